//! Dereferencing of remote IRIs.
//!
//! The engine only consumes the interface; fetching strategies are left
//! to embedders. The bundled [`NoFetch`](struct.NoFetch.html) refuses
//! every remote fetch but still parses inline text, which is all
//! `log:parsedAsN3` needs.

use crate::error::{Error, Result};
use crate::term::Triple;

/// Resolves IRIs to their textual or parsed content.
///
/// A failed dereference is normal builtin failure for `log:semantics`
/// and friends; implementations report it as [`Error::Deref`](../error/enum.Error.html).
pub trait Dereference {
    /// The raw text behind an IRI.
    fn deref_text(&self, iri: &str) -> Result<String>;

    /// The parsed formula behind an IRI.
    fn deref_semantics(&self, iri: &str) -> Result<Vec<Triple>> {
        let text = self.deref_text(iri)?;
        self.parse_semantics(&text, Some(iri))
    }

    /// Parses N3 text into a formula, resolving against `base`.
    fn parse_semantics(&self, text: &str, base: Option<&str>) -> Result<Vec<Triple>>;
}

/// Removes the fragment part of an IRI.
pub fn strip_fragment(iri: &str) -> &str {
    iri.split('#').next().unwrap_or(iri)
}

/// Rejects plain-HTTP IRIs when the enforce-HTTPS toggle is on.
pub fn check_scheme(iri: &str, enforce_https: bool) -> Result<()> {
    if enforce_https && iri.starts_with("http://") {
        return Err(Error::Deref(
            iri.to_string(),
            "plain http is not allowed while HTTPS is enforced".to_string(),
        ));
    }
    Ok(())
}

/// A dereferencer without network access.
///
/// All remote fetches fail; inline parsing works.
#[derive(Debug, Clone, Default)]
pub struct NoFetch {
    /// Refuse `http://` IRIs outright.
    pub enforce_https: bool,
}

impl Dereference for NoFetch {
    fn deref_text(&self, iri: &str) -> Result<String> {
        check_scheme(iri, self.enforce_https)?;
        Err(Error::Deref(
            iri.to_string(),
            "remote fetching is disabled".to_string(),
        ))
    }

    fn parse_semantics(&self, text: &str, base: Option<&str>) -> Result<Vec<Triple>> {
        let parser = match base {
            Some(base) => crate::parse::Parser::with_base(text, base)?,
            None => crate::parse::Parser::new(text),
        };
        parser.collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("http://example.org/doc#frag" => "http://example.org/doc" ; "with fragment")]
    #[test_case("http://example.org/doc" => "http://example.org/doc" ; "without fragment")]
    fn check_strip_fragment(iri: &str) -> &str {
        strip_fragment(iri)
    }

    #[test]
    fn no_fetch_refuses_remote() {
        let d = NoFetch::default();
        assert!(d.deref_text("https://example.org/doc").is_err());
        assert!(d.deref_semantics("https://example.org/doc").is_err());
    }

    #[test]
    fn https_enforcement() {
        assert!(check_scheme("http://example.org/", true).is_err());
        assert!(check_scheme("https://example.org/", true).is_ok());
        assert!(check_scheme("http://example.org/", false).is_ok());
    }

    #[test]
    fn inline_parsing_works() {
        let d = NoFetch::default();
        let triples = d
            .parse_semantics("@prefix : <http://example.org/#> . :a :p :b .", None)
            .unwrap();
        assert_eq!(triples.len(), 1);
    }
}
