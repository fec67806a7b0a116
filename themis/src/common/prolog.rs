//! The prolog of prefixes and base typical for Notation3-derived
//! documents.

use crate::error::{Error, Result};
use crate::parse::terminals::{IRIREF_ONLY, PN_PREFIX};
use std::collections::HashMap;

/// Prefix and base environment of a document.
///
/// Used by the parser to expand prefixed names, by the serializer to
/// compact IRIs, and by the tracer to format terms.
#[derive(Clone, Debug, Default)]
pub struct Prolog {
    pub(crate) base: Option<String>,
    pub(crate) prefixes: HashMap<String, String>,
}

impl Prolog {
    /// A completely empty prolog: neither base nor prefixes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the default configuration with the default prefixes.
    ///
    /// Uses internally [`add_default_prefixes()`](#method.add_default_prefixes)
    pub fn with_default_prefixes() -> Self {
        let mut prolog = Self::default();
        prolog.add_default_prefixes();
        prolog
    }

    /// Checks if a given value is a valid IRI to be used as namespace.
    pub fn is_valid_ns(ns: &str) -> bool {
        IRIREF_ONLY.is_match(ns)
    }

    /// Checks if a given value is a valid prefix.
    pub fn is_valid_prefix(p: &str) -> bool {
        p.is_empty() || PN_PREFIX.is_match(p)
    }

    /// Set the base IRI.
    ///
    /// # Errors
    ///
    /// This method fails if base is not a valid IRI.
    pub fn set_base(&mut self, base: impl Into<String>) -> Result<&mut Self> {
        let base = base.into();
        if Self::is_valid_ns(&base) {
            self.base = Some(base);
            Ok(self)
        } else {
            Err(Error::InvalidIri(base))
        }
    }

    /// Removes the base IRI if it was set.
    pub fn unset_base(&mut self) -> &mut Self {
        self.base = None;
        self
    }

    /// Read the current base IRI.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Add a prefix.
    ///
    /// # Error
    ///
    /// Checks if both prefix and namespace are valid.
    pub fn add_prefix(&mut self, p: impl Into<String>, ns: impl Into<String>) -> Result<&mut Self> {
        let (p, ns) = (p.into(), ns.into());
        if !Self::is_valid_prefix(&p) {
            return Err(Error::InvalidPrefix(p));
        }
        if !Self::is_valid_ns(&ns) {
            return Err(Error::InvalidIri(ns));
        }
        self.prefixes.insert(p, ns);
        Ok(self)
    }

    /// Add a list of prefixes.
    ///
    /// # Error
    ///
    /// Checks if both prefixes and namespaces are valid.
    pub fn add_prefixes(
        &mut self,
        prefixes: impl Iterator<Item = (String, String)>,
    ) -> Result<&mut Self> {
        for (p, ns) in prefixes {
            self.add_prefix(p, ns)?;
        }
        Ok(self)
    }

    /// Adds prefixes for the `rdf`, `xsd` and SWAP builtin namespaces.
    pub fn add_default_prefixes(&mut self) -> &mut Self {
        use crate::ns;
        self.prefixes
            .insert("rdf".into(), ns::rdf::PREFIX.into());
        self.prefixes
            .insert("xsd".into(), ns::xsd::PREFIX.into());
        self.prefixes
            .insert("crypto".into(), ns::crypto::PREFIX.into());
        self.prefixes
            .insert("math".into(), ns::math::PREFIX.into());
        self.prefixes
            .insert("time".into(), ns::time::PREFIX.into());
        self.prefixes
            .insert("list".into(), ns::list::PREFIX.into());
        self.prefixes
            .insert("log".into(), ns::log::PREFIX.into());
        self.prefixes
            .insert("string".into(), ns::string::PREFIX.into());
        self
    }

    /// Deletes all prefixes.
    pub fn clear_prefixes(&mut self) -> &mut Self {
        self.prefixes.clear();
        self
    }

    /// The namespace bound to a prefix.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// All bound prefixes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.prefixes.iter()
    }

    /// Expands a prefixed name `prefix:local` against the bound
    /// namespaces.
    pub fn expand(&self, prefix: &str, local: &str) -> Option<String> {
        self.namespace(prefix).map(|ns| format!("{}{}", ns, local))
    }

    /// Resolves a (possibly relative) IRI reference against the base.
    ///
    /// Only the simple joining cases a document's own IRIs need; no full
    /// RFC 3986 resolution.
    pub fn resolve(&self, iri: &str) -> String {
        if iri.contains("://") || self.base.is_none() {
            return iri.to_string();
        }
        let base = self.base.as_deref().unwrap();
        if let Some(frag) = iri.strip_prefix('#') {
            let stem = base.split('#').next().unwrap_or(base);
            return format!("{}#{}", stem, frag);
        }
        if iri.is_empty() {
            return base.to_string();
        }
        match base.rfind('/') {
            Some(slash) => format!("{}{}", &base[..slash + 1], iri),
            None => iri.to_string(),
        }
    }

    /// Compacts an IRI to `prefix:local` when a bound namespace covers
    /// it. The longest namespace wins.
    pub fn shrink<'a>(&self, iri: &'a str) -> Option<(String, &'a str)> {
        let mut hit: Option<(&String, &String)> = None;
        for (p, ns) in &self.prefixes {
            if iri.starts_with(ns.as_str()) {
                match hit {
                    Some((_, best)) if best.len() >= ns.len() => {}
                    _ => hit = Some((p, ns)),
                }
            }
        }
        hit.map(|(p, ns)| (p.clone(), &iri[ns.len()..]))
    }
}
