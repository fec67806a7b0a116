//! The `crypto:` builtins: hex digests of string subjects.

use super::{bind, fail, Outcome};
use crate::ns;
use crate::subst::Subst;
use crate::term::{literal, Term, Triple};
use md5::{Digest, Md5};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

/// Dispatches a `crypto:` predicate.
pub(crate) fn eval(pred: &str, goal: &Triple, subst: &Subst) -> Outcome {
    // The subject must decode to a string.
    let text = match literal::string_value(&goal.s) {
        Some(lex) => lex.to_string(),
        None => return fail(),
    };
    let digest = match pred {
        ns::crypto::md5 => hex::encode(Md5::digest(text.as_bytes())),
        ns::crypto::sha => hex::encode(Sha1::digest(text.as_bytes())),
        ns::crypto::sha256 => hex::encode(Sha256::digest(text.as_bytes())),
        ns::crypto::sha512 => hex::encode(Sha512::digest(text.as_bytes())),
        _ => return Outcome::NotBuiltin,
    };
    super::solutions(bind(&goal.o, &Term::plain(digest), subst))
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    fn digest_of(pred: &str, subject: Term) -> Option<String> {
        let goal = Triple::new(subject, Term::Iri(pred.into()), Term::Var("d".into()));
        match eval(pred, &goal, &Subst::new()) {
            Outcome::Solutions(sols) => sols.first().map(|s| {
                literal::lexical(s.apply(&Term::Var("d".into())).as_literal().unwrap())
                    .to_string()
            }),
            Outcome::NotBuiltin => None,
        }
    }

    #[test_case(ns::crypto::md5, "abc" => Some("900150983cd24fb0d6963f7d28e17f72".to_string()) ; "md5")]
    #[test_case(ns::crypto::sha, "abc" => Some("a9993e364706816aba3e25717850c26c9cd0d89d".to_string()) ; "sha1")]
    #[test_case(ns::crypto::sha256, "abc" => Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string()) ; "sha256")]
    fn known_digests(pred: &str, text: &str) -> Option<String> {
        digest_of(pred, Term::plain(text))
    }

    #[test]
    fn non_string_subject_fails() {
        let goal = Triple::new(
            Term::integer(5),
            Term::Iri(ns::crypto::md5.into()),
            Term::Var("d".into()),
        );
        match eval(ns::crypto::md5, &goal, &Subst::new()) {
            Outcome::Solutions(sols) => assert!(sols.is_empty()),
            Outcome::NotBuiltin => panic!("md5 is a builtin"),
        }
    }
}
