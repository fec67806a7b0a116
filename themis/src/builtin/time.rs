//! The `time:` builtins: lexical extraction from `xsd:dateTime` values
//! and the memoized local time.
//!
//! Components are read off the lexical form; there is no timezone
//! normalization.

use super::{bind, fail, solutions, Outcome};
use crate::ns::{time, xsd};
use crate::reason::Run;
use crate::subst::Subst;
use crate::term::{literal, Term, Triple};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Lexical space of `xsd:dateTime`, timezone optional.
    static ref DATE_TIME: Regex = Regex::new(
        r"^(-?\d{4,})-(\d{2})-(\d{2})T(\d{2}):(\d{2})(?::(\d{2}(?:\.\d+)?))?(Z|[+-]\d{2}:\d{2})?$"
    )
    .unwrap();
}

/// Dispatches a `time:` predicate.
pub(crate) fn eval(pred: &str, goal: &Triple, subst: &Subst, run: &mut Run<'_>) -> Outcome {
    if pred == time::localTime {
        let now = Term::typed(run.current_time(), xsd::dateTime);
        return solutions(bind(&goal.o, &now, subst));
    }

    let lex = match goal.s.as_literal() {
        Some(lit) => literal::lexical(lit),
        None => return fail(),
    };
    let captures = match DATE_TIME.captures(lex) {
        Some(c) => c,
        None => return fail(),
    };
    let group = |idx: usize| captures.get(idx).map(|m| m.as_str());

    let result = match pred {
        time::year => group(1).map(integer_component),
        time::month => group(2).map(integer_component),
        time::day => group(3).map(integer_component),
        time::hour => group(4).map(integer_component),
        time::minute => group(5).map(integer_component),
        time::second => group(6).map(second_component),
        time::timeZone => group(7).map(Term::plain),
        _ => return Outcome::NotBuiltin,
    };
    match result {
        Some(term) => solutions(bind(&goal.o, &term, subst)),
        // The component (timezone, seconds) is absent from the lexical.
        None => fail(),
    }
}

/// A numeric component without its leading zeros.
fn integer_component(lex: &str) -> Term {
    let (sign, digits) = match lex.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", lex),
    };
    let trimmed = digits.trim_start_matches('0');
    let value = if trimmed.is_empty() { "0" } else { trimmed };
    Term::typed(format!("{}{}", sign, value), xsd::integer)
}

/// Seconds keep their fraction when present.
fn second_component(lex: &str) -> Term {
    if lex.contains('.') {
        Term::typed(lex, xsd::decimal)
    } else {
        integer_component(lex)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::deref::NoFetch;
    use crate::reason::{Config, MemoryTrace};
    use test_case::test_case;

    fn extract(pred: &str, lexical: &str) -> Option<Term> {
        let config = Config::default();
        let deref = NoFetch::default();
        let mut tracer = MemoryTrace::default();
        let mut run = Run::new(&config, &deref, &mut tracer, Default::default());
        let goal = Triple::new(
            Term::typed(lexical, xsd::dateTime),
            Term::Iri(pred.into()),
            Term::Var("c".into()),
        );
        match eval(pred, &goal, &Subst::new(), &mut run) {
            Outcome::Solutions(sols) => {
                sols.first().map(|s| s.apply(&Term::Var("c".into())))
            }
            Outcome::NotBuiltin => None,
        }
    }

    const STAMP: &str = "2023-01-02T03:04:05.25+01:00";

    #[test_case(time::year => Some(Term::integer(2023)) ; "year")]
    #[test_case(time::month => Some(Term::integer(1)) ; "month")]
    #[test_case(time::day => Some(Term::integer(2)) ; "day")]
    #[test_case(time::hour => Some(Term::integer(3)) ; "hour")]
    #[test_case(time::minute => Some(Term::integer(4)) ; "minute")]
    #[test_case(time::second => Some(Term::typed("05.25", xsd::decimal)) ; "fractional second")]
    #[test_case(time::timeZone => Some(Term::plain("+01:00")) ; "time zone")]
    fn check_components(pred: &str) -> Option<Term> {
        extract(pred, STAMP)
    }

    #[test]
    fn missing_timezone_fails() {
        assert!(extract(time::timeZone, "2023-01-02T03:04:05").is_none());
    }

    #[test]
    fn fixed_now_pins_local_time() {
        let config = Config {
            fixed_now: Some("2020-06-01T00:00:00Z".to_string()),
            ..Config::default()
        };
        let deref = NoFetch::default();
        let mut tracer = MemoryTrace::default();
        let mut run = Run::new(&config, &deref, &mut tracer, Default::default());
        let goal = Triple::new(
            Term::plain(""),
            Term::Iri(time::localTime.into()),
            Term::Var("t".into()),
        );
        match eval(time::localTime, &goal, &Subst::new(), &mut run) {
            Outcome::Solutions(sols) => {
                assert_eq!(
                    sols[0].apply(&Term::Var("t".into())),
                    Term::typed("2020-06-01T00:00:00Z", xsd::dateTime)
                );
            }
            Outcome::NotBuiltin => panic!("localTime is a builtin"),
        }
    }
}
