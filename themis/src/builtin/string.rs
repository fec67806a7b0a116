//! The `string:` builtins: comparison, concatenation, formatting and
//! regular expressions.

use super::{as_list, bind, fail, solutions, succeed, Outcome};
use crate::ns::string;
use crate::store::FactStore;
use crate::subst::Subst;
use crate::term::{literal, Term, Triple};
use regex::Regex;

/// Dispatches a `string:` predicate.
pub(crate) fn eval(pred: &str, goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    match pred {
        string::concatenation => concatenation(goal, subst, facts),
        string::contains => relation(goal, subst, |s, o| s.contains(o)),
        string::containsIgnoringCase => relation(goal, subst, |s, o| {
            s.to_lowercase().contains(&o.to_lowercase())
        }),
        string::startsWith => relation(goal, subst, |s, o| s.starts_with(o)),
        string::endsWith => relation(goal, subst, |s, o| s.ends_with(o)),
        string::equalIgnoringCase => relation(goal, subst, |s, o| {
            s.to_lowercase() == o.to_lowercase()
        }),
        string::notEqualIgnoringCase => relation(goal, subst, |s, o| {
            s.to_lowercase() != o.to_lowercase()
        }),
        string::greaterThan => relation(goal, subst, |s, o| s > o),
        string::lessThan => relation(goal, subst, |s, o| s < o),
        string::notGreaterThan => relation(goal, subst, |s, o| s <= o),
        string::notLessThan => relation(goal, subst, |s, o| s >= o),
        string::matches => regex_relation(goal, subst, true),
        string::notMatches => regex_relation(goal, subst, false),
        string::format => format_builtin(goal, subst, facts),
        string::replace => replace(goal, subst, facts),
        string::scrape => scrape(goal, subst, facts),
        _ => Outcome::NotBuiltin,
    }
}

/// The lexical value of any literal; string builtins are lenient about
/// datatypes so that numbers can be concatenated.
fn lex_of(t: &Term) -> Option<&str> {
    t.as_literal().map(literal::lexical)
}

fn relation(goal: &Triple, subst: &Subst, holds: impl Fn(&str, &str) -> bool) -> Outcome {
    match (lex_of(&goal.s), lex_of(&goal.o)) {
        (Some(s), Some(o)) if holds(s, o) => succeed(subst),
        _ => fail(),
    }
}

fn concatenation(goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    let items = match as_list(&goal.s, facts) {
        Some(items) => items,
        None => return fail(),
    };
    let mut out = String::new();
    for item in &items {
        match lex_of(item) {
            Some(lex) => out.push_str(lex),
            None => return fail(),
        }
    }
    solutions(bind(&goal.o, &Term::plain(out), subst))
}

/// Compiles a pattern, salvaging Perl-flavored identity escapes the
/// engine does not know.
pub(crate) fn compile_pattern(pattern: &str) -> Option<Regex> {
    if let Ok(re) = Regex::new(pattern) {
        return Some(re);
    }
    Regex::new(&salvage_escapes(pattern)).ok()
}

/// Drops the backslash of escapes that carry no meaning here (`\/`,
/// `\-`, …) while keeping every recognized class and anchor.
fn salvage_escapes(pattern: &str) -> String {
    const KNOWN: &str = "dDwWsSbBAzZpPnrtfvau0xukh\\^$.|?*+()[]{}-";
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some(&next) if KNOWN.contains(next) => {
                out.push('\\');
                out.push(next);
                chars.next();
            }
            Some(&next) => {
                // Identity escape: keep only the character.
                out.push(next);
                chars.next();
            }
            None => out.push('\\'),
        }
    }
    out
}

fn regex_relation(goal: &Triple, subst: &Subst, expect: bool) -> Outcome {
    let (s, pattern) = match (lex_of(&goal.s), lex_of(&goal.o)) {
        (Some(s), Some(p)) => (s, p),
        _ => return fail(),
    };
    match compile_pattern(pattern) {
        Some(re) => {
            if re.is_match(s) == expect {
                succeed(subst)
            } else {
                fail()
            }
        }
        None => fail(),
    }
}

/// `string:format` supports only `%s` and `%%`.
fn format_builtin(goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    let items = match as_list(&goal.s, facts) {
        Some(items) if !items.is_empty() => items,
        _ => return fail(),
    };
    let template = match lex_of(&items[0]) {
        Some(lex) => lex,
        None => return fail(),
    };
    let mut args = items[1..].iter();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('s') => match args.next().and_then(lex_of) {
                Some(lex) => out.push_str(lex),
                None => return fail(),
            },
            _ => return fail(),
        }
    }
    solutions(bind(&goal.o, &Term::plain(out), subst))
}

/// `(text pattern replacement) string:replace out`.
fn replace(goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    let items = match as_list(&goal.s, facts) {
        Some(items) if items.len() == 3 => items,
        _ => return fail(),
    };
    let (text, pattern, replacement) =
        match (lex_of(&items[0]), lex_of(&items[1]), lex_of(&items[2])) {
            (Some(t), Some(p), Some(r)) => (t, p, r),
            _ => return fail(),
        };
    match compile_pattern(pattern) {
        Some(re) => {
            let out = re.replace_all(text, replacement).into_owned();
            solutions(bind(&goal.o, &Term::plain(out), subst))
        }
        None => fail(),
    }
}

/// `(text pattern) string:scrape out`: the first capture group of the
/// first match.
fn scrape(goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    let items = match as_list(&goal.s, facts) {
        Some(items) if items.len() == 2 => items,
        _ => return fail(),
    };
    let (text, pattern) = match (lex_of(&items[0]), lex_of(&items[1])) {
        (Some(t), Some(p)) => (t, p),
        _ => return fail(),
    };
    let re = match compile_pattern(pattern) {
        Some(re) => re,
        None => return fail(),
    };
    match re.captures(text).and_then(|c| c.get(1)) {
        Some(group) => solutions(bind(&goal.o, &Term::plain(group.as_str()), subst)),
        None => fail(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    fn run(pred: &str, s: Term, o: Term) -> Vec<Subst> {
        let facts = FactStore::new();
        let goal = Triple::new(s, Term::Iri(pred.into()), o);
        match eval(pred, &goal, &Subst::new(), &facts) {
            Outcome::Solutions(sols) => sols,
            Outcome::NotBuiltin => panic!("{} should be a builtin", pred),
        }
    }

    fn object_of(pred: &str, s: Term) -> Option<String> {
        run(pred, s, Term::Var("out".into())).first().map(|sub| {
            literal::lexical(
                sub.apply(&Term::Var("out".into())).as_literal().unwrap(),
            )
            .to_string()
        })
    }

    #[test]
    fn concatenation_joins_lexicals() {
        let s = Term::List(vec![Term::plain("a"), Term::integer(1), Term::plain("b")]);
        assert_eq!(object_of(string::concatenation, s).unwrap(), "a1b");
    }

    #[test_case(string::contains, "hello", "ell" => true ; "contains")]
    #[test_case(string::contains, "hello", "xyz" => false ; "not contains")]
    #[test_case(string::containsIgnoringCase, "Hello", "hELL" => true ; "contains ignoring case")]
    #[test_case(string::startsWith, "hello", "he" => true ; "starts with")]
    #[test_case(string::endsWith, "hello", "lo" => true ; "ends with")]
    #[test_case(string::lessThan, "abc", "abd" => true ; "less than")]
    #[test_case(string::notLessThan, "abd", "abc" => true ; "not less than")]
    fn check_relation(pred: &str, s: &str, o: &str) -> bool {
        !run(pred, Term::plain(s), Term::plain(o)).is_empty()
    }

    #[test]
    fn format_substitutes() {
        let s = Term::List(vec![
            Term::plain("%s and %s%%"),
            Term::plain("this"),
            Term::plain("that"),
        ]);
        assert_eq!(object_of(string::format, s).unwrap(), "this and that%");
    }

    #[test_case("h.llo" => true ; "dot wildcard")]
    #[test_case(r"\d+" => false ; "digits against letters")]
    fn check_matches(pattern: &str) -> bool {
        !run(
            string::matches,
            Term::plain("hello"),
            Term::plain(pattern),
        )
        .is_empty()
    }

    #[test]
    fn unicode_property_escape() {
        assert!(!run(
            string::matches,
            Term::plain("Ω"),
            Term::plain(r"\p{Greek}"),
        )
        .is_empty());
    }

    #[test]
    fn perl_identity_escape_is_salvaged() {
        // `\/` is not a valid escape for this engine; the salvage pass
        // turns it into a plain slash.
        assert!(!run(
            string::matches,
            Term::plain("a/b"),
            Term::plain(r"a\/b"),
        )
        .is_empty());
    }

    #[test]
    fn replace_all_occurrences() {
        let s = Term::List(vec![
            Term::plain("banana"),
            Term::plain("an"),
            Term::plain("o"),
        ]);
        assert_eq!(object_of(string::replace, s).unwrap(), "booa");
    }

    #[test]
    fn scrape_first_group() {
        let s = Term::List(vec![
            Term::plain("v=42;"),
            Term::plain(r"v=(\d+)"),
        ]);
        assert_eq!(object_of(string::scrape, s).unwrap(), "42");
    }
}
