//! Structural equality and alpha-equivalence.
//!
//! Structural equality is what `==` on [`Term`](../enum.Term.html) means:
//! IRIs, blanks and variables by value; literals by canonical string with
//! two extra rules (a plain literal equals the same lexical typed
//! `xsd:string`, and two numeric literals of the _same_ datatype are equal
//! when their values are); quoted formulas as unordered triple sets up to
//! a bijective renaming of variables and blank labels. Equality never
//! identifies literals across different numeric datatypes, which is what
//! the list builtins rely on when a ground side is compared.

use super::literal::{self, Suffix};
use super::{Term, Triple};
use crate::ns::xsd;
use std::collections::HashMap;

impl PartialEq for Term {
    fn eq(&self, other: &Term) -> bool {
        eq_term(self, other)
    }
}

/// Structural term equality; the relation behind `==`.
pub fn eq_term(a: &Term, b: &Term) -> bool {
    match (a, b) {
        (Term::Iri(x), Term::Iri(y)) => x == y,
        (Term::Blank(x), Term::Blank(y)) => x == y,
        (Term::Var(x), Term::Var(y)) => x == y,
        (Term::Literal(x), Term::Literal(y)) => literal_eq(x, y),
        (Term::List(xs), Term::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| eq_term(x, y))
        }
        (Term::OpenList(xs, xt), Term::OpenList(ys, yt)) => {
            xt == yt && xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| eq_term(x, y))
        }
        (Term::Graph(xs), Term::Graph(ys)) => alpha_eq(xs, ys),
        _ => false,
    }
}

/// Equality of canonical literal strings.
pub fn literal_eq(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (alex, asuf) = literal::parts(a);
    let (blex, bsuf) = literal::parts(b);
    match (normalize(asuf), normalize(bsuf)) {
        (Suffix::Plain, Suffix::Plain) => alex == blex,
        (Suffix::Lang(x), Suffix::Lang(y)) => alex == blex && x.eq_ignore_ascii_case(y),
        (Suffix::Datatype(dx), Suffix::Datatype(dy)) => {
            if dx != dy {
                return false;
            }
            if alex == blex {
                return true;
            }
            if dx == xsd::decimal
                || dx == xsd::float
                || dx == xsd::double
                || literal::is_integer_datatype(dx)
            {
                match (
                    literal::numeric_value(&Term::Literal(a.to_string())),
                    literal::numeric_value(&Term::Literal(b.to_string())),
                ) {
                    (Some(x), Some(y)) => x.same_value(&y),
                    _ => false,
                }
            } else {
                false
            }
        }
        _ => false,
    }
}

/// `xsd:string` typing carries no information; fold it into plain.
fn normalize(suffix: Suffix) -> Suffix {
    match suffix {
        Suffix::Datatype(dt) if dt == xsd::string => Suffix::Plain,
        other => other,
    }
}

/// A bijective renaming accumulated while matching two formulas.
#[derive(Debug, Clone, Default)]
struct Renaming {
    vars: Bijection,
    blanks: Bijection,
}

#[derive(Debug, Clone, Default)]
struct Bijection {
    fwd: HashMap<String, String>,
    bwd: HashMap<String, String>,
}

impl Bijection {
    /// Accepts the pair if it is consistent with the mapping so far.
    fn pair(&mut self, x: &str, y: &str) -> bool {
        match (self.fwd.get(x), self.bwd.get(y)) {
            (None, None) => {
                self.fwd.insert(x.to_string(), y.to_string());
                self.bwd.insert(y.to_string(), x.to_string());
                true
            }
            (Some(mapped), Some(back)) => mapped == y && back == x,
            _ => false,
        }
    }
}

/// Alpha-equivalence of two quoted formulas.
///
/// Both sides are treated as unordered sets; the formulas are equal iff a
/// bijection on variables and blank labels maps one set of triples onto
/// the other. Nested formulas open a fresh renaming scope.
pub fn alpha_eq(xs: &[Triple], ys: &[Triple]) -> bool {
    if xs.len() != ys.len() {
        return false;
    }
    let mut used = vec![false; ys.len()];
    match_from(xs, 0, ys, &mut used, &Renaming::default())
}

fn match_from(xs: &[Triple], at: usize, ys: &[Triple], used: &mut [bool], ren: &Renaming) -> bool {
    if at == xs.len() {
        return true;
    }
    for j in 0..ys.len() {
        if used[j] {
            continue;
        }
        let mut attempt = ren.clone();
        if alpha_triple(&xs[at], &ys[j], &mut attempt) {
            used[j] = true;
            if match_from(xs, at + 1, ys, used, &attempt) {
                return true;
            }
            used[j] = false;
        }
    }
    false
}

fn alpha_triple(a: &Triple, b: &Triple, ren: &mut Renaming) -> bool {
    alpha_term(&a.p, &b.p, ren) && alpha_term(&a.s, &b.s, ren) && alpha_term(&a.o, &b.o, ren)
}

fn alpha_term(a: &Term, b: &Term, ren: &mut Renaming) -> bool {
    match (a, b) {
        (Term::Var(x), Term::Var(y)) => ren.vars.pair(x, y),
        (Term::Blank(x), Term::Blank(y)) => ren.blanks.pair(x, y),
        (Term::Iri(x), Term::Iri(y)) => x == y,
        (Term::Literal(x), Term::Literal(y)) => literal_eq(x, y),
        (Term::List(xs), Term::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| alpha_term(x, y, ren))
        }
        (Term::OpenList(xs, xt), Term::OpenList(ys, yt)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys).all(|(x, y)| alpha_term(x, y, ren))
                && ren.vars.pair(xt, yt)
        }
        // Fresh scope for nested formulas.
        (Term::Graph(xs), Term::Graph(ys)) => alpha_eq(xs, ys),
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ns;
    use test_case::test_case;

    fn iri(v: &str) -> Term {
        Term::Iri(v.into())
    }
    fn var(v: &str) -> Term {
        Term::Var(v.into())
    }
    fn blank(v: &str) -> Term {
        Term::Blank(v.into())
    }
    fn spo(s: Term, p: &str, o: Term) -> Triple {
        Triple::new(s, iri(p), o)
    }

    #[test_case(Term::plain("x"), Term::typed("x", ns::xsd::string) => true ; "plain equals xsd string")]
    #[test_case(Term::plain("x"), Term::plain("y") => false ; "different lexicals")]
    #[test_case(Term::typed("01", ns::xsd::integer), Term::integer(1) => true ; "integer by value")]
    #[test_case(Term::typed("2", ns::xsd::integer), Term::typed("2.0", ns::xsd::decimal) => false ; "never across numeric datatypes")]
    #[test_case(Term::typed("2.50", ns::xsd::decimal), Term::typed("2.5", ns::xsd::decimal) => true ; "decimal by value")]
    #[test_case(Term::lang_tagged("hi", "EN"), Term::lang_tagged("hi", "en") => true ; "lang tag case")]
    #[test_case(blank("a"), blank("b") => false ; "blanks by label")]
    fn check_eq(a: Term, b: Term) -> bool {
        a == b
    }

    #[test]
    fn alpha_equivalence_renames_consistently() {
        let f1 = vec![
            spo(var("x"), "p", var("y")),
            spo(var("y"), "p", var("x")),
        ];
        let f2 = vec![
            spo(var("a"), "p", var("b")),
            spo(var("b"), "p", var("a")),
        ];
        assert!(alpha_eq(&f1, &f2));

        // ?a must not map to both ?x and ?y.
        let f3 = vec![
            spo(var("a"), "p", var("a")),
            spo(var("a"), "p", var("a")),
        ];
        assert!(!alpha_eq(&f1, &f3));
    }

    #[test]
    fn alpha_equivalence_is_order_insensitive() {
        let f1 = vec![spo(iri("a"), "p", iri("b")), spo(iri("c"), "q", iri("d"))];
        let f2 = vec![spo(iri("c"), "q", iri("d")), spo(iri("a"), "p", iri("b"))];
        assert!(Term::Graph(f1) == Term::Graph(f2));
    }

    #[test]
    fn blanks_and_vars_do_not_mix() {
        let f1 = vec![spo(var("x"), "p", iri("b"))];
        let f2 = vec![spo(blank("x"), "p", iri("b"))];
        assert!(!alpha_eq(&f1, &f2));
    }
}
