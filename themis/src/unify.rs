//! Term unification.
//!
//! `unify` substitutes both sides with the incoming substitution before
//! the structural comparison, so variable cases below only ever see
//! unbound variables.

use crate::term::equal::{alpha_eq, literal_eq};
use crate::term::literal::{bool_value, numeric_value};
use crate::term::{Term, Triple};
use crate::subst::Subst;
use std::collections::HashSet;

/// Unification flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Standard unification: literals also match on boolean value
    /// (`true`/`false`/`1`/`0`).
    General,
    /// The `list:append` variant: boolean matching is off, but an integer
    /// literal matches a decimal literal whose scaled value is equal.
    Append,
}

/// Unifies two terms under a substitution.
///
/// On success the result extends `subst`; on failure `None`.
pub fn unify(a: &Term, b: &Term, subst: &Subst, mode: Mode) -> Option<Subst> {
    let a = subst.apply(a);
    let b = subst.apply(b);
    unify_applied(&a, &b, subst.clone(), mode)
}

/// Unifies two triples, predicate first (most selective position).
pub fn unify_triple(a: &Triple, b: &Triple, subst: &Subst, mode: Mode) -> Option<Subst> {
    let s = unify(&a.p, &b.p, subst, mode)?;
    let s = unify(&a.s, &b.s, &s, mode)?;
    unify(&a.o, &b.o, &s, mode)
}

fn unify_applied(a: &Term, b: &Term, subst: Subst, mode: Mode) -> Option<Subst> {
    match (a, b) {
        (Term::Var(x), Term::Var(y)) if x == y => Some(subst),
        (Term::Var(x), t) => bind_checked(x, t, subst),
        (t, Term::Var(y)) => bind_checked(y, t, subst),
        (Term::Iri(x), Term::Iri(y)) => if x == y { Some(subst) } else { None },
        (Term::Blank(x), Term::Blank(y)) => if x == y { Some(subst) } else { None },
        (Term::Literal(x), Term::Literal(y)) => {
            if literal_eq(x, y) {
                return Some(subst);
            }
            match mode {
                Mode::General => match (bool_value(a), bool_value(b)) {
                    (Some(x), Some(y)) if x == y => Some(subst),
                    _ => None,
                },
                Mode::Append => match (numeric_value(a), numeric_value(b)) {
                    (Some(x), Some(y)) if x.same_scaled_value(&y) => Some(subst),
                    _ => None,
                },
            }
        }
        (Term::List(xs), Term::List(ys)) => {
            if xs.len() != ys.len() {
                return None;
            }
            unify_each(xs, ys, subst, mode)
        }
        (Term::OpenList(xs, tail), Term::List(ys))
        | (Term::List(ys), Term::OpenList(xs, tail)) => {
            if ys.len() < xs.len() {
                return None;
            }
            let s = unify_each(xs, &ys[..xs.len()], subst, mode)?;
            let rest = Term::List(ys[xs.len()..].iter().map(|t| s.apply(t)).collect());
            bind_checked(tail, &rest, s)
        }
        (Term::OpenList(xs, xt), Term::OpenList(ys, yt)) => {
            if xt != yt || xs.len() != ys.len() {
                return None;
            }
            unify_each(xs, ys, subst, mode)
        }
        (Term::Graph(xs), Term::Graph(ys)) => {
            // No bindings needed when the formulas already coincide.
            if alpha_eq(xs, ys) {
                return Some(subst);
            }
            if xs.len() != ys.len() {
                return None;
            }
            let mut used = vec![false; ys.len()];
            unify_graphs(xs, 0, ys, &mut used, subst, mode)
        }
        _ => None,
    }
}

fn unify_each(xs: &[Term], ys: &[Term], subst: Subst, mode: Mode) -> Option<Subst> {
    let mut s = subst;
    for (x, y) in xs.iter().zip(ys) {
        s = unify(x, y, &s, mode)?;
    }
    Some(s)
}

/// Unordered matching of two formulas that threads the ambient
/// substitution through the triple unifications.
fn unify_graphs(
    xs: &[Triple],
    at: usize,
    ys: &[Triple],
    used: &mut [bool],
    subst: Subst,
    mode: Mode,
) -> Option<Subst> {
    if at == xs.len() {
        return Some(subst);
    }
    for j in 0..ys.len() {
        if used[j] {
            continue;
        }
        if let Some(s) = unify_triple(&xs[at], &ys[j], &subst, mode) {
            used[j] = true;
            if let Some(s) = unify_graphs(xs, at + 1, ys, used, s, mode) {
                return Some(s);
            }
            used[j] = false;
        }
    }
    None
}

fn bind_checked(var: &str, term: &Term, mut subst: Subst) -> Option<Subst> {
    if occurs(var, term) {
        return None;
    }
    subst.bind(var, term.clone());
    Some(subst)
}

/// The occurs check: does `term` contain the variable `var`?
pub fn occurs(var: &str, term: &Term) -> bool {
    let mut vars = HashSet::new();
    term.collect_vars(&mut vars);
    vars.contains(var)
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

    #[test]
    fn binds_unbound_variables() {
        let s = unify(&var("x"), &iri("a"), &Subst::new(), Mode::General).unwrap();
        assert_eq!(s.apply(&var("x")), iri("a"));
    }

    #[test]
    fn soundness_under_application() {
        let a = Term::List(vec![var("x"), iri("b")]);
        let b = Term::List(vec![iri("a"), var("y")]);
        let s = unify(&a, &b, &Subst::new(), Mode::General).unwrap();
        assert!(s.apply(&a) == s.apply(&b));
    }

    #[test]
    fn occurs_check_rejects() {
        let a = var("x");
        let b = Term::List(vec![var("x")]);
        assert!(unify(&a, &b, &Subst::new(), Mode::General).is_none());
    }

    #[test_case(Mode::General => true ; "boolean mode on by default")]
    #[test_case(Mode::Append => false ; "boolean mode off when appending")]
    fn boolean_literals(mode: Mode) -> bool {
        unify(
            &Term::plain("1"),
            &Term::typed("true", ns::xsd::boolean),
            &Subst::new(),
            mode,
        )
        .is_some()
    }

    #[test_case(Mode::General => false ; "no cross type by default")]
    #[test_case(Mode::Append => true ; "scaled equality when appending")]
    fn integer_meets_decimal(mode: Mode) -> bool {
        unify(
            &Term::integer(2),
            &Term::typed("2.0", ns::xsd::decimal),
            &Subst::new(),
            mode,
        )
        .is_some()
    }

    #[test]
    fn open_list_against_list() {
        let open = Term::OpenList(vec![var("h")], "t".into());
        let closed = Term::List(vec![iri("a"), iri("b"), iri("c")]);
        let s = unify(&open, &closed, &Subst::new(), Mode::General).unwrap();
        assert_eq!(s.apply(&var("h")), iri("a"));
        assert_eq!(
            s.apply(&var("t")),
            Term::List(vec![iri("b"), iri("c")])
        );
    }

    #[test]
    fn formulas_unify_with_bindings() {
        let lhs = Term::Graph(vec![Triple::new(var("x"), iri("p"), iri("b"))]);
        let rhs = Term::Graph(vec![Triple::new(iri("a"), iri("p"), iri("b"))]);
        let s = unify(&lhs, &rhs, &Subst::new(), Mode::General).unwrap();
        assert_eq!(s.apply(&var("x")), iri("a"));
    }
}
