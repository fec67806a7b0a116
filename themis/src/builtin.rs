//! Builtin evaluation.
//!
//! Every builtin predicate lives in one of the fixed SWAP namespaces.
//! A builtin receives the substituted goal, the ambient substitution, the
//! proof scope and the run state, and answers with a list of delta
//! substitutions, each extending the ambient one. An empty list is
//! failure; failure is control flow, never an error.

pub mod crypto;
pub mod list;
pub mod log;
pub mod math;
pub mod string;
pub mod time;

use crate::error::Result;
use crate::ns;
use crate::prove::{ProveOpts, Scope};
use crate::reason::Run;
use crate::store::FactStore;
use crate::subst::Subst;
use crate::term::{Term, Triple};
use crate::unify::{unify, Mode};

/// The answer of the dispatcher.
pub(crate) enum Outcome {
    /// The predicate is not a builtin; resolve it against facts and
    /// rules.
    NotBuiltin,
    /// The predicate is a builtin and produced these solutions.
    Solutions(Vec<Subst>),
}

/// Evaluates `goal` if its predicate is a builtin.
///
/// In super-restricted mode everything except `log:implies` and
/// `log:impliedBy` is treated as an ordinary predicate.
pub(crate) fn eval(
    goal: &Triple,
    subst: &Subst,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
    opts: &ProveOpts,
) -> Result<Outcome> {
    let pred = match goal.p.as_iri() {
        Some(iri) => iri.to_string(),
        None => return Ok(Outcome::NotBuiltin),
    };
    if run.config.super_restricted
        && pred != ns::log::implies
        && pred != ns::log::impliedBy
    {
        return Ok(Outcome::NotBuiltin);
    }
    if pred.starts_with(ns::crypto::PREFIX) {
        return Ok(crypto::eval(&pred, goal, subst));
    }
    if pred.starts_with(ns::math::PREFIX) {
        return Ok(math::eval(&pred, goal, subst, scope.facts));
    }
    if pred.starts_with(ns::time::PREFIX) {
        return Ok(time::eval(&pred, goal, subst, run));
    }
    if pred.starts_with(ns::string::PREFIX) {
        return Ok(string::eval(&pred, goal, subst, scope.facts));
    }
    if pred.starts_with(ns::list::PREFIX)
        || pred == ns::rdf::first
        || pred == ns::rdf::rest
    {
        return list::eval(&pred, goal, subst, scope, run, opts);
    }
    if pred.starts_with(ns::log::PREFIX) {
        return log::eval(&pred, goal, subst, scope, run, opts);
    }
    Ok(Outcome::NotBuiltin)
}

/// Math relations that hold for some value of their arguments; the
/// prover treats them as satisfiable once the whole conjunction rotated
/// without binding them.
pub(crate) fn is_functional_math(pred: &Term) -> bool {
    match pred.as_iri() {
        Some(iri) => math::is_functional(iri),
        None => false,
    }
}

/// Zero-or-one solutions out of an optional substitution.
pub(crate) fn solutions(s: Option<Subst>) -> Outcome {
    Outcome::Solutions(s.into_iter().collect())
}

/// Exactly one solution: the unchanged ambient substitution.
pub(crate) fn succeed(subst: &Subst) -> Outcome {
    Outcome::Solutions(vec![subst.clone()])
}

/// No solutions.
pub(crate) fn fail() -> Outcome {
    Outcome::Solutions(Vec::new())
}

/// Unifies in the default mode, producing a delta candidate.
pub(crate) fn bind(a: &Term, b: &Term, subst: &Subst) -> Option<Subst> {
    unify(a, b, subst, Mode::General)
}

/// A term as a closed list: an explicit list term, `rdf:nil`, or a node
/// heading an `rdf:first`/`rdf:rest` chain in the fact store.
pub(crate) fn as_list(t: &Term, facts: &FactStore) -> Option<Vec<Term>> {
    match t {
        Term::List(items) => Some(items.clone()),
        Term::Iri(_) | Term::Blank(_) => facts.materialize_list(t),
        _ => None,
    }
}

/// Strict comparison where both sides are ground, unification otherwise.
/// The strict side never identifies across numeric datatypes and never
/// matches booleans by value.
pub(crate) fn strict_unify(a: &Term, b: &Term, subst: &Subst) -> Option<Subst> {
    let left = subst.apply(a);
    let right = subst.apply(b);
    if left.is_ground() && right.is_ground() {
        if left == right {
            Some(subst.clone())
        } else {
            None
        }
    } else {
        unify(&left, &right, subst, Mode::General)
    }
}
