//! Substitutions mapping variable names to terms.
//!
//! The prover shallow-copies substitutions whenever it explores an
//! alternative, so a substitution is a plain map with value semantics.
//! Application follows variable chains with a cycle guard; structural
//! cycles cannot arise because unification performs an occurs check.

use crate::term::{Term, Triple};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A set of variable bindings.
#[derive(Debug, Clone, Default)]
pub struct Subst {
    map: HashMap<String, Term>,
}

impl Subst {
    /// The empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The binding of `var`, if any. Does not follow chains.
    pub fn get(&self, var: &str) -> Option<&Term> {
        self.map.get(var)
    }

    /// Binds `var` to `term`, replacing any previous binding.
    pub fn bind(&mut self, var: impl Into<String>, term: Term) {
        self.map.insert(var.into(), term);
    }

    /// Iterates over all bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Term)> {
        self.map.iter()
    }

    /// Follows the chain starting at `var` until an unbound variable or a
    /// non-variable term. Returns `None` when `var` ends unbound at itself
    /// or the chain cycles.
    fn resolve(&self, var: &str) -> Resolved {
        let mut seen = HashSet::new();
        let mut cur = var;
        loop {
            if !seen.insert(cur.to_string()) {
                return Resolved::Unbound(var.to_string());
            }
            match self.map.get(cur) {
                Some(Term::Var(next)) => cur = next,
                Some(term) => return Resolved::Bound(term.clone()),
                None => return Resolved::Unbound(cur.to_string()),
            }
        }
    }

    /// Applies the substitution to a term, recursing into lists and
    /// quoted formulas.
    pub fn apply(&self, term: &Term) -> Term {
        if self.map.is_empty() {
            return term.clone();
        }
        match term {
            Term::Var(v) => match self.resolve(v) {
                Resolved::Bound(t) => self.apply(&t),
                Resolved::Unbound(rep) => Term::Var(rep),
            },
            Term::List(items) => Term::List(items.iter().map(|t| self.apply(t)).collect()),
            Term::OpenList(items, tail) => {
                let mut items: Vec<Term> = items.iter().map(|t| self.apply(t)).collect();
                match self.resolve(tail) {
                    Resolved::Bound(Term::List(rest)) => {
                        items.extend(rest.iter().map(|t| self.apply(t)));
                        Term::List(items)
                    }
                    Resolved::Bound(Term::OpenList(rest, tail2)) => {
                        items.extend(rest.iter().map(|t| self.apply(t)));
                        Term::OpenList(items, tail2)
                    }
                    Resolved::Bound(other) => {
                        // A tail bound to a non-list is kept as-is; the
                        // unifier rejects such bindings.
                        let _ = other;
                        Term::OpenList(items, tail.clone())
                    }
                    Resolved::Unbound(rep) => Term::OpenList(items, rep),
                }
            }
            Term::Graph(triples) => {
                Term::Graph(triples.iter().map(|t| self.apply_triple(t)).collect())
            }
            other => other.clone(),
        }
    }

    /// Applies the substitution to all three positions of a triple.
    pub fn apply_triple(&self, triple: &Triple) -> Triple {
        Triple::new(
            self.apply(&triple.s),
            self.apply(&triple.p),
            self.apply(&triple.o),
        )
    }

    /// Applies the substitution to a sequence of triples.
    pub fn apply_all(&self, triples: &[Triple]) -> Vec<Triple> {
        triples.iter().map(|t| self.apply_triple(t)).collect()
    }

    /// Merges `delta` into a copy of `self`.
    ///
    /// Fails when both bind the same variable to structurally unequal
    /// terms.
    pub fn compose(&self, delta: &Subst) -> Option<Subst> {
        let mut out = self.clone();
        for (var, term) in delta.iter() {
            match out.map.get(var) {
                Some(existing) if existing != term => return None,
                Some(_) => {}
                None => {
                    out.map.insert(var.clone(), term.clone());
                }
            }
        }
        Some(out)
    }

    /// Discards bindings not transitively referenced from `roots`.
    ///
    /// Run periodically on deep proofs to stop quadratic copying; the
    /// roots are the variables of the remaining goals plus the caller's
    /// answer variables.
    pub fn compact(&self, roots: &HashSet<String>) -> Subst {
        let mut keep = HashMap::new();
        let mut queue: Vec<String> = roots.iter().cloned().collect();
        let mut seen: HashSet<String> = roots.clone();
        while let Some(var) = queue.pop() {
            if let Some(term) = self.map.get(&var) {
                keep.insert(var, term.clone());
                let mut vars = HashSet::new();
                term.collect_vars(&mut vars);
                for v in vars {
                    if seen.insert(v.clone()) {
                        queue.push(v);
                    }
                }
            }
        }
        Subst { map: keep }
    }

    /// Restricts to the given variables without following references.
    /// Used when printing explanations.
    pub fn project(&self, vars: &HashSet<String>) -> Subst {
        Subst {
            map: self
                .map
                .iter()
                .filter(|(v, _)| vars.contains(*v))
                .map(|(v, t)| (v.clone(), t.clone()))
                .collect(),
        }
    }
}

enum Resolved {
    Bound(Term),
    Unbound(String),
}

impl fmt::Display for Subst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut entries: Vec<_> = self.map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        write!(f, "{{")?;
        for (idx, (var, term)) in entries.into_iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{} -> {}", var, term)?;
        }
        write!(f, "}}")
    }
}
