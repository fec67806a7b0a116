//! RDF-list materialization.
//!
//! List builtins accept a node that heads an `rdf:first`/`rdf:rest` chain
//! in the fact store in place of an explicit list term. Materialized
//! lists are cached on the store.

use super::{fast_key, FactStore};
use crate::ns::rdf;
use crate::term::{Term, Triple};
use std::collections::HashSet;

impl FactStore {
    /// Builds a closed list from the `rdf:first`/`rdf:rest` chain headed
    /// at `node`.
    ///
    /// Duplicate `rdf:first`/`rdf:rest` statements for one node collapse
    /// when they agree; conflicting values or a cyclic chain yield
    /// `None`. `rdf:nil` is the empty list.
    pub fn materialize_list(&self, node: &Term) -> Option<Vec<Term>> {
        if is_nil(node) {
            return Some(Vec::new());
        }
        let key = fast_key(node)?;
        if let Some(hit) = self.cached_list(&key) {
            return hit;
        }
        let result = self.walk_chain(node);
        self.cache_list(key, result.clone());
        result
    }

    fn walk_chain(&self, node: &Term) -> Option<Vec<Term>> {
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut cur = node.clone();
        loop {
            if is_nil(&cur) {
                return Some(items);
            }
            let key = fast_key(&cur)?;
            if !seen.insert(key) {
                // Cycle through rdf:rest.
                return None;
            }
            items.push(self.sole_object(&cur, rdf::first)?);
            cur = self.sole_object(&cur, rdf::rest)?;
        }
    }

    /// The single object of `(node, pred, _)`; duplicates collapse,
    /// disagreement fails.
    fn sole_object(&self, node: &Term, pred: &str) -> Option<Term> {
        let probe = Triple::new(node.clone(), Term::Iri(pred.to_string()), Term::Var("o".into()));
        let mut found: Option<Term> = None;
        for fact in self.candidates(&probe) {
            if &fact.s == node && fact.p == probe.p {
                match &found {
                    None => found = Some(fact.o.clone()),
                    Some(prev) if *prev == fact.o => {}
                    Some(_) => return None,
                }
            }
        }
        found
    }
}

fn is_nil(t: &Term) -> bool {
    matches!(t, Term::Iri(iri) if iri == rdf::nil)
}

#[cfg(test)]
mod test {
    use super::*;

    fn iri(v: &str) -> Term {
        Term::Iri(v.into())
    }
    fn blank(v: &str) -> Term {
        Term::Blank(v.into())
    }
    fn spo(s: Term, p: &str, o: Term) -> Triple {
        Triple::new(s, iri(p), o)
    }

    fn chain() -> FactStore {
        let mut store = FactStore::new();
        store.insert(spo(blank("l1"), rdf::first, Term::integer(1)));
        store.insert(spo(blank("l1"), rdf::rest, blank("l2")));
        store.insert(spo(blank("l2"), rdf::first, Term::integer(2)));
        store.insert(spo(blank("l2"), rdf::rest, iri(rdf::nil)));
        store
    }

    #[test]
    fn materializes_chains() {
        let store = chain();
        let list = store.materialize_list(&blank("l1")).unwrap();
        assert_eq!(list, vec![Term::integer(1), Term::integer(2)]);
        assert_eq!(store.materialize_list(&iri(rdf::nil)).unwrap(), vec![]);
    }

    #[test]
    fn conflicting_first_fails() {
        let mut store = chain();
        store.insert(spo(blank("l1"), rdf::first, Term::integer(9)));
        assert!(store.materialize_list(&blank("l1")).is_none());
    }

    #[test]
    fn cycles_fail() {
        let mut store = FactStore::new();
        store.insert(spo(blank("c"), rdf::first, Term::integer(1)));
        store.insert(spo(blank("c"), rdf::rest, blank("c")));
        assert!(store.materialize_list(&blank("c")).is_none());
    }
}
