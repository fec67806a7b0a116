//! Fact and rule storage with overlay indexes.
//!
//! Facts live in insertion order with three overlays: by predicate, by
//! (predicate, subject) and by (predicate, object), plus a key set for
//! O(1) duplicate checks when all three positions are indexable. Backward
//! rules are indexed by head predicate.

pub mod list;

use crate::term::literal::{self, Suffix};
use crate::term::{Rule, Term, Triple};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A fast lookup key for a term.
///
/// IRIs, blanks and literals have keys; lists, open lists, formulas and
/// variables do not. Literal keys are normalized so that a plain literal
/// and its `xsd:string` spelling collide, and numeric literals of one
/// datatype collide on their value.
pub fn fast_key(term: &Term) -> Option<String> {
    match term {
        Term::Iri(iri) => Some(format!("I:{}", iri)),
        Term::Blank(label) => Some(format!("B:{}", label)),
        Term::Literal(lit) => {
            let (lex, suffix) = literal::parts(lit);
            match suffix {
                Suffix::Plain => Some(format!("S:{}", lex)),
                Suffix::Lang(tag) => Some(format!("L:@{}|{}", tag.to_ascii_lowercase(), lex)),
                Suffix::Datatype(dt) if dt == crate::ns::xsd::string => {
                    Some(format!("S:{}", lex))
                }
                Suffix::Datatype(dt) => match literal::numeric_value(term) {
                    Some(num) => Some(format!("N:{}|{}", dt, num.canon())),
                    None => Some(format!("L:{}|{}", dt, lex)),
                },
            }
        }
        _ => None,
    }
}

/// The `S\tP\tO` key of a triple, when every position is indexable.
pub fn triple_key(triple: &Triple) -> Option<String> {
    Some(format!(
        "{}\t{}\t{}",
        fast_key(&triple.s)?,
        fast_key(&triple.p)?,
        fast_key(&triple.o)?
    ))
}

/// The indexed multiset of ground facts.
///
/// Mutated only by the forward chainer; the prover reads it. Snapshots
/// taken between saturation phases carry a closure `level`.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: Vec<Triple>,
    by_pred: HashMap<String, Vec<usize>>,
    by_ps: HashMap<String, HashMap<String, Vec<usize>>>,
    by_po: HashMap<String, HashMap<String, Vec<usize>>>,
    key_set: HashSet<String>,
    level: u32,
    list_cache: RefCell<HashMap<String, Option<Vec<Term>>>>,
}

impl FactStore {
    /// An empty store at closure level 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a sequence of triples, dropping duplicates.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut store = Self::new();
        for t in triples {
            store.insert(t);
        }
        store
    }

    /// Number of stored facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// True when no fact is stored.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// All facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.facts.iter()
    }

    /// The closure level this store was frozen at; 0 for the live store.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// A read-only copy tagged with the given closure level.
    pub fn freeze(&self, level: u32) -> FactStore {
        let mut copy = self.clone();
        copy.level = level;
        copy
    }

    /// Appends a fact unless a structural duplicate is already indexed.
    /// Returns whether the fact was new.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.has(&triple) {
            return false;
        }
        let idx = self.facts.len();
        if let Some(key) = triple_key(&triple) {
            self.key_set.insert(key);
        }
        if let Term::Iri(p) = &triple.p {
            self.by_pred.entry(p.clone()).or_default().push(idx);
            if let Some(sk) = fast_key(&triple.s) {
                self.by_ps
                    .entry(p.clone())
                    .or_default()
                    .entry(sk)
                    .or_default()
                    .push(idx);
            }
            if let Some(ok) = fast_key(&triple.o) {
                self.by_po
                    .entry(p.clone())
                    .or_default()
                    .entry(ok)
                    .or_default()
                    .push(idx);
            }
        }
        self.facts.push(triple);
        // The rdf:first/rdf:rest graph may have grown.
        self.list_cache.borrow_mut().clear();
        true
    }

    /// Structural membership test.
    ///
    /// Goes through the key set when the triple is fully indexable,
    /// otherwise scans the most selective bucket. Blanks are compared by
    /// label; two blanks with different labels are distinct existentials.
    pub fn has(&self, triple: &Triple) -> bool {
        if let Some(key) = triple_key(triple) {
            return self.key_set.contains(&key);
        }
        self.scan_bucket(triple).any(|f| f == triple)
    }

    fn scan_bucket<'a>(&'a self, triple: &Triple) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        if let Term::Iri(p) = &triple.p {
            if let Some(ok) = fast_key(&triple.o) {
                let hits = self
                    .by_po
                    .get(p)
                    .and_then(|m| m.get(&ok))
                    .map(|v| v.as_slice())
                    .unwrap_or(&[]);
                return Box::new(hits.iter().map(move |&i| &self.facts[i]));
            }
            let hits = self.by_pred.get(p).map(|v| v.as_slice()).unwrap_or(&[]);
            return Box::new(hits.iter().map(move |&i| &self.facts[i]));
        }
        Box::new(self.facts.iter())
    }

    /// Facts worth trying to unify with a goal.
    ///
    /// With an IRI predicate, uses whichever of the (predicate, subject) /
    /// (predicate, object) overlays applies; when both do, the smaller
    /// bucket wins. Without one, every fact is a candidate.
    pub fn candidates(&self, goal: &Triple) -> Vec<&Triple> {
        let p = match &goal.p {
            Term::Iri(p) => p,
            _ => return self.facts.iter().collect(),
        };
        let sk = fast_key(&goal.s);
        let ok = fast_key(&goal.o);
        let ps = sk
            .as_ref()
            .and_then(|k| self.by_ps.get(p).and_then(|m| m.get(k)));
        let po = ok
            .as_ref()
            .and_then(|k| self.by_po.get(p).and_then(|m| m.get(k)));
        let hits: &[usize] = match (sk.is_some(), ok.is_some()) {
            (true, true) => {
                let ps = ps.map(|v| v.as_slice()).unwrap_or(&[]);
                let po = po.map(|v| v.as_slice()).unwrap_or(&[]);
                if ps.len() <= po.len() {
                    ps
                } else {
                    po
                }
            }
            (true, false) => ps.map(|v| v.as_slice()).unwrap_or(&[]),
            (false, true) => po.map(|v| v.as_slice()).unwrap_or(&[]),
            (false, false) => self.by_pred.get(p).map(|v| v.as_slice()).unwrap_or(&[]),
        };
        hits.iter().map(|&i| &self.facts[i]).collect()
    }

    pub(crate) fn cached_list(&self, key: &str) -> Option<Option<Vec<Term>>> {
        self.list_cache.borrow().get(key).cloned()
    }

    pub(crate) fn cache_list(&self, key: String, value: Option<Vec<Term>>) {
        self.list_cache.borrow_mut().insert(key, value);
    }
}

/// The rule registry with the backward-rule head index.
///
/// Appendable during forward chaining: `log:implies` conclusions can mint
/// new rules, and the head index is updated incrementally.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    forward: Vec<Rc<Rule>>,
    backward: Vec<Rc<Rule>>,
    by_head_pred: HashMap<String, Vec<Rc<Rule>>>,
    wild_head: Vec<Rc<Rule>>,
    next_id: usize,
}

impl RuleSet {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of registered rules.
    pub fn len(&self) -> usize {
        self.forward.len() + self.backward.len()
    }

    /// True when no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The forward rules in registration order.
    pub fn forward(&self) -> &[Rc<Rule>] {
        &self.forward
    }

    /// The backward rules in registration order.
    pub fn backward(&self) -> &[Rc<Rule>] {
        &self.backward
    }

    /// Registers a rule, assigning its id. Backward rules are indexed by
    /// the predicate of their single head triple; non-IRI heads go to the
    /// wildcard list.
    pub fn add(
        &mut self,
        premise: Vec<Triple>,
        conclusion: Vec<Triple>,
        is_forward: bool,
        is_fuse: bool,
        head_blanks: HashSet<String>,
    ) -> Rc<Rule> {
        let rule = Rc::new(Rule {
            id: self.next_id,
            premise,
            conclusion,
            is_forward,
            is_fuse,
            head_blanks,
        });
        self.next_id += 1;
        if is_forward {
            self.forward.push(rule.clone());
        } else {
            self.backward.push(rule.clone());
            if rule.conclusion.len() == 1 {
                match &rule.conclusion[0].p {
                    Term::Iri(p) => self
                        .by_head_pred
                        .entry(p.clone())
                        .or_default()
                        .push(rule.clone()),
                    _ => self.wild_head.push(rule.clone()),
                }
            }
        }
        rule
    }

    /// Backward rules whose head may match a goal with this predicate:
    /// the bucket for an IRI predicate plus the wildcard list, or every
    /// indexed rule for a non-IRI goal predicate. Candidates come back in
    /// registration order.
    pub fn backward_candidates(&self, pred: &Term) -> Vec<Rc<Rule>> {
        let mut out = Vec::new();
        match pred {
            Term::Iri(p) => {
                if let Some(bucket) = self.by_head_pred.get(p) {
                    out.extend(bucket.iter().cloned());
                }
                out.extend(self.wild_head.iter().cloned());
            }
            _ => {
                // Registration order keeps derivations deterministic.
                out.extend(
                    self.backward
                        .iter()
                        .filter(|r| r.conclusion.len() == 1)
                        .cloned(),
                );
            }
        }
        out
    }

    /// True when an equivalent rule (same direction, alpha-equivalent
    /// premise and conclusion) is already registered.
    pub fn contains_equivalent(
        &self,
        premise: &[Triple],
        conclusion: &[Triple],
        is_forward: bool,
    ) -> bool {
        let pool = if is_forward {
            &self.forward
        } else {
            &self.backward
        };
        let prem = Term::Graph(premise.to_vec());
        let concl = Term::Graph(conclusion.to_vec());
        pool.iter().any(|r| {
            Term::Graph(r.premise.clone()) == prem && Term::Graph(r.conclusion.clone()) == concl
        })
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
    fn spo(s: &str, p: &str, o: Term) -> Triple {
        Triple::new(iri(s), iri(p), o)
    }

    #[test]
    fn duplicate_elimination_is_semantic() {
        let mut store = FactStore::new();
        assert!(store.insert(spo("a", "p", Term::plain("x"))));
        // The xsd:string spelling is the same literal.
        assert!(!store.insert(spo("a", "p", Term::typed("x", ns::xsd::string))));
        // Same integer value, different lexical form.
        assert!(store.insert(spo("a", "q", Term::typed("01", ns::xsd::integer))));
        assert!(!store.insert(spo("a", "q", Term::integer(1))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn blanks_stay_distinct() {
        let mut store = FactStore::new();
        assert!(store.insert(Triple::new(
            Term::Blank("a".into()),
            iri("p"),
            Term::integer(1)
        )));
        assert!(store.insert(Triple::new(
            Term::Blank("b".into()),
            iri("p"),
            Term::integer(1)
        )));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn candidate_selection_prefers_smaller_bucket() {
        let mut store = FactStore::new();
        for i in 0..10 {
            store.insert(spo("s", "p", Term::integer(i)));
        }
        store.insert(spo("other", "p", Term::integer(0)));
        // Subject bucket has 10 entries, object bucket 2; object wins.
        let goal = spo("s", "p", Term::integer(0));
        assert_eq!(store.candidates(&goal).len(), 2);
    }

    #[test_case(Term::List(vec![]) => None ; "list has no key")]
    #[test_case(Term::Var("x".into()) => None ; "var has no key")]
    #[test_case(Term::Iri("a".into()) => Some("I:a".to_string()) ; "iri key")]
    fn check_fast_key(t: Term) -> Option<String> {
        fast_key(&t)
    }

    #[test]
    fn backward_rule_index() {
        let mut rules = RuleSet::new();
        let head = vec![spo("s", "p", iri("o"))];
        rules.add(vec![], head.clone(), false, false, HashSet::new());
        assert_eq!(rules.backward_candidates(&iri("p")).len(), 1);
        assert_eq!(rules.backward_candidates(&iri("q")).len(), 0);
        assert_eq!(
            rules.backward_candidates(&Term::Var("any".into())).len(),
            1
        );
        assert!(rules.contains_equivalent(&[], &head, false));
        assert!(!rules.contains_equivalent(&[], &head, true));
    }
}
