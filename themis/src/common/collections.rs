//! Collections of terms.

use crate::term::{Term, Triple};

/// A list of terms.
pub type TermList = Vec<Term>;

/// A predicate with a list of objects
#[derive(Debug, Clone, PartialEq)]
pub struct PoList {
    predicate: Term,
    objects: TermList,
}

impl PoList {
    /// Creates a new PO-list from a predicate and a list of objects.
    pub fn new(predicate: Term, objects: TermList) -> Self {
        Self { predicate, objects }
    }
    /// Returns the list of predicates and objects.
    ///
    /// This consumes the list. For each pair the predicate is copied.
    pub fn into_pairs(self) -> impl Iterator<Item = (Term, Term)> {
        let p = self.predicate;
        self.objects.into_iter().map(move |o| (p.clone(), o))
    }
    /// Returns the list of predicates and objects by reference.
    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Term)> {
        self.objects.iter().map(move |o| (&self.predicate, o))
    }
}

/// A subject with a list of predicate-object-lists
#[derive(Debug, Clone, PartialEq)]
pub struct SpoList {
    subject: Term,
    po_lists: Vec<PoList>,
}

impl SpoList {
    /// Creates a new SPO-list from a subject and predicate-object-lists.
    pub fn new(subject: Term, po_lists: Vec<PoList>) -> Self {
        Self { subject, po_lists }
    }

    /// The subject all predicate-object pairs share.
    pub fn subject(&self) -> &Term {
        &self.subject
    }

    /// Returns the triples of the statement.
    ///
    /// This consumes the list. For each triple the subject and predicate
    /// are copied!
    pub fn into_triples(self) -> impl Iterator<Item = Triple> {
        let s_outer = self.subject;
        self.po_lists.into_iter().flat_map(move |pol| {
            let s = s_outer.clone();
            pol.into_pairs()
                .map(move |(p, o)| Triple::new(s.clone(), p, o))
        })
    }
}
