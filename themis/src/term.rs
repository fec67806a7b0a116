//! The term model of the engine.
//!
//! Terms form a strict tree; shared structure is expressed through shared
//! labels (blank nodes, variables), never through shared memory. All
//! comparisons are by value.

pub mod equal;
pub mod literal;

use crate::subst::Subst;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A term of the Notation3 data model.
///
/// Equality (`==`) is _structural_ equality: IRIs and blanks by value,
/// literals by canonical string with plain literals identified with
/// `xsd:string` and numeric literals of the same datatype compared by
/// value, and quoted formulas compared up to renaming of variables and
/// blank labels (see [`equal`](equal/index.html)).
#[derive(Debug, Clone)]
pub enum Term {
    /// A resource identifier.
    Iri(String),
    /// A literal in canonical form: the raw lexical value between double
    /// quotes followed by an optional `@lang` tag or `^^<datatype>`.
    Literal(String),
    /// An anonymous node. Two blanks with the same label within one
    /// document are the same node.
    Blank(String),
    /// A rule variable, scoped to its defining rule once standardized.
    Var(String),
    /// A closed list.
    List(Vec<Term>),
    /// A list with a known prefix and a variable tail.
    OpenList(Vec<Term>, String),
    /// A quoted formula.
    Graph(Vec<Triple>),
}

impl Term {
    /// A plain literal from a raw (unescaped) lexical value.
    pub fn plain(lex: impl AsRef<str>) -> Self {
        Term::Literal(format!("\"{}\"", lex.as_ref()))
    }
    /// A typed literal.
    pub fn typed(lex: impl AsRef<str>, dt: &str) -> Self {
        Term::Literal(format!("\"{}\"^^<{}>", lex.as_ref(), dt))
    }
    /// A language-tagged literal.
    pub fn lang_tagged(lex: impl AsRef<str>, tag: &str) -> Self {
        Term::Literal(format!("\"{}\"@{}", lex.as_ref(), tag))
    }
    /// An `xsd:boolean` literal.
    pub fn boolean(b: bool) -> Self {
        Term::typed(if b { "true" } else { "false" }, crate::ns::xsd::boolean)
    }
    /// An `xsd:integer` literal.
    pub fn integer(i: impl ToString) -> Self {
        Term::typed(i.to_string(), crate::ns::xsd::integer)
    }

    /// The IRI value if this is an IRI term.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
    /// The canonical literal string if this is a literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }
    /// The variable name if this is a variable.
    pub fn as_var(&self) -> Option<&str> {
        match self {
            Term::Var(v) => Some(v),
            _ => None,
        }
    }

    /// True if the term contains neither variables nor open lists.
    ///
    /// Variables _inside_ quoted formulas do not count; they are local
    /// placeholders of the formula.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Var(_) | Term::OpenList(..) => false,
            Term::List(items) => items.iter().all(Term::is_ground),
            Term::Graph(_) => true,
            _ => true,
        }
    }

    /// True if the term contains no variables, blanks or open lists
    /// anywhere, including inside quoted formulas.
    pub fn is_strictly_ground(&self) -> bool {
        match self {
            Term::Var(_) | Term::OpenList(..) | Term::Blank(_) => false,
            Term::List(items) => items.iter().all(Term::is_strictly_ground),
            Term::Graph(triples) => triples.iter().all(Triple::is_strictly_ground),
            _ => true,
        }
    }

    /// Collects the names of all variables in the term, including those
    /// inside quoted formulas.
    pub fn collect_vars(&self, out: &mut HashSet<String>) {
        match self {
            Term::Var(v) => {
                out.insert(v.clone());
            }
            Term::List(items) => items.iter().for_each(|t| t.collect_vars(out)),
            Term::OpenList(items, tail) => {
                items.iter().for_each(|t| t.collect_vars(out));
                out.insert(tail.clone());
            }
            Term::Graph(triples) => triples.iter().for_each(|t| t.collect_vars(out)),
            _ => {}
        }
    }

    /// Collects the labels of all blank nodes in the term, including
    /// those inside quoted formulas.
    pub fn collect_blanks(&self, out: &mut HashSet<String>) {
        match self {
            Term::Blank(label) => {
                out.insert(label.clone());
            }
            Term::List(items) | Term::OpenList(items, _) => {
                items.iter().for_each(|t| t.collect_blanks(out))
            }
            Term::Graph(triples) => triples.iter().for_each(|t| {
                t.s.collect_blanks(out);
                t.p.collect_blanks(out);
                t.o.collect_blanks(out);
            }),
            _ => {}
        }
    }

    /// Renames every variable through `rename`, including inside quoted
    /// formulas. Used to standardize rules apart.
    pub fn rename_vars(&self, rename: &dyn Fn(&str) -> String) -> Term {
        match self {
            Term::Var(v) => Term::Var(rename(v)),
            Term::List(items) => {
                Term::List(items.iter().map(|t| t.rename_vars(rename)).collect())
            }
            Term::OpenList(items, tail) => Term::OpenList(
                items.iter().map(|t| t.rename_vars(rename)).collect(),
                rename(tail),
            ),
            Term::Graph(triples) => {
                Term::Graph(triples.iter().map(|t| t.rename_vars(rename)).collect())
            }
            other => other.clone(),
        }
    }

    /// Replaces blank nodes through `replace`, including inside lists and
    /// quoted formulas. Used to skolemize head existentials.
    pub fn map_blanks(&self, replace: &dyn Fn(&str) -> Term) -> Term {
        match self {
            Term::Blank(label) => replace(label),
            Term::List(items) => {
                Term::List(items.iter().map(|t| t.map_blanks(replace)).collect())
            }
            Term::OpenList(items, tail) => Term::OpenList(
                items.iter().map(|t| t.map_blanks(replace)).collect(),
                tail.clone(),
            ),
            Term::Graph(triples) => Term::Graph(
                triples
                    .iter()
                    .map(|t| {
                        Triple::new(
                            t.s.map_blanks(replace),
                            t.p.map_blanks(replace),
                            t.o.map_blanks(replace),
                        )
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Term {
    /// Prefix-free N3 rendition. The [`serialize`](../serialize/index.html)
    /// module compacts against a prolog.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Literal(l) => write!(f, "{}", l),
            Term::Blank(label) => write!(f, "_:{}", label),
            Term::Var(v) => write!(f, "?{}", v),
            Term::List(items) => {
                write!(f, "(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Term::OpenList(items, tail) => {
                write!(f, "(")?;
                for item in items {
                    write!(f, "{} ", item)?;
                }
                write!(f, "| ?{})", tail)
            }
            Term::Graph(triples) => {
                write!(f, "{{")?;
                for t in triples {
                    write!(f, " {} .", t)?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// A subject, predicate, object statement.
///
/// Predicates are usually IRIs but any term is handled uniformly.
#[derive(Debug, Clone, PartialEq)]
pub struct Triple {
    /// Subject.
    pub s: Term,
    /// Predicate.
    pub p: Term,
    /// Object.
    pub o: Term,
}

impl Triple {
    /// Assembles a triple.
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }

    /// True if subject, predicate and object are all ground.
    pub fn is_ground(&self) -> bool {
        self.s.is_ground() && self.p.is_ground() && self.o.is_ground()
    }

    /// True if no position holds a variable, blank or open list, formulas
    /// included.
    pub fn is_strictly_ground(&self) -> bool {
        self.s.is_strictly_ground() && self.p.is_strictly_ground() && self.o.is_strictly_ground()
    }

    /// Collects variable names over all three positions.
    pub fn collect_vars(&self, out: &mut HashSet<String>) {
        self.s.collect_vars(out);
        self.p.collect_vars(out);
        self.o.collect_vars(out);
    }

    /// Collects blank labels over all three positions.
    pub fn collect_blanks(&self, out: &mut HashSet<String>) {
        self.s.collect_blanks(out);
        self.p.collect_blanks(out);
        self.o.collect_blanks(out);
    }

    /// Renames variables over all three positions.
    pub fn rename_vars(&self, rename: &dyn Fn(&str) -> String) -> Triple {
        Triple::new(
            self.s.rename_vars(rename),
            self.p.rename_vars(rename),
            self.o.rename_vars(rename),
        )
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.s, self.p, self.o)
    }
}

/// An inference rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Position in the rule registry; part of the firing key.
    pub id: usize,
    /// The body that must be proven for the rule to fire.
    pub premise: Vec<Triple>,
    /// The head instantiated on firing.
    pub conclusion: Vec<Triple>,
    /// Forward (`=>`) or backward (`<=`) chaining.
    pub is_forward: bool,
    /// A `{…} => false` rule; firing it is a programmed contradiction.
    pub is_fuse: bool,
    /// Labels of blanks introduced in the head only (existentials).
    /// Blanks occurring in the body are rewritten to variables up front.
    pub head_blanks: HashSet<String>,
}

impl Rule {
    /// The variables free in the rule (premise and conclusion).
    pub fn free_vars(&self) -> HashSet<String> {
        let mut vars = HashSet::new();
        for t in self.premise.iter().chain(self.conclusion.iter()) {
            t.collect_vars(&mut vars);
        }
        vars
    }
}

/// A fact produced by forward chaining, recorded for explanation.
#[derive(Debug, Clone)]
pub struct DerivedFact {
    /// The derived triple.
    pub fact: Triple,
    /// The rule that fired.
    pub rule: Rc<Rule>,
    /// The rule's premise under the proof substitution.
    pub premises: Vec<Triple>,
    /// The proof substitution itself.
    pub binding: Subst,
}
