//! Parsing of N3 documents into the engine's term model.

mod util;
pub use self::util::*;

pub mod error;
pub use self::error::*;

pub mod production;
pub mod terminals;

use crate::common::Prolog;
use crate::error::Result;
use crate::term::{Term, Triple};
use std::cell::RefCell;
use std::collections::VecDeque;

/// The current context of the parser.
#[derive(Debug, Default)]
pub struct Context {
    /// Prefixes and Base
    pub(crate) prolog: Prolog,
    /// Number of parsed blank nodes. Used for naming anonymous nodes.
    bnode_cnt: usize,
    /// When a blank node property list is parsed its surrounding
    /// statement is built first. The list's triples are stored and
    /// returned afterwards.
    triple_stack: VecDeque<Triple>,
}

impl Context {
    /// A context with the `rdf`, `xsd` and SWAP prefixes pre-bound.
    pub fn with_default_prefixes() -> Self {
        Self {
            prolog: Prolog::with_default_prefixes(),
            bnode_cnt: 0,
            triple_stack: VecDeque::new(),
        }
    }
    pub(crate) fn new_anon_bnode(&mut self) -> Term {
        let bn = Term::Blank(format!("anon{}", self.bnode_cnt));
        self.bnode_cnt += 1;
        bn
    }
    pub(crate) fn push_triple(&mut self, triple: Triple) {
        self.triple_stack.push_back(triple)
    }
    pub(crate) fn drain_triples(&mut self) -> Vec<Triple> {
        self.triple_stack.drain(..).collect()
    }
    /// Depth mark so formulas only collect the triples pushed while they
    /// were being parsed.
    pub(crate) fn stack_mark(&self) -> usize {
        self.triple_stack.len()
    }
    pub(crate) fn drain_triples_from(&mut self, mark: usize) -> Vec<Triple> {
        self.triple_stack.split_off(mark).into_iter().collect()
    }
}

/// A parsed document: its prefix environment and its statements.
///
/// Statements whose predicate is `log:implies` / `log:impliedBy` at the
/// top level are rule candidates; splitting them off is the loader's job,
/// not the parser's.
#[derive(Debug, Default)]
pub struct Document {
    /// Prefixes and base collected from the directives.
    pub prolog: Prolog,
    /// All top-level statements in document order.
    pub triples: Vec<Triple>,
}

/// Parses a complete N3 document.
pub fn parse_document(doc: &str) -> Result<Document> {
    let ctx = RefCell::new(Context::default());
    let (rest, triples) =
        production::document(doc, &ctx).map_err(|e| crate::error::Error::Parser(match e {
            nom::Err::Error(pe) | nom::Err::Failure(pe) => pe.to_string(),
            nom::Err::Incomplete(_) => "Unexpected end of input".to_string(),
        }))?;
    if !rest.is_empty() {
        return Err(crate::error::Error::Parser(format!(
            "Trailing content: {:.48}",
            rest
        )));
    }
    Ok(Document {
        prolog: ctx.into_inner().prolog,
        triples,
    })
}

/// A parser that yields a document's triples statement by statement.
pub struct Parser<'a> {
    /// Gathered metadata.
    ctx: RefCell<Context>,
    /// Current position within the document.
    current: &'a str,
    /// Triples of the last parsed statement not yet returned.
    pending: VecDeque<Triple>,
    /// true if the parser failed once or is at EOF.
    ///
    /// In both cases the `next() = None`.
    end_or_failed: bool,
}

impl<'a> Parser<'a> {
    /// Creates a new Parser.
    pub fn new(doc: &'a str) -> Self {
        // trim leading whitespaces
        let (doc, _) = terminals::multispace0(doc).unwrap();
        Self {
            ctx: RefCell::new(Context::default()),
            current: doc,
            pending: VecDeque::new(),
            end_or_failed: false,
        }
    }
    /// A new parser with a pre-set base IRI to resolve `iri` productions.
    ///
    /// _Note:_ If the document contains an own `base` directive the
    /// pre-set value is overridden.
    pub fn with_base(doc: &'a str, base: impl Into<String>) -> Result<Self> {
        let mut ctx = Context::default();
        ctx.prolog.set_base(base.into())?;

        // trim leading whitespaces
        let (doc, _) = terminals::multispace0(doc).unwrap();
        Ok(Self {
            ctx: RefCell::new(ctx),
            current: doc,
            pending: VecDeque::new(),
            end_or_failed: false,
        })
    }

    /// The prefix environment gathered so far.
    pub fn prolog(&self) -> Prolog {
        self.ctx.borrow().prolog.clone()
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Triple>;

    /// Returns parsed triples.
    ///
    /// The parsing is done statement per statement. The parsed triples
    /// from a statement are stored internally. When all triples of a
    /// parsed statement are returned the next statement is parsed.
    fn next(&mut self) -> Option<Self::Item> {
        if self.end_or_failed {
            return None;
        } else if let Some(tri) = self.pending.pop_front() {
            return Some(Ok(tri));
        } else if self.current.is_empty() {
            self.end_or_failed = true;
            return None;
        }

        let step = production::statement(self.current, &self.ctx);
        let rest = match step {
            Ok((rest, triples)) => {
                self.pending.extend(triples);
                rest
            }
            Err(e) => {
                self.end_or_failed = true;
                let msg = match e {
                    nom::Err::Error(pe) | nom::Err::Failure(pe) => pe.to_string(),
                    nom::Err::Incomplete(_) => "Unexpected end of input".to_string(),
                };
                return Some(Err(crate::error::Error::Parser(msg)));
            }
        };
        // multispace0 never fails
        let (rest, _) = terminals::multispace0(rest).unwrap();
        self.current = rest;

        self.next()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ns;

    #[test]
    fn parse_simple_document() {
        let example = r#"   # initial comment
        @prefix : <http://example.org/ns#> .
        @prefix math: <http://www.w3.org/2000/10/swap/math#> .

        :config :iterations "10" .
        :ix :input 28561 . # 169^2
        :ix :label "iks"@en .
        "#;

        let doc = parse_document(example).unwrap();
        assert_eq!(doc.triples.len(), 3);
        assert_eq!(
            doc.triples[0].s,
            Term::Iri("http://example.org/ns#config".into())
        );
        assert_eq!(doc.triples[1].o, Term::integer(28561));
        assert_eq!(doc.triples[2].o, Term::lang_tagged("iks", "en"));
    }

    #[test]
    fn parse_rules_and_formulas() {
        let example = r#"
        @prefix : <http://example.org/ns#> .
        @prefix math: <http://www.w3.org/2000/10/swap/math#> .

        :socrates a :Man .
        { ?x a :Man . (?x 2) math:sum ?y . } => { ?x a :Mortal } .
        "#;

        let doc = parse_document(example).unwrap();
        assert_eq!(doc.triples.len(), 2);
        let rule = &doc.triples[1];
        assert_eq!(rule.p, Term::Iri(ns::log::implies.into()));
        match (&rule.s, &rule.o) {
            (Term::Graph(premise), Term::Graph(conclusion)) => {
                assert_eq!(premise.len(), 2);
                assert_eq!(premise[1].o, Term::Var("y".into()));
                assert_eq!(conclusion.len(), 1);
            }
            other => panic!("not a rule shape: {:?}", other),
        }
    }

    #[test]
    fn parser_iterates_statement_wise() {
        let example = r#"
        @prefix : <http://example.org/ns#> .
        :a :p :b ; :q :c , :d .
        "#;
        let triples: Vec<_> = Parser::new(example).collect::<Result<_>>().unwrap();
        assert_eq!(triples.len(), 3);
    }

    #[test]
    fn syntax_error_is_reported() {
        assert!(parse_document(":a :b ").is_err());
    }
}
