//! The reasoning front-end: configuration, run state and the `Reasoner`.
//!
//! A reasoning run is a nested, synchronous procedure call. Per-run state
//! (skolem cache and salt, memoized now, output strings) lives in
//! [`Run`](struct.Run.html), initialized when the outermost run starts
//! and dropped at its end; nested runs (`log:conclusion`) share the outer
//! run's state.

use crate::common::Prolog;
use crate::deref::{Dereference, NoFetch};
use crate::error::Result;
use crate::forward;
use crate::prove::{self, ProveOpts, Scope};
use crate::serialize::{Config as WriteConfig, Serializer};
use crate::skolem::SkolemManager;
use crate::store::{FactStore, RuleSet};
use crate::subst::Subst;
use crate::term::{literal, DerivedFact, Rule, Term, Triple};
use std::collections::HashMap;

/// Configuration flags of a reasoning run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Keep skolem identities stable across runs instead of salting them.
    pub deterministic_skolem: bool,
    /// Refuse to dereference plain-HTTP IRIs.
    pub enforce_https: bool,
    /// Emit explanation comments alongside derived facts.
    pub proof_comments: bool,
    /// Disable every builtin except `log:implies` and `log:impliedBy`.
    pub super_restricted: bool,
    /// Fix `time:localTime` to this `xsd:dateTime` lexical instead of the
    /// wall clock.
    pub fixed_now: Option<String>,
}

/// Sink for `log:trace` lines.
pub trait Trace {
    /// Writes one line.
    fn write_line(&mut self, line: &str);
}

/// The default tracer: standard error.
#[derive(Debug, Clone, Default)]
pub struct StderrTrace;

impl Trace for StderrTrace {
    fn write_line(&mut self, line: &str) {
        eprintln!("{}", line);
    }
}

/// A tracer that collects lines in memory; useful for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrace {
    /// The collected lines.
    pub lines: Vec<String>,
}

impl Trace for MemoryTrace {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// One `log:outputString` emission.
#[derive(Debug, Clone)]
pub(crate) struct OutputEntry {
    pub key: Term,
    pub text: String,
    pub seq: usize,
}

/// Mutable per-run state threaded through proving and chaining.
pub(crate) struct Run<'a> {
    pub config: &'a Config,
    pub deref: &'a dyn Dereference,
    pub tracer: &'a mut dyn Trace,
    pub skolem: SkolemManager,
    pub now: Option<String>,
    pub output: Vec<OutputEntry>,
    pub conclusions: HashMap<String, Vec<Triple>>,
    pub prefixes: Prolog,
    var_counter: usize,
}

impl<'a> Run<'a> {
    pub(crate) fn new(
        config: &'a Config,
        deref: &'a dyn Dereference,
        tracer: &'a mut dyn Trace,
        prefixes: Prolog,
    ) -> Self {
        let skolem = if config.deterministic_skolem {
            SkolemManager::deterministic()
        } else {
            SkolemManager::new(rand::random())
        };
        Self {
            config,
            deref,
            tracer,
            skolem,
            now: None,
            output: Vec::new(),
            conclusions: HashMap::new(),
            prefixes,
            var_counter: 0,
        }
    }

    /// A fresh standardization suffix, unique within the run.
    pub(crate) fn fresh_suffix(&mut self) -> usize {
        self.var_counter += 1;
        self.var_counter
    }

    /// A fresh variable never used before in this run.
    pub(crate) fn fresh_var(&mut self) -> String {
        format!("v.{}", self.fresh_suffix())
    }

    /// Standardizes a rule apart: every variable gets a fresh name so
    /// that distinct firings never share variables.
    pub(crate) fn standardize(&mut self, rule: &Rule) -> (Vec<Triple>, Vec<Triple>) {
        let n = self.fresh_suffix();
        let rename = move |v: &str| format!("{}.{}", v, n);
        (
            rule.premise.iter().map(|t| t.rename_vars(&rename)).collect(),
            rule.conclusion
                .iter()
                .map(|t| t.rename_vars(&rename))
                .collect(),
        )
    }

    /// Standardizes a formula apart to avoid variable capture when it is
    /// returned into the proof (dereferenced or parsed formulas).
    pub(crate) fn standardize_triples(&mut self, triples: &[Triple]) -> Vec<Triple> {
        let n = self.fresh_suffix();
        let rename = move |v: &str| format!("{}.{}", v, n);
        triples.iter().map(|t| t.rename_vars(&rename)).collect()
    }

    /// The memoized current time, or the configured fixed value.
    pub(crate) fn current_time(&mut self) -> String {
        if let Some(fixed) = &self.config.fixed_now {
            return fixed.clone();
        }
        if let Some(now) = &self.now {
            return now.clone();
        }
        let now = chrono::Local::now()
            .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
            .to_string();
        self.now = Some(now.clone());
        now
    }

    /// Renders a term for trace output against the trace prefixes.
    pub(crate) fn format_term(&self, t: &Term) -> String {
        let config = WriteConfig::with_prolog(self.prefixes.clone());
        Serializer::new(&config).term(t)
    }
}

/// The result of a reasoning run.
#[derive(Debug)]
pub struct RunOutput {
    /// The triple closure, input facts included.
    pub closure: Vec<Triple>,
    /// One record per derived fact, in derivation order.
    pub derivations: Vec<DerivedFact>,
    /// The concatenated `log:outputString` texts, ordered by subject key.
    pub output_string: String,
    /// Rendered explanation comments, one per derivation, when proof
    /// comments are enabled.
    pub comments: Vec<String>,
}

/// The reasoner: facts, rules and collaborators, ready to saturate.
pub struct Reasoner {
    facts: FactStore,
    rules: RuleSet,
    prolog: Prolog,
    trace_prolog: Option<Prolog>,
    config: Config,
    deref: Box<dyn Dereference>,
    tracer: Box<dyn Trace>,
}

impl Reasoner {
    /// A reasoner with the given config, no network access and stderr
    /// tracing.
    pub fn new(config: Config) -> Self {
        let enforce_https = config.enforce_https;
        Self {
            facts: FactStore::new(),
            rules: RuleSet::new(),
            prolog: Prolog::new(),
            trace_prolog: None,
            config,
            deref: Box::new(NoFetch { enforce_https }),
            tracer: Box::new(StderrTrace),
        }
    }

    /// Replaces the dereferencer.
    pub fn set_dereferencer(&mut self, deref: Box<dyn Dereference>) -> &mut Self {
        self.deref = deref;
        self
    }

    /// Replaces the tracer.
    pub fn set_tracer(&mut self, tracer: Box<dyn Trace>) -> &mut Self {
        self.tracer = tracer;
        self
    }

    /// The prefix environment used to format trace lines.
    pub fn trace_prefixes(&self) -> &Prolog {
        self.trace_prolog.as_ref().unwrap_or(&self.prolog)
    }

    /// Overrides the prefix environment used to format trace lines.
    pub fn set_trace_prefixes(&mut self, prolog: Prolog) -> &mut Self {
        self.trace_prolog = Some(prolog);
        self
    }

    /// The current fact store.
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    /// The prefix environment gathered from loaded documents.
    pub fn prolog(&self) -> &Prolog {
        &self.prolog
    }

    /// Number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Loads an N3 document: its prefixes, facts and rules.
    ///
    /// Top-level `{…} => {…}` statements register forward rules,
    /// `{…} <= {…}` backward rules and `{…} => false` fuses; everything
    /// else lands in the fact store.
    pub fn load_str(&mut self, doc: &str) -> Result<()> {
        let parsed = crate::parse::parse_document(doc)?;
        for (p, ns) in parsed.prolog.iter() {
            // Re-validated already during parsing.
            let _ = self.prolog.add_prefix(p.clone(), ns.clone());
        }
        for triple in parsed.triples {
            if let Some(parts) = forward::rule_parts(&triple) {
                forward::register_rule(&mut self.rules, parts);
            } else if triple.is_ground() {
                self.facts.insert(triple);
            } else {
                log::warn!("dropping non-ground top-level statement: {}", triple);
            }
        }
        Ok(())
    }

    /// Adds a single ground fact. Returns whether it was new.
    pub fn add_fact(&mut self, fact: Triple) -> bool {
        fact.is_ground() && self.facts.insert(fact)
    }

    /// Runs forward chaining to the fixed point.
    ///
    /// Returns the closure, the derivation records and the ordered
    /// `log:outputString` concatenation. A fired inference fuse surfaces
    /// as [`Error::Fuse`](../error/enum.Error.html); front-ends map it to
    /// process exit code 2.
    pub fn run(&mut self) -> Result<RunOutput> {
        literal::clear_caches();
        let trace_prefixes = self.trace_prefixes().clone();
        let mut run = Run::new(
            &self.config,
            &*self.deref,
            &mut *self.tracer,
            trace_prefixes,
        );
        let derivations = forward::saturate(&mut self.facts, &mut self.rules, &mut run)?;
        let mut output = run.output;
        // Derived `log:outputString` facts emit at run end too.
        for fact in self.facts.iter() {
            if fact.p.as_iri() == Some(crate::ns::log::outputString) {
                if let Some(lit) = fact.o.as_literal() {
                    let seq = output.len();
                    output.push(OutputEntry {
                        key: fact.s.clone(),
                        text: literal::lexical(lit).to_string(),
                        seq,
                    });
                }
            }
        }
        let output_string = assemble_output(output);
        let comments = if self.config.proof_comments {
            let prolog = self.trace_prefixes();
            derivations
                .iter()
                .map(|d| crate::explain::explain(d, prolog))
                .collect()
        } else {
            Vec::new()
        };
        Ok(RunOutput {
            closure: self.facts.iter().cloned().collect(),
            derivations,
            output_string,
            comments,
        })
    }

    /// Proves goals backward against the current facts and rules.
    ///
    /// Typically called after [`run()`](#method.run); returns one
    /// substitution per proof, up to `max_results`.
    pub fn query(&mut self, goals: &[Triple], max_results: Option<usize>) -> Result<Vec<Subst>> {
        let trace_prefixes = self.trace_prefixes().clone();
        let mut run = Run::new(
            &self.config,
            &*self.deref,
            &mut *self.tracer,
            trace_prefixes,
        );
        let scope = Scope {
            facts: &self.facts,
            rules: &self.rules,
            snapshot: None,
        };
        let opts = ProveOpts {
            max_results,
            defer_builtins: false,
        };
        prove::prove(goals, &Subst::new(), &scope, &mut run, &opts)
    }
}

/// Orders and concatenates the `log:outputString` entries: numeric
/// subject keys by value, then other literals lexicographically, then
/// IRIs, then blanks, each tie broken by insertion index.
fn assemble_output(mut entries: Vec<OutputEntry>) -> String {
    fn class(t: &Term) -> u8 {
        match t {
            Term::Literal(_) if literal::numeric_value(t).is_some() => 0,
            Term::Literal(_) => 1,
            Term::Iri(_) => 2,
            Term::Blank(_) => 3,
            _ => 4,
        }
    }
    entries.sort_by(|a, b| {
        use std::cmp::Ordering;
        let by_class = class(&a.key).cmp(&class(&b.key));
        if by_class != Ordering::Equal {
            return by_class;
        }
        let by_key = match (&a.key, &b.key) {
            (ka @ Term::Literal(la), kb @ Term::Literal(lb)) => {
                match (literal::numeric_value(ka), literal::numeric_value(kb)) {
                    (Some(x), Some(y)) => {
                        x.to_f64().partial_cmp(&y.to_f64()).unwrap_or(Ordering::Equal)
                    }
                    _ => literal::lexical(la).cmp(literal::lexical(lb)),
                }
            }
            (Term::Iri(x), Term::Iri(y)) => x.cmp(y),
            (Term::Blank(x), Term::Blank(y)) => x.cmp(y),
            _ => Ordering::Equal,
        };
        by_key.then(a.seq.cmp(&b.seq))
    });
    entries.into_iter().map(|e| e.text).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ns;

    const PRELUDE: &str = r#"
        @prefix : <http://example.org/ns#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
        @prefix math: <http://www.w3.org/2000/10/swap/math#> .
        @prefix log: <http://www.w3.org/2000/10/swap/log#> .
        @prefix string: <http://www.w3.org/2000/10/swap/string#> .
    "#;

    fn ex(local: &str) -> Term {
        Term::Iri(format!("http://example.org/ns#{}", local))
    }

    fn reason_over(doc: &str) -> RunOutput {
        let mut reasoner = Reasoner::new(Config::default());
        reasoner.load_str(&format!("{}{}", PRELUDE, doc)).unwrap();
        reasoner.run().unwrap()
    }

    fn has(closure: &[Triple], s: Term, p: Term, o: Term) -> bool {
        let probe = Triple::new(s, p, o);
        closure.iter().any(|t| *t == probe)
    }

    #[test]
    fn scenario_modus_ponens() {
        let out = reason_over(
            ":socrates a :Man . { ?x a :Man } => { ?x a :Mortal } .",
        );
        assert!(has(
            &out.closure,
            ex("socrates"),
            Term::Iri(ns::rdf::TYPE.into()),
            ex("Mortal")
        ));
        assert_eq!(out.derivations.len(), 1);
    }

    #[test]
    fn scenario_arithmetic_with_promotion() {
        let out = reason_over("{ (2 3.5) math:sum ?x } => { :r :v ?x } .");
        assert!(has(
            &out.closure,
            ex("r"),
            ex("v"),
            Term::typed("5.5", ns::xsd::decimal)
        ));
    }

    #[test]
    fn scenario_existential_head_skolemization() {
        let doc = ":a :hasPart _:p . \
                   { ?x :hasPart _:y } => { ?x :hasNamedPart _:z . _:z :for ?x } .";
        let mut reasoner = Reasoner::new(Config::default());
        reasoner.load_str(&format!("{}{}", PRELUDE, doc)).unwrap();
        let out = reasoner.run().unwrap();

        let named: Vec<&Triple> = out
            .closure
            .iter()
            .filter(|t| t.p == ex("hasNamedPart"))
            .collect();
        assert_eq!(named.len(), 1);
        let skolem = match &named[0].o {
            Term::Blank(label) => label.clone(),
            other => panic!("expected a skolem blank, got {:?}", other),
        };
        // The same fresh blank appears in both head triples.
        assert!(has(
            &out.closure,
            Term::Blank(skolem),
            ex("for"),
            ex("a")
        ));

        // Re-running adds nothing.
        let before = out.closure.len();
        let again = reasoner.run().unwrap();
        assert_eq!(again.closure.len(), before);
        assert!(again.derivations.is_empty());
    }

    #[test]
    fn scenario_scoped_collection() {
        let out = reason_over(
            ":a :n 1 . :a :n 2 . :a :n 3 . \
             { (?v { :a :n ?v } ?l) log:collectAllIn 1 . (?l) math:sum ?s } \
             => { :a :total ?s } .",
        );
        assert!(has(&out.closure, ex("a"), ex("total"), Term::integer(6)));
    }

    #[test]
    fn scenario_inference_fuse() {
        let mut reasoner = Reasoner::new(Config::default());
        reasoner
            .load_str(&format!(
                "{}{}",
                PRELUDE, ":p :q :r . { :p :q :r } => false ."
            ))
            .unwrap();
        match reasoner.run() {
            Err(err @ crate::error::Error::Fuse(_)) => assert_eq!(err.exit_code(), 2),
            other => panic!("expected a fuse, got {:?}", other.map(|o| o.closure.len())),
        }
    }

    #[test]
    fn scenario_includes_with_priority() {
        let out = reason_over(
            ":a :p :b . { 2 log:includes { :a :p :b } } => { :ok :is :true } .",
        );
        assert!(has(&out.closure, ex("ok"), ex("is"), ex("true")));
    }

    #[test]
    fn premise_order_does_not_matter() {
        let builtin_first = reason_over(
            ":x :val 2 . { (?a 1) math:sum ?b . ?s :val ?a } => { ?s :succ ?b } .",
        );
        let builtin_last = reason_over(
            ":x :val 2 . { ?s :val ?a . (?a 1) math:sum ?b } => { ?s :succ ?b } .",
        );
        assert!(has(&builtin_first.closure, ex("x"), ex("succ"), Term::integer(3)));
        assert_eq!(builtin_first.closure.len(), builtin_last.closure.len());
    }

    #[test]
    fn monotonicity_of_added_facts() {
        let base = reason_over(":a a :Man . { ?x a :Man } => { ?x a :Mortal } .");
        let bigger =
            reason_over(":a a :Man . :b a :Man . { ?x a :Man } => { ?x a :Mortal } .");
        assert!(bigger.closure.len() > base.closure.len());
        for t in &base.closure {
            assert!(bigger.closure.iter().any(|u| u == t));
        }
    }

    #[test]
    fn backward_rules_answer_queries() {
        let mut reasoner = Reasoner::new(Config::default());
        reasoner
            .load_str(&format!(
                "{}{}",
                PRELUDE,
                ":socrates a :Man . { ?x a :Mortal } <= { ?x a :Man } ."
            ))
            .unwrap();
        reasoner.run().unwrap();
        let goal = Triple::new(
            Term::Var("who".into()),
            Term::Iri(ns::rdf::TYPE.into()),
            ex("Mortal"),
        );
        let answers = reasoner.query(&[goal], None).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].apply(&Term::Var("who".into())), ex("socrates"));
    }

    #[test]
    fn output_strings_are_ordered_by_key() {
        let out = reason_over(
            ":go :now :yes . \
             { :go :now :yes } => { 2 log:outputString \"second \" } . \
             { :go :now :yes } => { 1 log:outputString \"first \" } .",
        );
        assert_eq!(out.output_string, "first second ");
    }

    #[test]
    fn proof_comments_render_derivations() {
        let mut reasoner = Reasoner::new(Config {
            proof_comments: true,
            ..Config::default()
        });
        reasoner
            .load_str(&format!(
                "{}{}",
                PRELUDE, ":socrates a :Man . { ?x a :Man } => { ?x a :Mortal } ."
            ))
            .unwrap();
        let out = reasoner.run().unwrap();
        assert_eq!(out.comments.len(), 1);
        assert!(out.comments[0].starts_with("# derived:"));
    }

    #[test]
    fn super_restricted_disables_builtins() {
        let mut reasoner = Reasoner::new(Config {
            super_restricted: true,
            ..Config::default()
        });
        reasoner
            .load_str(&format!(
                "{}{}",
                PRELUDE, "{ (2 3.5) math:sum ?x } => { :r :v ?x } ."
            ))
            .unwrap();
        let out = reasoner.run().unwrap();
        assert!(out.closure.is_empty());
    }

    #[test]
    fn output_ordering() {
        let entries = vec![
            OutputEntry {
                key: Term::Iri("http://example.org/z".into()),
                text: "third".into(),
                seq: 0,
            },
            OutputEntry {
                key: Term::plain("b"),
                text: "second".into(),
                seq: 1,
            },
            OutputEntry {
                key: Term::integer(10),
                text: "first-b".into(),
                seq: 2,
            },
            OutputEntry {
                key: Term::integer(2),
                text: "first-a".into(),
                seq: 3,
            },
        ];
        assert_eq!(assemble_output(entries), "first-afirst-bsecondthird");
    }

    #[test]
    fn ties_break_by_insertion() {
        let entries = vec![
            OutputEntry {
                key: Term::plain("k"),
                text: "one".into(),
                seq: 0,
            },
            OutputEntry {
                key: Term::plain("k"),
                text: "two".into(),
                seq: 1,
            },
        ];
        assert_eq!(assemble_output(entries), "onetwo");
    }
}
