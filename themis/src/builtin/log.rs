//! The `log:` builtins: identity, literal surgery, formula reflection
//! and the scoped closures.

use super::{as_list, bind, fail, solutions, succeed, Outcome};
use crate::deref::strip_fragment;
use crate::error::Result;
use crate::forward;
use crate::ns::{log as ns_log, rdf, xsd};
use crate::prove::{self, ProveOpts, Scope};
use crate::reason::{OutputEntry, Run};
use crate::store::{triple_key, FactStore, RuleSet};
use crate::subst::Subst;
use crate::term::literal::{self, Numeric};
use crate::term::{Term, Triple};
use num_traits::ToPrimitive;
use std::collections::HashSet;

/// Dispatches a `log:` predicate.
pub(crate) fn eval(
    pred: &str,
    goal: &Triple,
    subst: &Subst,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
    opts: &ProveOpts,
) -> Result<Outcome> {
    let _ = opts;
    Ok(match pred {
        ns_log::equalTo => solutions(bind(&goal.s, &goal.o, subst)),
        ns_log::notEqualTo => {
            if bind(&goal.s, &goal.o, subst).is_some() {
                fail()
            } else {
                succeed(subst)
            }
        }
        ns_log::conjunction => conjunction(goal, subst, scope.facts),
        ns_log::rawType => raw_type(goal, subst),
        ns_log::dtlit => dtlit(goal, subst, scope.facts),
        ns_log::langlit => langlit(goal, subst, scope.facts),
        ns_log::uri => uri(goal, subst),
        ns_log::skolem => skolem(goal, subst, run),
        ns_log::implies => expose_rules(goal, subst, run, scope, true),
        ns_log::impliedBy => expose_rules(goal, subst, run, scope, false),
        ns_log::content => content(goal, subst, run),
        ns_log::semantics => semantics(goal, subst, run, false),
        ns_log::semanticsOrError => semantics(goal, subst, run, true),
        ns_log::parsedAsN3 => parsed_as_n3(goal, subst, run),
        ns_log::conclusion => return conclusion(goal, subst, run),
        ns_log::includes => return includes(goal, subst, scope, run, true),
        ns_log::notIncludes => return includes(goal, subst, scope, run, false),
        ns_log::collectAllIn => return collect_all_in(goal, subst, scope, run),
        ns_log::forAllIn => return for_all_in(goal, subst, scope, run),
        ns_log::trace => trace(goal, subst, run),
        ns_log::outputString => output_string(goal, subst, run),
        _ => Outcome::NotBuiltin,
    })
}

/// A formula argument: a graph term, or `true` for the empty formula.
fn formula_of(t: &Term) -> Option<Vec<Triple>> {
    match t {
        Term::Graph(triples) => Some(triples.clone()),
        other if literal::bool_value(other) == Some(true) => Some(Vec::new()),
        _ => None,
    }
}

fn as_formula(triples: Vec<Triple>) -> Term {
    if triples.is_empty() {
        Term::boolean(true)
    } else {
        Term::Graph(triples)
    }
}

/// Set union of a list of formulas, with structural and fast-key dedup.
fn conjunction(goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    let formulas = match as_list(&goal.s, facts) {
        Some(formulas) => formulas,
        None => return fail(),
    };
    let mut triples: Vec<Triple> = Vec::new();
    let mut keys: HashSet<String> = HashSet::new();
    for formula in &formulas {
        let parts = match formula_of(formula) {
            Some(parts) => parts,
            None => return fail(),
        };
        for t in parts {
            match triple_key(&t) {
                Some(key) => {
                    if keys.insert(key) {
                        triples.push(t);
                    }
                }
                None => {
                    if !triples.contains(&t) {
                        triples.push(t);
                    }
                }
            }
        }
    }
    solutions(bind(&goal.o, &Term::Graph(triples), subst))
}

/// Classifies the subject term.
fn raw_type(goal: &Triple, subst: &Subst) -> Outcome {
    let class = match &goal.s {
        Term::Graph(_) => ns_log::Formula,
        Term::Literal(_) => ns_log::Literal,
        Term::List(_) | Term::OpenList(..) => rdf::List,
        Term::Iri(_) | Term::Blank(_) => ns_log::Other,
        Term::Var(_) => return fail(),
    };
    solutions(bind(&goal.o, &Term::Iri(class.to_string()), subst))
}

/// `(lexical datatype) log:dtlit typedLiteral`, both directions.
fn dtlit(goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    if let Some(pair) = as_list(&goal.s, facts) {
        if pair.len() == 2 {
            if let (Some(lit), Some(dt)) = (pair[0].as_literal(), pair[1].as_iri()) {
                let composed = Term::typed(literal::lexical(lit), dt);
                return solutions(bind(&goal.o, &composed, subst));
            }
        }
    }
    if let Some(lit) = goal.o.as_literal() {
        let (lex, suffix) = literal::parts(lit);
        let dt = match suffix {
            literal::Suffix::Datatype(dt) => dt,
            literal::Suffix::Plain => xsd::string,
            literal::Suffix::Lang(_) => return fail(),
        };
        let decomposed = Term::List(vec![Term::plain(lex), Term::Iri(dt.to_string())]);
        return solutions(bind(&goal.s, &decomposed, subst));
    }
    fail()
}

/// `(lexical tag) log:langlit taggedLiteral`, both directions.
fn langlit(goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    if let Some(pair) = as_list(&goal.s, facts) {
        if pair.len() == 2 {
            if let (Some(lit), Some(tag)) = (
                pair[0].as_literal(),
                pair[1].as_literal().map(literal::lexical),
            ) {
                let composed = Term::lang_tagged(literal::lexical(lit), tag);
                return solutions(bind(&goal.o, &composed, subst));
            }
        }
    }
    if let Some(lit) = goal.o.as_literal() {
        if let (lex, literal::Suffix::Lang(tag)) = literal::parts(lit) {
            let decomposed = Term::List(vec![Term::plain(lex), Term::plain(tag)]);
            return solutions(bind(&goal.s, &decomposed, subst));
        }
    }
    fail()
}

/// IRI to string and back.
fn uri(goal: &Triple, subst: &Subst) -> Outcome {
    if let Some(iri) = goal.s.as_iri() {
        return solutions(bind(&goal.o, &Term::plain(iri), subst));
    }
    if let Some(text) = literal::string_value(&goal.o) {
        return solutions(bind(&goal.s, &Term::Iri(text.to_string()), subst));
    }
    fail()
}

/// Deterministic skolem IRI for any ground subject.
fn skolem(goal: &Triple, subst: &Subst, run: &mut Run<'_>) -> Outcome {
    if !goal.s.is_ground() || matches!(goal.s, Term::Var(_)) {
        return fail();
    }
    let iri = run.skolem.iri_for(&goal.s.to_string());
    solutions(bind(&goal.o, &Term::Iri(iri), subst))
}

/// Exposes the rule registry as standardized-apart formula pairs:
/// forward rules for `log:implies`, backward rules for `log:impliedBy`.
fn expose_rules(
    goal: &Triple,
    subst: &Subst,
    run: &mut Run<'_>,
    scope: &Scope<'_>,
    forward_rules: bool,
) -> Outcome {
    let pool: Vec<_> = if forward_rules {
        scope.rules.forward().to_vec()
    } else {
        scope.rules.backward().to_vec()
    };
    let mut sols = Vec::new();
    for rule in pool {
        let (premise, conclusion) = run.standardize(&rule);
        let (subject, object) = if forward_rules {
            let object = if rule.is_fuse {
                Term::boolean(false)
            } else {
                as_formula(conclusion)
            };
            (as_formula(premise), object)
        } else {
            (as_formula(conclusion), as_formula(premise))
        };
        if let Some(s) = bind(&goal.s, &subject, subst) {
            if let Some(s) = bind(&goal.o, &object, &s) {
                sols.push(s);
            }
        }
    }
    Outcome::Solutions(sols)
}

fn content(goal: &Triple, subst: &Subst, run: &mut Run<'_>) -> Outcome {
    let iri = match goal.s.as_iri() {
        Some(iri) => iri,
        None => return fail(),
    };
    match run.deref.deref_text(strip_fragment(iri)) {
        Ok(text) => solutions(bind(&goal.o, &Term::plain(text), subst)),
        Err(_) => fail(),
    }
}

/// `log:semantics` and, with `or_error`, `log:semanticsOrError`. The
/// returned formula is standardized apart to avoid variable capture.
fn semantics(goal: &Triple, subst: &Subst, run: &mut Run<'_>, or_error: bool) -> Outcome {
    let iri = match goal.s.as_iri() {
        Some(iri) => iri,
        None => return fail(),
    };
    match run.deref.deref_semantics(strip_fragment(iri)) {
        Ok(triples) => {
            let fresh = run.standardize_triples(&triples);
            solutions(bind(&goal.o, &Term::Graph(fresh), subst))
        }
        Err(err) if or_error => {
            solutions(bind(&goal.o, &Term::plain(err.to_string()), subst))
        }
        Err(_) => fail(),
    }
}

fn parsed_as_n3(goal: &Triple, subst: &Subst, run: &mut Run<'_>) -> Outcome {
    let text = match literal::string_value(&goal.s) {
        Some(text) => text.to_string(),
        None => return fail(),
    };
    match run.deref.parse_semantics(&text, None) {
        Ok(triples) => {
            let fresh = run.standardize_triples(&triples);
            solutions(bind(&goal.o, &Term::Graph(fresh), subst))
        }
        Err(_) => fail(),
    }
}

/// Deductive closure of a quoted formula treated as a local program.
/// Cached per formula for the duration of the run.
fn conclusion(goal: &Triple, subst: &Subst, run: &mut Run<'_>) -> Result<Outcome> {
    let formula = match &goal.s {
        Term::Graph(triples) => triples.clone(),
        _ => return Ok(fail()),
    };
    let key = {
        let mut lines: Vec<String> = formula.iter().map(|t| t.to_string()).collect();
        lines.sort();
        lines.join("\n")
    };
    let closure = match run.conclusions.get(&key) {
        Some(cached) => cached.clone(),
        None => {
            let mut facts = FactStore::new();
            let mut rules = RuleSet::new();
            for t in &formula {
                if let Some(parts) = forward::rule_parts(t) {
                    forward::register_rule(&mut rules, parts);
                } else if t.is_ground() {
                    facts.insert(t.clone());
                }
            }
            forward::saturate(&mut facts, &mut rules, run)?;
            let closure: Vec<Triple> = facts.iter().cloned().collect();
            run.conclusions.insert(key, closure.clone());
            closure
        }
    };
    Ok(solutions(bind(&goal.o, &Term::Graph(closure), subst)))
}

/// How a scope selector resolves.
enum Resolved {
    /// A quoted graph: query it directly, no outside rules.
    Local(FactStore),
    /// Delay until a saturation snapshot at this level exists.
    Level(u32),
}

fn resolve_selector(t: &Term) -> Resolved {
    match t {
        Term::Graph(triples) => Resolved::Local(FactStore::from_triples(triples.clone())),
        other => match literal::numeric_value(other) {
            Some(Numeric::Integer(n)) => match n.to_u32() {
                Some(n) if n >= 1 => Resolved::Level(n),
                _ => Resolved::Level(1),
            },
            _ => Resolved::Level(1),
        },
    }
}

/// Proves goals in a resolved scope. `None` when the scope is a priority
/// level without a sufficient snapshot yet.
fn prove_scoped(
    goals: &[Triple],
    base: &Subst,
    resolved: &Resolved,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
    max_results: Option<usize>,
) -> Result<Option<Vec<Subst>>> {
    let opts = ProveOpts {
        max_results,
        defer_builtins: false,
    };
    match resolved {
        Resolved::Local(store) => {
            let no_rules = RuleSet::new();
            let inner = Scope {
                facts: store,
                rules: &no_rules,
                snapshot: scope.snapshot,
            };
            prove::prove(goals, base, &inner, run, &opts).map(Some)
        }
        Resolved::Level(level) => match scope.snapshot {
            Some(snapshot) if snapshot.level() >= *level => {
                let inner = Scope {
                    facts: snapshot,
                    rules: scope.rules,
                    snapshot: scope.snapshot,
                };
                prove::prove(goals, base, &inner, run, &opts).map(Some)
            }
            _ => Ok(None),
        },
    }
}

/// `log:includes` / `log:notIncludes`: the subject selects the scope,
/// the object formula is proven inside it.
fn includes(
    goal: &Triple,
    subst: &Subst,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
    positive: bool,
) -> Result<Outcome> {
    let object = match formula_of(&goal.o) {
        Some(triples) => triples,
        None => return Ok(fail()),
    };
    if object.is_empty() {
        // `true` is the empty formula, included in every scope.
        return Ok(if positive { succeed(subst) } else { fail() });
    }
    let resolved = resolve_selector(&goal.s);
    let max = if positive { None } else { Some(1) };
    match prove_scoped(&object, subst, &resolved, scope, run, max)? {
        None => Ok(fail()),
        Some(sols) => Ok(if positive {
            Outcome::Solutions(sols)
        } else if sols.is_empty() {
            succeed(subst)
        } else {
            fail()
        }),
    }
}

/// `(Template Where Result) log:collectAllIn Scope`.
fn collect_all_in(
    goal: &Triple,
    subst: &Subst,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
) -> Result<Outcome> {
    let items = match &goal.s {
        Term::List(items) if items.len() == 3 => items,
        _ => return Ok(fail()),
    };
    let where_clause = match formula_of(&items[1]) {
        Some(triples) => triples,
        None => return Ok(fail()),
    };
    let resolved = resolve_selector(&goal.o);
    let witnesses = match prove_scoped(&where_clause, subst, &resolved, scope, run, None)? {
        Some(witnesses) => witnesses,
        None => return Ok(fail()),
    };
    let values: Vec<Term> = witnesses.iter().map(|w| w.apply(&items[0])).collect();
    // A blank result slot is a wildcard.
    if matches!(items[2], Term::Blank(_)) {
        return Ok(succeed(subst));
    }
    Ok(solutions(bind(&items[2], &Term::List(values), subst)))
}

/// `(Where Then) log:forAllIn Scope`: every witness of the where clause
/// must extend to a proof of the then clause.
fn for_all_in(
    goal: &Triple,
    subst: &Subst,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
) -> Result<Outcome> {
    let items = match &goal.s {
        Term::List(items) if items.len() == 2 => items,
        _ => return Ok(fail()),
    };
    let where_clause = match formula_of(&items[0]) {
        Some(triples) => triples,
        None => return Ok(fail()),
    };
    let then_clause = match formula_of(&items[1]) {
        Some(triples) => triples,
        None => return Ok(fail()),
    };
    let resolved = resolve_selector(&goal.o);
    let witnesses = match prove_scoped(&where_clause, subst, &resolved, scope, run, None)? {
        Some(witnesses) => witnesses,
        None => return Ok(fail()),
    };
    // An empty where-set holds trivially.
    for witness in &witnesses {
        let proof = prove_scoped(&then_clause, witness, &resolved, scope, run, Some(1))?;
        match proof {
            Some(proofs) if !proofs.is_empty() => {}
            _ => return Ok(fail()),
        }
    }
    Ok(succeed(subst))
}

/// Writes a trace line; succeeds when both arguments are concrete.
fn trace(goal: &Triple, subst: &Subst, run: &mut Run<'_>) -> Outcome {
    if !goal.s.is_ground() || !goal.o.is_ground() {
        return fail();
    }
    let line = format!(
        "TRACE {} {}",
        run.format_term(&goal.s),
        run.format_term(&goal.o)
    );
    run.tracer.write_line(&line);
    succeed(subst)
}

/// Registers an output-string emission keyed by the subject; the texts
/// are concatenated in key order at the end of the run.
fn output_string(goal: &Triple, subst: &Subst, run: &mut Run<'_>) -> Outcome {
    if !goal.s.is_ground() {
        return fail();
    }
    let text = match goal.o.as_literal() {
        Some(lit) => literal::lexical(lit).to_string(),
        None => return fail(),
    };
    let seq = run.output.len();
    run.output.push(OutputEntry {
        key: goal.s.clone(),
        text,
        seq,
    });
    succeed(subst)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::deref::NoFetch;
    use crate::reason::{Config, MemoryTrace};

    fn iri(v: &str) -> Term {
        Term::Iri(v.into())
    }
    fn var(v: &str) -> Term {
        Term::Var(v.into())
    }
    fn spo(s: Term, p: &str, o: Term) -> Triple {
        Triple::new(s, iri(p), o)
    }

    fn run_log(pred: &str, s: Term, o: Term, facts: &FactStore) -> Vec<Subst> {
        let rules = RuleSet::new();
        let scope = Scope {
            facts,
            rules: &rules,
            snapshot: None,
        };
        let config = Config::default();
        let deref = NoFetch::default();
        let mut tracer = MemoryTrace::default();
        let mut run = Run::new(&config, &deref, &mut tracer, Default::default());
        let goal = Triple::new(s, Term::Iri(pred.into()), o);
        match eval(
            pred,
            &goal,
            &Subst::new(),
            &scope,
            &mut run,
            &ProveOpts::default(),
        )
        .unwrap()
        {
            Outcome::Solutions(sols) => sols,
            Outcome::NotBuiltin => panic!("{} should be a builtin", pred),
        }
    }

    #[test]
    fn equal_to_unifies() {
        let facts = FactStore::new();
        let sols = run_log(ns_log::equalTo, var("x"), iri("a"), &facts);
        assert_eq!(sols.len(), 1);
        assert_eq!(sols[0].apply(&var("x")), iri("a"));
        assert!(run_log(ns_log::notEqualTo, iri("a"), iri("a"), &facts).is_empty());
        assert!(!run_log(ns_log::notEqualTo, iri("a"), iri("b"), &facts).is_empty());
    }

    #[test]
    fn raw_type_classifies() {
        let facts = FactStore::new();
        let check = |t: Term, expected: &str| {
            let sols = run_log(ns_log::rawType, t, var("c"), &facts);
            assert_eq!(sols[0].apply(&var("c")), iri(expected));
        };
        check(Term::Graph(vec![]), ns_log::Formula);
        check(Term::plain("x"), ns_log::Literal);
        check(Term::List(vec![]), rdf::List);
        check(iri("a"), ns_log::Other);
        check(Term::Blank("b".into()), ns_log::Other);
    }

    #[test]
    fn dtlit_composes_and_decomposes() {
        let facts = FactStore::new();
        let pair = Term::List(vec![Term::plain("5"), iri(xsd::integer)]);
        let sols = run_log(ns_log::dtlit, pair, var("lit"), &facts);
        assert_eq!(sols[0].apply(&var("lit")), Term::integer(5));

        let sols = run_log(ns_log::dtlit, var("pair"), Term::integer(5), &facts);
        assert_eq!(
            sols[0].apply(&var("pair")),
            Term::List(vec![Term::plain("5"), iri(xsd::integer)])
        );
    }

    #[test]
    fn langlit_round_trips() {
        let facts = FactStore::new();
        let pair = Term::List(vec![Term::plain("hi"), Term::plain("en")]);
        let sols = run_log(ns_log::langlit, pair, var("lit"), &facts);
        assert_eq!(sols[0].apply(&var("lit")), Term::lang_tagged("hi", "en"));

        let sols = run_log(ns_log::langlit, var("p"), Term::lang_tagged("hi", "en"), &facts);
        assert_eq!(
            sols[0].apply(&var("p")),
            Term::List(vec![Term::plain("hi"), Term::plain("en")])
        );
    }

    #[test]
    fn uri_is_bidirectional() {
        let facts = FactStore::new();
        let sols = run_log(ns_log::uri, iri("http://example.org/x"), var("u"), &facts);
        assert_eq!(sols[0].apply(&var("u")), Term::plain("http://example.org/x"));

        let sols = run_log(ns_log::uri, var("r"), Term::plain("http://example.org/x"), &facts);
        assert_eq!(sols[0].apply(&var("r")), iri("http://example.org/x"));
    }

    #[test]
    fn skolem_is_stable_within_run() {
        let facts = FactStore::new();
        let rules = RuleSet::new();
        let scope = Scope {
            facts: &facts,
            rules: &rules,
            snapshot: None,
        };
        let config = Config::default();
        let deref = NoFetch::default();
        let mut tracer = MemoryTrace::default();
        let mut run = Run::new(&config, &deref, &mut tracer, Default::default());
        let mut ask = |t: Term, run: &mut Run| -> Term {
            let goal = Triple::new(t, Term::Iri(ns_log::skolem.into()), var("sk"));
            match eval(
                ns_log::skolem,
                &goal,
                &Subst::new(),
                &scope,
                run,
                &ProveOpts::default(),
            )
            .unwrap()
            {
                Outcome::Solutions(sols) => sols[0].apply(&var("sk")),
                Outcome::NotBuiltin => unreachable!(),
            }
        };
        let a = ask(iri("a"), &mut run);
        let b = ask(iri("b"), &mut run);
        let a2 = ask(iri("a"), &mut run);
        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    #[test]
    fn conjunction_unions_with_dedup() {
        let facts = FactStore::new();
        let f1 = Term::Graph(vec![spo(iri("a"), "p", iri("b"))]);
        let f2 = Term::Graph(vec![
            spo(iri("a"), "p", iri("b")),
            spo(iri("c"), "q", iri("d")),
        ]);
        let list = Term::List(vec![f1, Term::boolean(true), f2]);
        let sols = run_log(ns_log::conjunction, list, var("g"), &facts);
        match sols[0].apply(&var("g")) {
            Term::Graph(triples) => assert_eq!(triples.len(), 2),
            other => panic!("not a graph: {:?}", other),
        }
    }

    #[test]
    fn includes_on_quoted_graph() {
        let facts = FactStore::new();
        let scope_graph = Term::Graph(vec![
            spo(iri("a"), "p", iri("b")),
            spo(iri("a"), "p", iri("c")),
        ]);
        let question = Term::Graph(vec![spo(iri("a"), "p", var("x"))]);
        let sols = run_log(ns_log::includes, scope_graph.clone(), question, &facts);
        assert_eq!(sols.len(), 2);

        let absent = Term::Graph(vec![spo(iri("z"), "p", var("x"))]);
        assert!(run_log(ns_log::includes, scope_graph.clone(), absent.clone(), &facts).is_empty());
        assert!(!run_log(ns_log::notIncludes, scope_graph, absent, &facts).is_empty());
    }

    #[test]
    fn includes_priority_delays_without_snapshot() {
        let facts = FactStore::new();
        let question = Term::Graph(vec![spo(iri("a"), "p", iri("b"))]);
        assert!(run_log(ns_log::includes, Term::integer(1), question, &facts).is_empty());
    }

    #[test]
    fn conclusion_of_facts_is_those_facts() {
        let facts = FactStore::new();
        let formula = Term::Graph(vec![
            spo(iri("a"), "p", iri("b")),
            spo(iri("c"), "q", iri("d")),
        ]);
        let sols = run_log(ns_log::conclusion, formula, var("g"), &facts);
        match sols[0].apply(&var("g")) {
            Term::Graph(triples) => assert_eq!(triples.len(), 2),
            other => panic!("not a graph: {:?}", other),
        }
    }

    #[test]
    fn conclusion_fires_local_rules() {
        let facts = FactStore::new();
        let rule = Triple::new(
            Term::Graph(vec![spo(var("x"), "type", iri("Man"))]),
            Term::Iri(ns_log::implies.into()),
            Term::Graph(vec![spo(var("x"), "type", iri("Mortal"))]),
        );
        let formula = Term::Graph(vec![spo(iri("sok"), "type", iri("Man")), rule]);
        let sols = run_log(ns_log::conclusion, formula, var("g"), &facts);
        match sols[0].apply(&var("g")) {
            Term::Graph(triples) => {
                assert!(triples.contains(&spo(iri("sok"), "type", iri("Mortal"))));
            }
            other => panic!("not a graph: {:?}", other),
        }
    }

    #[test]
    fn for_all_in_empty_where_succeeds() {
        let facts = FactStore::new();
        let pair = Term::List(vec![
            Term::Graph(vec![spo(iri("nobody"), "p", var("x"))]),
            Term::Graph(vec![spo(var("x"), "q", iri("b"))]),
        ]);
        let scope_graph = Term::Graph(vec![spo(iri("a"), "r", iri("b"))]);
        assert!(!run_log(ns_log::forAllIn, pair, scope_graph, &facts).is_empty());
    }

    #[test]
    fn for_all_in_requires_every_witness() {
        let facts = FactStore::new();
        let scope_graph = Term::Graph(vec![
            spo(iri("a"), "n", iri("x")),
            spo(iri("b"), "n", iri("y")),
            spo(iri("x"), "even", iri("t")),
        ]);
        let pair = Term::List(vec![
            Term::Graph(vec![spo(var("k"), "n", var("v"))]),
            Term::Graph(vec![spo(var("v"), "even", iri("t"))]),
        ]);
        // Witness `b n y` has no matching `y even t`.
        assert!(run_log(ns_log::forAllIn, pair, scope_graph, &facts).is_empty());
    }

    #[test]
    fn output_string_collects() {
        let facts = FactStore::new();
        let rules = RuleSet::new();
        let scope = Scope {
            facts: &facts,
            rules: &rules,
            snapshot: None,
        };
        let config = Config::default();
        let deref = NoFetch::default();
        let mut tracer = MemoryTrace::default();
        let mut run = Run::new(&config, &deref, &mut tracer, Default::default());
        let goal = Triple::new(
            Term::integer(1),
            Term::Iri(ns_log::outputString.into()),
            Term::plain("hello\n"),
        );
        let outcome = eval(
            ns_log::outputString,
            &goal,
            &Subst::new(),
            &scope,
            &mut run,
            &ProveOpts::default(),
        )
        .unwrap();
        assert!(matches!(outcome, Outcome::Solutions(s) if s.len() == 1));
        assert_eq!(run.output.len(), 1);
        assert_eq!(run.output[0].text, "hello\n");
    }
}
