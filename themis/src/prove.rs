//! The backward prover: SLD-style goal proving as an iterative DFS.
//!
//! Alternatives live on an explicit stack and are explored LIFO, first
//! generated first tried. Builtins return lists of delta substitutions;
//! no generators, so the deferral and cycle guards stay visible.

use crate::builtin::{self, Outcome};
use crate::error::Result;
use crate::reason::Run;
use crate::store::{FactStore, RuleSet};
use crate::subst::Subst;
use crate::term::{Term, Triple};
use crate::unify::{unify_triple, Mode};
use log::trace;
use std::collections::HashSet;
use std::rc::Rc;

/// What a proof runs against: the live facts and rules, plus the frozen
/// saturation snapshot scoped builtins reflect on.
pub(crate) struct Scope<'a> {
    /// Facts goals are matched against.
    pub facts: &'a FactStore,
    /// Backward rules goals are resolved against.
    pub rules: &'a RuleSet,
    /// The frozen saturation snapshot, if a phase has completed.
    pub snapshot: Option<&'a FactStore>,
}

/// Options of one `prove` call.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ProveOpts {
    /// Stop as soon as this many complete proofs exist.
    pub max_results: Option<usize>,
    /// Rotate failed builtins with unbound inputs to the end of the
    /// conjunction. Only forward-rule bodies enable this.
    pub defer_builtins: bool,
}

/// Depth beyond which substitutions are compacted.
const COMPACT_DEPTH: usize = 128;
/// Binding count beyond which substitutions are compacted.
const COMPACT_BINDINGS: usize = 256;

/// Goals already expanded through a rule on the current branch, as a
/// shared cons list so branching stays cheap.
enum Visited {
    Nil,
    Cons(Triple, Rc<Visited>),
}

fn visited_contains(mut node: &Rc<Visited>, goal: &Triple) -> bool {
    loop {
        match &**node {
            Visited::Nil => return false,
            Visited::Cons(t, next) => {
                // Standardization renames variables on every expansion,
                // so the comparison must be up to renaming.
                if crate::term::equal::alpha_eq(
                    std::slice::from_ref(t),
                    std::slice::from_ref(goal),
                ) {
                    return true;
                }
                node = next;
            }
        }
    }
}

struct State {
    goals: Vec<Triple>,
    subst: Subst,
    depth: usize,
    visited: Rc<Visited>,
    can_defer: bool,
    defer_count: usize,
}

/// Proves all `goals` under `base`, returning one substitution per proof.
///
/// Pure with respect to the caller's substitution: `base` is never
/// mutated, each result extends a copy of it.
pub(crate) fn prove(
    goals: &[Triple],
    base: &Subst,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
    opts: &ProveOpts,
) -> Result<Vec<Subst>> {
    let mut answer_vars = HashSet::new();
    for g in goals {
        g.collect_vars(&mut answer_vars);
    }

    let mut results: Vec<Subst> = Vec::new();
    let mut stack = vec![State {
        goals: goals.to_vec(),
        subst: base.clone(),
        depth: 0,
        visited: Rc::new(Visited::Nil),
        can_defer: opts.defer_builtins,
        defer_count: 0,
    }];

    while let Some(st) = stack.pop() {
        if let Some(max) = opts.max_results {
            if results.len() >= max {
                break;
            }
        }
        if st.goals.is_empty() {
            results.push(st.subst);
            continue;
        }

        let mut subst = st.subst;
        if st.depth > COMPACT_DEPTH || subst.len() > COMPACT_BINDINGS {
            let mut roots = answer_vars.clone();
            for g in &st.goals {
                g.collect_vars(&mut roots);
            }
            subst = subst.compact(&roots);
        }

        let goal = subst.apply_triple(&st.goals[0]);
        let rest = &st.goals[1..];

        // 1. Builtin predicates.
        match builtin::eval(&goal, &subst, scope, run, opts)? {
            Outcome::Solutions(solutions) => {
                if solutions.is_empty() {
                    if st.can_defer
                        && !goal.is_ground()
                        && !rest.is_empty()
                        && st.defer_count < st.goals.len()
                    {
                        // Rotate the builtin to the end and retry.
                        let mut rotated: Vec<Triple> = rest.to_vec();
                        rotated.push(st.goals[0].clone());
                        stack.push(State {
                            goals: rotated,
                            subst,
                            depth: st.depth,
                            visited: st.visited,
                            can_defer: st.can_defer,
                            defer_count: st.defer_count + 1,
                        });
                        continue;
                    }
                    // A functional relation with nothing bound holds for
                    // some value; once the whole conjunction has rotated
                    // without progress, accept it with an empty delta.
                    if st.can_defer
                        && matches!(goal.s, Term::Var(_))
                        && matches!(goal.o, Term::Var(_))
                        && builtin::is_functional_math(&goal.p)
                        && (rest.is_empty() || st.defer_count >= st.goals.len())
                    {
                        stack.push(State {
                            goals: rest.to_vec(),
                            subst,
                            depth: st.depth,
                            visited: st.visited,
                            can_defer: st.can_defer,
                            defer_count: 0,
                        });
                    }
                    continue;
                }
                for solution in solutions.into_iter().rev() {
                    stack.push(State {
                        goals: rest.to_vec(),
                        subst: solution,
                        depth: st.depth,
                        visited: st.visited.clone(),
                        can_defer: st.can_defer,
                        defer_count: 0,
                    });
                }
                continue;
            }
            Outcome::NotBuiltin => {}
        }

        // 2. Loop check.
        if visited_contains(&st.visited, &goal) {
            trace!("pruning visited goal {}", goal);
            continue;
        }

        // 3. Facts, 4. backward rules. Both generate alternatives; the
        // stack pops them first generated first.
        let mut rule_states = Vec::new();
        for rule in scope.rules.backward_candidates(&goal.p) {
            let (premise, conclusion) = run.standardize(&rule);
            let head = &conclusion[0];
            if let Some(s) = unify_triple(&goal, head, &subst, Mode::General) {
                let mut new_goals = s.apply_all(&premise);
                new_goals.extend(rest.iter().cloned());
                rule_states.push(State {
                    goals: new_goals,
                    subst: s,
                    depth: st.depth + 1,
                    visited: Rc::new(Visited::Cons(goal.clone(), st.visited.clone())),
                    // Left-to-right evaluation inside rule bodies.
                    can_defer: false,
                    defer_count: 0,
                });
            }
        }
        let mut fact_states = Vec::new();
        for fact in scope.facts.candidates(&goal) {
            if let Some(s) = unify_triple(&goal, fact, &subst, Mode::General) {
                fact_states.push(State {
                    goals: rest.to_vec(),
                    subst: s,
                    depth: st.depth,
                    visited: st.visited.clone(),
                    can_defer: st.can_defer,
                    defer_count: 0,
                });
            }
        }
        for state in rule_states.into_iter().rev() {
            stack.push(state);
        }
        for state in fact_states.into_iter().rev() {
            stack.push(state);
        }
    }
    Ok(results)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::deref::NoFetch;
    use crate::reason::{Config, MemoryTrace};
    use std::collections::HashSet as Set;

    fn iri(v: &str) -> Term {
        Term::Iri(v.into())
    }
    fn var(v: &str) -> Term {
        Term::Var(v.into())
    }
    fn spo(s: Term, p: &str, o: Term) -> Triple {
        Triple::new(s, iri(p), o)
    }

    fn with_run<T>(f: impl FnOnce(&mut Run) -> T) -> T {
        let config = Config::default();
        let deref = NoFetch::default();
        let mut tracer = MemoryTrace::default();
        let mut run = Run::new(&config, &deref, &mut tracer, Default::default());
        f(&mut run)
    }

    #[test]
    fn proves_against_facts() {
        let mut facts = FactStore::new();
        facts.insert(spo(iri("a"), "p", iri("b")));
        facts.insert(spo(iri("c"), "p", iri("d")));
        let rules = RuleSet::new();
        let scope = Scope {
            facts: &facts,
            rules: &rules,
            snapshot: None,
        };
        let goals = vec![spo(var("x"), "p", var("y"))];
        let results = with_run(|run| {
            prove(&goals, &Subst::new(), &scope, run, &ProveOpts::default())
        })
        .unwrap();
        assert_eq!(results.len(), 2);
        // First generated first tried: fact order is preserved.
        assert_eq!(results[0].apply(&var("x")), iri("a"));
        assert_eq!(results[1].apply(&var("x")), iri("c"));
    }

    #[test]
    fn chains_through_backward_rules() {
        let mut facts = FactStore::new();
        facts.insert(spo(iri("sok"), "isMan", iri("true")));
        let mut rules = RuleSet::new();
        rules.add(
            vec![spo(var("x"), "isMan", iri("true"))],
            vec![spo(var("x"), "isMortal", iri("true"))],
            false,
            false,
            Set::new(),
        );
        let scope = Scope {
            facts: &facts,
            rules: &rules,
            snapshot: None,
        };
        let goals = vec![spo(var("who"), "isMortal", iri("true"))];
        let results = with_run(|run| {
            prove(&goals, &Subst::new(), &scope, run, &ProveOpts::default())
        })
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].apply(&var("who")), iri("sok"));
    }

    #[test]
    fn cyclic_rules_terminate() {
        let facts = FactStore::new();
        let mut rules = RuleSet::new();
        // p(x) <= p(x): must not loop.
        rules.add(
            vec![spo(var("x"), "p", var("y"))],
            vec![spo(var("x"), "p", var("y"))],
            false,
            false,
            Set::new(),
        );
        let scope = Scope {
            facts: &facts,
            rules: &rules,
            snapshot: None,
        };
        let goals = vec![spo(var("a"), "p", var("b"))];
        let results = with_run(|run| {
            prove(&goals, &Subst::new(), &scope, run, &ProveOpts::default())
        })
        .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn max_results_short_circuits() {
        let mut facts = FactStore::new();
        for i in 0..100 {
            facts.insert(spo(iri(&format!("n{}", i)), "p", iri("b")));
        }
        let rules = RuleSet::new();
        let scope = Scope {
            facts: &facts,
            rules: &rules,
            snapshot: None,
        };
        let goals = vec![spo(var("x"), "p", iri("b"))];
        let opts = ProveOpts {
            max_results: Some(3),
            defer_builtins: false,
        };
        let results =
            with_run(|run| prove(&goals, &Subst::new(), &scope, run, &opts)).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn deep_chains_compact_substitutions() {
        let mut facts = FactStore::new();
        facts.insert(spo(iri("n0"), "next", iri("n1")));
        for i in 1..200 {
            facts.insert(spo(
                iri(&format!("n{}", i)),
                "next",
                iri(&format!("n{}", i + 1)),
            ));
        }
        let mut rules = RuleSet::new();
        // reach(x, y) <= next(x, y)
        rules.add(
            vec![spo(var("x"), "next", var("y"))],
            vec![spo(var("x"), "reach", var("y"))],
            false,
            false,
            Set::new(),
        );
        // reach(x, z) <= next(x, y), reach(y, z)
        rules.add(
            vec![
                spo(var("x"), "next", var("y")),
                spo(var("y"), "reach", var("z")),
            ],
            vec![spo(var("x"), "reach", var("z"))],
            false,
            false,
            Set::new(),
        );
        let scope = Scope {
            facts: &facts,
            rules: &rules,
            snapshot: None,
        };
        let goals = vec![spo(iri("n0"), "reach", iri("n200"))];
        let opts = ProveOpts {
            max_results: Some(1),
            defer_builtins: false,
        };
        let results =
            with_run(|run| prove(&goals, &Subst::new(), &scope, run, &opts)).unwrap();
        assert_eq!(results.len(), 1);
    }
}
