//! The forward chainer: phase-gated saturation to a fixed point.
//!
//! Scoped meta builtins that reflect on the saturated graph fail until a
//! snapshot of sufficient closure level exists; between phases the fact
//! store is frozen and the level incremented, until nothing changes and
//! the highest priority requested anywhere in the rule base is reached.

use crate::error::{Error, Result};
use crate::ns;
use crate::prove::{prove, ProveOpts, Scope};
use crate::reason::Run;
use crate::serialize::{Config as WriteConfig, Serializer};
use crate::store::{FactStore, RuleSet};
use crate::subst::Subst;
use crate::term::literal::{self, Numeric};
use crate::term::{DerivedFact, Rule, Term, Triple};
use log::debug;
use num_traits::ToPrimitive;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// The pieces of a rule-shaped triple (`{…} => {…}`, `{…} <= {…}`,
/// `{…} => false`, with `true` for the empty formula).
#[derive(Debug, Clone)]
pub(crate) struct RuleParts {
    pub premise: Vec<Triple>,
    pub conclusion: Vec<Triple>,
    pub is_forward: bool,
    pub is_fuse: bool,
}

/// Deconstructs a triple into rule parts, if it is rule-shaped.
pub(crate) fn rule_parts(triple: &Triple) -> Option<RuleParts> {
    let graph_or_empty = |t: &Term| -> Option<Vec<Triple>> {
        match t {
            Term::Graph(triples) => Some(triples.clone()),
            other if literal::bool_value(other) == Some(true) => Some(Vec::new()),
            _ => None,
        }
    };
    match triple.p.as_iri()? {
        pred if pred == ns::log::implies => {
            let premise = graph_or_empty(&triple.s)?;
            if literal::bool_value(&triple.o) == Some(false) {
                return Some(RuleParts {
                    premise,
                    conclusion: Vec::new(),
                    is_forward: true,
                    is_fuse: true,
                });
            }
            let conclusion = graph_or_empty(&triple.o)?;
            Some(RuleParts {
                premise,
                conclusion,
                is_forward: true,
                is_fuse: false,
            })
        }
        pred if pred == ns::log::impliedBy => {
            let conclusion = graph_or_empty(&triple.s)?;
            let premise = graph_or_empty(&triple.o)?;
            Some(RuleParts {
                premise,
                conclusion,
                is_forward: false,
                is_fuse: false,
            })
        }
        _ => None,
    }
}

/// Registers rule parts: blanks in the body become rule variables, head
/// blanks are recorded as existentials, multi-triple backward heads are
/// split into one rule per head triple. Returns whether anything new was
/// registered.
pub(crate) fn register_rule(rules: &mut RuleSet, parts: RuleParts) -> bool {
    let mut body_blanks = HashSet::new();
    for t in &parts.premise {
        t.collect_blanks(&mut body_blanks);
    }
    let to_var = |label: &str| -> Term {
        if body_blanks.contains(label) {
            Term::Var(format!("b.{}", label))
        } else {
            Term::Blank(label.to_string())
        }
    };
    let rewrite = |t: &Triple| -> Triple {
        Triple::new(
            t.s.map_blanks(&to_var),
            t.p.map_blanks(&to_var),
            t.o.map_blanks(&to_var),
        )
    };
    let premise: Vec<Triple> = parts.premise.iter().map(rewrite).collect();
    let conclusion: Vec<Triple> = parts.conclusion.iter().map(rewrite).collect();

    let head_blanks_of = |heads: &[Triple]| -> HashSet<String> {
        let mut blanks = HashSet::new();
        for t in heads {
            t.collect_blanks(&mut blanks);
        }
        blanks
    };

    let mut added = false;
    if parts.is_forward || conclusion.len() <= 1 {
        if !rules.contains_equivalent(&premise, &conclusion, parts.is_forward) {
            let head_blanks = head_blanks_of(&conclusion);
            rules.add(
                premise,
                conclusion,
                parts.is_forward,
                parts.is_fuse,
                head_blanks,
            );
            added = true;
        }
    } else {
        // Backward rules are indexed by their single head triple.
        for head in conclusion {
            let single = vec![head];
            if !rules.contains_equivalent(&premise, &single, false) {
                let head_blanks = head_blanks_of(&single);
                rules.add(premise.clone(), single, false, false, head_blanks);
                added = true;
            }
        }
    }
    added
}

/// The highest scoped-closure priority requested anywhere in the rule
/// base.
fn max_requested_priority(rules: &RuleSet) -> u32 {
    let mut max = 0;
    for rule in rules.forward().iter().chain(rules.backward().iter()) {
        for t in &rule.premise {
            let scope_term = match t.p.as_iri() {
                Some(p) if p == ns::log::includes || p == ns::log::notIncludes => Some(&t.s),
                Some(p) if p == ns::log::collectAllIn || p == ns::log::forAllIn => Some(&t.o),
                _ => None,
            };
            if let Some(term) = scope_term {
                if let Some(Numeric::Integer(n)) = literal::numeric_value(term) {
                    if let Some(n) = n.to_u32() {
                        max = max.max(n);
                    }
                }
            }
        }
    }
    max
}

/// Saturates the fact store under the forward rules.
///
/// Appends derived facts (and dynamically produced rules) until a fixed
/// point; returns the derivation records. An inference fuse aborts with
/// [`Error::Fuse`](../error/enum.Error.html).
pub(crate) fn saturate(
    facts: &mut FactStore,
    rules: &mut RuleSet,
    run: &mut Run<'_>,
) -> Result<Vec<DerivedFact>> {
    let mut derived = Vec::new();
    let mut level: u32 = 0;
    let mut snapshot: Option<FactStore> = None;
    loop {
        let changed = fixpoint(facts, rules, run, snapshot.as_ref(), &mut derived)?;
        let max_priority = max_requested_priority(rules);
        if !changed && level >= max_priority {
            break;
        }
        level += 1;
        debug!("freezing saturation snapshot at closure level {}", level);
        snapshot = Some(facts.freeze(level));
    }
    debug!(
        "saturation complete: {} facts, {} derived",
        facts.len(),
        derived.len()
    );
    Ok(derived)
}

/// One standard saturation pass to a fixed point with a fixed snapshot.
fn fixpoint(
    facts: &mut FactStore,
    rules: &mut RuleSet,
    run: &mut Run<'_>,
    snapshot: Option<&FactStore>,
    derived: &mut Vec<DerivedFact>,
) -> Result<bool> {
    let mut any = false;
    loop {
        let mut changed = false;
        let mut idx = 0;
        // The registry may grow while iterating; newly produced rules
        // join the same pass.
        while idx < rules.forward().len() {
            let rule = rules.forward()[idx].clone();
            idx += 1;

            // No-op short-circuit for strictly ground heads.
            if !rule.is_fuse
                && !rule.conclusion.is_empty()
                && rule.conclusion.iter().all(Triple::is_strictly_ground)
                && rule.conclusion.iter().all(|t| facts.has(t))
            {
                continue;
            }

            let solutions = {
                let scope = Scope {
                    facts: &*facts,
                    rules: &*rules,
                    snapshot,
                };
                let opts = ProveOpts {
                    max_results: if rule.is_fuse { Some(1) } else { None },
                    defer_builtins: true,
                };
                prove(&rule.premise, &Subst::new(), &scope, run, &opts)?
            };

            if rule.is_fuse && !solutions.is_empty() {
                return Err(Error::Fuse(fuse_diagnostic(&rule, &solutions[0], run)));
            }

            for solution in &solutions {
                if fire(&rule, solution, facts, rules, run, derived) {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
        any = true;
    }
    Ok(any)
}

fn fuse_diagnostic(rule: &Rule, solution: &Subst, run: &Run<'_>) -> String {
    let config = WriteConfig::with_prolog(run.prefixes.clone());
    let writer = Serializer::new(&config);
    solution
        .apply_all(&rule.premise)
        .iter()
        .map(|t| writer.triple(t))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fires one rule under one proof substitution. Returns whether facts or
/// rules changed.
fn fire(
    rule: &Rc<Rule>,
    solution: &Subst,
    facts: &mut FactStore,
    rules: &mut RuleSet,
    run: &mut Run<'_>,
    derived: &mut Vec<DerivedFact>,
) -> bool {
    let premises = solution.apply_all(&rule.premise);
    let firing_key = {
        let mut hasher = DefaultHasher::new();
        rule.id.hash(&mut hasher);
        for t in &premises {
            t.to_string().hash(&mut hasher);
        }
        hasher.finish()
    };

    // Stable skolem labels per (firing, head blank): outer iterations
    // must not invent new blanks for the same firing. Labels are
    // allocated in sorted order to keep the counter deterministic.
    let mut head_labels: Vec<&String> = rule.head_blanks.iter().collect();
    head_labels.sort();
    let skolems: HashMap<String, Term> = head_labels
        .into_iter()
        .map(|label| {
            let key = format!("{:x}|{}", firing_key, label);
            (label.clone(), Term::Blank(run.skolem.label_for(&key)))
        })
        .collect();
    let replace = |label: &str| -> Term {
        skolems
            .get(label)
            .cloned()
            .unwrap_or_else(|| Term::Blank(label.to_string()))
    };

    let mut changed = false;
    for head in &rule.conclusion {
        let mut triple = solution.apply_triple(head);
        if !rule.head_blanks.is_empty() {
            triple = Triple::new(
                triple.s.map_blanks(&replace),
                triple.p.map_blanks(&replace),
                triple.o.map_blanks(&replace),
            );
        }

        if let Some(parts) = rule_parts(&triple) {
            // Rule-producing triple: record the triple and register the
            // rule, reindexing incrementally.
            if facts.insert(triple.clone()) {
                derived.push(DerivedFact {
                    fact: triple,
                    rule: rule.clone(),
                    premises: premises.clone(),
                    binding: solution.clone(),
                });
                changed = true;
            }
            if register_rule(rules, parts) {
                changed = true;
            }
        } else if triple.is_ground() && facts.insert(triple.clone()) {
            derived.push(DerivedFact {
                fact: triple,
                rule: rule.clone(),
                premises: premises.clone(),
                binding: solution.clone(),
            });
            changed = true;
        }
    }
    changed
}
