//! The `list:` builtins, plus `rdf:first`/`rdf:rest` over explicit list
//! terms.
//!
//! Where a ground side is compared (`memberAt`, `iterate`, `length`,
//! `remove`) the comparison is strict structural equality, which never
//! identifies a decimal with an integer.

use super::{as_list, bind, fail, solutions, strict_unify, succeed, Outcome};
use crate::error::Result;
use crate::ns::{list, rdf};
use crate::prove::{self, ProveOpts, Scope};
use crate::reason::Run;
use crate::subst::Subst;
use crate::term::literal::numeric_value;
use crate::term::{literal, Term, Triple};
use crate::unify::{unify, Mode};
use num_traits::ToPrimitive;
use std::cmp::Ordering;

/// Dispatches a `list:` (or `rdf:first`/`rdf:rest`) predicate.
pub(crate) fn eval(
    pred: &str,
    goal: &Triple,
    subst: &Subst,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
    _opts: &ProveOpts,
) -> Result<Outcome> {
    let facts = scope.facts;
    Ok(match pred {
        // rdf:first/rdf:rest behave like list:first/list:rest but only
        // on explicit list terms; on nodes they stay ordinary triples.
        rdf::first => match &goal.s {
            Term::List(items) if !items.is_empty() => {
                solutions(bind(&goal.o, &items[0], subst))
            }
            Term::List(_) => fail(),
            _ => return Ok(Outcome::NotBuiltin),
        },
        rdf::rest => match &goal.s {
            Term::List(items) if !items.is_empty() => {
                solutions(bind(&goal.o, &Term::List(items[1..].to_vec()), subst))
            }
            Term::List(_) => fail(),
            _ => return Ok(Outcome::NotBuiltin),
        },
        list::first => match as_list(&goal.s, facts) {
            Some(items) if !items.is_empty() => solutions(bind(&goal.o, &items[0], subst)),
            _ => fail(),
        },
        list::rest => match as_list(&goal.s, facts) {
            Some(items) if !items.is_empty() => {
                solutions(bind(&goal.o, &Term::List(items[1..].to_vec()), subst))
            }
            _ => fail(),
        },
        list::last => match as_list(&goal.s, facts) {
            Some(items) => match items.last() {
                Some(last) => solutions(bind(&goal.o, last, subst)),
                None => fail(),
            },
            None => fail(),
        },
        list::member => match as_list(&goal.s, facts) {
            Some(items) => Outcome::Solutions(
                items
                    .iter()
                    .filter_map(|item| bind(&goal.o, item, subst))
                    .collect(),
            ),
            None => fail(),
        },
        _ if pred == list::IN => match as_list(&goal.o, facts) {
            Some(items) => Outcome::Solutions(
                items
                    .iter()
                    .filter_map(|item| bind(&goal.s, item, subst))
                    .collect(),
            ),
            None => fail(),
        },
        list::notMember => match as_list(&goal.s, facts) {
            Some(items) => {
                if items.iter().any(|item| bind(&goal.o, item, subst).is_some()) {
                    fail()
                } else {
                    succeed(subst)
                }
            }
            None => fail(),
        },
        list::memberAt => member_at(goal, subst, facts),
        list::iterate => iterate(goal, subst, facts),
        list::remove => remove(goal, subst, facts),
        list::length => length(goal, subst, facts),
        list::reverse => reverse(goal, subst, facts),
        list::sort => sort(goal, subst, facts),
        list::firstRest => first_rest(goal, subst, facts),
        list::append => append(goal, subst, facts),
        list::map => return map_builtin(goal, subst, scope, run),
        _ => Outcome::NotBuiltin,
    })
}

fn index_of(t: &Term) -> Option<usize> {
    match numeric_value(t)? {
        literal::Numeric::Integer(i) => i.to_usize(),
        _ => None,
    }
}

/// `(list index) list:memberAt value`, 0-based; enumerates indexes when
/// the index is unbound.
fn member_at(
    goal: &Triple,
    subst: &Subst,
    facts: &crate::store::FactStore,
) -> Outcome {
    let pair = match &goal.s {
        Term::List(pair) if pair.len() == 2 => pair,
        _ => return fail(),
    };
    let items = match as_list(&pair[0], facts) {
        Some(items) => items,
        None => return fail(),
    };
    if pair[1].is_ground() {
        let idx = match index_of(&pair[1]) {
            Some(idx) => idx,
            None => return fail(),
        };
        match items.get(idx) {
            Some(item) => solutions(strict_unify(&goal.o, item, subst)),
            None => fail(),
        }
    } else {
        Outcome::Solutions(
            items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| {
                    let s = bind(&pair[1], &Term::integer(idx), subst)?;
                    strict_unify(&goal.o, item, &s)
                })
                .collect(),
        )
    }
}

/// Enumerates `(index value)` pairs of a list.
fn iterate(goal: &Triple, subst: &Subst, facts: &crate::store::FactStore) -> Outcome {
    let items = match as_list(&goal.s, facts) {
        Some(items) => items,
        None => return fail(),
    };
    Outcome::Solutions(
        items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| match &goal.o {
                Term::List(pair) if pair.len() == 2 => {
                    let s = strict_unify(&pair[0], &Term::integer(idx), subst)?;
                    strict_unify(&pair[1], item, &s)
                }
                other => {
                    let pair = Term::List(vec![Term::integer(idx), item.clone()]);
                    strict_unify(other, &pair, subst)
                }
            })
            .collect(),
    )
}

/// `(list item) list:remove out`: drops every occurrence of the item
/// under strict equality.
fn remove(goal: &Triple, subst: &Subst, facts: &crate::store::FactStore) -> Outcome {
    let pair = match &goal.s {
        Term::List(pair) if pair.len() == 2 => pair,
        _ => return fail(),
    };
    let items = match as_list(&pair[0], facts) {
        Some(items) => items,
        None => return fail(),
    };
    let kept: Vec<Term> = items.into_iter().filter(|item| *item != pair[1]).collect();
    solutions(bind(&goal.o, &Term::List(kept), subst))
}

fn length(goal: &Triple, subst: &Subst, facts: &crate::store::FactStore) -> Outcome {
    match as_list(&goal.s, facts) {
        Some(items) => solutions(strict_unify(&goal.o, &Term::integer(items.len()), subst)),
        None => fail(),
    }
}

fn reverse(goal: &Triple, subst: &Subst, facts: &crate::store::FactStore) -> Outcome {
    if let Some(mut items) = as_list(&goal.s, facts) {
        items.reverse();
        return solutions(bind(&goal.o, &Term::List(items), subst));
    }
    if let Some(mut items) = as_list(&goal.o, facts) {
        items.reverse();
        return solutions(bind(&goal.s, &Term::List(items), subst));
    }
    fail()
}

/// Numeric ordering when both sides carry numeric lexicals, otherwise
/// lexicographic.
fn compare_items(a: &Term, b: &Term) -> Ordering {
    if let (Some(x), Some(y)) = (numeric_value(a), numeric_value(b)) {
        if let (literal::Numeric::Integer(ix), literal::Numeric::Integer(iy)) = (&x, &y) {
            return ix.cmp(iy);
        }
        if let Some(ord) = x.to_f64().partial_cmp(&y.to_f64()) {
            return ord;
        }
    }
    let key = |t: &Term| match t.as_literal() {
        Some(lit) => literal::lexical(lit).to_string(),
        None => t.to_string(),
    };
    key(a).cmp(&key(b))
}

fn sort(goal: &Triple, subst: &Subst, facts: &crate::store::FactStore) -> Outcome {
    let mut items = match as_list(&goal.s, facts) {
        Some(items) => items,
        None => return fail(),
    };
    items.sort_by(compare_items);
    solutions(bind(&goal.o, &Term::List(items), subst))
}

/// `list list:firstRest (first rest)`, both directions.
fn first_rest(goal: &Triple, subst: &Subst, facts: &crate::store::FactStore) -> Outcome {
    if let Some(items) = as_list(&goal.s, facts) {
        if items.is_empty() {
            return fail();
        }
        let pair = Term::List(vec![items[0].clone(), Term::List(items[1..].to_vec())]);
        return solutions(bind(&goal.o, &pair, subst));
    }
    if let Term::List(pair) = &goal.o {
        if pair.len() == 2 {
            if let Some(rest) = as_list(&pair[1], facts) {
                let mut items = vec![pair[0].clone()];
                items.extend(rest);
                return solutions(bind(&goal.s, &Term::List(items), subst));
            }
        }
    }
    fail()
}

/// `list:append`: concatenation when every part is known, split
/// enumeration when the output is ground instead.
fn append(goal: &Triple, subst: &Subst, facts: &crate::store::FactStore) -> Outcome {
    let parts = match &goal.s {
        Term::List(parts) => parts.clone(),
        _ => match as_list(&goal.s, facts) {
            Some(parts) => parts,
            None => return fail(),
        },
    };
    let known: Option<Vec<Vec<Term>>> =
        parts.iter().map(|part| as_list(part, facts)).collect();
    if let Some(known) = known {
        let whole: Vec<Term> = known.into_iter().flatten().collect();
        return solutions(unify(&goal.o, &Term::List(whole), subst, Mode::Append));
    }
    // Some part is unbound: enumerate every split of a ground output.
    let out = match as_list(&goal.o, facts) {
        Some(out) if Term::List(out.clone()).is_ground() => out,
        _ => return fail(),
    };
    let mut results = Vec::new();
    split_parts(&parts, &out, subst, &mut results);
    Outcome::Solutions(results)
}

fn split_parts(parts: &[Term], out: &[Term], subst: &Subst, acc: &mut Vec<Subst>) {
    match parts {
        [] => {
            if out.is_empty() {
                acc.push(subst.clone());
            }
        }
        [last] => {
            if let Some(s) = unify(last, &Term::List(out.to_vec()), subst, Mode::Append) {
                acc.push(s);
            }
        }
        [head, rest @ ..] => {
            for cut in 0..=out.len() {
                if let Some(s) =
                    unify(head, &Term::List(out[..cut].to_vec()), subst, Mode::Append)
                {
                    split_parts(rest, &out[cut..], &s, acc);
                }
            }
        }
    }
}

/// `(list predicate) list:map out`: proves `(element predicate ?v)` for
/// each element and concatenates all solutions in order.
fn map_builtin(
    goal: &Triple,
    subst: &Subst,
    scope: &Scope<'_>,
    run: &mut Run<'_>,
) -> Result<Outcome> {
    let pair = match &goal.s {
        Term::List(pair) if pair.len() == 2 => pair,
        _ => return Ok(fail()),
    };
    let items = match as_list(&pair[0], scope.facts) {
        Some(items) => items,
        None => return Ok(fail()),
    };
    let mut outputs = Vec::new();
    for item in items {
        let v = Term::Var(run.fresh_var());
        let inner = Triple::new(item, pair[1].clone(), v.clone());
        let sols = prove::prove(
            &[inner],
            subst,
            scope,
            run,
            &ProveOpts {
                max_results: None,
                defer_builtins: false,
            },
        )?;
        for s in sols {
            outputs.push(s.apply(&v));
        }
    }
    Ok(solutions(bind(&goal.o, &Term::List(outputs), subst)))
}
