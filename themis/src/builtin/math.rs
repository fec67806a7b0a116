//! The `math:` builtins: comparisons, arithmetic and unary functions.
//!
//! Integer-integer arithmetic is arbitrary precision; integer and
//! decimal inputs are combined exactly as scaled integers, everything
//! else goes through binary floating point. The output datatype is the
//! common rank of the inputs and the output slot
//! (`integer < decimal < float < double`), promoted to decimal when a
//! rank-integer result is not a whole number.

use super::{as_list, bind, fail, solutions, succeed, Outcome};
use crate::ns::math;
use crate::store::FactStore;
use crate::subst::Subst;
use crate::term::literal::{decimal_lexical, numeric_value, Numeric};
use crate::term::{Term, Triple};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;

/// Math relations that are functions of their subject (or inverses of
/// one); satisfiable for some value even when nothing is bound.
pub(crate) fn is_functional(pred: &str) -> bool {
    matches!(
        pred,
        math::absoluteValue
            | math::acos
            | math::asin
            | math::atan
            | math::sin
            | math::cos
            | math::tan
            | math::sinh
            | math::cosh
            | math::tanh
            | math::degrees
            | math::negation
            | math::rounded
    )
}

/// Dispatches a `math:` predicate.
pub(crate) fn eval(pred: &str, goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    match pred {
        math::greaterThan => comparison(goal, subst, facts, |o| o == Ordering::Greater),
        math::lessThan => comparison(goal, subst, facts, |o| o == Ordering::Less),
        math::notGreaterThan => comparison(goal, subst, facts, |o| o != Ordering::Greater),
        math::notLessThan => comparison(goal, subst, facts, |o| o != Ordering::Less),
        math::equalTo => comparison(goal, subst, facts, |o| o == Ordering::Equal),
        math::notEqualTo => comparison(goal, subst, facts, |o| o != Ordering::Equal),
        math::sum => fold(goal, subst, facts, add),
        math::product => fold(goal, subst, facts, mul),
        math::difference => pairwise(goal, subst, facts, |a, b| Some(add(a, &negate(b)))),
        math::quotient => pairwise(goal, subst, facts, quotient),
        math::integerQuotient => pairwise(goal, subst, facts, integer_quotient),
        math::remainder => pairwise(goal, subst, facts, remainder),
        math::exponentiation => exponentiation(goal, subst, facts),
        math::negation => negation(goal, subst),
        math::rounded => rounded(goal, subst),
        math::absoluteValue => unary(goal, subst, f64::abs, None),
        math::acos => unary(goal, subst, f64::acos, Some(f64::cos)),
        math::asin => unary(goal, subst, f64::asin, Some(f64::sin)),
        math::atan => unary(goal, subst, f64::atan, Some(f64::tan)),
        math::sin => unary(goal, subst, f64::sin, Some(f64::asin)),
        math::cos => unary(goal, subst, f64::cos, Some(f64::acos)),
        math::tan => unary(goal, subst, f64::tan, Some(f64::atan)),
        math::sinh => unary(goal, subst, f64::sinh, Some(f64::asinh)),
        math::cosh => unary(goal, subst, f64::cosh, Some(f64::acosh)),
        math::tanh => unary(goal, subst, f64::tanh, Some(f64::atanh)),
        math::degrees => unary(goal, subst, f64::to_degrees, Some(f64::to_radians)),
        _ => Outcome::NotBuiltin,
    }
}

fn compare(a: &Numeric, b: &Numeric) -> Option<Ordering> {
    match (a, b) {
        (Numeric::Integer(x), Numeric::Integer(y)) => Some(x.cmp(y)),
        _ => a.to_f64().partial_cmp(&b.to_f64()),
    }
}

/// Comparison operands: either `(s, o)` or a two-membered subject list.
fn comparison(
    goal: &Triple,
    subst: &Subst,
    facts: &FactStore,
    holds: impl Fn(Ordering) -> bool,
) -> Outcome {
    let pair = match as_list(&goal.s, facts) {
        Some(items) if items.len() == 2 => {
            match (numeric_value(&items[0]), numeric_value(&items[1])) {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            }
        }
        _ => match (numeric_value(&goal.s), numeric_value(&goal.o)) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        },
    };
    match pair {
        Some((a, b)) => match compare(&a, &b) {
            Some(ordering) if holds(ordering) => succeed(subst),
            _ => fail(),
        },
        None => fail(),
    }
}

fn ten_pow(n: u32) -> BigInt {
    let mut r = BigInt::from(1);
    for _ in 0..n {
        r *= 10;
    }
    r
}

/// Both values as scaled integers at a common scale; only valid for
/// integer and decimal inputs.
fn align(a: &Numeric, b: &Numeric) -> Option<(BigInt, BigInt, u32)> {
    let parts = |n: &Numeric| match n {
        Numeric::Integer(i) => Some((i.clone(), 0u32)),
        Numeric::Decimal(u, s) => Some((u.clone(), *s)),
        _ => None,
    };
    let (au, asc) = parts(a)?;
    let (bu, bsc) = parts(b)?;
    let scale = asc.max(bsc);
    Some((au * ten_pow(scale - asc), bu * ten_pow(scale - bsc), scale))
}

fn add(a: &Numeric, b: &Numeric) -> Numeric {
    match (a, b) {
        (Numeric::Integer(x), Numeric::Integer(y)) => Numeric::Integer(x + y),
        _ => match align(a, b) {
            Some((x, y, scale)) => Numeric::Decimal(x + y, scale),
            None => Numeric::Double(a.to_f64() + b.to_f64()),
        },
    }
}

fn mul(a: &Numeric, b: &Numeric) -> Numeric {
    match (a, b) {
        (Numeric::Integer(x), Numeric::Integer(y)) => Numeric::Integer(x * y),
        (Numeric::Decimal(xu, xs), Numeric::Decimal(yu, ys)) => {
            Numeric::Decimal(xu * yu, xs + ys)
        }
        (Numeric::Integer(x), Numeric::Decimal(u, s))
        | (Numeric::Decimal(u, s), Numeric::Integer(x)) => Numeric::Decimal(x * u, *s),
        _ => Numeric::Double(a.to_f64() * b.to_f64()),
    }
}

fn negate(n: &Numeric) -> Numeric {
    match n {
        Numeric::Integer(i) => Numeric::Integer(-i),
        Numeric::Decimal(u, s) => Numeric::Decimal(-u, *s),
        Numeric::Float(f) => Numeric::Float(-f),
        Numeric::Double(f) => Numeric::Double(-f),
    }
}

fn is_zero(n: &Numeric) -> bool {
    match n {
        Numeric::Integer(i) => i.is_zero(),
        Numeric::Decimal(u, _) => u.is_zero(),
        Numeric::Float(f) | Numeric::Double(f) => *f == 0.0,
    }
}

fn quotient(a: &Numeric, b: &Numeric) -> Option<Numeric> {
    if is_zero(b) && b.rank() <= 2 {
        return None;
    }
    Some(Numeric::Double(a.to_f64() / b.to_f64()))
}

fn integer_quotient(a: &Numeric, b: &Numeric) -> Option<Numeric> {
    if is_zero(b) {
        return None;
    }
    match (a, b) {
        (Numeric::Integer(x), Numeric::Integer(y)) => Some(Numeric::Integer(x / y)),
        _ => {
            let q = (a.to_f64() / b.to_f64()).trunc();
            BigInt::from_f64(q).map(Numeric::Integer)
        }
    }
}

fn remainder(a: &Numeric, b: &Numeric) -> Option<Numeric> {
    if is_zero(b) {
        return None;
    }
    match (a, b) {
        (Numeric::Integer(x), Numeric::Integer(y)) => Some(Numeric::Integer(x % y)),
        _ => Some(Numeric::Double(a.to_f64() % b.to_f64())),
    }
}

/// The common-rank datatype of the inputs and the output slot.
fn common_rank(inputs: &[&Numeric], object: &Term) -> u8 {
    let mut rank = inputs.iter().map(|n| n.rank()).max().unwrap_or(1);
    if let Some(obj) = numeric_value(object) {
        rank = rank.max(obj.rank());
    }
    rank
}

/// Renders a result at the given rank; a fractional result at integer
/// rank is promoted to decimal.
fn render(result: &Numeric, rank: u8) -> Term {
    use crate::ns::xsd;
    match rank {
        1 => match result {
            Numeric::Integer(i) => Term::typed(i.to_string(), xsd::integer),
            Numeric::Decimal(u, s) => {
                let aligned = u % ten_pow(*s);
                if aligned.is_zero() {
                    Term::typed((u / ten_pow(*s)).to_string(), xsd::integer)
                } else {
                    Term::typed(decimal_lexical(u, *s), xsd::decimal)
                }
            }
            Numeric::Float(f) | Numeric::Double(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    match BigInt::from_f64(*f) {
                        Some(i) => Term::typed(i.to_string(), xsd::integer),
                        None => Term::typed(format!("{}", f), xsd::decimal),
                    }
                } else {
                    Term::typed(decimal_from_f64(*f), xsd::decimal)
                }
            }
        },
        2 => match result {
            Numeric::Integer(i) => Term::typed(format!("{}.0", i), xsd::decimal),
            Numeric::Decimal(u, s) => Term::typed(decimal_lexical(u, *s), xsd::decimal),
            Numeric::Float(f) | Numeric::Double(f) => {
                Term::typed(decimal_from_f64(*f), xsd::decimal)
            }
        },
        3 => Term::typed(format!("{}", result.to_f64()), xsd::float),
        _ => Term::typed(format!("{}", result.to_f64()), xsd::double),
    }
}

fn decimal_from_f64(f: f64) -> String {
    let rendered = format!("{}", f);
    if rendered.contains('.') || !f.is_finite() {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

/// Sum and product: fold over a subject list of any length. A singleton
/// subject whose element is itself a list folds that inner list, which is
/// how collected value lists arrive.
fn fold(
    goal: &Triple,
    subst: &Subst,
    facts: &FactStore,
    op: impl Fn(&Numeric, &Numeric) -> Numeric,
) -> Outcome {
    let mut items = match as_list(&goal.s, facts) {
        Some(items) => items,
        None => return fail(),
    };
    if items.len() == 1 {
        if let Some(inner) = as_list(&items[0], facts) {
            items = inner;
        }
    }
    let nums: Option<Vec<Numeric>> = items.iter().map(numeric_value).collect();
    let nums = match nums {
        Some(nums) if !nums.is_empty() => nums,
        _ => return fail(),
    };
    let mut acc = nums[0].clone();
    for n in &nums[1..] {
        acc = op(&acc, n);
    }
    let rank = common_rank(&nums.iter().collect::<Vec<_>>(), &goal.o);
    solutions(bind(&goal.o, &render(&acc, rank), subst))
}

/// Binary operators over a two-membered subject list.
fn pairwise(
    goal: &Triple,
    subst: &Subst,
    facts: &FactStore,
    op: impl Fn(&Numeric, &Numeric) -> Option<Numeric>,
) -> Outcome {
    let items = match as_list(&goal.s, facts) {
        Some(items) if items.len() == 2 => items,
        _ => return fail(),
    };
    let (a, b) = match (numeric_value(&items[0]), numeric_value(&items[1])) {
        (Some(a), Some(b)) => (a, b),
        _ => return fail(),
    };
    match op(&a, &b) {
        Some(result) => {
            let rank = common_rank(&[&a, &b], &goal.o);
            solutions(bind(&goal.o, &render(&result, rank), subst))
        }
        None => fail(),
    }
}

/// `(base exponent) math:exponentiation result`, with an inverse mode
/// solving for the exponent when the base and the result are known.
fn exponentiation(goal: &Triple, subst: &Subst, facts: &FactStore) -> Outcome {
    let items = match as_list(&goal.s, facts) {
        Some(items) if items.len() == 2 => items,
        _ => return fail(),
    };
    let base = numeric_value(&items[0]);
    let exp = numeric_value(&items[1]);
    match (base, exp) {
        (Some(base), Some(exp)) => {
            let result = power(&base, &exp);
            let rank = common_rank(&[&base, &exp], &goal.o);
            solutions(bind(&goal.o, &render(&result, rank), subst))
        }
        (Some(base), None) => {
            // Inverse mode: exponent unbound, base a positive real != 1.
            let out = match numeric_value(&goal.o) {
                Some(out) => out,
                None => return fail(),
            };
            let b = base.to_f64();
            if b <= 0.0 || b == 1.0 {
                return fail();
            }
            let e = out.to_f64().ln() / b.ln();
            if !e.is_finite() {
                return fail();
            }
            solutions(bind(&items[1], &Numeric::Double(e).to_term(), subst))
        }
        _ => fail(),
    }
}

fn power(base: &Numeric, exp: &Numeric) -> Numeric {
    if let (Numeric::Integer(b), Numeric::Integer(e)) = (base, exp) {
        if !e.is_negative() {
            if let Some(e) = e.to_u32() {
                let mut acc = BigInt::from(1);
                for _ in 0..e {
                    acc *= b;
                }
                return Numeric::Integer(acc);
            }
        }
    }
    Numeric::Double(base.to_f64().powf(exp.to_f64()))
}

/// Exact negation, invertible in both directions.
fn negation(goal: &Triple, subst: &Subst) -> Outcome {
    if let Some(n) = numeric_value(&goal.s) {
        let rank = common_rank(&[&n], &goal.o);
        return solutions(bind(&goal.o, &render(&negate(&n), rank), subst));
    }
    if let Some(n) = numeric_value(&goal.o) {
        return solutions(bind(&goal.s, &negate(&n).to_term(), subst));
    }
    fail()
}

/// Round half toward positive infinity.
fn rounded(goal: &Triple, subst: &Subst) -> Outcome {
    let n = match numeric_value(&goal.s) {
        Some(n) => n,
        None => return fail(),
    };
    let rounded = match &n {
        Numeric::Integer(i) => i.clone(),
        other => match BigInt::from_f64((other.to_f64() + 0.5).floor()) {
            Some(i) => i,
            None => return fail(),
        },
    };
    solutions(bind(&goal.o, &Term::integer(rounded), subst))
}

/// Unary functions: forward when the subject is bound, the inverse when
/// only the object is. Fully unbound yields no bindings; the prover
/// treats the relation as satisfiable once rotation is exhausted.
fn unary(
    goal: &Triple,
    subst: &Subst,
    forward: fn(f64) -> f64,
    inverse: Option<fn(f64) -> f64>,
) -> Outcome {
    if let Some(n) = numeric_value(&goal.s) {
        let result = forward(n.to_f64());
        if !result.is_finite() {
            return fail();
        }
        let rank = common_rank(&[&n], &goal.o);
        return solutions(bind(&goal.o, &render(&Numeric::Double(result), rank), subst));
    }
    if let (Some(g), Some(n)) = (inverse, numeric_value(&goal.o)) {
        let result = g(n.to_f64());
        if !result.is_finite() {
            return fail();
        }
        let rank = common_rank(&[&n], &goal.s);
        return solutions(bind(&goal.s, &render(&Numeric::Double(result), rank), subst));
    }
    fail()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ns::xsd;
    use test_case::test_case;

    fn run(pred: &str, s: Term, o: Term) -> Vec<Subst> {
        let facts = FactStore::new();
        let goal = Triple::new(s, Term::Iri(pred.into()), o);
        match eval(pred, &goal, &Subst::new(), &facts) {
            Outcome::Solutions(sols) => sols,
            Outcome::NotBuiltin => panic!("{} should be a builtin", pred),
        }
    }

    fn object_of(pred: &str, s: Term) -> Option<Term> {
        run(pred, s, Term::Var("out".into()))
            .first()
            .map(|sub| sub.apply(&Term::Var("out".into())))
    }

    #[test]
    fn promotion_to_decimal() {
        let s = Term::List(vec![Term::integer(2), Term::typed("3.5", xsd::decimal)]);
        assert_eq!(
            object_of(math::sum, s).unwrap(),
            Term::typed("5.5", xsd::decimal)
        );
    }

    #[test]
    fn integer_sum_stays_integer() {
        let s = Term::List(vec![Term::integer(1), Term::integer(2), Term::integer(3)]);
        assert_eq!(object_of(math::sum, s).unwrap(), Term::integer(6));
    }

    #[test]
    fn singleton_list_of_list_folds_inner() {
        let inner = Term::List(vec![Term::integer(1), Term::integer(2), Term::integer(3)]);
        let s = Term::List(vec![inner]);
        assert_eq!(object_of(math::sum, s).unwrap(), Term::integer(6));
    }

    #[test]
    fn integer_quotient_zero_divisor_fails() {
        let s = Term::List(vec![Term::integer(7), Term::integer(0)]);
        assert!(run(math::integerQuotient, s, Term::Var("q".into())).is_empty());
    }

    #[test]
    fn integer_quotient_truncates() {
        let s = Term::List(vec![Term::integer(7), Term::integer(2)]);
        assert_eq!(object_of(math::integerQuotient, s).unwrap(), Term::integer(3));
    }

    #[test]
    fn quotient_of_integers_promotes() {
        let s = Term::List(vec![Term::integer(7), Term::integer(2)]);
        assert_eq!(
            object_of(math::quotient, s).unwrap(),
            Term::typed("3.5", xsd::decimal)
        );
    }

    #[test_case(Term::integer(2), Term::integer(3) => true ; "two lt three")]
    #[test_case(Term::integer(3), Term::integer(3) => false ; "equal not less")]
    #[test_case(Term::typed("2.5", xsd::decimal), Term::integer(3) => true ; "decimal lt integer")]
    fn check_less_than(a: Term, b: Term) -> bool {
        !run(math::lessThan, a, b).is_empty()
    }

    #[test]
    fn comparison_accepts_list_subject() {
        let s = Term::List(vec![Term::integer(1), Term::integer(5)]);
        assert!(!run(math::lessThan, s, Term::Var("ignored".into())).is_empty());
    }

    #[test]
    fn big_integers_do_not_overflow() {
        let big = "123456789012345678901234567890";
        let s = Term::List(vec![
            Term::typed(big, xsd::integer),
            Term::typed(big, xsd::integer),
        ]);
        assert_eq!(
            object_of(math::sum, s).unwrap(),
            Term::typed("246913578024691357802469135780", xsd::integer)
        );
    }

    #[test_case(0.5 => 1 ; "half rounds up")]
    #[test_case(-0.5 => 0 ; "negative half rounds toward positive infinity")]
    #[test_case(2.4 => 2 ; "below half rounds down")]
    fn check_rounded(x: f64) -> i64 {
        let lex = format!("{}", x);
        let out = object_of(math::rounded, Term::typed(lex, xsd::decimal)).unwrap();
        crate::term::literal::lexical(out.as_literal().unwrap())
            .parse()
            .unwrap()
    }

    #[test]
    fn unary_inverse_mode() {
        // Only the object bound: evaluate the inverse.
        let sols = run(math::sin, Term::Var("x".into()), Term::integer(0));
        assert_eq!(sols.len(), 1);
        assert_eq!(
            sols[0].apply(&Term::Var("x".into())),
            Term::integer(0)
        );
    }

    #[test]
    fn exponentiation_inverse_solves_exponent() {
        let s = Term::List(vec![Term::integer(2), Term::Var("e".into())]);
        let sols = run(math::exponentiation, s, Term::integer(8));
        assert_eq!(sols.len(), 1);
        let e = sols[0].apply(&Term::Var("e".into()));
        let lex = crate::term::literal::lexical(e.as_literal().unwrap()).to_string();
        assert!((lex.parse::<f64>().unwrap() - 3.0).abs() < 1e-9);
    }
}
