//! Decomposition of canonical literal strings and the numeric tower.
//!
//! A literal is stored as one canonical string: the raw lexical value
//! between double quotes, optionally followed by `@lang` or `^^<datatype>`.
//! Parsed numeric values are cached per lexical form; literals are
//! immutable so the caches are never invalidated, only cleared for memory
//! hygiene between runs.

use crate::ns::xsd;
use crate::term::Term;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cell::RefCell;
use std::collections::HashMap;

/// What follows the closing quote of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix<'a> {
    /// Nothing; a plain literal.
    Plain,
    /// A language tag, without the `@`.
    Lang(&'a str),
    /// A datatype IRI, without the `^^<…>` wrapper.
    Datatype(&'a str),
}

/// Splits a canonical literal string into lexical value and suffix.
///
/// The suffix is whatever follows the _last_ double quote, so lexical
/// values may themselves contain quotes.
pub fn parts(lit: &str) -> (&str, Suffix) {
    let close = lit.rfind('"').unwrap_or(0);
    let open = lit.find('"').map(|i| i + 1).unwrap_or(0);
    let lex = if open <= close { &lit[open..close] } else { "" };
    let suffix = &lit[close.saturating_add(1).min(lit.len())..];
    if suffix.is_empty() {
        (lex, Suffix::Plain)
    } else if let Some(tag) = suffix.strip_prefix('@') {
        (lex, Suffix::Lang(tag))
    } else if suffix.starts_with("^^<") && suffix.ends_with('>') {
        (lex, Suffix::Datatype(&suffix[3..suffix.len() - 1]))
    } else {
        (lex, Suffix::Plain)
    }
}

/// The lexical value of a canonical literal string.
pub fn lexical(lit: &str) -> &str {
    parts(lit).0
}

/// The datatype IRI, if any.
pub fn datatype(lit: &str) -> Option<&str> {
    match parts(lit).1 {
        Suffix::Datatype(dt) => Some(dt),
        _ => None,
    }
}

/// The language tag, if any.
pub fn language(lit: &str) -> Option<&str> {
    match parts(lit).1 {
        Suffix::Lang(tag) => Some(tag),
        _ => None,
    }
}

/// The lexical value of a term that decodes to a string: a plain or
/// `xsd:string` literal.
pub fn string_value(t: &Term) -> Option<&str> {
    let lit = t.as_literal()?;
    match parts(lit) {
        (lex, Suffix::Plain) => Some(lex),
        (lex, Suffix::Datatype(dt)) if dt == xsd::string => Some(lex),
        _ => None,
    }
}

/// The boolean value of a literal: `true`/`false`/`1`/`0`, plain or typed
/// `xsd:boolean`.
pub fn bool_value(t: &Term) -> Option<bool> {
    let lit = t.as_literal()?;
    let (lex, suffix) = parts(lit);
    match suffix {
        Suffix::Plain => {}
        Suffix::Datatype(dt) if dt == xsd::boolean || is_integer_datatype(dt) => {}
        _ => return None,
    }
    match lex {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Datatypes of the `xsd` integer hierarchy treated as arbitrary-precision
/// integers.
pub fn is_integer_datatype(dt: &str) -> bool {
    dt == xsd::integer
        || dt == xsd::long
        || dt == xsd::int
        || dt == xsd::short
        || dt == xsd::byte
        || dt == xsd::nonNegativeInteger
        || dt == xsd::nonPositiveInteger
        || dt == xsd::negativeInteger
        || dt == xsd::positiveInteger
        || dt == xsd::unsignedLong
        || dt == xsd::unsignedInt
        || dt == xsd::unsignedShort
        || dt == xsd::unsignedByte
}

/// A parsed numeric literal.
///
/// Ranked `integer < decimal < float < double` for datatype promotion.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    /// Arbitrary-precision integer.
    Integer(BigInt),
    /// Exact scaled decimal: `unscaled × 10^-scale`.
    Decimal(BigInt, u32),
    /// Single-precision value, held as `f64`.
    Float(f64),
    /// Double-precision value.
    Double(f64),
}

impl Numeric {
    /// The promotion rank of the datatype.
    pub fn rank(&self) -> u8 {
        match self {
            Numeric::Integer(_) => 1,
            Numeric::Decimal(..) => 2,
            Numeric::Float(_) => 3,
            Numeric::Double(_) => 4,
        }
    }

    /// The value as `f64`, lossy for big integers.
    pub fn to_f64(&self) -> f64 {
        match self {
            Numeric::Integer(i) => i.to_f64().unwrap_or(f64::NAN),
            Numeric::Decimal(unscaled, scale) => {
                unscaled.to_f64().unwrap_or(f64::NAN) / 10f64.powi(*scale as i32)
            }
            Numeric::Float(f) | Numeric::Double(f) => *f,
        }
    }

    /// A canonical value string: minimal lexical form with trailing
    /// decimal zeros removed. Used for fast keys.
    pub fn canon(&self) -> String {
        match self {
            Numeric::Integer(i) => i.to_string(),
            Numeric::Decimal(unscaled, scale) => {
                let (u, s) = strip_zeros(unscaled.clone(), *scale);
                decimal_lexical(&u, s)
            }
            Numeric::Float(f) | Numeric::Double(f) => format!("{}", f),
        }
    }

    /// Renders the value back as a typed literal term of its own datatype.
    pub fn to_term(&self) -> Term {
        match self {
            Numeric::Integer(i) => Term::typed(i.to_string(), xsd::integer),
            Numeric::Decimal(unscaled, scale) => {
                Term::typed(decimal_lexical(unscaled, *scale), xsd::decimal)
            }
            Numeric::Float(f) => Term::typed(format!("{}", f), xsd::float),
            Numeric::Double(f) => Term::typed(format!("{}", f), xsd::double),
        }
    }

    /// Value equality within the same datatype.
    pub fn same_value(&self, other: &Numeric) -> bool {
        match (self, other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => a == b,
            (Numeric::Decimal(au, asc), Numeric::Decimal(bu, bsc)) => {
                scaled_eq(au, *asc, bu, *bsc)
            }
            (Numeric::Float(a), Numeric::Float(b)) => a == b,
            (Numeric::Double(a), Numeric::Double(b)) => a == b,
            _ => false,
        }
    }

    /// Cross-type equality between an integer and a decimal whose scaled
    /// values agree. Only the `list:append` unification mode uses this.
    pub fn same_scaled_value(&self, other: &Numeric) -> bool {
        match (self, other) {
            (Numeric::Integer(i), Numeric::Decimal(u, s))
            | (Numeric::Decimal(u, s), Numeric::Integer(i)) => scaled_eq(i, 0, u, *s),
            _ => self.same_value(other),
        }
    }
}

fn ten_pow(n: u32) -> BigInt {
    let mut r = BigInt::from(1);
    for _ in 0..n {
        r *= 10;
    }
    r
}

fn scaled_eq(au: &BigInt, asc: u32, bu: &BigInt, bsc: u32) -> bool {
    if asc == bsc {
        return au == bu;
    }
    let (lo_u, lo_s, hi_u, hi_s) = if asc < bsc {
        (au, asc, bu, bsc)
    } else {
        (bu, bsc, au, asc)
    };
    lo_u * ten_pow(hi_s - lo_s) == *hi_u
}

fn strip_zeros(mut unscaled: BigInt, mut scale: u32) -> (BigInt, u32) {
    let ten = BigInt::from(10u8);
    while scale > 0 && (&unscaled % &ten).is_zero() {
        unscaled /= &ten;
        scale -= 1;
    }
    (unscaled, scale)
}

/// Renders an exact decimal as its `xsd:decimal` lexical form.
pub(crate) fn decimal_lexical(unscaled: &BigInt, scale: u32) -> String {
    if scale == 0 {
        return format!("{}.0", unscaled);
    }
    let negative = unscaled.is_negative();
    let digits = unscaled.abs().to_string();
    let scale = scale as usize;
    let (int_part, frac_part) = if digits.len() > scale {
        let split = digits.len() - scale;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{}{}", "0".repeat(scale - digits.len()), digits))
    };
    format!("{}{}.{}", if negative { "-" } else { "" }, int_part, frac_part)
}

fn parse_decimal(lex: &str) -> Option<(BigInt, u32)> {
    let lex = lex.trim();
    let (sign, body) = match lex.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, lex.strip_prefix('+').unwrap_or(lex)),
    };
    let (int_part, frac_part) = match body.find('.') {
        Some(dot) => (&body[..dot], &body[dot + 1..]),
        None => (body, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    let digits = format!("{}{}", int_part, frac_part);
    let unscaled: BigInt = digits.parse().ok()?;
    Some((unscaled * sign, frac_part.len() as u32))
}

fn parse_numeric_uncached(lit: &str) -> Option<Numeric> {
    let (lex, suffix) = parts(lit);
    let lex = lex.trim();
    match suffix {
        Suffix::Datatype(dt) if is_integer_datatype(dt) => {
            lex.parse::<BigInt>().ok().map(Numeric::Integer)
        }
        Suffix::Datatype(dt) if dt == xsd::decimal => {
            parse_decimal(lex).map(|(u, s)| Numeric::Decimal(u, s))
        }
        Suffix::Datatype(dt) if dt == xsd::float => lex.parse().ok().map(Numeric::Float),
        Suffix::Datatype(dt) if dt == xsd::double => lex.parse().ok().map(Numeric::Double),
        Suffix::Plain => {
            // Untyped numerics keep the shape their lexical form suggests.
            if lex.is_empty() {
                None
            } else if lex.chars().all(|c| c.is_ascii_digit())
                || (lex.len() > 1
                    && (lex.starts_with('-') || lex.starts_with('+'))
                    && lex[1..].chars().all(|c| c.is_ascii_digit()))
            {
                lex.parse::<BigInt>().ok().map(Numeric::Integer)
            } else if lex.contains(|c| c == 'e' || c == 'E') {
                lex.parse().ok().map(Numeric::Double)
            } else if lex.contains('.') {
                parse_decimal(lex).map(|(u, s)| Numeric::Decimal(u, s))
            } else {
                None
            }
        }
        _ => None,
    }
}

thread_local! {
    static NUMERIC_CACHE: RefCell<HashMap<String, Option<Numeric>>> = RefCell::new(HashMap::new());
}

/// The numeric value of a literal term, memoized per canonical form.
pub fn numeric_value(t: &Term) -> Option<Numeric> {
    let lit = t.as_literal()?;
    NUMERIC_CACHE.with(|cache| {
        if let Some(hit) = cache.borrow().get(lit) {
            return hit.clone();
        }
        let parsed = parse_numeric_uncached(lit);
        cache.borrow_mut().insert(lit.to_string(), parsed.clone());
        parsed
    })
}

/// Drops the memoized numeric values. Only called between runs.
pub fn clear_caches() {
    NUMERIC_CACHE.with(|cache| cache.borrow_mut().clear());
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("\"abc\"" => ("abc".to_string(), None, None) ; "plain")]
    #[test_case("\"abc\"@en" => ("abc".to_string(), Some("en".to_string()), None) ; "lang tagged")]
    #[test_case("\"5\"^^<http://www.w3.org/2001/XMLSchema#integer>" => ("5".to_string(), None, Some(xsd::integer.to_string())) ; "typed")]
    #[test_case("\"he said \"hi\"\"" => ("he said \"hi\"".to_string(), None, None) ; "inner quotes")]
    fn check_parts(lit: &str) -> (String, Option<String>, Option<String>) {
        let (lex, _) = parts(lit);
        (
            lex.to_string(),
            language(lit).map(String::from),
            datatype(lit).map(String::from),
        )
    }

    #[test_case(Term::plain("true") => Some(true) ; "plain true")]
    #[test_case(Term::typed("false", xsd::boolean) => Some(false) ; "typed false")]
    #[test_case(Term::typed("1", xsd::integer) => Some(true) ; "one")]
    #[test_case(Term::plain("yes") => None ; "not a boolean")]
    fn check_bool_value(t: Term) -> Option<bool> {
        bool_value(&t)
    }

    #[test]
    fn numeric_parsing() {
        let five = numeric_value(&Term::integer(5)).unwrap();
        assert_eq!(five, Numeric::Integer(BigInt::from(5)));

        let dec = numeric_value(&Term::typed("3.50", xsd::decimal)).unwrap();
        assert!(dec.same_value(&Numeric::Decimal(BigInt::from(35), 1)));
        assert_eq!(dec.canon(), "3.5");

        assert!(numeric_value(&Term::plain("abc")).is_none());
        assert!(numeric_value(&Term::plain("10")).is_some());
    }

    #[test]
    fn decimal_lexical_forms() {
        assert_eq!(decimal_lexical(&BigInt::from(55), 1), "5.5");
        assert_eq!(decimal_lexical(&BigInt::from(-5), 2), "-0.05");
        assert_eq!(decimal_lexical(&BigInt::from(6), 0), "6.0");
    }

    #[test]
    fn scaled_comparison() {
        let two = Numeric::Integer(BigInt::from(2));
        let two_dec = Numeric::Decimal(BigInt::from(20), 1);
        assert!(!two.same_value(&two_dec));
        assert!(two.same_scaled_value(&two_dec));
    }
}
