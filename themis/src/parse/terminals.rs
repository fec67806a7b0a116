//! Parsers for the terminals of the N3 subset.
//!
//! # Escape
//!
//! All terminals perform no escape resolution, meaning `" "` will be
//! recognized but not resolved. Escapes are resolved when the productions
//! build terms.
//!
//! # Provided
//!
//! Most terminals are provided as regular expressions. Some were to
//! complex for one expression. Therefore, those are implemented as `nom`
//! parser functions.

use crate::parse::util::parse_regex;
use lazy_static::lazy_static;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::{opt, recognize};
use nom::multi::many0;
use nom::sequence::tuple;
use nom::IResult;
use regex::Regex;

lazy_static! {
    /// Production of IRIREF according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref IRIREF: Regex = Regex::new(r#"^<([^\u{00}-\u{20}<>"\{\}\|\^`\\]|(\\u[[:xdigit:]]{4})|(\\U[[:xdigit:]]{8}))*>"#).unwrap();
    /// Production of IRIREF according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar)
    /// (without the angle brackets).
    ///
    /// Used to determine if a complete string is a valid IRIREF.
    pub static ref IRIREF_ONLY: Regex = Regex::new(r#"(?x)
        ^(
            [^\u{00}-\u{20}<>"\{\}\|\^`\\]
            | (\\u [[:xdigit:]]{4})
            | (\\U [[:xdigit:]]{8})
        )* $"#).unwrap();

    /// Production of PN_CHARS_U according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_CHARS_U: Regex = Regex::new(r#"^[_A-Za-z\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0370}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}]"#).unwrap();

    /// Production of PN_CHARS according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_CHARS: Regex = Regex::new(r#"^[-0-9_A-Za-z\u{00B7}\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0300}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{203F}-\u{2040}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}]"#).unwrap();

    /// Production of PN_PREFIX according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PN_PREFIX: Regex = Regex::new(r#"^([A-Za-z\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0370}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}]([-\.0-9_A-Za-z\u{00B7}\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0300}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{203F}-\u{2040}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}]*[-0-9_A-Za-z\u{00B7}\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0300}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{203F}-\u{2040}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}])?)"#).unwrap();
    /// Production of PNAME_NS according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PNAME_NS: Regex = Regex::new(r#"^([A-Za-z\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0370}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}]([-\.0-9_A-Za-z\u{00B7}\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0300}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{203F}-\u{2040}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}]*[-0-9_A-Za-z\u{00B7}\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0300}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{203F}-\u{2040}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}])?)?:"#).unwrap();
    /// Production of LANGTAG according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref LANGTAG: Regex = Regex::new(r#"^@[[:alpha:]]+(-[[:alnum:]]+)*"#).unwrap();
    /// Production of INTEGER according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref INTEGER: Regex = Regex::new(r#"^[+-]?[[:digit:]]+"#).unwrap();
    /// Production of DECIMAL according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref DECIMAL: Regex = Regex::new(r#"^[+-]?[[:digit:]]*\.[[:digit:]]+"#).unwrap();
    /// Production of DOUBLE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref DOUBLE: Regex = Regex::new(r#"^[+-]?(([[:digit:]]+\.[[:digit:]]*[eE][+-]?[[:digit:]]+)|(\.[[:digit:]]+[eE][+-]?[[:digit:]]+)|([[:digit:]]+[eE][+-]?[[:digit:]]+))"#).unwrap();
    /// Production of STRING_LITERAL_QUOTE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref STRING_LITERAL_QUOTE: Regex = Regex::new(r#"^"([^\u{22}\u{5C}\u{A}\u{D}]|(\\[tbnrf"'\\])|(\\u[[:xdigit:]]{4})|(\\U[[:xdigit:]]{8}))*""#).unwrap();
    /// Production of STRING_LITERAL_SINGLE_QUOTE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref STRING_LITERAL_SINGLE_QUOTE: Regex = Regex::new(r#"^'([^\u{27}\u{5C}\u{A}\u{D}]|(\\[tbnrf"'\\])|(\\u[[:xdigit:]]{4})|(\\U[[:xdigit:]]{8}))*'"#).unwrap();
    /// Production of STRING_LITERAL_LONG_QUOTE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref STRING_LITERAL_LONG_QUOTE: Regex = Regex::new(r#"^"""((("|"")?([^"\\]|(\\[tbnrf"'\\])|(\\u[[:xdigit:]]{4})|(\\U[[:xdigit:]]{8}))))*""""#).unwrap();
    /// Production of STRING_LITERAL_LONG_SINGLE_QUOTE according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref STRING_LITERAL_LONG_SINGLE_QUOTE: Regex = Regex::new(r#"^'''((('|'')?([^'\\]|(\\[tbnrf"'\\])|(\\u[[:xdigit:]]{4})|(\\U[[:xdigit:]]{8}))))*'''"#).unwrap();
    /// Production of WS according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    /// Parses comments as well
    pub static ref WS_MANY1: Regex = Regex::new(r#"^([ \t\n\r]|(#[^\n]*\n?))+"#).unwrap();
    /// Parses `WS*`.
    pub static ref WS_MANY0: Regex = Regex::new(r#"^([ \t\n\r]|(#[^\n]*\n?))*"#).unwrap();
    /// Production of ANON according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref ANON: Regex = Regex::new(r#"^\[[ \t\n\r]*\]"#).unwrap();
    /// Production of PLX according to the [Turtle spec](https://www.w3.org/TR/turtle/#sec-grammar).
    pub static ref PLX: Regex = Regex::new(r#"^(%[[:xdigit:]]{2})|(\\[-_~\.!\$&'#\(\)\*\+,;=/\?@%])"#).unwrap();
    /// Production of VARNAME, adapted from [SPARQL's VAR1](https://www.w3.org/TR/sparql11-query/#rVARNAME).
    pub static ref VARNAME: Regex = Regex::new(r#"^[_0-9A-Za-z\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0370}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}][-_0-9A-Za-z\u{00B7}\u{00C0}-\u{00D6}\u{00D8}-\u{00F6}\u{00F8}-\u{02FF}\u{0300}-\u{037D}\u{037F}-\u{1FFF}\u{200C}-\u{200D}\u{203F}-\u{2040}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}\U{00010000}-\U{000EFFFF}]*"#).unwrap();

    /// Utiliy
    static ref DIGIT: Regex = Regex::new(r#"^[[:digit:]]"#).unwrap();
}

/// Parses Turtle's rule
/// [140s] PNAME_LN ::= PNAME_NS PN_LOCAL
pub fn pname_ln(i: &str) -> IResult<&str, &str> {
    recognize(tuple((parse_regex(&PNAME_NS), pn_local)))(i)
}

/// Parses Turtle's rule
/// [141s] BLANK_NODE_LABEL ::= '_:' (PN_CHARS_U | [[:digit:]]) ((PN_CHARS | '.')* PN_CHARS)?
pub fn blank_node_label(i: &str) -> IResult<&str, &str> {
    recognize(tuple((
        tag("_:"),
        alt((parse_regex(&PN_CHARS_U), parse_regex(&DIGIT))),
        many0(alt((parse_regex(&PN_CHARS), tag(".")))),
        opt(parse_regex(&PN_CHARS)),
    )))(i)
}

/// Parses Turtle's rule
/// [168s] PN_LOCAL ::= (PN_CHARS_U | ':' | [[:digit:]] | PLX) ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX))?
pub fn pn_local(i: &str) -> IResult<&str, &str> {
    recognize(tuple((
        alt((
            parse_regex(&PN_CHARS_U),
            tag(":"),
            parse_regex(&DIGIT),
            parse_regex(&PLX),
        )),
        many0(alt((
            parse_regex(&PN_CHARS),
            tag("."),
            tag(":"),
            parse_regex(&PLX),
        ))),
        opt(alt((parse_regex(&PN_CHARS), tag(":"), parse_regex(&PLX)))),
    )))(i)
}

/// Parses at least one whitespace (includeing comments).
pub fn multispace1(i: &str) -> IResult<&str, &str> {
    parse_regex(&WS_MANY1)(i)
}

/// Parses zero or more whitespaces (includeing comments).
pub fn multispace0(i: &str) -> IResult<&str, &str> {
    parse_regex(&WS_MANY0)(i)
}
