//! Production rules of the N3 subset.
//!
//! In general productions are two split:
//!
//! 1. A _pure_ nom-parser that only parses the `&str` which returns
//!   `nom::Err::Error` if the parser not matches.
//! 2. A context-building step that constructs terms from the `&str`.
//!   If building fails `nom::Err::Failure` is returned.
//!
//! Collections parse directly into the engine's native list terms and
//! `{…}` quoted formulas into graph terms; neither is expanded to
//! `rdf:first`/`rdf:rest` triples.

use super::terminals::*;
use super::{
    parse_regex, unwrap_str, Context, Error, IntoPR as _, MapPR as _, OrIntoPR as _, PResult,
    PosError,
};
use crate::common::{PoList, SpoList};
use crate::ns::{log, rdf, xsd};
use crate::term::{Term, Triple};
use nom::bytes::complete::{tag, tag_no_case};
use nom::error::ErrorKind;
use nom::IResult;
use std::cell::RefCell;

/// A context wrapped in a RefCell.
///
/// This is necessary due to the constraints of `nom`'s parser generators
/// (they only take `Fn`).
pub type RefContext = RefCell<Context>;

type Plain<'a> = IResult<&'a str, &'a str>;

fn sym<'a>(i: &'a str, t: &'static str) -> Plain<'a> {
    tag(t)(i)
}

fn ws0(i: &str) -> Plain {
    multispace0(i)
}

/// Resolves the escape sequences of ECHAR and UCHAR. Unknown escapes
/// resolve to the escaped character itself (identity escape).
pub(crate) fn resolve_escapes(i: &str) -> String {
    let mut out = String::with_capacity(i.len());
    let mut chars = i.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{08}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{0C}'),
            Some('u') => push_code(&mut out, &mut chars, 4),
            Some('U') => push_code(&mut out, &mut chars, 8),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code(out: &mut String, chars: &mut std::str::Chars, digits: usize) {
    let hex: String = chars.take(digits).collect();
    match u32::from_str_radix(&hex, 16).ok().and_then(std::char::from_u32) {
        Some(c) => out.push(c),
        None => out.push('\u{FFFD}'),
    }
}

/// Parses the production
/// document ::= statement*
pub fn document<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Vec<Triple>> {
    let (mut rest, _) = ws0(i).map_pr()?;
    let mut triples = Vec::new();
    while !rest.is_empty() {
        let (r, mut parsed) = statement(rest, ctx)?;
        triples.append(&mut parsed);
        let (r, _) = ws0(r).map_pr()?;
        rest = r;
    }
    Ok((rest, triples))
}

/// Parses the production
/// statement ::= directive | triples '.'
pub fn statement<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Vec<Triple>> {
    match directive(i, ctx) {
        Ok((rest, _)) => return Ok((rest, Vec::new())),
        Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
        Err(_) => {}
    }
    let (rest, spo) = triples(i, ctx)?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (rest, _) = sym(rest, ".").map_pr()?;
    let mut out: Vec<Triple> = spo.into_triples().collect();
    out.extend(ctx.borrow_mut().drain_triples());
    Ok((rest, out))
}

/// Parses the production
/// directive ::= prefixID | base | sparqlPrefix | sparqlBase
fn directive<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, ()> {
    for rule in &[prefix_id, base, sparql_prefix, sparql_base] {
        match rule(i, ctx) {
            Err(nom::Err::Error(_)) => {}
            other => return other,
        }
    }
    Err(PosError::err(i, Error::NoMatch))
}

/// Parses the production
/// prefixID ::= '@prefix' PNAME_NS IRIREF '.'
fn prefix_id<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, ()> {
    let (rest, _) = sym(i, "@prefix").map_pr()?;
    let (rest, _) = multispace1(rest).map_pr()?;
    let (rest, p) = parse_regex(&PNAME_NS)(rest).map_pr()?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (rest, ns) = parse_regex(&IRIREF)(rest).map_pr()?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (after, _) = sym(rest, ".").map_pr()?;
    bind_prefix(ctx, p, ns).into_pr(i, after)
}

/// Parses the production
/// base ::= '@base' IRIREF '.'
fn base<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, ()> {
    let (rest, _) = sym(i, "@base").map_pr()?;
    let (rest, _) = multispace1(rest).map_pr()?;
    let (rest, iri) = parse_regex(&IRIREF)(rest).map_pr()?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (after, _) = sym(rest, ".").map_pr()?;
    bind_base(ctx, iri).into_pr(i, after)
}

/// Parses SPARQL's production
/// sparqlPrefix ::= "PREFIX" PNAME_NS IRIREF
fn sparql_prefix<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, ()> {
    let (rest, _) = tag_no_case::<_, _, (&str, ErrorKind)>("PREFIX")(i).map_pr()?;
    let (rest, _) = multispace1(rest).map_pr()?;
    let (rest, p) = parse_regex(&PNAME_NS)(rest).map_pr()?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (after, ns) = parse_regex(&IRIREF)(rest).map_pr()?;
    bind_prefix(ctx, p, ns).into_pr(i, after)
}

/// Parses SPARQL's production
/// sparqlBase ::= "BASE" IRIREF
fn sparql_base<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, ()> {
    let (rest, _) = tag_no_case::<_, _, (&str, ErrorKind)>("BASE")(i).map_pr()?;
    let (rest, _) = multispace1(rest).map_pr()?;
    let (after, iri) = parse_regex(&IRIREF)(rest).map_pr()?;
    bind_base(ctx, iri).into_pr(i, after)
}

fn bind_prefix(ctx: &RefContext, pname_ns: &str, iriref: &str) -> Result<(), Error> {
    let prefix = &pname_ns[..pname_ns.len() - 1];
    let ns = resolve_escapes(unwrap_str(iriref, 1));
    let ns = ctx.borrow().prolog.resolve(&ns);
    ctx.borrow_mut()
        .prolog
        .add_prefix(prefix, ns)
        .map(|_| ())
        .map_err(Error::from)
}

fn bind_base(ctx: &RefContext, iriref: &str) -> Result<(), Error> {
    let iri = resolve_escapes(unwrap_str(iriref, 1));
    let iri = ctx.borrow().prolog.resolve(&iri);
    ctx.borrow_mut()
        .prolog
        .set_base(iri)
        .map(|_| ())
        .map_err(Error::from)
}

/// Parses the production
/// triples ::= subject predicateObjectList
pub(crate) fn triples<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, SpoList> {
    let (rest, s) = expression(i, ctx)?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (rest, pos) = predicate_object_list(rest, ctx)?;
    Ok((rest, SpoList::new(s, pos)))
}

/// Parses the production
/// predicateObjectList ::= verb objectList (';' (verb objectList)?)*
fn predicate_object_list<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Vec<PoList>> {
    let (rest, first) = verb_object_list(i, ctx)?;
    let mut lists = vec![first];
    let mut rest = rest;
    loop {
        let checkpoint = rest;
        let (r, _) = match ws0(rest).map_pr().and_then(|(r, _)| sym(r, ";").map_pr()) {
            Ok(hit) => hit,
            Err(_) => return Ok((checkpoint, lists)),
        };
        let (r, _) = ws0(r).map_pr()?;
        match verb_object_list(r, ctx) {
            Ok((r, pol)) => {
                lists.push(pol);
                rest = r;
            }
            // Dangling ';' is allowed.
            Err(nom::Err::Error(_)) => rest = r,
            Err(e) => return Err(e),
        }
    }
}

fn verb_object_list<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, PoList> {
    let (rest, p) = verb(i, ctx)?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (rest, objects) = object_list(rest, ctx)?;
    Ok((rest, PoList::new(p, objects)))
}

/// Parses the production
/// objectList ::= object (',' object)*
fn object_list<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Vec<Term>> {
    let (rest, first) = expression(i, ctx)?;
    let mut objects = vec![first];
    let mut rest = rest;
    loop {
        let checkpoint = rest;
        let sep = ws0(rest)
            .map_pr()
            .and_then(|(r, _)| sym(r, ",").map_pr())
            .and_then(|(r, _)| ws0(r).map_pr());
        match sep {
            Ok((r, _)) => {
                let (r, o) = expression(r, ctx)?;
                objects.push(o);
                rest = r;
            }
            Err(_) => return Ok((checkpoint, objects)),
        }
    }
}

/// Parses the production
/// verb ::= expression | 'a' | '=>' | '<='
fn verb<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    if let Ok((rest, _)) = sym(i, "=>") {
        return Ok((rest, Term::Iri(log::implies.to_string())));
    }
    if let Ok((rest, _)) = sym(i, "<=") {
        return Ok((rest, Term::Iri(log::impliedBy.to_string())));
    }
    if let Some(rest) = i.strip_prefix('a') {
        if rest.starts_with(|c: char| c.is_whitespace() || c == '#') {
            return Ok((rest, Term::Iri(rdf::TYPE.to_string())));
        }
    }
    expression(i, ctx)
}

/// Parses the production
/// expression ::= iri | formula | variable | literal | blankNode | blankNodePropertyList | collection
pub(crate) fn expression<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    for rule in &[
        iri,
        formula,
        variable,
        literal,
        blank_node,
        blank_node_property_list,
        collection,
    ] {
        match rule(i, ctx) {
            Err(nom::Err::Error(_)) => {}
            other => return other,
        }
    }
    Err(PosError::err(i, Error::NoMatch))
}

/// Parses the production
/// iri ::= IRIREF | prefixedName
fn iri<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    if let Ok((rest, iriref)) = parse_regex(&IRIREF)(i) {
        let raw = resolve_escapes(unwrap_str(iriref, 1));
        let resolved = ctx.borrow().prolog.resolve(&raw);
        return Ok((rest, Term::Iri(resolved)));
    }
    // prefixedName ::= PNAME_LN | PNAME_NS
    let (mut rest, mut matched) = match pname_ln(i) {
        Ok(hit) => hit,
        Err(_) => parse_regex(&PNAME_NS)(i).map_pr()?,
    };
    // pn_local is greedy; give trailing statement dots back.
    while matched.ends_with('.') {
        matched = &matched[..matched.len() - 1];
        rest = &i[matched.len()..];
    }
    let colon = matched
        .find(':')
        .ok_or_else(|| PosError::err(matched, Error::NoMatch))?;
    let (prefix, local) = (&matched[..colon], &matched[colon + 1..]);
    let local = resolve_escapes(local);
    let expanded = ctx.borrow().prolog.expand(prefix, &local);
    expanded
        .map(Term::Iri)
        .or_into_pr(i, Error::UnknownPrefix(prefix.to_string()), rest)
}

/// Parses the production
/// variable ::= '?' VARNAME
fn variable<'a>(i: &'a str, _ctx: &RefContext) -> PResult<'a, Term> {
    let (rest, _) = sym(i, "?").map_pr()?;
    let (rest, name) = parse_regex(&VARNAME)(rest).map_pr()?;
    Ok((rest, Term::Var(name.to_string())))
}

/// Parses the production
/// blankNode ::= BLANK_NODE_LABEL | ANON
fn blank_node<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    if let Ok((rest, label)) = blank_node_label(i) {
        // The label parser is greedy; give trailing statement dots back.
        let (mut rest, mut label) = (rest, label);
        while label.ends_with('.') {
            label = &label[..label.len() - 1];
            rest = &i[label.len()..];
        }
        return Ok((rest, Term::Blank(label[2..].to_string())));
    }
    let (rest, _) = parse_regex(&ANON)(i).map_pr()?;
    Ok((rest, ctx.borrow_mut().new_anon_bnode()))
}

/// Parses the production
/// literal ::= RDFLiteral | NumericLiteral | BooleanLiteral
fn literal<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    for rule in &[rdf_literal, numeric_literal, boolean_literal] {
        match rule(i, ctx) {
            Err(nom::Err::Error(_)) => {}
            other => return other,
        }
    }
    Err(PosError::err(i, Error::NoMatch))
}

/// Parses the production
/// RDFLiteral ::= String (LANGTAG | '^^' iri)?
fn rdf_literal<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    let (rest, lex) = string(i)?;
    if let Ok((rest, langtag)) = parse_regex(&LANGTAG)(rest) {
        return Ok((rest, Term::lang_tagged(&lex, &langtag[1..])));
    }
    if let Ok((rest, _)) = sym(rest, "^^") {
        let (rest, dt) = iri(rest, ctx)?;
        let dt = dt
            .as_iri()
            .map(str::to_string)
            .or_into_pr(i, Error::NoMatch, rest)?
            .1;
        return Ok((rest, Term::typed(&lex, &dt)));
    }
    Ok((rest, Term::plain(&lex)))
}

/// Parses the production
/// String ::= STRING_LITERAL_QUOTE | STRING_LITERAL_SINGLE_QUOTE
///          | STRING_LITERAL_LONG_QUOTE | STRING_LITERAL_LONG_SINGLE_QUOTE
///
/// The returned lexical value has its escapes resolved.
fn string(i: &str) -> PResult<String> {
    if let Ok((rest, lex)) = parse_regex(&STRING_LITERAL_LONG_QUOTE)(i) {
        return Ok((rest, resolve_escapes(unwrap_str(lex, 3))));
    }
    if let Ok((rest, lex)) = parse_regex(&STRING_LITERAL_LONG_SINGLE_QUOTE)(i) {
        return Ok((rest, resolve_escapes(unwrap_str(lex, 3))));
    }
    if let Ok((rest, lex)) = parse_regex(&STRING_LITERAL_QUOTE)(i) {
        return Ok((rest, resolve_escapes(unwrap_str(lex, 1))));
    }
    let (rest, lex) = parse_regex(&STRING_LITERAL_SINGLE_QUOTE)(i).map_pr()?;
    Ok((rest, resolve_escapes(unwrap_str(lex, 1))))
}

/// Parses the production
/// NumericLiteral ::= INTEGER | DECIMAL | DOUBLE
fn numeric_literal<'a>(i: &'a str, _ctx: &RefContext) -> PResult<'a, Term> {
    if let Ok((rest, lex)) = parse_regex(&DOUBLE)(i) {
        return Ok((rest, Term::typed(lex, xsd::double)));
    }
    if let Ok((rest, lex)) = parse_regex(&DECIMAL)(i) {
        return Ok((rest, Term::typed(lex, xsd::decimal)));
    }
    let (rest, lex) = parse_regex(&INTEGER)(i).map_pr()?;
    Ok((rest, Term::typed(lex, xsd::integer)))
}

/// Parses the production
/// BooleanLiteral ::= 'true' | 'false'
fn boolean_literal<'a>(i: &'a str, _ctx: &RefContext) -> PResult<'a, Term> {
    for word in &["true", "false"] {
        if let Some(rest) = i.strip_prefix(word) {
            let delimited = rest
                .chars()
                .next()
                .map(|c| !c.is_alphanumeric() && c != '_' && c != ':')
                .unwrap_or(true);
            if delimited {
                return Ok((rest, Term::typed(*word, xsd::boolean)));
            }
        }
    }
    Err(PosError::err(i, Error::NoMatch))
}

/// Parses the production
/// blankNodePropertyList ::= '[' predicateObjectList ']'
///
/// The contained triples are pushed onto the context's triple stack; the
/// fresh blank node is returned.
fn blank_node_property_list<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    let (rest, _) = sym(i, "[").map_pr()?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (rest, contents) = predicate_object_list(rest, ctx)?;
    let (rest, _) = ws0(rest).map_pr()?;
    let (rest, _) = sym(rest, "]").map_pr()?;

    let bn = ctx.borrow_mut().new_anon_bnode();
    let spos = SpoList::new(bn.clone(), contents);
    let mut ctx = ctx.borrow_mut();
    for triple in spos.into_triples() {
        ctx.push_triple(triple);
    }
    Ok((rest, bn))
}

/// Parses the production
/// collection ::= '(' expression* ')'
///
/// # Result
///
/// Builds a native list term; the elements are not expanded to an
/// `rdf:first`/`rdf:rest` chain.
fn collection<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    let (rest, _) = sym(i, "(").map_pr()?;
    let (mut rest, _) = ws0(rest).map_pr()?;
    let mut items = Vec::new();
    loop {
        if let Ok((r, _)) = sym(rest, ")") {
            return Ok((r, Term::List(items)));
        }
        let (r, item) = expression(rest, ctx)?;
        items.push(item);
        let (r, _) = ws0(r).map_pr()?;
        rest = r;
    }
}

/// Parses the production
/// formula ::= '{' (triples ('.' triples)* '.'?)? '}'
///
/// # Result
///
/// Builds a quoted graph term. Triples from blank node property lists
/// inside the formula stay inside the formula.
fn formula<'a>(i: &'a str, ctx: &RefContext) -> PResult<'a, Term> {
    let (rest, _) = sym(i, "{").map_pr()?;
    let (mut rest, _) = ws0(rest).map_pr()?;
    let mut triples_acc: Vec<Triple> = Vec::new();
    loop {
        if let Ok((r, _)) = sym(rest, "}") {
            return Ok((r, Term::Graph(triples_acc)));
        }
        let mark = ctx.borrow().stack_mark();
        let (r, spo) = triples(rest, ctx)?;
        triples_acc.extend(spo.into_triples());
        triples_acc.extend(ctx.borrow_mut().drain_triples_from(mark));
        let (r, _) = ws0(r).map_pr()?;
        rest = match sym(r, ".") {
            Ok((r2, _)) => ws0(r2).map_pr()?.0,
            Err(_) => r,
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    fn ctx() -> RefContext {
        let mut ctx = Context::default();
        ctx.prolog
            .add_prefix("", "http://example.org/ns#")
            .unwrap();
        ctx.prolog
            .add_prefix("math", crate::ns::math::PREFIX)
            .unwrap();
        RefCell::new(ctx)
    }

    #[test_case(r#""abc""# => Term::plain("abc") ; "plain string")]
    #[test_case(r#""a\nb""# => Term::plain("a\nb") ; "escaped newline")]
    #[test_case(r#""hi"@en"# => Term::lang_tagged("hi", "en") ; "lang tag")]
    #[test_case("42" => Term::integer(42) ; "integer")]
    #[test_case("-3.5" => Term::typed("-3.5", xsd::decimal) ; "decimal")]
    #[test_case("1.0e3" => Term::typed("1.0e3", xsd::double) ; "double")]
    #[test_case("true" => Term::typed("true", xsd::boolean) ; "boolean")]
    fn check_literal(i: &str) -> Term {
        let ctx = ctx();
        literal(i, &ctx).unwrap().1
    }

    #[test]
    fn typed_literal_expands_datatype() {
        let ctx = ctx();
        let input = r#""5"^^<http://www.w3.org/2001/XMLSchema#integer>"#;
        assert_eq!(rdf_literal(input, &ctx).unwrap().1, Term::integer(5));
    }

    #[test]
    fn pname_keeps_statement_dot() {
        let ctx = ctx();
        let (rest, term) = iri(":b.", &ctx).unwrap();
        assert_eq!(term, Term::Iri("http://example.org/ns#b".into()));
        assert_eq!(rest, ".");
    }

    #[test]
    fn unknown_prefix_fails_hard() {
        let ctx = ctx();
        assert!(matches!(
            iri("nope:x", &ctx),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn collection_nests() {
        let ctx = ctx();
        let (_, term) = collection("(1 (2 3) \"x\")", &ctx).unwrap();
        match term {
            Term::List(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[1], Term::List(vec![Term::integer(2), Term::integer(3)]));
            }
            other => panic!("not a list: {:?}", other),
        }
    }

    #[test]
    fn formula_keeps_property_list_triples_inside() {
        let ctx = ctx();
        let input = "{ ?id :iteration [ :result ?y ; :number 1 ] . }";
        let (_, term) = formula(input, &ctx).unwrap();
        match term {
            Term::Graph(triples) => {
                // 1 outer + 2 from the property list.
                assert_eq!(triples.len(), 3);
                assert!(ctx.borrow_mut().drain_triples().is_empty());
            }
            other => panic!("not a graph: {:?}", other),
        }
    }

    #[test]
    fn rule_statement_shape() {
        let ctx = ctx();
        let input = "{ ?x a :Man } => { ?x a :Mortal } .";
        let (_, parsed) = statement(input, &ctx).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].p, Term::Iri(log::implies.into()));
    }
}
