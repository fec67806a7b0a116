//! Serialization of terms, triples and closures back to N3 text.

use crate::common::Prolog;
use crate::ns::{rdf, xsd};
use crate::parse::terminals::{DECIMAL, DOUBLE, INTEGER};
use crate::term::{literal, Term, Triple};
use regex::Regex;

/// Options for serialization.
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) prolog: Prolog,
    indent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prolog: Prolog::default(),
            indent: 4,
        }
    }
}

impl Config {
    /// A config writing against the given prefix environment.
    pub fn with_prolog(prolog: Prolog) -> Self {
        Self {
            prolog,
            indent: 4,
        }
    }

    /// Set the indentation for nested formulas.
    ///
    /// Is applied once for each level of indentation.
    pub fn set_indentation(&mut self, spaces: usize) -> &mut Self {
        self.indent = spaces;
        self
    }
}

/// Writes terms and triples as N3 text.
#[derive(Debug)]
pub struct Serializer<'a> {
    config: &'a Config,
}

impl<'a> Serializer<'a> {
    /// A serializer over the given config.
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// A term on a single line.
    pub fn term(&self, t: &Term) -> String {
        self.term_at(t, usize::MAX)
    }

    /// A term with quoted formulas broken over indented lines.
    ///
    /// `level` is the current indentation depth; pass `usize::MAX` to
    /// force single-line output.
    pub fn term_at(&self, t: &Term, level: usize) -> String {
        match t {
            Term::Iri(iri) => self.iri(iri),
            Term::Literal(lit) => self.literal(lit),
            Term::Blank(label) => format!("_:{}", label),
            Term::Var(name) => format!("?{}", name),
            Term::List(items) => {
                let inner: Vec<String> =
                    items.iter().map(|i| self.term_at(i, level)).collect();
                format!("({})", inner.join(" "))
            }
            Term::OpenList(items, tail) => {
                let inner: Vec<String> =
                    items.iter().map(|i| self.term_at(i, level)).collect();
                format!("({} | ?{})", inner.join(" "), tail)
            }
            Term::Graph(triples) => {
                if triples.is_empty() {
                    return "{}".to_string();
                }
                if level == usize::MAX {
                    let inner: Vec<String> =
                        triples.iter().map(|t| self.triple_at(t, level)).collect();
                    format!("{{ {} }}", inner.join(" "))
                } else {
                    let pad = " ".repeat(self.config.indent * (level + 1));
                    let close = " ".repeat(self.config.indent * level);
                    let inner: Vec<String> = triples
                        .iter()
                        .map(|t| format!("{}{}", pad, self.triple_at(t, level + 1)))
                        .collect();
                    format!("{{\n{}\n{}}}", inner.join("\n"), close)
                }
            }
        }
    }

    /// A triple terminated with ` .`.
    pub fn triple(&self, t: &Triple) -> String {
        self.triple_at(t, usize::MAX)
    }

    fn triple_at(&self, t: &Triple, level: usize) -> String {
        let p = match t.p.as_iri() {
            Some(iri) if iri == rdf::TYPE => "a".to_string(),
            Some(iri) if iri == crate::ns::log::implies => "=>".to_string(),
            Some(iri) if iri == crate::ns::log::impliedBy => "<=".to_string(),
            _ => self.term_at(&t.p, level),
        };
        format!(
            "{} {} {} .",
            self.term_at(&t.s, level),
            p,
            self.term_at(&t.o, level)
        )
    }

    /// A whole document: prefix directives and all triples.
    pub fn document(&self, triples: &[Triple]) -> String {
        let mut out = String::new();
        let mut prefixes: Vec<_> = self.config.prolog.iter().collect();
        prefixes.sort();
        for (p, ns) in prefixes {
            out.push_str(&format!("@prefix {}: <{}> .\n", p, ns));
        }
        if !out.is_empty() {
            out.push('\n');
        }
        for t in triples {
            out.push_str(&self.triple_at(t, 0));
            out.push('\n');
        }
        out
    }

    fn iri(&self, iri: &str) -> String {
        match self.config.prolog.shrink(iri) {
            Some((prefix, local)) if local_is_safe(local) => format!("{}:{}", prefix, local),
            _ => format!("<{}>", iri),
        }
    }

    fn literal(&self, lit: &str) -> String {
        let (lex, suffix) = literal::parts(lit);
        match suffix {
            literal::Suffix::Plain => format!("\"{}\"", escape(lex)),
            literal::Suffix::Lang(tag) => format!("\"{}\"@{}", escape(lex), tag),
            literal::Suffix::Datatype(dt) => {
                if dt == xsd::string {
                    format!("\"{}\"", escape(lex))
                } else if dt == xsd::boolean && (lex == "true" || lex == "false") {
                    lex.to_string()
                } else if dt == xsd::integer && full_match(&INTEGER, lex) {
                    lex.to_string()
                } else if dt == xsd::decimal && full_match(&DECIMAL, lex) {
                    lex.to_string()
                } else if dt == xsd::double && full_match(&DOUBLE, lex) {
                    lex.to_string()
                } else {
                    format!("\"{}\"^^{}", escape(lex), self.iri(dt))
                }
            }
        }
    }
}

fn full_match(re: &Regex, lex: &str) -> bool {
    re.find(lex).map(|m| m.end() == lex.len()).unwrap_or(false)
}

/// Local names with dots or empty ones round-trip badly; fall back to the
/// full IRI form for them.
fn local_is_safe(local: &str) -> bool {
    !local.is_empty()
        && !local.contains(|c: char| {
            c.is_whitespace() || "\"'<>(){}[],;\\".contains(c)
        })
        && !local.ends_with('.')
}

fn escape(lex: &str) -> String {
    let mut out = String::with_capacity(lex.len());
    for c in lex.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
