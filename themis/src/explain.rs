//! Explanation of derived facts.
//!
//! Every derived fact carries the rule that fired, the instantiated
//! premise and the proof substitution; printing projects the
//! substitution onto the rule's free variables and formats quoted
//! formulas over indented lines.

use crate::common::Prolog;
use crate::serialize::{Config, Serializer};
use crate::term::{DerivedFact, Term};

/// Renders one derivation record as an N3 comment block.
pub fn explain(derived: &DerivedFact, prolog: &Prolog) -> String {
    let config = Config::with_prolog(prolog.clone());
    let writer = Serializer::new(&config);

    let mut out = String::new();
    out.push_str(&format!("# derived: {}\n", writer.triple(&derived.fact)));

    out.push_str("# by rule:\n");
    let premise = Term::Graph(derived.rule.premise.clone());
    let conclusion = Term::Graph(derived.rule.conclusion.clone());
    out.push_str(&format!(
        "#   {} => {} .\n",
        indent_hash(&writer.term_at(&premise, 0)),
        indent_hash(&writer.term_at(&conclusion, 0))
    ));

    out.push_str("# with premise:\n");
    for t in &derived.premises {
        out.push_str(&format!("#   {}\n", writer.triple(t)));
    }

    let projected = derived.binding.project(&derived.rule.free_vars());
    if !projected.is_empty() {
        let mut bindings: Vec<(String, String)> = projected
            .iter()
            .map(|(var, term)| (var.clone(), writer.term(term)))
            .collect();
        bindings.sort();
        out.push_str("# where:\n");
        for (var, term) in bindings {
            out.push_str(&format!("#   ?{} = {}\n", var, term));
        }
    }
    out
}

/// Keeps multi-line formula renditions inside the comment block.
fn indent_hash(rendered: &str) -> String {
    rendered.replace('\n', "\n#   ")
}
