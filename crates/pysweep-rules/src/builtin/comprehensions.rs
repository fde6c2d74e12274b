//! Comprehension construction: `dict(...)` and `set(...)` over a
//! comprehension argument become comprehension displays

use pysweep_core::cst::{
    PySyntaxElement, element_text, prefix_text, suffix_text,
};
use pysweep_core::edit::Rewrite;
use pysweep_core::error::SweepError;
use pysweep_core::result::Result;

use super::capture_element;
use crate::rule::Rule;

/// The comprehension clause shared by both rules: `for ... in ...` with an
/// optional trailing `if`
const FORLOOP: &str = r#"forloop=( comp_for< any* "in" any [ ifpart=comp_if< any* > ] > )"#;

/// A parenthesized key/value pair: `(k, v)`
const KV: &str = r#"kv=atom< "(" testlist_gexp< k=any "," v=any > ")" >"#;

/// `dict([(k, v) for ...])`, `dict((k, v) for ...)`, and
/// `dict(((k, v) for ...))` -> `{k: v for ...}`
///
/// The list-comprehension form changes scoping on Python 2, where list
/// comprehensions leak their loop variable and dict comprehensions do
/// not; sites where that matters need the interactive review.
pub fn dict_comprehension() -> Result<Rule> {
    let pattern = format!(
        r#"power< "dict" trailer< '(' (
            atom< "[" listmaker< {KV} {FORLOOP} > "]" >
            | argument< {KV} {FORLOOP} >
            | atom< "(" testlist_gexp< {KV} {FORLOOP} > ")" >
        ) ')' > >"#
    );
    Rule::new(
        "dict-comprehension",
        "build dicts with a comprehension display instead of dict()",
        &pattern,
        |matched, _source| {
            const RULE: &str = "dict-comprehension";
            let kv = capture_element(matched, RULE, "kv")?;
            let key = capture_element(matched, RULE, "k")?;
            let value = capture_element(matched, RULE, "v")?;
            let forloop = capture_element(matched, RULE, "forloop")?;
            let container = container_of(kv, RULE)?;

            // the container's surrounding trivia moves inside the braces
            let replacement = format!(
                "{{{}{}:{}{}{}{}{}}}",
                prefix_text(&container),
                element_text(key),
                prefix_text(value),
                element_text(value),
                prefix_text(forloop),
                element_text(forloop),
                suffix_text(&container),
            );
            Ok(Some(Rewrite::new(
                matched.range(),
                replacement,
                "replace dict() call with a dict comprehension",
            )))
        },
    )
}

/// `set([a for ...])`, `set(a for ...)`, and `set((a for ...))`
/// -> `{a for ...}`
pub fn set_comprehension() -> Result<Rule> {
    let pattern = format!(
        r#"power< "set" trailer< '(' (
            atom< "[" listmaker< arg=any {FORLOOP} > "]" >
            | argument< arg=any {FORLOOP} >
            | atom< "(" testlist_gexp< arg=any {FORLOOP} > ")" >
        ) ')' > >"#
    );
    Rule::new(
        "set-comprehension",
        "build sets with a comprehension display instead of set()",
        &pattern,
        |matched, _source| {
            const RULE: &str = "set-comprehension";
            let arg = capture_element(matched, RULE, "arg")?;
            let forloop = capture_element(matched, RULE, "forloop")?;
            let container = container_of(arg, RULE)?;

            let replacement = format!(
                "{{{}{}{}{}{}}}",
                prefix_text(&container),
                element_text(arg),
                prefix_text(forloop),
                element_text(forloop),
                suffix_text(&container),
            );
            Ok(Some(Rewrite::new(
                matched.range(),
                replacement,
                "replace set() call with a set comprehension",
            )))
        },
    )
}

/// The node holding the comprehension: the listmaker, argument, or
/// testlist_gexp the matched element sits in
fn container_of(element: &PySyntaxElement, rule: &str) -> Result<PySyntaxElement> {
    let parent = match element {
        PySyntaxElement::Node(node) => node.parent(),
        PySyntaxElement::Token(tok) => tok.parent(),
    };
    parent
        .map(PySyntaxElement::Node)
        .ok_or_else(|| SweepError::internal(rule, "matched element has no parent"))
}
