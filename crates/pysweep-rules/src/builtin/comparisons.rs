//! Comparison cleanups: negation inversion and None identity

use pysweep_core::cst::{PySyntaxKind, element_range, element_text, significant_children};
use pysweep_core::edit::Rewrite;
use pysweep_core::error::SweepError;
use pysweep_core::result::Result;

use super::capture_element;
use crate::rule::Rule;

/// `not a == b` -> `a != b`
///
/// Only fires when the operand of `not` is a comparison; `not flag` is
/// untouched. Chained comparisons have more than one operator and keeping
/// the inversion correct would require De Morgan reasoning, so the first
/// operator is inverted and the chain case is excluded by the action.
pub fn invert_negated_comparison() -> Result<Rule> {
    Rule::new(
        "invert-negated-comparison",
        "replace a negated comparison with the inverse operator",
        r#"not_test< "not" comparison=comparison< any* > >"#,
        |matched, source| {
            const RULE: &str = "invert-negated-comparison";
            let comparison = capture_element(matched, RULE, "comparison")?;
            let children = match comparison {
                pysweep_core::cst::PySyntaxElement::Node(node) => significant_children(node),
                _ => {
                    return Err(SweepError::internal(RULE, "comparison bound to a token"));
                }
            };
            if children.len() != 3 {
                // chained comparison: inverting one operator would change
                // meaning
                return Ok(None);
            }
            let op = &children[1];
            let Some(inverted) = invert_operator(&element_text(op)) else {
                return Err(SweepError::internal(
                    RULE,
                    format!("no inversion for operator {:?}", element_text(op)),
                ));
            };

            let cmp_range = element_range(comparison);
            let op_range = element_range(op);
            let replacement = format!(
                "{}{}{}",
                &source[cmp_range.start..op_range.start],
                inverted,
                &source[op_range.end..cmp_range.end],
            );
            Ok(Some(Rewrite::new(
                matched.range(),
                replacement,
                "invert negated comparison",
            )))
        },
    )
}

/// `a == None` -> `a is None`, `a != None` -> `a is not None`
pub fn none_identity() -> Result<Rule> {
    Rule::new(
        "none-identity",
        "compare against None by identity",
        r#"comparison<
            ( any op=( "==" | "!=" ) "None" )
            | ( "None" op=( "==" | "!=" ) any )
        >"#,
        |matched, _source| {
            const RULE: &str = "none-identity";
            let op = capture_element(matched, RULE, "op")?;
            let replacement = match op.kind() {
                PySyntaxKind::EqEq => "is",
                PySyntaxKind::NotEq => "is not",
                other => {
                    return Err(SweepError::internal(
                        RULE,
                        format!("unexpected operator kind {other}"),
                    ));
                }
            };
            Ok(Some(Rewrite::new(
                element_range(op),
                replacement,
                "use identity comparison with None",
            )))
        },
    )
}

/// Inverse of a single comparison operator, normalized for spelling
fn invert_operator(op: &str) -> Option<&'static str> {
    let normalized = op.split_whitespace().collect::<Vec<_>>().join(" ");
    let inverted = match normalized.as_str() {
        "==" => "!=",
        "!=" => "==",
        "<" => ">=",
        ">" => "<=",
        "<=" => ">",
        ">=" => "<",
        "in" => "not in",
        "not in" => "in",
        "is" => "is not",
        "is not" => "is",
        _ => return None,
    };
    Some(inverted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pysweep_core::cst::parse_module;
    use pysweep_core::edit::apply_rewrites;

    fn run_rule(rule: &Rule, source: &str) -> String {
        let tree = parse_module(source).unwrap();
        let mut rewrites = Vec::new();
        for matched in rule.find(&tree) {
            if let Some(rw) = rule.apply(&matched, source).unwrap() {
                rewrites.push(rw);
            }
        }
        apply_rewrites(source, &rewrites).unwrap()
    }

    #[test]
    fn test_inversion_table() {
        assert_eq!(invert_operator("=="), Some("!="));
        assert_eq!(invert_operator("is  not"), Some("is"));
        assert_eq!(invert_operator("not in"), Some("in"));
        assert_eq!(invert_operator("and"), None);
    }

    #[test]
    fn test_invert_negated_comparison() {
        let rule = invert_negated_comparison().unwrap();
        assert_eq!(run_rule(&rule, "if not a == b:\n    pass\n"), "if a != b:\n    pass\n");
        assert_eq!(run_rule(&rule, "x = not a < b\n"), "x = a >= b\n");
        assert_eq!(run_rule(&rule, "x = not a in b\n"), "x = a not in b\n");
        assert_eq!(run_rule(&rule, "x = not a is not b\n"), "x = a is b\n");
    }

    #[test]
    fn test_plain_not_is_untouched() {
        let rule = invert_negated_comparison().unwrap();
        let source = "if not flag:\n    pass\n";
        assert_eq!(run_rule(&rule, source), source);
    }

    #[test]
    fn test_chained_comparison_is_untouched() {
        let rule = invert_negated_comparison().unwrap();
        let source = "x = not a == b == c\n";
        assert_eq!(run_rule(&rule, source), source);
    }

    #[test]
    fn test_inner_spacing_is_preserved() {
        let rule = invert_negated_comparison().unwrap();
        assert_eq!(run_rule(&rule, "y = not a  ==  b\n"), "y = a  !=  b\n");
    }

    #[test]
    fn test_none_identity() {
        let rule = none_identity().unwrap();
        assert_eq!(run_rule(&rule, "if x == None:\n    pass\n"), "if x is None:\n    pass\n");
        assert_eq!(run_rule(&rule, "if x != None:\n    pass\n"), "if x is not None:\n    pass\n");
        assert_eq!(run_rule(&rule, "if None == x:\n    pass\n"), "if None is x:\n    pass\n");
    }

    #[test]
    fn test_none_identity_negatives() {
        let rule = none_identity().unwrap();
        for source in ["x < None\n", "x is None\n", "a == b == None\n", "x == y\n"] {
            assert_eq!(run_rule(&rule, source), source, "source {source:?}");
        }
    }
}
