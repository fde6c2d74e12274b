//! Removal of redundant parentheses

use pysweep_core::cst::{
    PySyntaxElement, PySyntaxKind, element_range, element_text, significant_children, token_line,
};
use pysweep_core::edit::Rewrite;
use pysweep_core::error::SweepError;
use pysweep_core::result::Result;

use super::capture_element;
use crate::rule::Rule;

/// `(a)` -> `a`, `f((x for x in y))` -> `f(x for x in y)`
///
/// Three forms are handled: the sole right-hand side of an assignment, a
/// parenthesized simple atom anywhere, and a doubly parenthesized
/// generator argument. Two exclusions are checked after matching:
/// parentheses whose open and close sit on different lines are load
/// bearing for statement continuation, and tuple or generator displays on
/// the right of an assignment keep their parentheses by convention.
pub fn remove_redundant_parens() -> Result<Rule> {
    Rule::new(
        "remove-redundant-parens",
        "drop parentheses that change nothing",
        r#"(
            assignment_form=expr_stmt<
                any
                "="
                outer=atom< "(" inner=any ")" >
            >
            |
            outer=atom<
                "("
                inner=(NAME | NUMBER | STRING | factor | atom< "(" any ")" >)
                ")"
            >
            |
            any<
                "("
                outer=atom<
                    "("
                    inner=testlist_gexp< any comp_for >
                    ")"
                >
                ")"
            >
        )"#,
        |matched, source| {
            const RULE: &str = "remove-redundant-parens";
            let outer = capture_element(matched, RULE, "outer")?;
            let inner = capture_element(matched, RULE, "inner")?;

            let PySyntaxElement::Node(outer_node) = outer else {
                return Err(SweepError::internal(RULE, "outer bound to a token"));
            };
            let children = significant_children(outer_node);
            if children.len() != 3 {
                return Err(SweepError::internal(
                    RULE,
                    format!("atom with {} significant children", children.len()),
                ));
            }
            let (Some(open), Some(close)) = (as_token(&children[0]), as_token(&children[2]))
            else {
                return Err(SweepError::internal(RULE, "atom delimiters are not tokens"));
            };

            // parentheses spanning lines hold the statement together
            if token_line(source, open) != token_line(source, close) {
                return Ok(None);
            }

            // a = (b, c) and a = (b for c in d) keep their parentheses
            if matched.captures.contains("assignment_form")
                && inner.kind() == PySyntaxKind::TestlistGexp
            {
                return Ok(None);
            }

            Ok(Some(Rewrite::new(
                element_range(outer),
                element_text(inner),
                "remove redundant parentheses",
            )))
        },
    )
}

fn as_token(element: &PySyntaxElement) -> Option<&pysweep_core::cst::PySyntaxToken> {
    match element {
        PySyntaxElement::Token(tok) => Some(tok),
        PySyntaxElement::Node(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pysweep_core::cst::parse_module;
    use pysweep_core::edit::apply_rewrites;

    fn run_once(source: &str) -> String {
        let rule = remove_redundant_parens().unwrap();
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
    fn test_assignment_rhs() {
        assert_eq!(run_once("a = (b)\n"), "a = b\n");
        assert_eq!(run_once("a = (b == c)\n"), "a = b == c\n");
    }

    #[test]
    fn test_simple_atoms_anywhere() {
        assert_eq!(run_once("f((x))\n"), "f(x)\n");
        assert_eq!(run_once("return (x)\n"), "return x\n");
        assert_eq!(run_once("y = (1) + 2\n"), "y = 1 + 2\n");
        assert_eq!(run_once("s = ('text')\n"), "s = 'text'\n");
        assert_eq!(run_once("n = (-x)\n"), "n = -x\n");
    }

    #[test]
    fn test_doubly_parenthesized_generator_argument() {
        assert_eq!(
            run_once("f((x for x in y))\n"),
            "f(x for x in y)\n"
        );
    }

    #[test]
    fn test_tuple_assignment_is_untouched() {
        for source in [
            "a = (b, c)\n",
            "a = (b,)\n",
            "a = (b for c in d)\n",
        ] {
            assert_eq!(run_once(source), source, "source {source:?}");
        }
    }

    #[test]
    fn test_multiline_parens_are_untouched() {
        let source = "total = (1 +\n         2)\n";
        assert_eq!(run_once(source), source);

        let source = "a = (\n    b\n)\n";
        assert_eq!(run_once(source), source);
    }

    #[test]
    fn test_call_argument_tuple_is_untouched() {
        // f((a, b)) passes a tuple; the parens are the argument itself
        let source = "f((a, b))\n";
        assert_eq!(run_once(source), source);
    }

    #[test]
    fn test_nested_parens_peel_one_layer_per_pass() {
        let first = run_once("a = ((b))\n");
        assert_eq!(first, "a = (b)\n");
        assert_eq!(run_once(&first), "a = b\n");
    }

    #[test]
    fn test_result_reparses() {
        for source in ["a = (b)\n", "f((x))\n", "f((x for x in y))\n"] {
            parse_module(&run_once(source)).unwrap();
        }
    }
}
