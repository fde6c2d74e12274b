//! Pattern matching against the CST
//!
//! Sequence matching works over the significant (non-trivia) children of a
//! node. Optional and repeated parts backtrack; alternation commits to the
//! first alternative that matches. Matches are found in preorder and never
//! nest: once an element matches, its subtree is not scanned again.

use pysweep_core::cst::{
    PySyntaxElement, PySyntaxNode, element_range, significant_children,
};

use super::{Captured, Captures, Pattern};

/// A successful pattern match
#[derive(Debug, Clone)]
pub struct Match {
    /// The element the top-level pattern matched
    pub element: PySyntaxElement,
    /// Named bindings recorded during the match
    pub captures: Captures,
}

impl Match {
    /// Byte range of the matched element in the source
    pub fn range(&self) -> std::ops::Range<usize> {
        element_range(&self.element)
    }
}

/// Find all non-nested matches of `pattern` in `root`, in source order
pub fn find_matches(pattern: &Pattern, root: &PySyntaxNode) -> Vec<Match> {
    let mut out = Vec::new();
    for child in root.children_with_tokens() {
        scan(pattern, &child, &mut out);
    }
    out
}

/// Try `pattern` against a single element, returning its captures
pub fn match_element(pattern: &Pattern, element: &PySyntaxElement) -> Option<Captures> {
    match_seq(
        std::slice::from_ref(pattern),
        std::slice::from_ref(element),
        Captures::default(),
    )
}

fn scan(pattern: &Pattern, element: &PySyntaxElement, out: &mut Vec<Match>) {
    if element.kind().is_trivia() {
        return;
    }
    if let Some(captures) = match_element(pattern, element) {
        out.push(Match {
            element: element.clone(),
            captures,
        });
        return; // non-nesting: skip the matched subtree
    }
    if let PySyntaxElement::Node(node) = element {
        for child in node.children_with_tokens() {
            scan(pattern, &child, out);
        }
    }
}

/// Match a pattern sequence against an element sequence exactly
///
/// Returns the accumulated captures on success. Backtracking is expressed
/// by threading ownership of the capture set and cloning at choice points.
fn match_seq(
    patterns: &[Pattern],
    elements: &[PySyntaxElement],
    captures: Captures,
) -> Option<Captures> {
    let Some((first, rest)) = patterns.split_first() else {
        return elements.is_empty().then_some(captures);
    };

    match first {
        Pattern::Any => {
            let (_, tail) = elements.split_first()?;
            match_seq(rest, tail, captures)
        }

        Pattern::Leaf(_)
        | Pattern::TokenClass(_)
        | Pattern::Kind(_)
        | Pattern::Node { .. }
        | Pattern::AnyNode { .. } => {
            let (head, tail) = elements.split_first()?;
            let captures = match_single(first, head, captures)?;
            match_seq(rest, tail, captures)
        }

        Pattern::Optional(inner) => {
            // present, longest first
            for taken in (1..=elements.len()).rev() {
                if let Some(caps) = match_seq(inner, &elements[..taken], captures.clone())
                    && let Some(caps) = match_seq(rest, &elements[taken..], caps)
                {
                    return Some(caps);
                }
            }
            // absent
            match_seq(rest, elements, captures)
        }

        Pattern::Repeat(inner) => {
            // greedy: longest run of single-element matches of the unit
            let mut prefix_captures = vec![captures.clone()];
            for element in elements {
                let last = prefix_captures
                    .last()
                    .cloned()
                    .unwrap_or_default();
                match match_single(inner, element, last) {
                    Some(caps) => prefix_captures.push(caps),
                    None => break,
                }
            }
            for taken in (0..prefix_captures.len()).rev() {
                if let Some(caps) = match_seq(rest, &elements[taken..], prefix_captures[taken].clone())
                {
                    return Some(caps);
                }
            }
            None
        }

        Pattern::Alt(alternatives) => {
            for alternative in alternatives {
                for taken in (0..=elements.len()).rev() {
                    if let Some(caps) =
                        match_seq(alternative, &elements[..taken], captures.clone())
                    {
                        // committed: the remainder must work with this
                        // alternative or the whole match fails
                        return match_seq(rest, &elements[taken..], caps);
                    }
                }
            }
            None
        }

        Pattern::Capture { name, inner } => {
            for taken in (0..=elements.len()).rev() {
                if let Some(mut caps) =
                    match_seq(std::slice::from_ref(inner.as_ref()), &elements[..taken], captures.clone())
                {
                    let value = if taken == 1 {
                        Captured::Element(elements[0].clone())
                    } else {
                        Captured::Seq(elements[..taken].to_vec())
                    };
                    if !caps.bind(name, value) {
                        continue;
                    }
                    if let Some(caps) = match_seq(rest, &elements[taken..], caps) {
                        return Some(caps);
                    }
                }
            }
            None
        }
    }
}

/// Match one pattern unit against exactly one element
fn match_single(
    pattern: &Pattern,
    element: &PySyntaxElement,
    captures: Captures,
) -> Option<Captures> {
    match pattern {
        Pattern::Any => Some(captures),
        Pattern::Leaf(text) => match element {
            PySyntaxElement::Token(tok) if tok.text() == text => Some(captures),
            _ => None,
        },
        Pattern::TokenClass(class) => match element {
            PySyntaxElement::Token(tok) if class.matches(tok.kind()) => Some(captures),
            _ => None,
        },
        Pattern::Kind(kind) => (element.kind() == *kind).then_some(captures),
        Pattern::Node { kind, children } => match element {
            PySyntaxElement::Node(node) if node.kind() == *kind => {
                match_seq(children, &significant_children(node), captures)
            }
            _ => None,
        },
        Pattern::AnyNode { children } => match element {
            PySyntaxElement::Node(node) => {
                match_seq(children, &significant_children(node), captures)
            }
            _ => None,
        },
        // variable-width units reached through a capture or alternation
        _ => match_seq(
            std::slice::from_ref(pattern),
            std::slice::from_ref(element),
            captures,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile_pattern;
    use pysweep_core::cst::parse_module;

    fn matches_of(pattern: &str, source: &str) -> Vec<Match> {
        let pat = compile_pattern(pattern).unwrap();
        let tree = parse_module(source).unwrap();
        find_matches(&pat, &tree)
    }

    #[test]
    fn test_negated_comparison_pattern() {
        let found = matches_of(
            r#"not_test< "not" comparison=comparison< any* > >"#,
            "if not a == b:\n    pass\n",
        );
        assert_eq!(found.len(), 1);
        let cap = found[0].captures.get("comparison").unwrap();
        assert_eq!(cap.text(), "a == b");
    }

    #[test]
    fn test_not_without_comparison_does_not_match() {
        let found = matches_of(
            r#"not_test< "not" comparison=comparison< any* > >"#,
            "if not flag:\n    pass\n",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_leaf_literal_matches_token_text() {
        let found = matches_of(
            r#"comparison< any "==" "None" >"#,
            "x == None\nx == y\n",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].element.to_string(), "x == None");
    }

    #[test]
    fn test_alternation_in_sequence() {
        let pattern = r#"comparison< any ("==" | "!=") "None" >"#;
        assert_eq!(matches_of(pattern, "a == None\n").len(), 1);
        assert_eq!(matches_of(pattern, "a != None\n").len(), 1);
        assert_eq!(matches_of(pattern, "a < None\n").len(), 0);
    }

    #[test]
    fn test_matches_are_in_source_order_and_disjoint() {
        let found = matches_of(
            r#"comparison< any "==" "None" >"#,
            "a == None\nb = 1\nc == None\n",
        );
        assert_eq!(found.len(), 2);
        assert!(found[0].range().end <= found[1].range().start);
    }

    #[test]
    fn test_non_nesting_outer_wins() {
        // both the outer and inner parens are atoms matching the pattern;
        // only the outer one may be reported
        let found = matches_of(r#"atom< "(" any ")" >"#, "x = ((y))\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].element.to_string(), "((y))");
    }

    #[test]
    fn test_optional_part() {
        let pattern = r#"comp_for< any* "in" any [ifpart=comp_if< any* >] >"#;
        let with_if = matches_of(pattern, "[x for x in xs if x]\n");
        assert_eq!(with_if.len(), 1);
        assert!(with_if[0].captures.contains("ifpart"));

        let without_if = matches_of(pattern, "[x for x in xs]\n");
        assert_eq!(without_if.len(), 1);
        assert!(!without_if[0].captures.contains("ifpart"));
    }

    #[test]
    fn test_duplicate_capture_requires_equal_text() {
        let pattern = r#"comparison< x=NAME "==" x=NAME >"#;
        assert_eq!(matches_of(pattern, "a == a\n").len(), 1);
        assert_eq!(matches_of(pattern, "a == b\n").len(), 0);
    }

    #[test]
    fn test_trivia_is_ignored_in_child_sequences() {
        let found = matches_of(
            r#"comparison< any "==" "None" >"#,
            "a  ==   None  # compare\n",
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_any_star_spans_chained_comparison() {
        let found = matches_of(
            r#"not_test< "not" comparison=comparison< any* > >"#,
            "not a == b == c\n",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].captures.get("comparison").unwrap().text(),
            "a == b == c"
        );
    }

    #[test]
    fn test_capture_of_whole_match() {
        let found = matches_of(
            r#"power< "dict" trailer< "(" any ")" > >"#,
            "d = dict(pairs)\n",
        );
        assert_eq!(found.len(), 1);
    }
}
