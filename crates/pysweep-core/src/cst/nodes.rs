//! Type aliases and utilities for working with the Python-subset CST
//!
//! The tree types are Rowan's generic red-tree types parameterized with
//! [`PyLanguage`]. The helpers here recover the lib2to3-style notions the
//! rewrite rules need: a node's *prefix* (the contiguous trivia run
//! immediately preceding its first token, wherever it is attached) and
//! *suffix* (the trivia run following its last token).

use super::{PyLanguage, PySyntaxKind};

/// A node in the concrete syntax tree
pub type PySyntaxNode = rowan::SyntaxNode<PyLanguage>;
/// A token in the concrete syntax tree
pub type PySyntaxToken = rowan::SyntaxToken<PyLanguage>;
/// Either a node or a token
pub type PySyntaxElement = rowan::NodeOrToken<PySyntaxNode, PySyntaxToken>;

/// The first token of an element, in source order
pub fn first_token(elem: &PySyntaxElement) -> Option<PySyntaxToken> {
    match elem {
        rowan::NodeOrToken::Node(n) => n.first_token(),
        rowan::NodeOrToken::Token(t) => Some(t.clone()),
    }
}

/// The last token of an element, in source order
pub fn last_token(elem: &PySyntaxElement) -> Option<PySyntaxToken> {
    match elem {
        rowan::NodeOrToken::Node(n) => n.last_token(),
        rowan::NodeOrToken::Token(t) => Some(t.clone()),
    }
}

/// The contiguous trivia run immediately preceding an element
///
/// This is the element's "prefix" in the lib2to3 sense: the whitespace and
/// comments between the previous non-trivia token and the element itself,
/// regardless of which ancestor node the trivia tokens are attached to.
pub fn prefix_text(elem: &PySyntaxElement) -> String {
    let Some(first) = first_token(elem) else {
        return String::new();
    };
    let mut run = Vec::new();
    let mut cursor = first.prev_token();
    while let Some(tok) = cursor {
        if !tok.kind().is_trivia() {
            break;
        }
        run.push(tok.text().to_string());
        cursor = tok.prev_token();
    }
    run.reverse();
    run.concat()
}

/// The contiguous trivia run immediately following an element
pub fn suffix_text(elem: &PySyntaxElement) -> String {
    let Some(last) = last_token(elem) else {
        return String::new();
    };
    let mut out = String::new();
    let mut cursor = last.next_token();
    while let Some(tok) = cursor {
        if !tok.kind().is_trivia() {
            break;
        }
        out.push_str(tok.text());
        cursor = tok.next_token();
    }
    out
}

/// Exact source text of an element
pub fn element_text(elem: &PySyntaxElement) -> String {
    match elem {
        rowan::NodeOrToken::Node(n) => n.text().to_string(),
        rowan::NodeOrToken::Token(t) => t.text().to_string(),
    }
}

/// Byte range of an element in the original source
pub fn element_range(elem: &PySyntaxElement) -> std::ops::Range<usize> {
    let range = elem.text_range();
    usize::from(range.start())..usize::from(range.end())
}

/// Non-trivia children (nodes and tokens) of a node, in source order
///
/// This is the child list the pattern matcher operates on: trivia never
/// participates in positional matching.
pub fn significant_children(node: &PySyntaxNode) -> Vec<PySyntaxElement> {
    node.children_with_tokens()
        .filter(|el| !el.kind().is_trivia())
        .collect()
}

/// The element's kind
pub fn element_kind(elem: &PySyntaxElement) -> PySyntaxKind {
    elem.kind()
}

/// 1-based line and column of a byte offset in `source`
pub fn line_col(source: &str, offset: usize) -> (u32, u32) {
    let prefix = &source[..offset.min(source.len())];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() as u32 + 1;
    let col = prefix
        .rsplit_once('\n')
        .map(|(_, tail)| tail.chars().count())
        .unwrap_or_else(|| prefix.chars().count()) as u32
        + 1;
    (line, col)
}

/// 1-based source line of a token
pub fn token_line(source: &str, token: &PySyntaxToken) -> u32 {
    line_col(source, usize::from(token.text_range().start())).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_module;

    #[test]
    fn test_prefix_of_nested_node() {
        let tree = parse_module("x =  a == b\n").unwrap();
        let comparison = tree
            .descendants()
            .find(|n| n.kind() == PySyntaxKind::Comparison)
            .unwrap();
        assert_eq!(prefix_text(&comparison.into()), "  ");
    }

    #[test]
    fn test_suffix_runs_to_next_token() {
        let tree = parse_module("f( x )\n").unwrap();
        let name_x = tree
            .descendants_with_tokens()
            .filter_map(|el| el.into_token())
            .find(|t| t.text() == "x")
            .unwrap();
        assert_eq!(suffix_text(&name_x.into()), " ");
    }

    #[test]
    fn test_significant_children_skip_trivia() {
        let tree = parse_module("a == b\n").unwrap();
        let comparison = tree
            .descendants()
            .find(|n| n.kind() == PySyntaxKind::Comparison)
            .unwrap();
        let kids = significant_children(&comparison);
        assert_eq!(kids.len(), 3);
        assert_eq!(kids[1].kind(), PySyntaxKind::EqEq);
    }

    #[test]
    fn test_line_col() {
        let src = "abc\nde\nf";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 5), (2, 2));
        assert_eq!(line_col(src, 7), (3, 1));
    }
}
