//! Lossless concrete syntax tree for a Python subset
//!
//! Every byte of the source, including whitespace, comments, newlines, and
//! backslash continuations, lives in some token of the tree, so
//! `tree.text() == source` always holds. Rewrites are expressed as text
//! edits against token spans rather than tree mutation, which keeps the
//! untouched parts of a file byte-identical.
//!
//! The pipeline is lexer -> parser -> [`PySyntaxNode`] (a `rowan` red
//! tree over a shared green tree). [`nodes`] adds the traversal helpers
//! the pattern matcher and rewrite rules are built on.

mod builder;
mod language;
mod lexer;
mod nodes;
mod parser;
mod syntax_kind;

pub use builder::CstBuilder;
pub use language::PyLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use nodes::{
    PySyntaxElement, PySyntaxNode, PySyntaxToken, element_kind, element_range, element_text,
    first_token, last_token, line_col, prefix_text, significant_children, suffix_text, token_line,
};
pub use parser::{ParseError, parse_module, parse_with_errors};
pub use syntax_kind::PySyntaxKind;
