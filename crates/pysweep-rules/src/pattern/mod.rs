//! Structural pattern language over the CST
//!
//! Patterns are written in a small textual language and compiled once per
//! rule. A pattern describes the shape of a subtree: a node category with
//! an ordered child sequence, token literals, wildcards, optional and
//! repeated parts, alternation, and named captures.
//!
//! ```text
//! not_test< "not" comparison=comparison< any* > >
//! ```
//!
//! matches a `not_test` node whose significant children are the `not`
//! keyword followed by a `comparison` node, binding that node to the name
//! `comparison`. Trivia never participates in matching; child sequences
//! are matched against the significant children only.

mod matcher;
mod parser;

pub use matcher::{Match, find_matches};
pub use parser::compile_pattern;

use pysweep_core::cst::{PySyntaxElement, PySyntaxKind, element_text};

/// A compiled pattern unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// `any` - one element of any kind
    Any,
    /// `"text"` or `'text'` - one token with exactly this text
    Leaf(String),
    /// `NAME`, `NUMBER`, `STRING` - one token of the given class
    TokenClass(TokenClass),
    /// Bare category name - one element of that kind, children unchecked
    Kind(PySyntaxKind),
    /// `category< ... >` - a node of that kind with a matching child
    /// sequence
    Node {
        kind: PySyntaxKind,
        children: Vec<Pattern>,
    },
    /// `any< ... >` - a node of any kind with a matching child sequence
    AnyNode { children: Vec<Pattern> },
    /// `( seq | seq | ... )` - first matching alternative wins and is
    /// committed to
    Alt(Vec<Vec<Pattern>>),
    /// `[ seq ]` - the sequence may be present or absent
    Optional(Vec<Pattern>),
    /// `unit*` - zero or more consecutive elements matching the unit
    Repeat(Box<Pattern>),
    /// `name=unit` - match the unit and bind what it consumed
    Capture {
        name: String,
        inner: Box<Pattern>,
    },
}

/// Token classes usable in patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Name,
    Number,
    String,
}

impl TokenClass {
    pub fn matches(self, kind: PySyntaxKind) -> bool {
        match self {
            Self::Name => kind == PySyntaxKind::Name,
            Self::Number => kind == PySyntaxKind::Number,
            Self::String => kind == PySyntaxKind::String,
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "NAME" => Some(Self::Name),
            "NUMBER" => Some(Self::Number),
            "STRING" => Some(Self::String),
            _ => None,
        }
    }
}

/// What a named capture bound to
#[derive(Debug, Clone)]
pub enum Captured {
    /// A single element (node or token)
    Element(PySyntaxElement),
    /// A run of sibling elements, as bound by a repeat or optional part
    Seq(Vec<PySyntaxElement>),
}

impl Captured {
    /// Source text of the binding, without leading trivia
    pub fn text(&self) -> String {
        match self {
            Self::Element(el) => element_text(el),
            Self::Seq(els) => els.iter().map(element_text).collect(),
        }
    }

    /// The bound element, when the capture consumed exactly one
    pub fn element(&self) -> Option<&PySyntaxElement> {
        match self {
            Self::Element(el) => Some(el),
            Self::Seq(els) if els.len() == 1 => Some(&els[0]),
            Self::Seq(_) => None,
        }
    }
}

/// Named bindings collected during a match
///
/// A name bound more than once only matches when every occurrence has the
/// same significant text.
#[derive(Debug, Clone, Default)]
pub struct Captures {
    slots: Vec<(String, Captured)>,
}

impl Captures {
    pub fn get(&self, name: &str) -> Option<&Captured> {
        self.slots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(n, _)| n.as_str())
    }

    /// Record a binding; fails when the name exists with different text
    pub(crate) fn bind(&mut self, name: &str, value: Captured) -> bool {
        if let Some(existing) = self.get(name) {
            return existing.text() == value.text();
        }
        self.slots.push((name.to_string(), value));
        true
    }
}
