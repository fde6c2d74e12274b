//! Text edits and diff rendering
//!
//! A rewrite is a span replacement against the original source text. The
//! engine applies accepted rewrites back to front so earlier spans stay
//! valid, then re-parses the result before the next rule pass.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use crate::error::SweepError;
use crate::result::Result;

/// A single span replacement produced by a rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    /// Byte range in the source this rewrite replaces
    pub range: Range<usize>,
    /// Replacement text
    pub replacement: String,
    /// Human-readable description shown at confirmation prompts
    pub description: String,
}

impl Rewrite {
    pub fn new(range: Range<usize>, replacement: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
            description: description.into(),
        }
    }

    /// Signed length change this rewrite introduces
    pub fn delta(&self) -> isize {
        self.replacement.len() as isize - self.range.len() as isize
    }
}

/// Apply a batch of rewrites to `source`
///
/// Rewrites must be sorted by start offset and non-overlapping; the
/// match scan guarantees both. Overlap here means a rule produced
/// conflicting edits, which is reported as an internal error.
pub fn apply_rewrites(source: &str, rewrites: &[Rewrite]) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for rw in rewrites {
        if rw.range.start < cursor || rw.range.end > source.len() {
            return Err(SweepError::internal(
                "apply",
                format!(
                    "rewrite span {}..{} overlaps or exceeds source of {} bytes",
                    rw.range.start,
                    rw.range.end,
                    source.len()
                ),
            ));
        }
        out.push_str(&source[cursor..rw.range.start]);
        out.push_str(&rw.replacement);
        cursor = rw.range.end;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}

/// Render a unified diff between the original and rewritten text
pub fn unified_diff(path: &str, original: &str, rewritten: &str) -> String {
    TextDiff::from_lines(original, rewritten)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_in_order() {
        let source = "not a == b\n";
        let rewrites = vec![Rewrite::new(0..10, "a != b", "invert")];
        assert_eq!(apply_rewrites(source, &rewrites).unwrap(), "a != b\n");
    }

    #[test]
    fn test_apply_multiple() {
        let source = "x == None\ny == None\n";
        let rewrites = vec![
            Rewrite::new(2..4, "is", "is-comparison"),
            Rewrite::new(12..14, "is", "is-comparison"),
        ];
        assert_eq!(
            apply_rewrites(source, &rewrites).unwrap(),
            "x is None\ny is None\n"
        );
    }

    #[test]
    fn test_overlap_is_rejected() {
        let source = "abcdef";
        let rewrites = vec![
            Rewrite::new(0..4, "x", "one"),
            Rewrite::new(2..6, "y", "two"),
        ];
        assert!(apply_rewrites(source, &rewrites).is_err());
    }

    #[test]
    fn test_empty_batch_is_identity() {
        assert_eq!(apply_rewrites("a = 1\n", &[]).unwrap(), "a = 1\n");
    }

    #[test]
    fn test_unified_diff_shape() {
        let diff = unified_diff("demo.py", "x == None\n", "x is None\n");
        assert!(diff.contains("a/demo.py"));
        assert!(diff.contains("-x == None"));
        assert!(diff.contains("+x is None"));
    }
}
