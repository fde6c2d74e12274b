//! Error types for the rewrite engine

use thiserror::Error;

/// Errors surfaced while parsing, matching, or rewriting source files
#[derive(Error, Debug)]
pub enum SweepError {
    /// Source text could not be parsed
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
    },

    /// A rule's pattern expression is malformed
    #[error("invalid pattern {pattern:?}: {message}")]
    PatternSyntax { pattern: String, message: String },

    /// A rule callback observed a tree shape its pattern should have ruled
    /// out
    #[error("internal consistency error in rule '{rule}': {message}")]
    InternalConsistency { rule: String, message: String },

    /// Reading or writing a source file failed
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SweepError {
    pub fn syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    pub fn pattern_syntax(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PatternSyntax {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn internal(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InternalConsistency {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a batch run can continue with the remaining files after
    /// this error. Pattern and consistency errors mean a rule itself is
    /// broken and every file would hit them.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Syntax { .. } | Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SweepError::syntax("unexpected token", 3, 7);
        assert_eq!(
            err.to_string(),
            "syntax error at line 3, column 7: unexpected token"
        );

        let err = SweepError::pattern_syntax("atom< (", "unclosed group");
        assert!(err.to_string().contains("atom< ("));
    }

    #[test]
    fn test_recoverability() {
        assert!(SweepError::syntax("bad", 1, 1).is_recoverable());
        assert!(!SweepError::internal("remove-parens", "missing capture").is_recoverable());
        assert!(!SweepError::pattern_syntax("x<", "unclosed").is_recoverable());
    }
}
