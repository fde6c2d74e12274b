//! pysweep-core - lossless CST and text-edit infrastructure
//!
//! Core of the pysweep rewrite engine: a format-preserving concrete
//! syntax tree for a Python subset, span-based text edits, and the
//! shared error types. Pattern compilation, the builtin rules, and the
//! rewrite driver live in `pysweep-rules`.

pub mod cst;
pub mod edit;
pub mod error;
pub mod result;

pub use cst::{
    CstSpan, CstToken, ParseError, PyLanguage, PySyntaxElement, PySyntaxKind, PySyntaxNode,
    PySyntaxToken, element_kind, element_range, element_text, first_token, last_token, line_col,
    parse_module, parse_with_errors, prefix_text, significant_children, suffix_text, token_line,
};
pub use edit::{Rewrite, apply_rewrites, unified_diff};
pub use error::SweepError;
pub use result::Result;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize tracing with environment-based filtering
///
/// Uses `RUST_LOG` when set, defaulting to `pysweep=info`.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pysweep=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}
