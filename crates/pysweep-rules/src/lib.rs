//! pysweep-rules - pattern language, built-in rules, and the driver
//!
//! The pattern language ([`pattern`]) compiles textual structure
//! descriptions into matchers over the CST from `pysweep-core`. A
//! [`rule::Rule`] pairs a pattern with an action producing text edits, and
//! the [`engine::Engine`] runs a rule set over files with interactive
//! confirmation and parallel batch processing.

pub mod builtin;
pub mod engine;
pub mod pattern;
pub mod rule;

pub use builtin::builtin_rules;
pub use engine::{
    AcceptAll, Confirm, Decision, Engine, EngineOptions, FileOutcome, Proposal, RunSummary,
};
pub use pattern::{Captured, Captures, Match, Pattern, TokenClass, compile_pattern, find_matches};
pub use rule::{Rule, RuleAction};
