//! Rewrite rule abstraction
//!
//! A rule pairs a compiled pattern with an action that turns a match into
//! a text edit. Actions may decline a match after inspecting it (post-match
//! conditions the pattern language cannot express), which is an ordinary
//! outcome, not an error.

use pysweep_core::cst::PySyntaxNode;
use pysweep_core::edit::Rewrite;
use pysweep_core::result::Result;

use crate::pattern::{Match, Pattern, compile_pattern, find_matches};

/// Turns a match into a rewrite, or `None` to leave the site alone
pub type RuleAction = fn(&Match, &str) -> Result<Option<Rewrite>>;

/// A named structural rewrite rule
pub struct Rule {
    pub name: &'static str,
    pub description: &'static str,
    pattern: Pattern,
    action: RuleAction,
}

impl Rule {
    /// Compile `pattern_text` and build the rule
    pub fn new(
        name: &'static str,
        description: &'static str,
        pattern_text: &str,
        action: RuleAction,
    ) -> Result<Self> {
        Ok(Self {
            name,
            description,
            pattern: compile_pattern(pattern_text)?,
            action,
        })
    }

    /// All non-nested matches of this rule's pattern, in source order
    pub fn find(&self, tree: &PySyntaxNode) -> Vec<Match> {
        find_matches(&self.pattern, tree)
    }

    /// Run the action on a match
    pub fn apply(&self, matched: &Match, source: &str) -> Result<Option<Rewrite>> {
        (self.action)(matched, source)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}
