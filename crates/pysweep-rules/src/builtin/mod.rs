//! Built-in rewrite rules
//!
//! Four structural cleanups, applied in a fixed order:
//!
//! 1. `not a == b` -> `a != b` (comparison inversion)
//! 2. `a == None` -> `a is None` (identity comparison with None)
//! 3. `dict([(k, v) for ...])` / `set([a for ...])` -> comprehension
//!    displays
//! 4. `(a)` -> `a` (redundant parentheses)

mod comparisons;
mod comprehensions;
mod parens;

use pysweep_core::cst::PySyntaxElement;
use pysweep_core::error::SweepError;
use pysweep_core::result::Result;

use crate::pattern::Match;
use crate::rule::Rule;

/// Construct the built-in rule set, compiling every pattern up front
///
/// A pattern that fails to compile is a programming error in this crate;
/// it surfaces as [`SweepError::PatternSyntax`] before any file is
/// touched.
pub fn builtin_rules() -> Result<Vec<Rule>> {
    Ok(vec![
        comparisons::invert_negated_comparison()?,
        comparisons::none_identity()?,
        comprehensions::dict_comprehension()?,
        comprehensions::set_comprehension()?,
        parens::remove_redundant_parens()?,
    ])
}

/// Fetch a capture the rule's pattern guarantees, as a single element
fn capture_element<'m>(
    matched: &'m Match,
    rule: &str,
    name: &str,
) -> Result<&'m PySyntaxElement> {
    matched
        .captures
        .get(name)
        .and_then(|c| c.element())
        .ok_or_else(|| {
            SweepError::internal(rule, format!("pattern matched without binding '{name}'"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_patterns_compile() {
        let rules = builtin_rules().unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "invert-negated-comparison",
                "none-identity",
                "dict-comprehension",
                "set-comprehension",
                "remove-redundant-parens",
            ]
        );
    }
}
