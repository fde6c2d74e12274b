//! The rewrite driver
//!
//! Runs every rule over a file in order. Each rule gets its own
//! find-confirm-apply loop: the file is parsed, matches are collected,
//! each surviving candidate is offered for confirmation, and the accepted
//! edits are applied in one batch. The new text is then re-parsed and only
//! the regions the batch replaced are rescanned, so cascades like
//! `((x))` converge without re-offering rejected sites.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pysweep_core::cst::line_col;
use pysweep_core::edit::{Rewrite, apply_rewrites, unified_diff};
use pysweep_core::error::SweepError;
use pysweep_core::result::Result;

use crate::builtin::builtin_rules;
use crate::rule::Rule;

/// Verdict on a single proposed rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Apply this rewrite
    Accept,
    /// Skip this rewrite and keep looking
    Reject,
    /// Stop offering rewrites for this file; accepted ones stay applied
    AbortFile,
}

/// A rewrite offered for confirmation
#[derive(Debug)]
pub struct Proposal<'a> {
    pub path: &'a str,
    pub rule: &'a str,
    pub description: &'a str,
    /// Source text being replaced
    pub before: &'a str,
    /// Replacement text
    pub after: &'a str,
    /// 1-based line of the rewrite in the current file text
    pub line: u32,
}

/// Confirmation hook for proposed rewrites
///
/// Implementations must be `Sync`; files are processed in parallel and an
/// interactive implementation is expected to serialize its prompting.
pub trait Confirm: Sync {
    fn decide(&self, proposal: &Proposal<'_>) -> Decision;
}

/// Accept every proposal (non-interactive mode)
pub struct AcceptAll;

impl Confirm for AcceptAll {
    fn decide(&self, _proposal: &Proposal<'_>) -> Decision {
        Decision::Accept
    }
}

/// Engine behavior switches
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Write changed files back to disk; otherwise the rewritten text is
    /// only reported
    pub write: bool,
}

/// Result of processing one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: String,
    pub applied: usize,
    pub rejected: usize,
    /// Confirmation aborted partway through this file
    pub aborted: bool,
    /// Rewritten file text (equal to the input when nothing was applied)
    pub rewritten: String,
    /// Unified diff against the input, empty when unchanged
    pub diff: String,
}

impl FileOutcome {
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Aggregate result of a batch run
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<FileOutcome>,
    pub errors: Vec<(String, SweepError)>,
}

impl RunSummary {
    pub fn files_changed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.changed()).count()
    }

    pub fn rewrites_applied(&self) -> usize {
        self.outcomes.iter().map(|o| o.applied).sum()
    }

    /// Process exit code: nonzero when any file failed
    pub fn exit_code(&self) -> i32 {
        if self.errors.is_empty() { 0 } else { 1 }
    }
}

/// Applies a rule set to source files
pub struct Engine {
    rules: Vec<Rule>,
    options: EngineOptions,
}

impl Engine {
    pub fn new(rules: Vec<Rule>, options: EngineOptions) -> Self {
        Self { rules, options }
    }

    /// Engine with the built-in rule set
    pub fn with_builtin_rules(options: EngineOptions) -> Result<Self> {
        Ok(Self::new(builtin_rules()?, options))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rewrite a single file's text
    ///
    /// Rules run in order; each one loops until no further accepted edits
    /// appear. Rescans after the first pass of a rule are restricted to
    /// the spans the previous batch replaced.
    pub fn rewrite_source(
        &self,
        path: &str,
        source: &str,
        confirm: &dyn Confirm,
    ) -> Result<FileOutcome> {
        let mut text = source.to_string();
        let mut applied = 0usize;
        let mut rejected = 0usize;
        let mut aborted = false;

        'rules: for rule in &self.rules {
            let mut dirty: Option<Vec<Range<usize>>> = None;
            loop {
                let tree = pysweep_core::cst::parse_module(&text)?;
                let matches = rule.find(&tree);

                let mut batch: Vec<Rewrite> = Vec::new();
                let mut next_dirty: Vec<Range<usize>> = Vec::new();
                let mut delta = 0isize;

                for matched in &matches {
                    if let Some(regions) = &dirty {
                        let range = matched.range();
                        if !regions.iter().any(|r| r.start < range.end && range.start < r.end) {
                            continue;
                        }
                    }
                    let Some(rewrite) = rule.apply(matched, &text)? else {
                        continue;
                    };
                    let proposal = Proposal {
                        path,
                        rule: rule.name,
                        description: &rewrite.description,
                        before: &text[rewrite.range.clone()],
                        after: &rewrite.replacement,
                        line: line_col(&text, rewrite.range.start).0,
                    };
                    match confirm.decide(&proposal) {
                        Decision::Accept => {
                            let start = (rewrite.range.start as isize + delta) as usize;
                            next_dirty.push(start..start + rewrite.replacement.len());
                            delta += rewrite.delta();
                            applied += 1;
                            batch.push(rewrite);
                        }
                        Decision::Reject => rejected += 1,
                        Decision::AbortFile => {
                            aborted = true;
                            break;
                        }
                    }
                }

                debug!(
                    rule = rule.name,
                    candidates = matches.len(),
                    accepted = batch.len(),
                    "rule pass"
                );

                let quiescent = batch.is_empty();
                text = apply_rewrites(&text, &batch)?;
                if aborted {
                    break 'rules;
                }
                if quiescent {
                    break;
                }
                dirty = Some(next_dirty);
            }
        }

        let diff = if text != source {
            unified_diff(path, source, &text)
        } else {
            String::new()
        };
        Ok(FileOutcome {
            path: path.to_string(),
            applied,
            rejected,
            aborted,
            rewritten: text,
            diff,
        })
    }

    /// Process a set of files in parallel
    ///
    /// Unreadable or unparseable files are reported in the summary without
    /// stopping the rest of the batch. With `options.write` set, changed
    /// files are written back in place.
    pub fn run_files(&self, paths: &[PathBuf], confirm: &dyn Confirm) -> RunSummary {
        let results: Vec<std::result::Result<FileOutcome, (String, SweepError)>> = paths
            .par_iter()
            .map(|path| self.run_one(path, confirm))
            .collect();

        let mut outcomes = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => errors.push(err),
            }
        }
        info!(
            files = outcomes.len(),
            changed = outcomes.iter().filter(|o| o.changed()).count(),
            failed = errors.len(),
            "run complete"
        );
        RunSummary { outcomes, errors }
    }

    fn run_one(
        &self,
        path: &Path,
        confirm: &dyn Confirm,
    ) -> std::result::Result<FileOutcome, (String, SweepError)> {
        let display = path.display().to_string();
        let wrap = |e: SweepError| (display.clone(), e);

        let source = fs::read_to_string(path).map_err(|e| wrap(SweepError::io(&display, e)))?;
        let outcome = self
            .rewrite_source(&display, &source, confirm)
            .map_err(wrap)?;
        if self.options.write && outcome.changed() {
            fs::write(path, &outcome.rewritten)
                .map_err(|e| (display.clone(), SweepError::io(&display, e)))?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::sync::Mutex;

    fn engine() -> Engine {
        Engine::with_builtin_rules(EngineOptions::default()).unwrap()
    }

    fn rewrite(source: &str) -> FileOutcome {
        engine().rewrite_source("test.py", source, &AcceptAll).unwrap()
    }

    struct RejectAll;
    impl Confirm for RejectAll {
        fn decide(&self, _proposal: &Proposal<'_>) -> Decision {
            Decision::Reject
        }
    }

    /// Replays a fixed decision script, aborting once it runs out
    struct Scripted(Mutex<Vec<Decision>>);
    impl Scripted {
        fn new(mut decisions: Vec<Decision>) -> Self {
            decisions.reverse();
            Self(Mutex::new(decisions))
        }
    }
    impl Confirm for Scripted {
        fn decide(&self, _proposal: &Proposal<'_>) -> Decision {
            self.0.lock().unwrap().pop().unwrap_or(Decision::AbortFile)
        }
    }

    #[test]
    fn test_all_rules_together() {
        let source = "\
if not a == b:
    x = (1)
d = dict([(k, v) for k, v in items])
s = set(a for a in x)
y = x == None
";
        let outcome = rewrite(source);
        assert_eq!(
            outcome.rewritten,
            "\
if a != b:
    x = 1
d = {k: v for k, v in items}
s = {a for a in x}
y = x is None
"
        );
        assert_eq!(outcome.applied, 5);
        assert!(!outcome.aborted);
        assert!(outcome.diff.contains("-if not a == b:"));
    }

    #[test]
    fn test_rules_compose_across_passes() {
        // inversion first, then identity normalization on the result
        let outcome = rewrite("x = not a == None\n");
        assert_eq!(outcome.rewritten, "x = a is not None\n");
    }

    #[test]
    fn test_cascading_paren_removal() {
        let outcome = rewrite("a = ((b))\n");
        assert_eq!(outcome.rewritten, "a = b\n");
        assert_eq!(outcome.applied, 2);
    }

    #[test]
    fn test_clean_file_is_untouched() {
        let source = "x = a != b\nd = {k: v for k, v in items}\n";
        let outcome = rewrite(source);
        assert_eq!(outcome.rewritten, source);
        assert_eq!(outcome.applied, 0);
        assert!(outcome.diff.is_empty());
    }

    #[test]
    fn test_idempotence() {
        let first = rewrite("if not a == b:\n    d = dict([(k, v) for k, v in x])\n");
        let second = rewrite(&first.rewritten);
        assert_eq!(second.rewritten, first.rewritten);
        assert_eq!(second.applied, 0);
    }

    #[test]
    fn test_output_reparses() {
        let outcome = rewrite("x = not a in b\nf((y))\n");
        pysweep_core::cst::parse_module(&outcome.rewritten).unwrap();
    }

    #[test]
    fn test_reject_all_keeps_file_unchanged() {
        let source = "x = not a == b\n";
        let outcome = engine().rewrite_source("t.py", source, &RejectAll).unwrap();
        assert_eq!(outcome.rewritten, source);
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.rejected, 1);
    }

    #[test]
    fn test_abort_keeps_earlier_accepts() {
        let source = "a = not x == y\nb = not u == v\nc == None\n";
        let confirm = Scripted::new(vec![Decision::Accept, Decision::AbortFile]);
        let outcome = engine().rewrite_source("t.py", source, &confirm).unwrap();
        assert!(outcome.aborted);
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.rewritten, "a = x != y\nb = not u == v\nc == None\n");
    }

    #[test]
    fn test_rejected_site_is_not_reoffered() {
        // rejecting the outer parens must not loop forever or re-prompt
        let source = "a = ((b))\n";
        let confirm = Scripted::new(vec![Decision::Reject]);
        let outcome = engine().rewrite_source("t.py", source, &confirm).unwrap();
        assert_eq!(outcome.rewritten, source);
        assert_eq!(outcome.rejected, 1);
        assert!(!outcome.aborted);
    }

    #[test]
    fn test_proposal_contents() {
        struct Check;
        impl Confirm for Check {
            fn decide(&self, proposal: &Proposal<'_>) -> Decision {
                assert_eq!(proposal.rule, "invert-negated-comparison");
                assert_eq!(proposal.before, "not a == b");
                assert_eq!(proposal.after, "a != b");
                assert_eq!(proposal.line, 2);
                Decision::Accept
            }
        }
        let outcome = engine()
            .rewrite_source("t.py", "z = 1\ny = not a == b\n", &Check)
            .unwrap();
        assert_eq!(outcome.applied, 1);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = engine()
            .rewrite_source("bad.py", "def f(:\n", &AcceptAll)
            .unwrap_err();
        assert!(matches!(err, SweepError::Syntax { .. }));
    }

    #[test]
    fn test_run_files_writes_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.py");
        let bad = dir.path().join("bad.py");
        let mut f = fs::File::create(&good).unwrap();
        writeln!(f, "x = not a == b").unwrap();
        let mut f = fs::File::create(&bad).unwrap();
        writeln!(f, "def broken(:").unwrap();

        let engine = Engine::with_builtin_rules(EngineOptions { write: true }).unwrap();
        let summary = engine.run_files(&[good.clone(), bad], &AcceptAll);

        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(fs::read_to_string(&good).unwrap(), "x = a != b\n");
    }

    #[test]
    fn test_run_files_dry_run_leaves_disk_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.py");
        fs::write(&path, "x = not a == b\n").unwrap();

        let summary = engine().run_files(&[path.clone()], &AcceptAll);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.files_changed(), 1);
        assert!(summary.outcomes[0].diff.contains("+x = a != b"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "x = not a == b\n");
    }
}
