//! Textual plan results.

use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Character budget for excerpts embedded in error messages.
pub const EXCERPT_LIMIT: usize = 400;

/// Pending change counts parsed from the plan footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub add: u32,
    pub change: u32,
    pub destroy: u32,
}

impl PlanSummary {
    pub fn total(&self) -> u32 {
        self.add + self.change + self.destroy
    }
}

/// The textual outcome of one plan computation.
///
/// Owned by the driver for the duration of one scenario; the assertion
/// layer only ever reads it.
#[derive(Debug, Clone)]
pub struct PlanResult {
    output: String,
    summary: Option<PlanSummary>,
    artifact: Option<PathBuf>,
}

impl PlanResult {
    pub fn new(output: impl Into<String>) -> Self {
        let output = output.into();
        let summary = parse_summary(&output);
        Self {
            output,
            summary,
            artifact: None,
        }
    }

    pub(crate) fn with_artifact(mut self, artifact: PathBuf) -> Self {
        self.artifact = Some(artifact);
        self
    }

    /// The flattened textual rendering assertions match against.
    pub fn text(&self) -> &str {
        &self.output
    }

    /// Parsed change counts, if the output carried a plan footer.
    pub fn summary(&self) -> Option<PlanSummary> {
        self.summary
    }

    /// Path of the persisted plan artifact, when one was requested.
    pub fn artifact(&self) -> Option<&PathBuf> {
        self.artifact.as_ref()
    }

    /// Whether the plan holds pending changes. A plan over unchanged
    /// external state reports none, which is what the idempotence property
    /// checks.
    pub fn has_changes(&self) -> bool {
        if self.output.contains("No changes.") {
            return false;
        }
        match self.summary {
            Some(summary) => summary.total() > 0,
            None => true,
        }
    }
}

/// Parse the `Plan: N to add, N to change, N to destroy.` footer.
fn parse_summary(output: &str) -> Option<PlanSummary> {
    let pattern =
        Regex::new(r"Plan: (\d+) to add, (\d+) to change, (\d+) to destroy").ok()?;
    let captures = pattern.captures(output)?;
    Some(PlanSummary {
        add: captures[1].parse().ok()?,
        change: captures[2].parse().ok()?,
        destroy: captures[3].parse().ok()?,
    })
}

/// Bounded excerpt from the head of `text`.
pub fn excerpt(text: &str) -> String {
    excerpt_from(text, 0)
}

/// Bounded excerpt centered on `position`.
pub fn excerpt_around(text: &str, position: usize) -> String {
    let start = position.saturating_sub(EXCERPT_LIMIT / 2);
    excerpt_from(text, start)
}

fn excerpt_from(text: &str, start: usize) -> String {
    let mut start = start.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (start + EXCERPT_LIMIT).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }

    let mut result = String::new();
    if start > 0 {
        result.push_str("...");
    }
    result.push_str(text[start..end].trim_end());
    if end < text.len() {
        result.push_str("...");
    }
    result
}
