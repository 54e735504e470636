//! Pass/fail classification of free-form test output

use std::fmt;

/// Outcome of inspecting a stage's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
    /// The binary produced no output to judge
    Indeterminate,
}

impl Verdict {
    pub fn is_pass(self) -> bool {
        self == Verdict::Passed
    }
}

/// Decides whether captured output represents a passing run
pub trait Classifier: fmt::Debug + Send + Sync {
    fn classify(&self, text: &str) -> Verdict;
}

/// Passes when the output contains a literal marker anywhere
///
/// The match is a plain substring search: `"[  PASSED  ] 1 test"` does not
/// match output reporting `"[  PASSED  ] 2 tests"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClassifier {
    marker: String,
}

impl MarkerClassifier {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl Classifier for MarkerClassifier {
    fn classify(&self, text: &str) -> Verdict {
        if text.contains(&self.marker) {
            Verdict::Passed
        } else if text.trim().is_empty() {
            Verdict::Indeterminate
        } else {
            Verdict::Failed
        }
    }
}
