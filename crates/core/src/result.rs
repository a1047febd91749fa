//! Test Result Accumulator
//!
//! Counters and per-failure diagnostics collected over a single test session.
//! A `TestResult` is created empty when the session starts, mutated once per
//! observed outcome, and read once when the session ends.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single observed test outcome, as reported by the host test runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed { id: String, cause: String },
    Skipped,
    Error { id: String, cause: String },
    XFailed,
    XPassed,
}

/// Aggregated outcome counters for one test session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub error: u64,
    pub xfailed: u64,
    pub xpassed: u64,
    /// Identifiers of failed or errored tests, in the order they were observed.
    pub failed_tests: Vec<String>,
    /// Short human-readable cause per failed identifier.
    pub failed_details: HashMap<String, String>,
}

impl TestResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_passed(&mut self) {
        self.passed += 1;
    }

    pub fn record_failed(&mut self, id: impl Into<String>, cause: impl Into<String>) {
        self.failed += 1;
        self.push_failure(id.into(), cause.into());
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_error(&mut self, id: impl Into<String>, cause: impl Into<String>) {
        self.error += 1;
        self.push_failure(id.into(), cause.into());
    }

    pub fn record_xfailed(&mut self) {
        self.xfailed += 1;
    }

    pub fn record_xpassed(&mut self) {
        self.xpassed += 1;
    }

    /// Dispatch an outcome event to the matching entry point.
    pub fn record(&mut self, outcome: TestOutcome) {
        match outcome {
            TestOutcome::Passed => self.record_passed(),
            TestOutcome::Failed { id, cause } => self.record_failed(id, cause),
            TestOutcome::Skipped => self.record_skipped(),
            TestOutcome::Error { id, cause } => self.record_error(id, cause),
            TestOutcome::XFailed => self.record_xfailed(),
            TestOutcome::XPassed => self.record_xpassed(),
        }
    }

    /// Replace the diagnostic for a failure whose cause arrived after its
    /// outcome. Counters and `failed_tests` are left untouched.
    pub fn record_failure_details(&mut self, id: impl Into<String>, cause: impl Into<String>) {
        self.failed_details.insert(id.into(), cause.into());
    }

    /// Diagnostic text recorded for `id`, if any.
    pub fn failure_details(&self, id: &str) -> Option<&str> {
        self.failed_details.get(id).map(String::as_str)
    }

    /// Whether any failure or error was observed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.error > 0
    }

    /// Total number of recorded outcomes.
    pub fn total(&self) -> u64 {
        self.passed + self.failed + self.skipped + self.error + self.xfailed + self.xpassed
    }

    fn push_failure(&mut self, id: String, cause: String) {
        self.failed_tests.push(id.clone());
        self.failed_details.insert(id, cause);
    }
}

/// Overall session outcome as reported by the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus(pub i32);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    pub const FAILURE: ExitStatus = ExitStatus(1);

    pub fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// "Passed" for a zero exit code, "Failed" otherwise.
    pub fn label(&self) -> &'static str {
        if self.is_success() {
            "Passed"
        } else {
            "Failed"
        }
    }

    /// Exit status implied by the recorded outcomes alone.
    pub fn from_result(result: &TestResult) -> Self {
        if result.has_failures() {
            Self::FAILURE
        } else {
            Self::SUCCESS
        }
    }
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
