//! Test Runner Integration
//!
//! Turns the human-readable output of Rust's libtest harness into outcome
//! events for a `TestResult`, and wraps a whole run in a `TestSession` whose
//! end triggers the notifications.

use test_alerts_core::{ExitStatus, TestOutcome, TestResult};

use super::service::AlertService;
use super::types::AlertDelivery;

/// Cause recorded for a failure until its diagnostic section is parsed.
pub const PLACEHOLDER_CAUSE: &str = "test failed";

/// Diagnostics longer than this many characters are truncated.
pub const MAX_CAUSE_CHARS: usize = 300;

const SHOULD_PANIC_SUFFIX: &str = " - should panic";

/// Line-oriented parser for libtest's default (pretty) output.
#[derive(Debug, Default)]
pub struct LibtestParser {
    /// Failure section currently being read: test id and its captured lines.
    section: Option<(String, Vec<String>)>,
}

impl LibtestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of harness output.
    pub fn feed_line(&mut self, line: &str, result: &mut TestResult) {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(id) = section_header(line) {
            self.flush(result);
            self.section = Some((id.to_string(), Vec::new()));
            return;
        }

        if self.section.is_some() {
            if line == "failures:" || line.starts_with("test result:") {
                self.flush(result);
            } else if let Some((_, lines)) = self.section.as_mut() {
                lines.push(line.to_string());
            }
            return;
        }

        if let Some(outcome) = parse_test_line(line) {
            result.record(outcome);
        }
    }

    /// Close any open failure section.
    pub fn finish(&mut self, result: &mut TestResult) {
        self.flush(result);
    }

    fn flush(&mut self, result: &mut TestResult) {
        let Some((id, lines)) = self.section.take() else {
            return;
        };

        if !result.failed_details.contains_key(&id) {
            return;
        }
        if let Some(cause) = extract_cause(&lines) {
            result.record_failure_details(id, cause);
        }
    }
}

/// `---- <id> stdout ----` → `<id>`
fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix("---- ")?.strip_suffix(" ----")?;
    let id = inner
        .strip_suffix(" stdout")
        .or_else(|| inner.strip_suffix(" stderr"))?;
    Some(id.strip_suffix(SHOULD_PANIC_SUFFIX).unwrap_or(id))
}

/// `test <id> ... <status>` → outcome event.
fn parse_test_line(line: &str) -> Option<TestOutcome> {
    let rest = line.strip_prefix("test ")?;
    let (name, status) = rest.split_once(" ... ")?;

    let (id, should_panic) = match name.strip_suffix(SHOULD_PANIC_SUFFIX) {
        Some(id) => (id, true),
        None => (name, false),
    };

    match status.trim() {
        "ok" if should_panic => Some(TestOutcome::XFailed),
        "ok" => Some(TestOutcome::Passed),
        "FAILED" => Some(TestOutcome::Failed {
            id: id.to_string(),
            cause: PLACEHOLDER_CAUSE.to_string(),
        }),
        s if s.starts_with("ignored") => Some(TestOutcome::Skipped),
        _ => None,
    }
}

/// Short cause from a captured failure section: the panic message when there
/// is one, otherwise the first meaningful line.
fn extract_cause(lines: &[String]) -> Option<String> {
    let mut iter = lines.iter().map(|l| l.as_str());

    while let Some(line) = iter.next() {
        let Some(pos) = line.find("panicked at ") else {
            continue;
        };
        let rest = &line[pos + "panicked at ".len()..];

        // Legacy form: panicked at 'message', src/lib.rs:1:1
        if let Some(quoted) = rest.strip_prefix('\'') {
            if let Some(end) = quoted.rfind("', ") {
                return Some(truncate(&quoted[..end]));
            }
        }

        // Current form: message on the lines after `panicked at <location>:`
        let message: Vec<&str> = iter
            .by_ref()
            .take_while(|l| !l.trim().is_empty() && !l.starts_with("note: "))
            .collect();
        if !message.is_empty() {
            return Some(truncate(&message.join("\n")));
        }
        return Some(truncate(line.trim()));
    }

    lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && !l.starts_with("note: "))
        .map(truncate)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CAUSE_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_CAUSE_CHARS - 1).collect();
    out.push('\u{2026}');
    out
}

/// One test run, from first outcome to final notification.
#[derive(Debug)]
pub struct TestSession {
    label: String,
    result: TestResult,
    parser: LibtestParser,
}

impl TestSession {
    /// Start a session. `label` identifies the run when it fails without any
    /// individual test failing (build errors, harness crashes).
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            result: TestResult::new(),
            parser: LibtestParser::new(),
        }
    }

    pub fn result(&self) -> &TestResult {
        &self.result
    }

    /// Record an outcome reported directly by the host.
    pub fn record(&mut self, outcome: TestOutcome) {
        self.result.record(outcome);
    }

    /// Feed one line of libtest output.
    pub fn observe_line(&mut self, line: &str) {
        self.parser.feed_line(line, &mut self.result);
    }

    /// End the session and return the final result.
    ///
    /// A failing exit status with no recorded failure or error adds one error
    /// for the session itself.
    pub fn finish(mut self, exit_status: ExitStatus) -> TestResult {
        self.parser.finish(&mut self.result);

        if !exit_status.is_success() && !self.result.has_failures() {
            self.result.record_error(
                self.label,
                format!("test process exited with status {}", exit_status),
            );
        }

        self.result
    }

    /// End the session and send the summary to every configured channel.
    pub async fn finish_and_notify(
        self,
        exit_status: ExitStatus,
        service: &AlertService,
    ) -> Vec<AlertDelivery> {
        let result = self.finish(exit_status);
        let deliveries = service.notify(&result, exit_status).await;
        if !deliveries.is_empty() {
            tracing::debug!(
                "Sent {} notification(s) for {} recorded outcome(s)",
                deliveries.len(),
                result.total()
            );
        }
        deliveries
    }
}
