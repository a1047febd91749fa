//! Slack Incoming Webhook Channel
//!
//! Sends the session summary to a Slack Incoming Webhook as a single coloured
//! attachment.

use async_trait::async_trait;
use test_alerts_core::{ExitStatus, TestResult};

use super::{post_json, AlertChannel};
use crate::services::alerts::config::SlackConfig;
use crate::services::alerts::types::*;
use crate::services::http_client::build_http_client;

/// Attachment colour for a passing session.
pub const SUCCESS_COLOR: &str = "#36a64f";
/// Attachment colour for a failing session.
pub const ERROR_COLOR: &str = "#dc3545";

/// Slack Incoming Webhook integration.
///
/// Webhook URL format: `https://hooks.slack.com/services/T.../B.../xxx`
pub struct SlackChannel {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackChannel {
    pub fn new(config: SlackConfig) -> Self {
        let client = build_http_client(config.timeout());
        Self { config, client }
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }
}

/// Escape the characters Slack reserves for mrkdwn control sequences.
pub fn escape_mrkdwn(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Render the session summary as a Slack attachments payload.
///
/// ```text
/// <prefix>
/// Test Suite: <name>
/// Status=<Passed|Failed>
/// Passed=N
/// ...
/// ```
///
/// Multi-line failure messages are re-indented line by line under their
/// bullet, so the Slack text does not carry them verbatim.
pub fn format_message(
    result: &TestResult,
    config: &SlackConfig,
    exit_status: ExitStatus,
) -> serde_json::Value {
    let color = if exit_status.is_success() {
        SUCCESS_COLOR
    } else {
        ERROR_COLOR
    };

    let mut lines = vec![escape_mrkdwn(&config.message_prefix)];
    if let Some(ref name) = config.test_name {
        lines.push(format!("Test Suite: {}", escape_mrkdwn(name)));
    }
    lines.push(format!("Status={}", exit_status.label()));
    for (counter, count) in summary_counts(result) {
        lines.push(format!("{}={}", counter.label(), count));
    }

    let failures = failure_entries(result, &config.display);
    if !failures.is_empty() {
        lines.push(String::new());
        lines.push("Failed Tests:".to_string());
        for (id, details) in failures {
            lines.push(format!("\u{2022} {}", escape_mrkdwn(id)));
            if let Some(details) = details {
                for line in details.lines() {
                    lines.push(format!("    {}", escape_mrkdwn(line)));
                }
            }
        }
    }

    serde_json::json!({
        "attachments": [
            {
                "color": color,
                "text": lines.join("\n")
            }
        ]
    })
}

#[async_trait]
impl AlertChannel for SlackChannel {
    fn channel_type(&self) -> AlertChannelType {
        AlertChannelType::Slack
    }

    fn request_body(&self, result: &TestResult, exit_status: ExitStatus) -> serde_json::Value {
        format_message(result, &self.config, exit_status)
    }

    async fn deliver(
        &self,
        result: &TestResult,
        exit_status: ExitStatus,
    ) -> Result<(), AlertError> {
        let body = self.request_body(result, exit_status);
        post_json(
            &self.client,
            &self.config.webhook_url,
            &body,
            self.config.timeout(),
            "Slack",
        )
        .await
    }
}
