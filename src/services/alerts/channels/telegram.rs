//! Telegram Bot API Notification Channel
//!
//! Sends the session summary via the Telegram Bot API `sendMessage` endpoint.
//! Uses HTML parse mode with escaping of user-supplied text.

use async_trait::async_trait;
use test_alerts_core::{ExitStatus, TestResult};

use super::{post_json, AlertChannel};
use crate::services::alerts::config::TelegramConfig;
use crate::services::alerts::types::*;
use crate::services::http_client::build_http_client;

/// Telegram rejects `sendMessage` text longer than this.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Telegram Bot API integration.
///
/// API endpoint: `https://api.telegram.org/bot<token>/sendMessage`
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Self {
        let client = build_http_client(config.timeout());
        Self { config, client }
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
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

/// Marker and padded label for a counter line.
fn result_line(counter: Counter) -> (&'static str, &'static str) {
    match counter {
        Counter::Passed => ("\u{2705}", "PASSED:   "),
        Counter::Failed => ("\u{274C}", "FAILED:   "),
        Counter::Skipped => ("\u{23ED}\u{FE0F}", "SKIPPED:  "),
        Counter::Error => ("\u{1F4A5}", "ERROR:    "),
        Counter::XFailed => ("\u{26A0}\u{FE0F}", "XFailed: "),
        Counter::XPassed => ("\u{1F3AF}", "XPassed: "),
    }
}

/// Render the session summary as an HTML-formatted Telegram message.
///
/// The failure list is cut at a whole entry so the text stays within
/// [`MAX_MESSAGE_CHARS`]; the status and counters are always kept.
pub fn format_message(result: &TestResult, config: &TelegramConfig, exit_status: ExitStatus) -> String {
    let (marker, status) = if exit_status.is_success() {
        ("\u{2705}", "PASSED")
    } else {
        ("\u{274C}", "FAILED")
    };

    let mut lines = vec![format!(
        "\u{1F4E2} <b>{}</b>",
        escape_html(&config.message_prefix)
    )];
    if let Some(ref name) = config.test_name {
        lines.push(format!("\u{1F9EA} <b>Test Suite:</b> {}", escape_html(name)));
    }

    lines.push(String::new());
    lines.push(format!("{} <b>Status: {}</b>", marker, status));

    lines.push(String::new());
    lines.push("\u{1F4CA} <b>Results:</b>".to_string());
    for (counter, count) in summary_counts(result) {
        let (emoji, label) = result_line(counter);
        lines.push(format!("{} {}{}", emoji, label, count));
    }

    let mut message = lines.join("\n");

    let entries: Vec<String> = failure_entries(result, &config.display)
        .into_iter()
        .map(|(id, details)| {
            let mut entry = format!("\u{2022} <code>{}</code>", escape_html(id));
            if let Some(details) = details {
                entry.push_str(&format!("\n  <i>{}</i>", escape_html(details)));
            }
            entry
        })
        .collect();
    if !entries.is_empty() {
        append_details(&mut message, &entries);
    }

    message
}

/// `… and N more` line for entries that did not fit.
fn omitted_line(count: usize) -> String {
    format!("\u{2026} and {} more", count)
}

/// Chars needed after the last kept entry when `remaining` entries are left out.
fn omitted_len(remaining: usize) -> usize {
    if remaining == 0 {
        0
    } else {
        1 + omitted_line(remaining).chars().count()
    }
}

fn append_details(message: &mut String, entries: &[String]) {
    let heading = "\n\n\u{1F50D} <b>Failed Tests Details:</b>";
    let mut used = message.chars().count() + heading.chars().count();
    if used + omitted_len(entries.len()) > MAX_MESSAGE_CHARS {
        return;
    }
    message.push_str(heading);

    for (i, entry) in entries.iter().enumerate() {
        let entry_len = 1 + entry.chars().count();
        let remaining = entries.len() - i - 1;
        if used + entry_len + omitted_len(remaining) > MAX_MESSAGE_CHARS {
            message.push('\n');
            message.push_str(&omitted_line(entries.len() - i));
            return;
        }
        message.push('\n');
        message.push_str(entry);
        used += entry_len;
    }
}

#[async_trait]
impl AlertChannel for TelegramChannel {
    fn channel_type(&self) -> AlertChannelType {
        AlertChannelType::Telegram
    }

    fn request_body(&self, result: &TestResult, exit_status: ExitStatus) -> serde_json::Value {
        serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": format_message(result, &self.config, exit_status),
            "parse_mode": "HTML",
            "disable_web_page_preview": true
        })
    }

    async fn deliver(
        &self,
        result: &TestResult,
        exit_status: ExitStatus,
    ) -> Result<(), AlertError> {
        let body = self.request_body(result, exit_status);
        post_json(
            &self.client,
            &self.config.send_message_url(),
            &body,
            self.config.timeout(),
            "Telegram",
        )
        .await
    }
}
