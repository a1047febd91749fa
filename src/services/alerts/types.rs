//! Alert Core Types
//!
//! Types shared by the alert channels: channel identifiers, display flags,
//! delivery records, errors, and the counter/detail helpers both message
//! formats are built from.

use std::fmt;

use serde::{Deserialize, Serialize};
use test_alerts_core::TestResult;

/// Supported notification channel types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertChannelType {
    Slack,
    Telegram,
}

impl fmt::Display for AlertChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slack => write!(f, "slack"),
            Self::Telegram => write!(f, "telegram"),
        }
    }
}

/// Presentation flags shared by every destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Append the list of failed tests to the message.
    pub show_details: bool,
    /// Omit diagnostic text from the failed test list.
    pub hide_errors: bool,
}

/// One of the six outcome counters every message reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Passed,
    Failed,
    Skipped,
    Error,
    XFailed,
    XPassed,
}

impl Counter {
    /// All counters in message order.
    pub const ALL: [Counter; 6] = [
        Counter::Passed,
        Counter::Failed,
        Counter::Skipped,
        Counter::Error,
        Counter::XFailed,
        Counter::XPassed,
    ];

    pub fn count(&self, result: &TestResult) -> u64 {
        match self {
            Counter::Passed => result.passed,
            Counter::Failed => result.failed,
            Counter::Skipped => result.skipped,
            Counter::Error => result.error,
            Counter::XFailed => result.xfailed,
            Counter::XPassed => result.xpassed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Counter::Passed => "Passed",
            Counter::Failed => "Failed",
            Counter::Skipped => "Skipped",
            Counter::Error => "Error",
            Counter::XFailed => "XFailed",
            Counter::XPassed => "XPassed",
        }
    }
}

/// Counter/value pairs in message order.
pub fn summary_counts(result: &TestResult) -> [(Counter, u64); 6] {
    Counter::ALL.map(|counter| (counter, counter.count(result)))
}

/// Failed test identifiers to render, each with its diagnostic when errors are shown.
///
/// Empty unless `show_details` is set. Order follows `failed_tests`.
pub fn failure_entries<'a>(
    result: &'a TestResult,
    display: &DisplayOptions,
) -> Vec<(&'a str, Option<&'a str>)> {
    if !display.show_details {
        return Vec::new();
    }

    result
        .failed_tests
        .iter()
        .map(|id| {
            let details = if display.hide_errors {
                None
            } else {
                result.failure_details(id).filter(|d| !d.is_empty())
            };
            (id.as_str(), details)
        })
        .collect()
}

/// Delivery status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Success,
    Failed,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of one notification attempt on one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDelivery {
    pub channel_type: AlertChannelType,
    pub status: DeliveryStatus,
    pub error: Option<String>,
}

impl AlertDelivery {
    pub fn success(channel_type: AlertChannelType) -> Self {
        Self {
            channel_type,
            status: DeliveryStatus::Success,
            error: None,
        }
    }

    pub fn failed(channel_type: AlertChannelType, error: impl Into<String>) -> Self {
        Self {
            channel_type,
            status: DeliveryStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DeliveryStatus::Success
    }
}

/// Alert-specific errors
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// Missing or malformed destination settings.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport failure or non-2xx response.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl AlertError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<reqwest::Error> for AlertError {
    fn from(err: reqwest::Error) -> Self {
        // Telegram URLs embed the bot token
        let err = err.without_url();
        if err.is_timeout() {
            Self::HttpError(format!("request timed out: {}", err))
        } else {
            Self::HttpError(err.to_string())
        }
    }
}
