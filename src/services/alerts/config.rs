//! Destination Configuration
//!
//! Validated connection settings for each alert destination, built from raw
//! option values. Construction fails with `AlertError::InvalidConfig` when a
//! mandatory credential is missing or a value cannot be parsed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::config::OptionSource;

use super::types::{AlertError, DisplayOptions};

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// First line of every message unless overridden.
pub const DEFAULT_MESSAGE_PREFIX: &str = "Test Run";

/// Telegram Bot API base URL.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Slack incoming webhook settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub message_prefix: String,
    pub test_name: Option<String>,
    pub timeout_secs: u64,
    pub display: DisplayOptions,
}

impl SlackConfig {
    /// Settings with defaults for everything but the webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
            test_name: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            display: DisplayOptions::default(),
        }
    }

    /// Build from `slack_*` options plus the shared display flags.
    pub fn from_options(options: &dyn OptionSource) -> Result<Self, AlertError> {
        let webhook_url = first_option(options, &["slack_webhook", "slack_hook"])
            .ok_or_else(|| AlertError::invalid_config("Slack webhook URL is required"))?;

        Ok(Self {
            webhook_url,
            message_prefix: options
                .option("slack_message_prefix")
                .unwrap_or_else(|| DEFAULT_MESSAGE_PREFIX.to_string()),
            test_name: first_option(options, &["slack_test_name", "slack_suite_name"]),
            timeout_secs: parse_timeout(options, "slack_timeout")?,
            display: display_from_options(options)?,
        })
    }

    /// Whether any Slack option is present at all.
    pub fn is_requested(options: &dyn OptionSource) -> bool {
        first_option(options, &["slack_webhook", "slack_hook"]).is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token. Excluded from serialization so it never lands in logs.
    #[serde(skip_serializing, default)]
    pub bot_token: String,
    pub chat_id: String,
    pub message_prefix: String,
    pub test_name: Option<String>,
    pub timeout_secs: u64,
    pub api_base: String,
    pub display: DisplayOptions,
}

impl TelegramConfig {
    /// Settings with defaults for everything but the credentials.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            message_prefix: DEFAULT_MESSAGE_PREFIX.to_string(),
            test_name: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_base: TELEGRAM_API_BASE.to_string(),
            display: DisplayOptions::default(),
        }
    }

    /// Build from `telegram_*` options plus the shared display flags.
    pub fn from_options(options: &dyn OptionSource) -> Result<Self, AlertError> {
        let bot_token = options
            .option("telegram_bot_token")
            .ok_or_else(|| AlertError::invalid_config("Telegram bot token is required"))?;
        let chat_id = options
            .option("telegram_chat_id")
            .ok_or_else(|| AlertError::invalid_config("Telegram chat id is required"))?;

        Ok(Self {
            bot_token,
            chat_id,
            message_prefix: options
                .option("telegram_message_prefix")
                .unwrap_or_else(|| DEFAULT_MESSAGE_PREFIX.to_string()),
            test_name: first_option(options, &["telegram_test_name", "telegram_suite_name"]),
            timeout_secs: parse_timeout(options, "telegram_timeout")?,
            api_base: options
                .option("telegram_api_url")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| TELEGRAM_API_BASE.to_string()),
            display: display_from_options(options)?,
        })
    }

    /// Whether any Telegram credential is present at all.
    pub fn is_requested(options: &dyn OptionSource) -> bool {
        options.option("telegram_bot_token").is_some() || options.option("telegram_chat_id").is_some()
    }

    /// `sendMessage` endpoint with the bot token embedded.
    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Shared `show_details` / `hide_errors` flags.
pub fn display_from_options(options: &dyn OptionSource) -> Result<DisplayOptions, AlertError> {
    Ok(DisplayOptions {
        show_details: parse_flag(options, "show_details")?,
        hide_errors: parse_flag(options, "hide_errors")?,
    })
}

fn first_option(options: &dyn OptionSource, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| options.option(name))
}

fn parse_timeout(options: &dyn OptionSource, name: &str) -> Result<u64, AlertError> {
    match options.option(name) {
        None => Ok(DEFAULT_TIMEOUT_SECS),
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(AlertError::invalid_config(format!(
                "{} must be a positive number of seconds, got '{}'",
                name, raw
            ))),
        },
    }
}

fn parse_flag(options: &dyn OptionSource, name: &str) -> Result<bool, AlertError> {
    let Some(raw) = options.option(name) else {
        return Ok(false);
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AlertError::invalid_config(format!(
            "{} must be a boolean, got '{}'",
            name, raw
        ))),
    }
}
