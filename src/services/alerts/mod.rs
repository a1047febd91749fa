//! Test Session Alerts
//!
//! Sends a summary of a finished test session to chat destinations. Supports
//! Slack incoming webhooks and the Telegram Bot API.

pub mod channels;
pub mod config;
pub mod integration;
pub mod service;
pub mod types;

pub use channels::AlertChannel;
pub use config::{SlackConfig, TelegramConfig};
pub use integration::{LibtestParser, TestSession};
pub use service::AlertService;
pub use types::*;
