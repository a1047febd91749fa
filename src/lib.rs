//! Test Alerts
//!
//! Collects test outcomes during a session and sends a summary to Slack and
//! Telegram when it ends. It includes:
//! - Outcome accumulation (re-exported from `test-alerts-core`)
//! - libtest output parsing and session lifecycle
//! - Slack and Telegram channels behind one `AlertChannel` trait
//! - Option sources for CLI flags, environment variables, and config files

pub mod services;
pub mod storage;
pub mod utils;

pub use test_alerts_core::{ExitStatus, TestOutcome, TestResult};

pub use services::alerts::{
    AlertChannel, AlertChannelType, AlertDelivery, AlertError, AlertService, SlackConfig,
    TelegramConfig, TestSession,
};
pub use storage::{EnvOptions, FileOptions, LayeredOptions, OptionSource};
pub use utils::error::{AppError, AppResult};
