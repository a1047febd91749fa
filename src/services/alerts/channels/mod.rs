//! Alert Channel Trait
//!
//! Defines the async trait both destination implementations satisfy, plus the
//! POST helper they share.

pub mod slack;
pub mod telegram;

use std::time::Duration;

use async_trait::async_trait;
use test_alerts_core::{ExitStatus, TestResult};

use super::types::{AlertChannelType, AlertError};

/// Async trait for alert channel implementations.
///
/// Each channel owns its validated config and an HTTP client, formats the
/// session summary into its platform's payload, and sends it with exactly one
/// request.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    /// Channel type identifier.
    fn channel_type(&self) -> AlertChannelType;

    /// JSON request body for the given session outcome.
    fn request_body(&self, result: &TestResult, exit_status: ExitStatus) -> serde_json::Value;

    /// Send the summary, keeping the failure reason.
    async fn deliver(&self, result: &TestResult, exit_status: ExitStatus)
        -> Result<(), AlertError>;

    /// Send the summary. Returns `false` on any failure; nothing propagates.
    async fn send(&self, result: &TestResult, exit_status: ExitStatus) -> bool {
        match self.deliver(result, exit_status).await {
            Ok(()) => {
                tracing::debug!("{} notification sent", self.channel_type());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to send {} notification: {}", self.channel_type(), e);
                false
            }
        }
    }
}

/// POST `body` as JSON to `url`. Any non-2xx status is an error.
pub(crate) async fn post_json(
    client: &reqwest::Client,
    url: &str,
    body: &serde_json::Value,
    timeout: Duration,
    platform: &str,
) -> Result<(), AlertError> {
    let response = client.post(url).timeout(timeout).json(body).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(AlertError::HttpError(format!(
            "{} returned HTTP {}: {}",
            platform, status, body
        )));
    }

    Ok(())
}
