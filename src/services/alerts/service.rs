//! Alert Service
//!
//! Holds the configured channels and delivers the session summary to each of
//! them in turn. A failing channel never affects the others.

use test_alerts_core::{ExitStatus, TestResult};

use crate::storage::config::OptionSource;

use super::channels::slack::SlackChannel;
use super::channels::telegram::TelegramChannel;
use super::channels::AlertChannel;
use super::config::{SlackConfig, TelegramConfig};
use super::types::*;

/// Sequential dispatcher over the configured alert channels.
#[derive(Default)]
pub struct AlertService {
    channels: Vec<Box<dyn AlertChannel>>,
}

impl AlertService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel. Channels are notified in registration order.
    pub fn with_channel(mut self, channel: impl AlertChannel + 'static) -> Self {
        self.channels.push(Box::new(channel));
        self
    }

    /// Build every destination the options ask for.
    ///
    /// A destination with no credentials at all is silently left out. One whose
    /// settings are invalid is logged and left out; the others still load.
    pub fn from_options(options: &dyn OptionSource) -> Self {
        let mut service = Self::new();

        if SlackConfig::is_requested(options) {
            match SlackConfig::from_options(options) {
                Ok(config) => service = service.with_channel(SlackChannel::new(config)),
                Err(e) => tracing::warn!("Slack notifications disabled: {}", e),
            }
        } else {
            tracing::debug!("Slack notifications not configured");
        }

        if TelegramConfig::is_requested(options) {
            match TelegramConfig::from_options(options) {
                Ok(config) => service = service.with_channel(TelegramChannel::new(config)),
                Err(e) => tracing::warn!("Telegram notifications disabled: {}", e),
            }
        } else {
            tracing::debug!("Telegram notifications not configured");
        }

        service
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn channel_types(&self) -> Vec<AlertChannelType> {
        self.channels.iter().map(|c| c.channel_type()).collect()
    }

    /// Deliver the summary to every channel, one after another.
    pub async fn notify(&self, result: &TestResult, exit_status: ExitStatus) -> Vec<AlertDelivery> {
        let mut deliveries = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let channel_type = channel.channel_type();
            let delivery = match channel.deliver(result, exit_status).await {
                Ok(()) => {
                    tracing::debug!("{} notification sent", channel_type);
                    AlertDelivery::success(channel_type)
                }
                Err(e) => {
                    tracing::warn!("Failed to send {} notification: {}", channel_type, e);
                    AlertDelivery::failed(channel_type, e.to_string())
                }
            };
            deliveries.push(delivery);
        }

        deliveries
    }

    /// Blocking form of [`AlertService::notify`] for synchronous callers.
    ///
    /// Must not be called from inside a tokio runtime.
    pub fn notify_blocking(&self, result: &TestResult, exit_status: ExitStatus) -> Vec<AlertDelivery> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();

        match runtime {
            Ok(runtime) => runtime.block_on(self.notify(result, exit_status)),
            Err(e) => {
                let err = AlertError::RuntimeError(e.to_string());
                tracing::warn!("Cannot send notifications: {}", err);
                self.channels
                    .iter()
                    .map(|c| AlertDelivery::failed(c.channel_type(), err.to_string()))
                    .collect()
            }
        }
    }
}

impl std::fmt::Debug for AlertService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertService")
            .field("channels", &self.channel_types())
            .finish()
    }
}
