//! HTTP Client Factory
//!
//! Builds the `reqwest::Client` shared by the alert channels.

use std::time::Duration;

/// User agent sent with every notification request.
pub const USER_AGENT: &str = concat!("test-alerts/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` whose connect phase is bounded by `timeout`.
///
/// The full request timeout is applied per request by the channels. Falls back
/// to a default client if the builder cannot be initialised.
pub fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Falling back to default HTTP client: {}", err);
            reqwest::Client::new()
        })
}
