//! Channel Delivery Integration Tests
//!
//! Each channel is pointed at an `httpmock` server and must report success
//! only for 2xx responses, never panicking on errors or timeouts.

use std::time::Duration;

use httpmock::prelude::*;

use test_alerts::services::alerts::channels::slack::SlackChannel;
use test_alerts::services::alerts::channels::telegram::TelegramChannel;
use test_alerts::services::alerts::DisplayOptions;
use test_alerts::{AlertChannel, AlertError, ExitStatus, SlackConfig, TelegramConfig, TestResult};

// ============================================================================
// Helper Functions
// ============================================================================

fn passing_result() -> TestResult {
    let mut result = TestResult::new();
    result.passed = 5;
    result
}

fn failing_result() -> TestResult {
    let mut result = TestResult::new();
    result.passed = 4;
    result.record_failed("test_x", "AssertionError: boom");
    result
}

fn show_details() -> DisplayOptions {
    DisplayOptions {
        show_details: true,
        hide_errors: false,
    }
}

fn slack_config(server: &MockServer) -> SlackConfig {
    let mut config = SlackConfig::new(server.url("/services/T/B/X"));
    config.display = show_details();
    config
}

fn telegram_config(server: &MockServer) -> TelegramConfig {
    let mut config = TelegramConfig::new("test_token", "test_chat_id");
    config.api_base = server.base_url();
    config.display = show_details();
    config
}

// ============================================================================
// Slack
// ============================================================================

#[tokio::test]
async fn slack_sends_passing_summary() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/services/T/B/X")
                .body_contains(r##""color":"#36a64f""##)
                .body_contains("Status=Passed")
                .body_contains("Passed=5");
            then.status(200).body("ok");
        })
        .await;

    let channel = SlackChannel::new(slack_config(&server));
    assert!(channel.send(&passing_result(), ExitStatus(0)).await);

    mock.assert_async().await;
}

#[tokio::test]
async fn slack_sends_failure_details() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/services/T/B/X")
                .body_contains(r##""color":"#dc3545""##)
                .body_contains("Status=Failed")
                .body_contains("Failed=1")
                .body_contains("test_x")
                .body_contains("AssertionError: boom");
            then.status(200);
        })
        .await;

    let channel = SlackChannel::new(slack_config(&server));
    assert!(channel.send(&failing_result(), ExitStatus(1)).await);

    mock.assert_async().await;
}

#[tokio::test]
async fn slack_bad_request_returns_false() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/services/T/B/X");
            then.status(400).body("invalid_payload");
        })
        .await;

    let channel = SlackChannel::new(slack_config(&server));
    assert!(!channel.send(&failing_result(), ExitStatus(1)).await);

    let err = channel
        .deliver(&failing_result(), ExitStatus(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AlertError::HttpError(_)));
    assert!(err.to_string().contains("HTTP 400"));
    assert!(err.to_string().contains("invalid_payload"));

    // exactly one request per call, no retries
    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn slack_timeout_returns_false() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/services/T/B/X");
            then.status(200).delay(Duration::from_secs(3));
        })
        .await;

    let mut config = slack_config(&server);
    config.timeout_secs = 1;
    let channel = SlackChannel::new(config);

    assert!(!channel.send(&passing_result(), ExitStatus(0)).await);
}

#[tokio::test]
async fn slack_connection_refused_returns_false() {
    let channel = SlackChannel::new(SlackConfig::new("http://127.0.0.1:1/hook"));
    assert!(!channel.send(&passing_result(), ExitStatus(0)).await);
}

// ============================================================================
// Telegram
// ============================================================================

#[tokio::test]
async fn telegram_sends_failure_summary() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bottest_token/sendMessage")
                .json_body_partial(r#"{"chat_id": "test_chat_id", "parse_mode": "HTML"}"#)
                .body_contains("Status: FAILED")
                .body_contains(" FAILED:   1")
                .body_contains("<code>test_x</code>")
                .body_contains("<i>AssertionError: boom</i>");
            then.status(200).json_body(serde_json::json!({ "ok": true }));
        })
        .await;

    let channel = TelegramChannel::new(telegram_config(&server));
    assert!(channel.send(&failing_result(), ExitStatus(1)).await);

    mock.assert_async().await;
}

#[tokio::test]
async fn telegram_bad_request_returns_false() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/bottest_token/sendMessage");
            then.status(400)
                .json_body(serde_json::json!({ "ok": false, "description": "Bad Request" }));
        })
        .await;

    let channel = TelegramChannel::new(telegram_config(&server));
    assert!(!channel.send(&passing_result(), ExitStatus(0)).await);

    mock.assert_async().await;
}

#[tokio::test]
async fn telegram_errors_do_not_leak_token() {
    let mut config = TelegramConfig::new("secret-token-123", "42");
    config.api_base = "http://127.0.0.1:1".to_string();
    let channel = TelegramChannel::new(config);

    let err = channel
        .deliver(&passing_result(), ExitStatus(0))
        .await
        .unwrap_err();
    assert!(!err.to_string().contains("secret-token-123"));
}
