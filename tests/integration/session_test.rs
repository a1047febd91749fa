//! Session Integration Tests
//!
//! Drives whole sessions: options → service, libtest output → result,
//! session end → every configured destination.

use std::collections::HashMap;
use std::io::Write;

use httpmock::prelude::*;
use tempfile::NamedTempFile;

use test_alerts::{
    AlertChannelType, AlertService, ExitStatus, FileOptions, LayeredOptions, TestResult,
    TestSession,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn options(pairs: &[(&str, String)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

const LIBTEST_OUTPUT: &str = "\
running 3 tests
test math::adds ... ok
test math::divides ... FAILED
test net::fetches ... ignored, needs network

failures:

---- math::divides stdout ----
thread 'math::divides' panicked at src/math.rs:12:5:
attempt to divide by zero
note: run with `RUST_BACKTRACE=1` environment variable to display a backtrace


failures:
    math::divides

test result: FAILED. 1 passed; 1 failed; 1 ignored; 0 measured; 0 filtered out; finished in 0.01s
";

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn failing_destination_does_not_block_the_other() {
    let server = MockServer::start_async().await;
    let slack = server
        .mock_async(|when, then| {
            when.method(POST).path("/slack");
            then.status(500).body("internal error");
        })
        .await;
    let telegram = server
        .mock_async(|when, then| {
            when.method(POST).path("/bottoken/sendMessage");
            then.status(200).body(r#"{"ok":true}"#);
        })
        .await;

    let service = AlertService::from_options(&options(&[
        ("slack_webhook", server.url("/slack")),
        ("telegram_bot_token", "token".to_string()),
        ("telegram_chat_id", "42".to_string()),
        ("telegram_api_url", server.base_url()),
    ]));
    assert_eq!(
        service.channel_types(),
        vec![AlertChannelType::Slack, AlertChannelType::Telegram]
    );

    let mut result = TestResult::new();
    result.passed = 3;
    let deliveries = service.notify(&result, ExitStatus(0)).await;

    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0].channel_type, AlertChannelType::Slack);
    assert!(!deliveries[0].is_success());
    assert!(deliveries[0].error.as_deref().unwrap().contains("HTTP 500"));
    assert_eq!(deliveries[1].channel_type, AlertChannelType::Telegram);
    assert!(deliveries[1].is_success());

    slack.assert_async().await;
    telegram.assert_async().await;
}

#[tokio::test]
async fn session_output_reaches_slack() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/hook")
                .body_contains("Test Suite: unit")
                .body_contains("Status=Failed")
                .body_contains("Passed=1")
                .body_contains("Failed=1")
                .body_contains("Skipped=1")
                .body_contains("math::divides")
                .body_contains("attempt to divide by zero");
            then.status(200);
        })
        .await;

    let service = AlertService::from_options(&options(&[
        ("slack_webhook", server.url("/hook")),
        ("slack_test_name", "unit".to_string()),
        ("show_details", "true".to_string()),
    ]));

    let mut session = TestSession::new("cargo test");
    for line in LIBTEST_OUTPUT.lines() {
        session.observe_line(line);
    }
    let deliveries = session.finish_and_notify(ExitStatus(101), &service).await;

    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].is_success());
    mock.assert_async().await;
}

#[tokio::test]
async fn hidden_errors_keep_only_identifiers() {
    let server = MockServer::start_async().await;
    let with_cause = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bottoken/sendMessage")
                .body_contains("attempt to divide by zero");
            then.status(200);
        })
        .await;
    let without_cause = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bottoken/sendMessage")
                .body_contains("<code>math::divides</code>");
            then.status(200);
        })
        .await;

    let service = AlertService::from_options(&options(&[
        ("telegram_bot_token", "token".to_string()),
        ("telegram_chat_id", "42".to_string()),
        ("telegram_api_url", server.base_url()),
        ("show_details", "yes".to_string()),
        ("hide_errors", "yes".to_string()),
    ]));

    let mut session = TestSession::new("cargo test");
    for line in LIBTEST_OUTPUT.lines() {
        session.observe_line(line);
    }
    let deliveries = session.finish_and_notify(ExitStatus(101), &service).await;

    assert!(deliveries[0].is_success());
    with_cause.assert_hits_async(0).await;
    without_cause.assert_async().await;
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn config_file_and_blocking_notify() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/from-file")
            .body_contains("Nightly")
            .body_contains("Status=Passed");
        then.status(204);
    });

    let mut file = NamedTempFile::new().unwrap();
    let json = serde_json::json!({
        "slack_webhook": server.url("/from-file"),
        "slack_message_prefix": "Nightly",
        "slack_timeout": 5
    });
    file.write_all(json.to_string().as_bytes()).unwrap();

    // command line layer overrides the file's prefix only when set
    let cli = options(&[("slack_message_prefix", String::new())]);
    let layered = LayeredOptions::new()
        .with_layer(cli)
        .with_layer(FileOptions::load(file.path()).unwrap());
    let service = AlertService::from_options(&layered);

    let mut result = TestResult::new();
    result.passed = 10;
    let deliveries = service.notify_blocking(&result, ExitStatus::from_result(&result));

    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].is_success());
    mock.assert();
}

#[test]
fn invalid_destination_is_dropped() {
    let service = AlertService::from_options(&options(&[
        ("slack_webhook", "https://hooks.test/x".to_string()),
        ("slack_timeout", "soon".to_string()),
        ("telegram_chat_id", "42".to_string()),
    ]));
    assert!(service.is_empty());
}
