//! Integration Tests Module
//!
//! End-to-end tests for alert delivery against mocked Slack and Telegram
//! endpoints, and for full test sessions driven by libtest output.

// Channel delivery tests (Slack webhook, Telegram Bot API)
mod channels_test;

// Session lifecycle and multi-destination dispatch tests
mod session_test;
