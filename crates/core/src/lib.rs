//! Test Alerts Core
//!
//! Value types shared across the test-alerts workspace. This crate has no
//! dependency on HTTP, configuration, or runtime code.
//!
//! ## Module Organization
//!
//! - `result` - Outcome accumulator (`TestResult`, `TestOutcome`) and `ExitStatus`

pub mod result;

// ── Result Types ───────────────────────────────────────────────────────
pub use result::{ExitStatus, TestOutcome, TestResult};
