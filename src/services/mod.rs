//! Services
//!
//! Alert delivery and the HTTP plumbing it needs.

pub mod alerts;
pub mod http_client;

pub use alerts::{AlertService, TestSession};
