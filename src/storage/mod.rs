//! Storage Layer
//!
//! Configuration sources for the alert destinations.

pub mod config;

pub use config::{EnvOptions, FileOptions, LayeredOptions, OptionSource, ENV_PREFIX};
