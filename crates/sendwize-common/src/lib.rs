//! Sendwize Common - Shared types and utilities
//!
//! This crate provides the value types, configuration, error type and
//! logging bootstrap shared by the audit engines.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
