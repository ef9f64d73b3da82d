//! Error types for Sendwize

use thiserror::Error;

/// Main error type for Sendwize
///
/// Only malformed call arguments are fatal for an audit. Defects inside a
/// single record (missing dates, broken addresses) are scoring outcomes and
/// never surface here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Sendwize
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Input(_) => 400,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
            Error::Other(_) => 500,
        }
    }

    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Error::Input(_) => "INVALID_INPUT",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error was caused by the caller's arguments
    pub fn is_input(&self) -> bool {
        matches!(self, Error::Input(_))
    }
}
