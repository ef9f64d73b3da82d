//! Tracing subscriber bootstrap

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns an error
/// when a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(&config.level)))
        .map_err(|e| crate::Error::Config(format!("Invalid log level: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_level(true))
            .try_init()
    };

    result.map_err(|e| crate::Error::Config(format!("Failed to install logger: {}", e)))
}

fn directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        "info,sendwize=debug".to_string()
    } else {
        level.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_default() {
        assert_eq!(directives(""), "info,sendwize=debug");
        assert_eq!(directives(" warn "), "warn");
    }

    #[test]
    fn test_second_install_fails() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: "text".to_string(),
        };
        // Another test may have installed a subscriber first; only the
        // second call in this test is guaranteed to fail.
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
