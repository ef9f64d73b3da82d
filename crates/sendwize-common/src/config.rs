//! Configuration for Sendwize

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Consent auditor configuration
    #[serde(default)]
    pub consent: ConsentConfig,

    /// List hygiene configuration
    #[serde(default)]
    pub hygiene: HygieneConfig,

    /// Content auditor configuration
    #[serde(default)]
    pub content: ContentConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "json" or "text"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Consent auditor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentConfig {
    /// Batch size from which contacts are scored on the thread pool
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Number of months covered by the expiry timeline
    #[serde(default = "default_expiry_horizon_months")]
    pub expiry_horizon_months: u32,

    /// Years after which recorded consent is treated as lapsed
    #[serde(default = "default_consent_lifetime_years")]
    pub consent_lifetime_years: u32,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: default_parallel_threshold(),
            expiry_horizon_months: default_expiry_horizon_months(),
            consent_lifetime_years: default_consent_lifetime_years(),
        }
    }
}

fn default_parallel_threshold() -> usize {
    256
}

fn default_expiry_horizon_months() -> u32 {
    12
}

fn default_consent_lifetime_years() -> u32 {
    2
}

/// List hygiene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HygieneConfig {
    /// Number of duplicates included in the preview
    #[serde(default = "default_duplicate_preview")]
    pub duplicate_preview: usize,

    /// Number of invalid addresses included in the preview
    #[serde(default = "default_short_preview")]
    pub invalid_preview: usize,

    /// Number of role addresses included in the preview
    #[serde(default = "default_short_preview")]
    pub role_preview: usize,
}

impl Default for HygieneConfig {
    fn default() -> Self {
        Self {
            duplicate_preview: default_duplicate_preview(),
            invalid_preview: default_short_preview(),
            role_preview: default_short_preview(),
        }
    }
}

fn default_duplicate_preview() -> usize {
    20
}

fn default_short_preview() -> usize {
    10
}

/// Content auditor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Rule ids that are skipped during evaluation
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// Link count above which the body is flagged
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Serialized size in bytes above which the email is flagged (Gmail clipping)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            max_links: default_max_links(),
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_max_links() -> usize {
    15
}

fn default_max_bytes() -> usize {
    102_000
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from the default locations
    pub fn load() -> crate::Result<Self> {
        let paths = [
            PathBuf::from("./sendwize.toml"),
            PathBuf::from("/etc/sendwize/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(crate::Error::Config(
            "No configuration file found".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.consent.expiry_horizon_months, 12);
        assert_eq!(config.consent.consent_lifetime_years, 2);
        assert_eq!(config.hygiene.duplicate_preview, 20);
        assert_eq!(config.hygiene.invalid_preview, 10);
        assert_eq!(config.content.max_links, 15);
        assert_eq!(config.content.max_bytes, 102_000);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "debug"
format = "text"

[consent]
parallel_threshold = 10

[content]
disabled_rules = ["preheader_missing", "viewport_missing"]
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.consent.parallel_threshold, 10);
        assert_eq!(config.consent.expiry_horizon_months, 12);
        assert_eq!(
            config.content.disabled_rules,
            vec!["preheader_missing".to_string(), "viewport_missing".to_string()]
        );
        assert_eq!(config.hygiene.role_preview, 10);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hygiene]\nduplicate_preview = 5").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.hygiene.duplicate_preview, 5);
        assert_eq!(config.content.max_links, 15);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hygiene\nduplicate_preview = ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
