//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Document numbering configuration.
    #[serde(default)]
    pub numbering: NumberingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Formatting of allocated document numbers.
///
/// The sequence allocator hands out bare integers; these settings turn them
/// into document numbers such as `CN-000042`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NumberingConfig {
    /// Prefix for customer invoice numbers.
    #[serde(default = "default_invoice_prefix")]
    pub invoice_prefix: String,
    /// Prefix for customer credit note numbers.
    #[serde(default = "default_credit_note_prefix")]
    pub credit_note_prefix: String,
    /// Prefix for customer refund numbers.
    #[serde(default = "default_refund_prefix")]
    pub refund_prefix: String,
    /// Minimum digit count; shorter values are left-padded with zeros.
    #[serde(default = "default_pad_width")]
    pub pad_width: usize,
}

fn default_invoice_prefix() -> String {
    "INV-".to_string()
}

fn default_credit_note_prefix() -> String {
    "CN-".to_string()
}

fn default_refund_prefix() -> String {
    "RF-".to_string()
}

fn default_pad_width() -> usize {
    6
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            invoice_prefix: default_invoice_prefix(),
            credit_note_prefix: default_credit_note_prefix(),
            refund_prefix: default_refund_prefix(),
            pad_width: default_pad_width(),
        }
    }
}

impl NumberingConfig {
    /// Formats an allocated sequence value with a prefix and zero padding.
    #[must_use]
    pub fn format(&self, prefix: &str, value: &str) -> String {
        format!("{prefix}{value:0>width$}", width = self.pad_width)
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("RECEIVA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
