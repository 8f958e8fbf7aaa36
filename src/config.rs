//! Configuration management for the salary prediction service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub bundle: BundleConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming prediction requests
    pub request_subject: String,
    /// Subject for outgoing replies when a request carries no reply inbox
    pub estimate_subject: String,
}

/// Model bundle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
    /// Directory containing bundle.json and the ONNX model file
    pub dir: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Display configuration
///
/// The multiplier converts the model's native output unit into the unit
/// shown to consumers. 1.0 leaves the output untouched; 12.0 is the
/// calendar monthly-to-annual conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Currency symbol for formatted log output
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_currency() -> String {
    "₹".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            multiplier: default_multiplier(),
            currency: default_currency(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Maximum concurrent in-flight requests
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Metrics summary interval in seconds
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_workers() -> usize {
    4
}

fn default_report_interval() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            report_interval_secs: default_report_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "salary.requests".to_string(),
                estimate_subject: "salary.estimates".to_string(),
            },
            bundle: BundleConfig {
                dir: "bundle".to_string(),
                onnx_threads: 1,
            },
            display: DisplayConfig::default(),
            service: ServiceConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.request_subject, "salary.requests");
        assert_eq!(config.bundle.dir, "bundle");
        assert_eq!(config.display.multiplier, 1.0);
        assert_eq!(config.service.workers, 4);
    }

    #[test]
    fn test_display_defaults() {
        let display = DisplayConfig::default();
        // Model-native unit unless the operator configures a conversion.
        assert_eq!(display.multiplier, 1.0);
        assert_eq!(display.currency, "₹");
    }
}
