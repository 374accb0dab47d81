use serde::{Deserialize, Serialize};
use thiserror::Error;

mod app_config;
mod config;
mod portal;

pub use app_config::{AppConfig, Environment, SinkConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use portal::PortalConfig;

/// Format string for the run timestamp shared by every record of one run.
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One extracted label/value pair plus the timestamp of the run that
/// produced it. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_lowercase_field_names() {
        let record = Record {
            timestamp: "2025-01-02 03:04:05".to_string(),
            label: "Flow".to_string(),
            value: "12.3".to_string(),
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains("\"timestamp\":\"2025-01-02 03:04:05\""));
        assert!(json.contains("\"label\":\"Flow\""));
        assert!(json.contains("\"value\":\"12.3\""));
    }
}
