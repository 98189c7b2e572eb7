//! nerprep Configuration Management
//!
//! Handles configuration from config files, environment variables
//! and command-line arguments with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Label used for the incorrect-span group when the model does not name one
pub const DEFAULT_INCORRECT_KEY: &str = "incorrect_spans";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Relation corpus builder configuration
    pub relation: RelationConfig,

    /// Prediction/gold reconciliation configuration
    pub reconcile: ReconcileConfig,

    /// Entity recognizer configuration
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Load from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_override()
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            self.logging.json_format = parse_bool("LOG_JSON", &json)?;
        }

        // Reconciliation
        if let Ok(key) = std::env::var("INCORRECT_SPANS_KEY") {
            if key.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "INCORRECT_SPANS_KEY".to_string(),
                    value: key,
                });
            }
            self.reconcile.incorrect_spans_key = key;
        }

        // Model
        if let Ok(threshold) = std::env::var("NER_THRESHOLD") {
            self.model.threshold = parse_threshold("NER_THRESHOLD", &threshold)?;
        }

        Ok(self)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a probability threshold in `[0.0, 1.0]`
pub fn parse_threshold(key: &str, value: &str) -> Result<f32, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };
    let threshold: f32 = value.trim().parse().map_err(|_| invalid())?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(invalid());
    }
    Ok(threshold)
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Relation corpus builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationConfig {
    /// Label given to both marked entities
    pub entity_label: String,

    /// Relation label that applies to both directions of a pair
    pub symmetric_label: String,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            entity_label: "Entity".to_string(),
            symmetric_label: "Other".to_string(),
        }
    }
}

/// Prediction/gold reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Keep correctly predicted spans as entities
    pub keep_correct: bool,

    /// Keep incorrect predictions in the incorrect span group
    pub keep_incorrect: bool,

    /// Keep gold spans the model missed as entities
    pub keep_missing: bool,

    /// Span group key for incorrect predictions
    pub incorrect_spans_key: String,

    /// Mark gaps as outside when the prediction is entirely correct
    pub outside_when_exact: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            keep_correct: true,
            keep_incorrect: true,
            keep_missing: false,
            incorrect_spans_key: DEFAULT_INCORRECT_KEY.to_string(),
            outside_when_exact: true,
        }
    }
}

impl ReconcileConfig {
    /// Span group key for incorrect spans; a model's own key wins
    pub fn incorrect_key<'a>(&'a self, model_key: Option<&'a str>) -> &'a str {
        model_key.unwrap_or(&self.incorrect_spans_key)
    }
}

/// Entity recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModelConfig {
    /// Predictions below this confidence are discarded
    pub threshold: f32,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
