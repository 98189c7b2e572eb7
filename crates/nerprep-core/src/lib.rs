//! nerprep Core - Document model, alignment, storage and shared types
//!
//! This crate defines the core abstractions used throughout nerprep:
//! - Annotated documents (tokens, entity spans, IOB state, span groups)
//! - A rule-based tokenizer
//! - Cross-tokenization alignment and training examples
//! - The serialized document store
//! - Common error types
//! - Configuration management

pub mod align;
pub mod config;
pub mod doc;
pub mod store;
pub mod tokenizer;

pub use align::{Alignment, Example};
pub use config::{AppConfig, ConfigError, LoggingConfig, ModelConfig, ReconcileConfig, RelationConfig};
pub use doc::{Doc, EntIob, GapPolicy, Span, Token};
pub use store::DocStore;
pub use tokenizer::Tokenizer;

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for nerprep operations
#[derive(Error, Debug)]
pub enum NerprepError {
    #[error("Invalid input at line {line}: {reason}")]
    InvalidInput { line: usize, reason: String },

    #[error("Invalid markup: {0}")]
    InvalidMarkup(String),

    #[error("Invalid span: {0}")]
    InvalidSpan(String),

    #[error("Alignment error: {0}")]
    AlignmentError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("IO error on {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unsupported document store version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for NerprepError {
    fn from(e: ConfigError) -> Self {
        Self::ConfigError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NerprepError>;

// ============================================================================
// Tests
// ============================================================================
