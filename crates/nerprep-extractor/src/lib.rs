//! nerprep Extractor - Training data preparation pipelines
//!
//! Implements the relation corpus builder (inline-markup benchmark to
//! annotated documents with relation maps), prediction/gold span
//! reconciliation, annotation variant generation and the NER mistake
//! report.

use nerprep_core::{Doc, Result};

/// Entity match in character offsets, before token alignment
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntity {
    pub text: String,
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

/// A pretrained entity recognizer
pub trait EntityRecognizer: Send + Sync {
    /// Model name for logging
    fn name(&self) -> &str;

    /// Span group key the model trains incorrect spans from, if it names one
    fn incorrect_spans_key(&self) -> Option<&str> {
        None
    }

    /// Tokenize `text` and annotate its entities
    fn predict(&self, text: &str) -> Result<Doc>;
}

pub mod annotate;
pub mod markup;
pub mod metrics;
pub mod ner;
pub mod reconcile;
pub mod relation;
pub mod report;
