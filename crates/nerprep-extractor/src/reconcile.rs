//! Prediction/gold span reconciliation
//!
//! Classifies a model's predicted entities against gold annotations that
//! were projected onto the prediction's tokenization, then writes the
//! selected spans back onto the predicted document for training:
//! correct and missing spans become entities with unknown gaps, incorrect
//! spans go into a span group.

use nerprep_core::{Doc, DocStore, Example, GapPolicy, ReconcileConfig, Result, Span};

use crate::metrics::AggregateMetrics;
use crate::EntityRecognizer;

// ============================================================================
// Classification
// ============================================================================

/// Correct / incorrect / missing spans of one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanClassification {
    /// Predicted spans matching a gold span on label and range
    pub correct: Vec<Span>,
    /// Predicted spans with no matching gold span
    pub incorrect: Vec<Span>,
    /// Gold spans with no matching prediction
    pub missing: Vec<Span>,
}

impl SpanClassification {
    /// True when the prediction reproduced the gold annotation
    pub fn is_exact(&self) -> bool {
        self.incorrect.is_empty() && self.missing.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.correct.is_empty() && self.incorrect.is_empty() && self.missing.is_empty()
    }
}

/// Classify the predicted entities of an example against its gold entities
///
/// Matching is one-to-one: a gold span is consumed by the first prediction
/// equal to it. A reference without complete entity annotation yields an
/// empty classification.
pub fn classify_spans(example: &Example) -> SpanClassification {
    if !example.reference().has_complete_ner() {
        return SpanClassification::default();
    }

    let mut pending = example.aligned_spans_y2x(example.reference().ents());
    let mut classification = SpanClassification::default();

    for pred in example.predicted().ents() {
        match pending.iter().position(|gold| gold == pred) {
            Some(idx) => {
                pending.remove(idx);
                classification.correct.push(pred.clone());
            }
            None => classification.incorrect.push(pred.clone()),
        }
    }

    classification.missing = pending;
    classification
}

// ============================================================================
// Reconciler
// ============================================================================

/// Outcome of reconciling a whole corpus
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// Documents with at least one retained span
    pub docs: DocStore,
    /// Counts over every classified document
    pub metrics: AggregateMetrics,
    /// Documents dropped because nothing was retained
    pub dropped: usize,
    /// Gold documents without complete entity annotation
    pub incomplete: usize,
}

/// Applies a `ReconcileConfig` to examples
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Span group key: the model's own key wins over the configured one
    pub fn incorrect_key<'a>(&'a self, recognizer: &'a dyn EntityRecognizer) -> &'a str {
        self.config.incorrect_key(recognizer.incorrect_spans_key())
    }

    /// Write the retained spans of `classification` onto the predicted doc
    ///
    /// Returns `None` when no span of any kept category remains. The
    /// incorrect span group is only written when the prediction has mistakes.
    pub fn apply(
        &self,
        example: Example,
        classification: &SpanClassification,
        incorrect_key: &str,
    ) -> Result<Option<Doc>> {
        let mut ents = Vec::new();
        if self.config.keep_correct {
            ents.extend(classification.correct.iter().cloned());
        }
        if self.config.keep_missing {
            ents.extend(classification.missing.iter().cloned());
        }
        let incorrect = if self.config.keep_incorrect {
            classification.incorrect.clone()
        } else {
            Vec::new()
        };

        if ents.is_empty() && incorrect.is_empty() {
            return Ok(None);
        }

        let policy = if self.config.outside_when_exact && classification.is_exact() {
            GapPolicy::Outside
        } else {
            GapPolicy::Missing
        };

        let mut doc = example.into_predicted();
        doc.set_ents(ents, policy)?;
        if self.config.keep_incorrect && !classification.is_exact() {
            doc.set_span_group(incorrect_key, incorrect)?;
        }
        Ok(Some(doc))
    }

    /// Predict over every gold document and reconcile the results
    pub fn reconcile_corpus(
        &self,
        recognizer: &dyn EntityRecognizer,
        gold: DocStore,
    ) -> Result<ReconcileOutcome> {
        let incorrect_key = self.incorrect_key(recognizer).to_string();
        let mut outcome = ReconcileOutcome::default();

        for reference in gold {
            if !reference.has_complete_ner() {
                tracing::debug!(
                    "Skipping reference without complete entity annotation: {:?}",
                    reference.text()
                );
                outcome.incomplete += 1;
                continue;
            }

            let predicted = recognizer.predict(reference.text())?;
            let example = Example::new(predicted, reference)?;
            let classification = classify_spans(&example);
            outcome.metrics.add(&classification);

            match self.apply(example, &classification, &incorrect_key)? {
                Some(doc) => outcome.docs.add(doc),
                None => outcome.dropped += 1,
            }
        }

        tracing::info!(
            "Reconciled {} documents with {}: kept {}, dropped {}, skipped {} incomplete",
            outcome.metrics.num_documents,
            recognizer.name(),
            outcome.docs.len(),
            outcome.dropped,
            outcome.incomplete
        );

        Ok(outcome)
    }
}

// ============================================================================
// Tests
// ============================================================================
