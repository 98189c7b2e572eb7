//! Quality Metrics module
//!
//! Precision, recall and F1 for a recognizer, computed from the
//! correct / incorrect / missing span counts of reconciliation.

use serde::{Deserialize, Serialize};

use crate::reconcile::SpanClassification;

// ============================================================================
// Entity Metrics
// ============================================================================

/// Metrics for entity extraction evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetrics {
    /// True positives (correct predictions)
    pub true_positives: usize,
    /// False positives (incorrect predictions)
    pub false_positives: usize,
    /// False negatives (missed gold entities)
    pub false_negatives: usize,
}

impl EntityMetrics {
    /// Counts from one document's classification
    pub fn from_classification(classification: &SpanClassification) -> Self {
        Self {
            true_positives: classification.correct.len(),
            false_positives: classification.incorrect.len(),
            false_negatives: classification.missing.len(),
        }
    }

    /// Total entities in gold standard
    pub fn gold_total(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    /// Total entities predicted
    pub fn predicted_total(&self) -> usize {
        self.true_positives + self.false_positives
    }

    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f32 {
        if self.predicted_total() == 0 {
            0.0
        } else {
            self.true_positives as f32 / self.predicted_total() as f32
        }
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f32 {
        if self.gold_total() == 0 {
            0.0
        } else {
            self.true_positives as f32 / self.gold_total() as f32
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    fn add(&mut self, other: &EntityMetrics) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

// ============================================================================
// Aggregate Metrics
// ============================================================================

/// Aggregate metrics for a batch of documents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub entity_metrics: EntityMetrics,
    pub num_documents: usize,
}

impl AggregateMetrics {
    /// Add one document's classification
    pub fn add(&mut self, classification: &SpanClassification) {
        self.entity_metrics
            .add(&EntityMetrics::from_classification(classification));
        self.num_documents += 1;
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        format!(
            "=== Reconciliation Report ===\n\n\
             Documents evaluated: {}\n\n\
             Entity Recognition:\n\
               Precision: {:.1}%\n\
               Recall:    {:.1}%\n\
               F1 Score:  {:.1}%\n\
               Gold: {} | Predicted: {} | Correct: {} | Incorrect: {} | Missing: {}\n",
            self.num_documents,
            self.entity_metrics.precision() * 100.0,
            self.entity_metrics.recall() * 100.0,
            self.entity_metrics.f1_score() * 100.0,
            self.entity_metrics.gold_total(),
            self.entity_metrics.predicted_total(),
            self.entity_metrics.true_positives,
            self.entity_metrics.false_positives,
            self.entity_metrics.false_negatives,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
