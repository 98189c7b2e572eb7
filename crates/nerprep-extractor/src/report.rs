//! NER mistake report
//!
//! Compares a fresh prediction with each gold document on token indices
//! and lists three kinds of mistakes: gold entities the model missed,
//! predictions with no gold counterpart, and entities whose boundaries
//! match but whose label does not.

use std::collections::BTreeSet;
use std::fmt;

use nerprep_core::{Doc, DocStore, Result};

use crate::EntityRecognizer;

/// Kind of NER mistake
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MistakeKind {
    /// Gold entity with no prediction on the same boundaries
    MissingPrediction,
    /// Prediction with no gold entity on the same boundaries
    WronglyPredicted,
    /// Gold entity predicted on the right boundaries with another label
    LabelNotCorrect,
}

impl fmt::Display for MistakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrediction => write!(f, "Missing prediction"),
            Self::WronglyPredicted => write!(f, "Wrongly predicted"),
            Self::LabelNotCorrect => write!(f, "Label not correct"),
        }
    }
}

/// One mistake; `label` is the gold label except for wrong predictions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mistake {
    pub kind: MistakeKind,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub label: String,
}

/// Mistakes found in one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMistakes {
    pub text: String,
    pub mistakes: Vec<Mistake>,
}

impl DocMistakes {
    pub fn count(&self, kind: MistakeKind) -> usize {
        self.mistakes.iter().filter(|m| m.kind == kind).count()
    }
}

impl fmt::Display for DocMistakes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.text.trim_end())?;
        for m in &self.mistakes {
            writeln!(f, "  {}: {} {} {} {}", m.kind, m.start, m.end, m.text, m.label)?;
        }
        Ok(())
    }
}

type Entry = (usize, usize, String, String);

fn entries(doc: &Doc) -> BTreeSet<Entry> {
    doc.ents()
        .iter()
        .map(|e| (e.start, e.end, doc.span_text(e), e.label.clone()))
        .collect()
}

/// Compare a prediction with its gold document
pub fn inspect_doc(gold: &Doc, predicted: &Doc) -> DocMistakes {
    let gold_ents = entries(gold);
    let pred_ents = entries(predicted);
    let unlabeled = |set: &BTreeSet<Entry>| -> BTreeSet<(usize, usize, String)> {
        set.iter()
            .map(|(s, e, t, _)| (*s, *e, t.clone()))
            .collect()
    };
    let gold_unlabeled = unlabeled(&gold_ents);
    let pred_unlabeled = unlabeled(&pred_ents);

    let mistake = |kind, (start, end, text, label): &Entry| Mistake {
        kind,
        start: *start,
        end: *end,
        text: text.clone(),
        label: label.clone(),
    };

    let mut mistakes = Vec::new();
    for entry in gold_ents.difference(&pred_ents) {
        if !pred_unlabeled.contains(&(entry.0, entry.1, entry.2.clone())) {
            mistakes.push(mistake(MistakeKind::MissingPrediction, entry));
        }
    }
    for entry in pred_ents.difference(&gold_ents) {
        if !gold_unlabeled.contains(&(entry.0, entry.1, entry.2.clone())) {
            mistakes.push(mistake(MistakeKind::WronglyPredicted, entry));
        }
    }
    for entry in gold_ents.difference(&pred_ents) {
        if pred_unlabeled.contains(&(entry.0, entry.1, entry.2.clone())) {
            mistakes.push(mistake(MistakeKind::LabelNotCorrect, entry));
        }
    }

    DocMistakes {
        text: gold.text().to_string(),
        mistakes,
    }
}

/// Mistakes over a whole gold collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MistakeReport {
    pub docs: Vec<DocMistakes>,
}

impl MistakeReport {
    /// Predict every gold text and collect mistakes
    pub fn build(recognizer: &dyn EntityRecognizer, gold: &DocStore) -> Result<Self> {
        let mut docs = Vec::with_capacity(gold.len());
        for gold_doc in gold.iter() {
            let predicted = recognizer.predict(gold_doc.text())?;
            docs.push(inspect_doc(gold_doc, &predicted));
        }
        Ok(Self { docs })
    }

    /// Total mistakes of one kind
    pub fn count(&self, kind: MistakeKind) -> usize {
        self.docs.iter().map(|d| d.count(kind)).sum()
    }
}

impl fmt::Display for MistakeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for doc in &self.docs {
            writeln!(f, "{doc}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nerprep_core::{GapPolicy, Span};

    fn doc(text: &str, ents: Vec<Span>) -> Doc {
        let mut doc = Doc::from_text(text);
        doc.set_ents(ents, GapPolicy::Outside).unwrap();
        doc
    }

    #[test]
    fn test_label_not_correct() {
        let gold = doc("Emerson met Smith.", vec![Span::new(0, 1, "PERSON")]);
        let pred = doc("Emerson met Smith.", vec![Span::new(0, 1, "ORG")]);
        let report = inspect_doc(&gold, &pred);

        assert_eq!(report.count(MistakeKind::LabelNotCorrect), 1);
        assert_eq!(report.count(MistakeKind::MissingPrediction), 0);
        assert_eq!(report.count(MistakeKind::WronglyPredicted), 0);
        assert_eq!(report.mistakes[0].label, "PERSON");
    }

    #[test]
    fn test_missing_and_wrong() {
        let gold = doc("Emerson met Smith.", vec![Span::new(2, 3, "PERSON")]);
        let pred = doc("Emerson met Smith.", vec![Span::new(0, 1, "PERSON")]);
        let report = inspect_doc(&gold, &pred);

        assert_eq!(
            report.mistakes,
            vec![
                Mistake {
                    kind: MistakeKind::MissingPrediction,
                    start: 2,
                    end: 3,
                    text: "Smith".to_string(),
                    label: "PERSON".to_string(),
                },
                Mistake {
                    kind: MistakeKind::WronglyPredicted,
                    start: 0,
                    end: 1,
                    text: "Emerson".to_string(),
                    label: "PERSON".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_perfect_prediction() {
        let gold = doc("Emerson met Smith.", vec![Span::new(0, 1, "PERSON")]);
        let report = inspect_doc(&gold, &gold.clone());
        assert!(report.mistakes.is_empty());
    }

    #[test]
    fn test_display_format() {
        let gold = doc("Emerson met Smith.", vec![Span::new(2, 3, "PERSON")]);
        let pred = doc("Emerson met Smith.", vec![]);
        let rendered = inspect_doc(&gold, &pred).to_string();
        assert_eq!(
            rendered,
            "Emerson met Smith.\n  Missing prediction: 2 3 Smith PERSON\n"
        );
    }
}
