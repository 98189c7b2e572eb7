//! Named Entity Recognition (NER) module
//!
//! Rule-based recognizer loaded from a JSON model artifact:
//! - Pattern rules: regex -> label with a fixed confidence
//! - Dictionary terms: case-insensitive whole-word matches with aliases
//!
//! Matches are resolved to token spans with strict alignment; matches that
//! do not fall on token boundaries are dropped.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{EntityRecognizer, ExtractedEntity};
use nerprep_core::{Doc, GapPolicy, NerprepError, Result, Span, Tokenizer};

const TERM_CONFIDENCE: f32 = 0.95;
const ALIAS_CONFIDENCE: f32 = 0.9;

// ============================================================================
// Model artifact
// ============================================================================

/// Serialized form of a rule-based model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Model name
    pub name: String,

    /// Span group key for incorrect spans
    #[serde(default)]
    pub incorrect_spans_key: Option<String>,

    /// Regex pattern rules
    #[serde(default)]
    pub patterns: Vec<PatternRule>,

    /// Dictionary terms
    #[serde(default)]
    pub terms: Vec<TermRule>,
}

/// Regex rule producing entities of one label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRule {
    pub pattern: String,
    pub label: String,
    pub confidence: f32,
}

/// Dictionary term with aliases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRule {
    pub term: String,
    pub label: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

// ============================================================================
// Rule-based NER
// ============================================================================

/// Rule-based NER using regex patterns and dictionaries
pub struct RuleBasedNer {
    name: String,
    incorrect_spans_key: Option<String>,
    /// Compiled rules (regex, label, confidence)
    rules: Vec<(Regex, String, f32)>,
    tokenizer: Tokenizer,
    /// Confidence threshold for accepting entities
    threshold: f32,
}

impl RuleBasedNer {
    /// Compile a model artifact
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        let mut rules = Vec::with_capacity(artifact.patterns.len() + artifact.terms.len());

        for rule in &artifact.patterns {
            let regex = Regex::new(&rule.pattern).map_err(|e| {
                NerprepError::ModelError(format!("invalid pattern {:?}: {e}", rule.pattern))
            })?;
            rules.push((regex, rule.label.clone(), rule.confidence.clamp(0.0, 1.0)));
        }

        for rule in &artifact.terms {
            rules.push((term_regex(&rule.term)?, rule.label.clone(), TERM_CONFIDENCE));
            for alias in &rule.aliases {
                rules.push((term_regex(alias)?, rule.label.clone(), ALIAS_CONFIDENCE));
            }
        }

        tracing::debug!(
            "Loaded model {} with {} rules",
            artifact.name,
            rules.len()
        );

        Ok(Self {
            name: artifact.name,
            incorrect_spans_key: artifact.incorrect_spans_key,
            rules,
            tokenizer: Tokenizer::default(),
            threshold: 0.0,
        })
    }

    /// Load and compile a JSON model artifact
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| NerprepError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&content)
            .map_err(|e| NerprepError::ModelError(format!("{}: {e}", path.display())))?;
        Self::from_artifact(artifact)
    }

    /// Set confidence threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Raw matches above the threshold, in character offsets
    pub fn extract(&self, text: &str) -> Vec<ExtractedEntity> {
        let char_offsets = CharOffsets::new(text);
        let mut entities = Vec::new();

        for (regex, label, confidence) in &self.rules {
            if *confidence < self.threshold {
                continue;
            }
            for mat in regex.find_iter(text) {
                if mat.start() == mat.end() {
                    continue;
                }
                entities.push(ExtractedEntity {
                    text: mat.as_str().to_string(),
                    entity_type: label.clone(),
                    start: char_offsets.to_char(mat.start()),
                    end: char_offsets.to_char(mat.end()),
                    confidence: *confidence,
                });
            }
        }

        entities
    }

    /// Keep the most confident of overlapping spans, earliest start on ties
    fn deduplicate(mut candidates: Vec<(Span, f32)>) -> Vec<Span> {
        candidates.sort_by(|(a, ca), (b, cb)| {
            cb.total_cmp(ca)
                .then(a.start.cmp(&b.start))
                .then(b.len().cmp(&a.len()))
        });

        let mut result: Vec<Span> = Vec::new();
        for (span, _) in candidates {
            if !result.iter().any(|kept| kept.overlaps(&span)) {
                result.push(span);
            }
        }

        result.sort_by_key(|s| s.start);
        result
    }
}

impl EntityRecognizer for RuleBasedNer {
    fn name(&self) -> &str {
        &self.name
    }

    fn incorrect_spans_key(&self) -> Option<&str> {
        self.incorrect_spans_key.as_deref()
    }

    fn predict(&self, text: &str) -> Result<Doc> {
        let mut doc = Doc::new(text, self.tokenizer.tokenize(text));

        let mut candidates = Vec::new();
        for entity in self.extract(text) {
            match doc.char_span(entity.start, entity.end, &entity.entity_type) {
                Some(span) => candidates.push((span, entity.confidence)),
                None => tracing::debug!(
                    "Dropping {} match {:?} at [{}, {}): not on token boundaries",
                    entity.entity_type,
                    entity.text,
                    entity.start,
                    entity.end
                ),
            }
        }

        doc.set_ents(Self::deduplicate(candidates), GapPolicy::Outside)?;
        Ok(doc)
    }
}

fn term_regex(term: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))
        .map_err(|e| NerprepError::ModelError(format!("invalid term {term:?}: {e}")))
}

/// Byte offset -> character offset lookup
struct CharOffsets {
    byte_starts: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        Self {
            byte_starts: text.char_indices().map(|(b, _)| b).collect(),
        }
    }

    fn to_char(&self, byte: usize) -> usize {
        match self.byte_starts.binary_search(&byte) {
            Ok(idx) | Err(idx) => idx,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nerprep_core::EntIob;

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            name: "toy".to_string(),
            incorrect_spans_key: None,
            patterns: vec![
                PatternRule {
                    pattern: r"\d{4}-\d{2}-\d{2}".to_string(),
                    label: "DATE".to_string(),
                    confidence: 0.9,
                },
                PatternRule {
                    pattern: r"[A-Z][a-z]+ Inc".to_string(),
                    label: "ORG".to_string(),
                    confidence: 0.6,
                },
            ],
            terms: vec![
                TermRule {
                    term: "Emerson".to_string(),
                    label: "PERSON".to_string(),
                    aliases: vec!["Ralph Waldo Emerson".to_string()],
                },
                TermRule {
                    term: "Acme".to_string(),
                    label: "ORG".to_string(),
                    aliases: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_rule_based_ner_patterns() {
        let ner = RuleBasedNer::from_artifact(artifact()).unwrap();
        let doc = ner.predict("Signed on 2024-03-01 by Emerson.").unwrap();

        let found: Vec<(String, String)> = doc
            .ents()
            .iter()
            .map(|s| (doc.span_text(s), s.label.clone()))
            .collect();
        assert!(found.contains(&("2024-03-01".to_string(), "DATE".to_string())));
        assert!(found.contains(&("Emerson".to_string(), "PERSON".to_string())));
        assert!(doc.has_complete_ner());
    }

    #[test]
    fn test_rule_based_ner_dictionary_case_insensitive() {
        let ner = RuleBasedNer::from_artifact(artifact()).unwrap();
        let doc = ner.predict("emerson spoke").unwrap();
        assert_eq!(doc.ents(), &[Span::new(0, 1, "PERSON")]);
    }

    #[test]
    fn test_word_boundaries() {
        let ner = RuleBasedNer::from_artifact(artifact()).unwrap();
        let doc = ner.predict("Emersonian prose").unwrap();
        assert!(doc.ents().is_empty());
        assert_eq!(doc.ent_iob(), &[EntIob::Outside, EntIob::Outside]);
    }

    #[test]
    fn test_overlap_keeps_highest_confidence() {
        let ner = RuleBasedNer::from_artifact(artifact()).unwrap();
        // "Acme Inc" (ORG pattern, 0.6) overlaps "Acme" (term, 0.95)
        let doc = ner.predict("Acme Inc hired Emerson").unwrap();
        assert_eq!(doc.ents()[0], Span::new(0, 1, "ORG"));
        assert_eq!(doc.span_text(&doc.ents()[0]), "Acme");
    }

    #[test]
    fn test_threshold_filters() {
        let ner = RuleBasedNer::from_artifact(artifact())
            .unwrap()
            .with_threshold(0.92);
        let ents = ner.extract("Ralph Waldo Emerson on 2024-03-01");
        assert!(ents.iter().all(|e| e.confidence >= 0.92));
        assert!(ents.iter().any(|e| e.text == "Emerson"));
        assert!(!ents.iter().any(|e| e.entity_type == "DATE"));
    }

    #[test]
    fn test_misaligned_match_dropped() {
        let mut model = artifact();
        model.patterns.push(PatternRule {
            pattern: "ers".to_string(),
            label: "X".to_string(),
            confidence: 1.0,
        });
        let ner = RuleBasedNer::from_artifact(model).unwrap();
        let doc = ner.predict("Emerson").unwrap();
        assert_eq!(doc.ents(), &[Span::new(0, 1, "PERSON")]);
    }

    #[test]
    fn test_char_offsets_non_ascii() {
        let ner = RuleBasedNer::from_artifact(artifact()).unwrap();
        let ents = ner.extract("Café Emerson");
        let emerson = ents.iter().find(|e| e.text == "Emerson").unwrap();
        assert_eq!((emerson.start, emerson.end), (5, 12));
    }

    #[test]
    fn test_invalid_pattern() {
        let mut model = artifact();
        model.patterns.push(PatternRule {
            pattern: "(unclosed".to_string(),
            label: "X".to_string(),
            confidence: 0.5,
        });
        assert!(matches!(
            RuleBasedNer::from_artifact(model),
            Err(NerprepError::ModelError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"name": "file_model", "incorrect_spans_key": "neg",
                "terms": [{"term": "Smith", "label": "PERSON"}]}"#,
        )
        .unwrap();

        let ner = RuleBasedNer::from_file(&path).unwrap();
        assert_eq!(ner.name(), "file_model");
        assert_eq!(ner.incorrect_spans_key(), Some("neg"));
        assert_eq!(ner.predict("Smith").unwrap().ents().len(), 1);
    }
}
