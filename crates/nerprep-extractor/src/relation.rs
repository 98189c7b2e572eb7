//! Relation corpus builder
//!
//! Turns a four-line-per-instance relation benchmark into documents with
//! two `Entity` spans and a dense relation label matrix between them.
//!
//! ```text
//! 8001\t"<e1>Emerson</e1> met <e2>Smith</e2>."
//! Cause-Effect(e1,e2)
//! Comment: example instance
//! <blank>
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::markup::{parse_inline_entities, parse_sentence_line};
use nerprep_core::{Doc, DocStore, GapPolicy, NerprepError, RelationConfig, Result, Tokenizer};

const LINES_PER_INSTANCE: usize = 4;

// ============================================================================
// Relation map
// ============================================================================

/// Ordered pair of entity start-token indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityPair {
    pub head: usize,
    pub tail: usize,
}

impl EntityPair {
    pub fn new(head: usize, tail: usize) -> Self {
        Self { head, tail }
    }

    /// Same pair in the opposite direction
    pub fn reversed(self) -> Self {
        Self::new(self.tail, self.head)
    }
}

/// Serialized form of one relation map entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationEntry {
    pair: EntityPair,
    labels: BTreeMap<String, f32>,
}

/// Entity pair -> relation label -> 1.0 (present) / 0.0 (absent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<RelationEntry>", into = "Vec<RelationEntry>")]
pub struct RelationMap {
    entries: BTreeMap<EntityPair, BTreeMap<String, f32>>,
}

impl From<Vec<RelationEntry>> for RelationMap {
    fn from(entries: Vec<RelationEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.pair, e.labels)).collect(),
        }
    }
}

impl From<RelationMap> for Vec<RelationEntry> {
    fn from(map: RelationMap) -> Self {
        map.entries
            .into_iter()
            .map(|(pair, labels)| RelationEntry { pair, labels })
            .collect()
    }
}

impl RelationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a label value for a pair, creating the pair if needed
    pub fn set(&mut self, pair: EntityPair, label: impl Into<String>, value: f32) {
        self.entries
            .entry(pair)
            .or_default()
            .insert(label.into(), value);
    }

    /// Create an empty label vector for a pair if it has none
    pub fn ensure(&mut self, pair: EntityPair) {
        self.entries.entry(pair).or_default();
    }

    pub fn get(&self, pair: EntityPair, label: &str) -> Option<f32> {
        self.entries.get(&pair)?.get(label).copied()
    }

    /// Label vector for a pair
    pub fn labels(&self, pair: EntityPair) -> Option<&BTreeMap<String, f32>> {
        self.entries.get(&pair)
    }

    pub fn pairs(&self) -> impl Iterator<Item = EntityPair> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every label recorded for any pair
    pub fn labels_seen(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flat_map(|labels| labels.keys().cloned())
            .collect()
    }

    /// Insert 0.0 for every label in `labels` missing from any of `pairs`
    pub fn backfill<'a>(
        &mut self,
        pairs: impl IntoIterator<Item = EntityPair>,
        labels: impl IntoIterator<Item = &'a String> + Clone,
    ) {
        for pair in pairs {
            let entry = self.entries.entry(pair).or_default();
            for label in labels.clone() {
                entry.entry(label.clone()).or_insert(0.0);
            }
        }
    }
}

// ============================================================================
// Relation labels
// ============================================================================

/// Which direction(s) a relation label applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationDirection {
    /// `Label(e1,e2)`
    Forward,
    /// `Label(e2,e1)`
    Reverse,
    /// The symmetric label, both directions
    Symmetric,
}

/// Parsed relation label line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLabel {
    pub label: String,
    pub direction: RelationDirection,
}

/// Parse `Label(e1,e2)`, `Label(e2,e1)` or the symmetric label
pub fn parse_relation_label(line: &str, symmetric_label: &str) -> Option<RelationLabel> {
    let line = line.trim();
    if line == symmetric_label {
        return Some(RelationLabel {
            label: line.to_string(),
            direction: RelationDirection::Symmetric,
        });
    }

    let (label, direction) = if let Some(label) = line.strip_suffix("(e1,e2)") {
        (label, RelationDirection::Forward)
    } else if let Some(label) = line.strip_suffix("(e2,e1)") {
        (label, RelationDirection::Reverse)
    } else {
        return None;
    };

    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some(RelationLabel {
        label: label.to_string(),
        direction,
    })
}

// ============================================================================
// Relation documents
// ============================================================================

/// A parsed benchmark instance with its relation map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDoc {
    /// Instance number from the benchmark
    pub id: u32,
    pub doc: Doc,
    pub rels: RelationMap,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RelationDoc {
    /// Both orderings of every pair of distinct entities
    pub fn entity_pairs(&self) -> Vec<EntityPair> {
        let starts: Vec<usize> = self.doc.ents().iter().map(|e| e.start).collect();
        let mut pairs = Vec::new();
        for &head in &starts {
            for &tail in &starts {
                if head != tail {
                    pairs.push(EntityPair::new(head, tail));
                }
            }
        }
        pairs
    }

    /// Record 0.0 for every label in `labels` not yet set on any entity pair
    pub fn backfill(&mut self, labels: &BTreeSet<String>) {
        let pairs = self.entity_pairs();
        self.rels.backfill(pairs, labels);
    }
}

/// Counts from one corpus build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Instances read from the input
    pub instances: usize,
    /// Instances turned into documents
    pub parsed: usize,
    /// Instances dropped because an entity did not align to tokens
    pub skipped: usize,
}

impl CorpusStats {
    /// Fraction of instances dropped
    pub fn skip_rate(&self) -> f32 {
        if self.instances == 0 {
            0.0
        } else {
            self.skipped as f32 / self.instances as f32
        }
    }
}

/// Result of a corpus build
#[derive(Debug, Clone)]
pub struct RelationCorpus {
    pub docs: DocStore<RelationDoc>,
    /// All relation labels observed, sorted
    pub labels: BTreeSet<String>,
    pub stats: CorpusStats,
}

// ============================================================================
// Builder
// ============================================================================

/// Builds relation documents from the benchmark format
pub struct RelationCorpusBuilder {
    config: RelationConfig,
    tokenizer: Tokenizer,
}

impl RelationCorpusBuilder {
    pub fn new(config: RelationConfig) -> Self {
        Self {
            config,
            tokenizer: Tokenizer::default(),
        }
    }

    /// Read every instance, then back-fill the corpus-wide label set
    pub fn build<R: BufRead>(&self, reader: R) -> Result<RelationCorpus> {
        let lines: Vec<String> = reader
            .lines()
            .collect::<std::io::Result<_>>()
            .map_err(|e| NerprepError::Other(e.into()))?;

        let mut docs = Vec::new();
        let mut labels = BTreeSet::new();
        let mut stats = CorpusStats::default();

        for (group_idx, group) in lines.chunks(LINES_PER_INSTANCE).enumerate() {
            if group.iter().all(|l| l.trim().is_empty()) {
                continue;
            }
            let first_line = group_idx * LINES_PER_INSTANCE + 1;
            stats.instances += 1;

            match self.parse_instance(group, first_line)? {
                Some(doc) => {
                    labels.extend(doc.rels.labels_seen());
                    docs.push(doc);
                    stats.parsed += 1;
                }
                None => stats.skipped += 1,
            }
        }

        for doc in &mut docs {
            doc.backfill(&labels);
        }

        if stats.skipped > 0 {
            tracing::info!(
                "Skipped {} of {} instances ({:.2}%) with entities off token boundaries",
                stats.skipped,
                stats.instances,
                stats.skip_rate() * 100.0
            );
        }
        tracing::info!(
            "Built {} relation documents with {} labels",
            stats.parsed,
            labels.len()
        );

        Ok(RelationCorpus {
            docs: docs.into_iter().collect(),
            labels,
            stats,
        })
    }

    /// Parse one instance; `Ok(None)` when an entity does not align
    fn parse_instance(&self, group: &[String], first_line: usize) -> Result<Option<RelationDoc>> {
        let sentence = parse_sentence_line(&group[0], first_line)?;
        let label_line = group.get(1).ok_or_else(|| NerprepError::InvalidInput {
            line: first_line + 1,
            reason: "missing relation label line".to_string(),
        })?;
        let relation = parse_relation_label(label_line, &self.config.symmetric_label).ok_or_else(
            || NerprepError::InvalidInput {
                line: first_line + 1,
                reason: format!("unrecognized relation label {:?}", label_line.trim()),
            },
        )?;
        let comment = group.get(2).and_then(|l| parse_comment(l));
        if let Some(separator) = group.get(3).filter(|l| !l.trim().is_empty()) {
            tracing::warn!(
                "Expected blank separator at line {}, found {:?}",
                first_line + 3,
                separator
            );
        }

        let inline = parse_inline_entities(&sentence.sentence)?;
        let mut doc = Doc::new(inline.text.as_str(), self.tokenizer.tokenize(&inline.text));

        let label = &self.config.entity_label;
        let (Some(e1), Some(e2)) = (
            doc.char_span(inline.e1.0, inline.e1.1, label),
            doc.char_span(inline.e2.0, inline.e2.1, label),
        ) else {
            tracing::debug!(
                "Skipping instance {}: entity not on token boundaries in {:?}",
                sentence.id,
                inline.text
            );
            return Ok(None);
        };

        let forward = EntityPair::new(e1.start, e2.start);
        doc.set_ents(vec![e1, e2], GapPolicy::Outside)?;

        let mut rels = RelationMap::new();
        match relation.direction {
            RelationDirection::Forward => {
                rels.set(forward, &relation.label, 1.0);
                rels.ensure(forward.reversed());
            }
            RelationDirection::Reverse => {
                rels.set(forward.reversed(), &relation.label, 1.0);
                rels.ensure(forward);
            }
            RelationDirection::Symmetric => {
                rels.set(forward, &relation.label, 1.0);
                rels.set(forward.reversed(), &relation.label, 1.0);
            }
        }

        Ok(Some(RelationDoc {
            id: sentence.id,
            doc,
            rels,
            comment,
        }))
    }
}

fn parse_comment(line: &str) -> Option<String> {
    let line = line.trim();
    let text = line.strip_prefix("Comment:").unwrap_or(line).trim();
    (!text.is_empty()).then(|| text.to_string())
}

// ============================================================================
// Tests
// ============================================================================
