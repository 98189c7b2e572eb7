//! Annotated document model
//!
//! A `Doc` owns its text, tokens, entity spans, per-token entity IOB
//! state and any number of named span groups. Token offsets and all
//! `start_char`/`end_char` arguments are character offsets, not bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tokenizer::Tokenizer;
use crate::{NerprepError, Result};

// ============================================================================
// Tokens and Spans
// ============================================================================

/// A single token of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token text
    pub text: String,

    /// Character offset of the token in the document text
    pub idx: usize,

    /// Whether the token is followed by whitespace
    pub whitespace: bool,
}

impl Token {
    /// Create a new token
    pub fn new(text: impl Into<String>, idx: usize, whitespace: bool) -> Self {
        Self {
            text: text.into(),
            idx,
            whitespace,
        }
    }

    /// Character offset one past the end of the token
    pub fn end_char(&self) -> usize {
        self.idx + self.text.chars().count()
    }
}

/// A labeled half-open token range `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Number of tokens covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for a zero-length span
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the two token ranges share at least one token
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Same range with a different label
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self::new(self.start, self.end, label)
    }
}

// ============================================================================
// Entity annotation state
// ============================================================================

/// Per-token entity annotation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntIob {
    /// No annotation: the token's status is unknown
    #[default]
    Missing,
    /// Annotated as not part of any entity
    Outside,
    /// First token of an entity
    Begin,
    /// Continuation token of an entity
    Inside,
}

/// How tokens not covered by an entity are marked by `Doc::set_ents`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Gaps are unknown
    Missing,
    /// Gaps are negative
    Outside,
}

impl GapPolicy {
    fn iob(self) -> EntIob {
        match self {
            Self::Missing => EntIob::Missing,
            Self::Outside => EntIob::Outside,
        }
    }
}

// ============================================================================
// Document
// ============================================================================

/// An annotated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    text: String,
    tokens: Vec<Token>,
    ents: Vec<Span>,
    ent_iob: Vec<EntIob>,
    #[serde(default)]
    spans: BTreeMap<String, Vec<Span>>,
}

impl Doc {
    /// Create an unannotated document from pre-computed tokens
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        let ent_iob = vec![EntIob::Missing; tokens.len()];
        Self {
            text: text.into(),
            tokens,
            ents: Vec::new(),
            ent_iob,
            spans: BTreeMap::new(),
        }
    }

    /// Tokenize `text` with the default tokenizer
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = Tokenizer::default().tokenize(&text);
        Self::new(text, tokens)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Entity spans, sorted by start
    pub fn ents(&self) -> &[Span] {
        &self.ents
    }

    pub fn ent_iob(&self) -> &[EntIob] {
        &self.ent_iob
    }

    /// True when every token carries entity annotation
    pub fn has_complete_ner(&self) -> bool {
        self.ent_iob.iter().all(|iob| *iob != EntIob::Missing)
    }

    /// Span group by key
    pub fn spans(&self, key: &str) -> Option<&[Span]> {
        self.spans.get(key).map(Vec::as_slice)
    }

    /// Replace the entity annotation
    ///
    /// Spans must be in bounds, non-empty and non-overlapping. Tokens
    /// outside every span take the state given by `default`.
    pub fn set_ents(&mut self, mut ents: Vec<Span>, default: GapPolicy) -> Result<()> {
        ents.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

        for span in &ents {
            self.check_bounds(span)?;
        }
        for pair in ents.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(NerprepError::InvalidSpan(format!(
                    "entities [{}, {}) and [{}, {}) overlap",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }

        let mut ent_iob = vec![default.iob(); self.tokens.len()];
        for span in &ents {
            ent_iob[span.start] = EntIob::Begin;
            for iob in &mut ent_iob[span.start + 1..span.end] {
                *iob = EntIob::Inside;
            }
        }

        self.ents = ents;
        self.ent_iob = ent_iob;
        Ok(())
    }

    /// Store a named span group; spans in a group may overlap
    pub fn set_span_group(&mut self, key: impl Into<String>, spans: Vec<Span>) -> Result<()> {
        for span in &spans {
            self.check_bounds(span)?;
        }
        self.spans.insert(key.into(), spans);
        Ok(())
    }

    /// Resolve a character range to a token span
    ///
    /// Returns `None` unless `start_char` is the start of a token and
    /// `end_char` is the end of a token at or after it.
    pub fn char_span(&self, start_char: usize, end_char: usize, label: &str) -> Option<Span> {
        if start_char >= end_char {
            return None;
        }
        let start = self.tokens.iter().position(|t| t.idx == start_char)?;
        let end = self.tokens[start..]
            .iter()
            .position(|t| t.end_char() == end_char)
            .map(|offset| start + offset + 1)?;
        Some(Span::new(start, end, label))
    }

    /// Character range `[start, end)` covered by a span
    pub fn span_char_range(&self, span: &Span) -> Option<(usize, usize)> {
        if span.is_empty() || span.end > self.tokens.len() {
            return None;
        }
        Some((self.tokens[span.start].idx, self.tokens[span.end - 1].end_char()))
    }

    /// Text covered by a span
    pub fn span_text(&self, span: &Span) -> String {
        match self.span_char_range(span) {
            Some((start, end)) => self.text.chars().skip(start).take(end - start).collect(),
            None => String::new(),
        }
    }

    fn check_bounds(&self, span: &Span) -> Result<()> {
        if span.is_empty() || span.end > self.tokens.len() {
            return Err(NerprepError::InvalidSpan(format!(
                "span [{}, {}) is empty or out of bounds for a document of {} tokens",
                span.start,
                span.end,
                self.tokens.len()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
