//! Cross-tokenization alignment
//!
//! Two documents over the same text (ignoring whitespace) can be tokenized
//! differently. `Alignment` maps each token of one to the tokens of the
//! other that share at least one non-whitespace character.

use crate::doc::{Doc, Span};
use crate::{NerprepError, Result};

/// Token-to-token mapping between a predicted doc (x) and a reference doc (y)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    x2y: Vec<Vec<usize>>,
    y2x: Vec<Vec<usize>>,
}

impl Alignment {
    /// Build the alignment; fails if the texts differ beyond whitespace
    pub fn new(x: &Doc, y: &Doc) -> Result<Self> {
        let x_stripped: String = x.text().chars().filter(|c| !c.is_whitespace()).collect();
        let y_stripped: String = y.text().chars().filter(|c| !c.is_whitespace()).collect();
        if x_stripped != y_stripped {
            return Err(NerprepError::AlignmentError(format!(
                "texts differ: {:?} vs {:?}",
                truncate(x.text()),
                truncate(y.text())
            )));
        }

        let x_ranges = stripped_ranges(x);
        let y_ranges = stripped_ranges(y);

        let mut x2y = vec![Vec::new(); x_ranges.len()];
        let mut y2x = vec![Vec::new(); y_ranges.len()];

        // Both range lists are sorted and non-overlapping: sweep once.
        let (mut i, mut j) = (0, 0);
        while i < x_ranges.len() && j < y_ranges.len() {
            let (xs, xe) = x_ranges[i];
            let (ys, ye) = y_ranges[j];
            if xs < ye && ys < xe {
                x2y[i].push(j);
                y2x[j].push(i);
            }
            if xe <= ye {
                i += 1;
            } else {
                j += 1;
            }
        }

        Ok(Self { x2y, y2x })
    }

    /// x tokens aligned to the y token at `index`
    pub fn y2x(&self, index: usize) -> &[usize] {
        self.y2x.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// y tokens aligned to the x token at `index`
    pub fn x2y(&self, index: usize) -> &[usize] {
        self.x2y.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Token character ranges counted over non-whitespace characters only
fn stripped_ranges(doc: &Doc) -> Vec<(usize, usize)> {
    let mut ranges = Vec::with_capacity(doc.len());
    let mut chars = doc.text().chars().enumerate().peekable();
    let mut stripped = 0;

    for token in doc.tokens() {
        while let Some((pos, c)) = chars.peek().copied() {
            if pos >= token.idx {
                break;
            }
            if !c.is_whitespace() {
                stripped += 1;
            }
            chars.next();
        }
        let len = token.text.chars().filter(|c| !c.is_whitespace()).count();
        ranges.push((stripped, stripped + len));
    }

    ranges
}

fn truncate(text: &str) -> String {
    text.chars().take(40).collect()
}

// ============================================================================
// Example
// ============================================================================

/// A prediction paired with its gold reference
#[derive(Debug, Clone)]
pub struct Example {
    predicted: Doc,
    reference: Doc,
    alignment: Alignment,
}

impl Example {
    /// Pair a predicted doc with a reference doc over the same text
    pub fn new(predicted: Doc, reference: Doc) -> Result<Self> {
        let alignment = Alignment::new(&predicted, &reference)?;
        Ok(Self {
            predicted,
            reference,
            alignment,
        })
    }

    pub fn predicted(&self) -> &Doc {
        &self.predicted
    }

    pub fn reference(&self) -> &Doc {
        &self.reference
    }

    pub fn into_predicted(self) -> Doc {
        self.predicted
    }

    /// Project reference spans onto the predicted tokenization
    ///
    /// Each aligned span runs from the first to the last x token mapped
    /// from the span's y tokens. Spans with no mapping, and spans that
    /// would overlap one already projected, are dropped.
    pub fn aligned_spans_y2x(&self, spans: &[Span]) -> Vec<Span> {
        let mut ordered: Vec<&Span> = spans.iter().collect();
        ordered.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

        let mut aligned: Vec<Span> = Vec::with_capacity(spans.len());
        for span in ordered {
            let x_indices: Vec<usize> = (span.start..span.end)
                .flat_map(|i| self.alignment.y2x(i).iter().copied())
                .collect();
            let (Some(first), Some(last)) = (x_indices.iter().min(), x_indices.iter().max())
            else {
                continue;
            };

            let candidate = Span::new(*first, *last + 1, span.label.clone());
            if aligned.iter().any(|s| s.overlaps(&candidate)) {
                continue;
            }
            aligned.push(candidate);
        }

        aligned
    }
}
