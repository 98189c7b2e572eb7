//! Inline entity markup parsing
//!
//! Benchmark sentences mark their two entities inline:
//! `"The <e1>cat</e1> chased the <e2>mouse</e2>."`. Parsing strips the
//! markers and reports where each entity sits in the clean text.

use nerprep_core::{NerprepError, Result};

const E1_OPEN: &str = "<e1>";
const E1_CLOSE: &str = "</e1>";
const E2_OPEN: &str = "<e2>";
const E2_CLOSE: &str = "</e2>";

/// Marker-free sentence with entity character offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEntities {
    /// Sentence with all markers removed
    pub text: String,
    /// `[start, end)` of the first entity, in characters
    pub e1: (usize, usize),
    /// `[start, end)` of the second entity, in characters
    pub e2: (usize, usize),
}

/// Numbered sentence line of the benchmark file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceLine {
    pub id: u32,
    /// Sentence between the surrounding quotes, markup intact
    pub sentence: String,
}

/// Parse a `<id>\t"<sentence>"` line
pub fn parse_sentence_line(line: &str, line_no: usize) -> Result<SentenceLine> {
    let invalid = |reason: String| NerprepError::InvalidInput {
        line: line_no,
        reason,
    };

    let splits: Vec<&str> = line.split('\t').collect();
    if splits.len() != 2 {
        return Err(invalid(format!(
            "expected 2 tab-separated fields, found {}",
            splits.len()
        )));
    }

    let id = splits[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(format!("instance id {:?} is not a number", splits[0].trim())))?;

    let sentence = splits[1].trim();
    if sentence.chars().count() <= 2 {
        return Err(invalid("sentence is too short".to_string()));
    }
    if !sentence.starts_with('"') || !sentence.ends_with('"') {
        return Err(invalid("sentence is not enclosed in quotes".to_string()));
    }

    Ok(SentenceLine {
        id,
        sentence: sentence[1..sentence.len() - 1].to_string(),
    })
}

/// Strip `<e1>`/`<e2>` markers and compute the entity offsets
///
/// The sentence must hold each marker exactly once, with `<e1>...</e1>`
/// entirely before `<e2>...</e2>`.
pub fn parse_inline_entities(sentence: &str) -> Result<InlineEntities> {
    let e1_start = marker_position(sentence, E1_OPEN)?;
    let e1_end = marker_position(sentence, E1_CLOSE)?;
    let e2_start = marker_position(sentence, E2_OPEN)?;
    let e2_end = marker_position(sentence, E2_CLOSE)?;

    if e1_start >= e1_end {
        return Err(NerprepError::InvalidMarkup(format!(
            "{E1_CLOSE} precedes {E1_OPEN}"
        )));
    }
    if e2_start >= e2_end {
        return Err(NerprepError::InvalidMarkup(format!(
            "{E2_CLOSE} precedes {E2_OPEN}"
        )));
    }
    if e1_end >= e2_start {
        return Err(NerprepError::InvalidMarkup(
            "e1 must end before e2 starts".to_string(),
        ));
    }

    // Offsets shift left by the length of every marker removed before them.
    let open = E1_OPEN.len();
    let close = E1_CLOSE.len();
    let e1 = (e1_start, e1_end - open);
    let e2 = (e2_start - open - close, e2_end - 2 * open - close);

    let text = sentence
        .replace(E1_OPEN, "")
        .replace(E1_CLOSE, "")
        .replace(E2_OPEN, "")
        .replace(E2_CLOSE, "");

    Ok(InlineEntities { text, e1, e2 })
}

/// Character index of the single occurrence of `marker`
fn marker_position(sentence: &str, marker: &str) -> Result<usize> {
    let mut matches = sentence.match_indices(marker);
    let Some((byte_pos, _)) = matches.next() else {
        return Err(NerprepError::InvalidMarkup(format!("missing {marker}")));
    };
    if matches.next().is_some() {
        return Err(NerprepError::InvalidMarkup(format!(
            "{marker} appears more than once"
        )));
    }
    Ok(sentence[..byte_pos].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(text: &str, (start, end): (usize, usize)) -> String {
        text.chars().skip(start).take(end - start).collect()
    }

    #[test]
    fn test_parse_inline_entities() {
        let parsed = parse_inline_entities("<e1>Emerson</e1> met <e2>Smith</e2>.").unwrap();
        assert_eq!(parsed.text, "Emerson met Smith.");
        assert_eq!(parsed.e1, (0, 7));
        assert_eq!(parsed.e2, (12, 17));
        assert_eq!(slice(&parsed.text, parsed.e1), "Emerson");
        assert_eq!(slice(&parsed.text, parsed.e2), "Smith");
    }

    #[test]
    fn test_parse_inline_entities_multiword() {
        let sentence = "The system as described above has its greatest application in an \
                        arrayed <e1>configuration</e1> of antenna <e2>elements</e2>.";
        let parsed = parse_inline_entities(sentence).unwrap();
        assert_eq!(slice(&parsed.text, parsed.e1), "configuration");
        assert_eq!(slice(&parsed.text, parsed.e2), "elements");
        assert!(!parsed.text.contains('<'));
    }

    #[test]
    fn test_parse_inline_entities_non_ascii() {
        let parsed = parse_inline_entities("Le <e1>café</e1> près de l'<e2>église</e2>").unwrap();
        assert_eq!(slice(&parsed.text, parsed.e1), "café");
        assert_eq!(slice(&parsed.text, parsed.e2), "église");
    }

    #[test]
    fn test_reversed_entity_order_fails() {
        let result = parse_inline_entities("<e2>Smith</e2> met <e1>Emerson</e1>.");
        assert!(matches!(result, Err(NerprepError::InvalidMarkup(_))));
    }

    #[test]
    fn test_overlapping_entities_fail() {
        let result = parse_inline_entities("<e1>Emerson <e2>met</e1> Smith</e2>.");
        assert!(matches!(result, Err(NerprepError::InvalidMarkup(_))));
    }

    #[test]
    fn test_close_before_open_fails() {
        let result = parse_inline_entities("</e1>Emerson<e1> met <e2>Smith</e2>.");
        assert!(matches!(result, Err(NerprepError::InvalidMarkup(_))));
    }

    #[test]
    fn test_missing_and_duplicate_markers_fail() {
        assert!(parse_inline_entities("<e1>Emerson</e1> met Smith.").is_err());
        assert!(parse_inline_entities("<e1>A</e1> <e1>B</e1> <e2>C</e2>").is_err());
    }

    #[test]
    fn test_parse_sentence_line() {
        let line = "8001\t\"<e1>Emerson</e1> met <e2>Smith</e2>.\"\n";
        let parsed = parse_sentence_line(line, 0).unwrap();
        assert_eq!(parsed.id, 8001);
        assert_eq!(parsed.sentence, "<e1>Emerson</e1> met <e2>Smith</e2>.");
    }

    #[test]
    fn test_parse_sentence_line_framing_errors() {
        assert!(matches!(
            parse_sentence_line("no tabs here", 3),
            Err(NerprepError::InvalidInput { line: 3, .. })
        ));
        assert!(parse_sentence_line("x\t\"abc\"", 0).is_err());
        assert!(parse_sentence_line("1\t\"abc", 0).is_err());
        assert!(parse_sentence_line("1\t\"\"", 0).is_err());
        assert!(parse_sentence_line("1\ta\tb", 0).is_err());
    }
}
