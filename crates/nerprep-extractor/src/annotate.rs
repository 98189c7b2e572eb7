//! Annotation variant generator
//!
//! Runs a recognizer over plain-text lines and rewrites each prediction
//! into one of several toy training styles for negative-annotation
//! experiments.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use nerprep_core::{ConfigError, Doc, DocStore, GapPolicy, NerprepError, Result, Span};

use crate::EntityRecognizer;

/// How a prediction is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotateStyle {
    /// Predictions as-is
    Silver,
    /// Target entities get a new label
    Relabel,
    /// Target entities move to the incorrect span group
    Incorrect,
    /// Only the incorrect span group, no entities
    IncorrectOnly,
    /// Target entities removed
    Filter,
}

impl AnnotateStyle {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Silver => "silver.json",
            Self::Relabel => "relabeled.json",
            Self::Incorrect => "incorrect.json",
            Self::IncorrectOnly => "incorrect_only.json",
            Self::Filter => "filtered.json",
        }
    }
}

impl FromStr for AnnotateStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SILVER" => Ok(Self::Silver),
            "RELABEL" => Ok(Self::Relabel),
            "INCORRECT" => Ok(Self::Incorrect),
            "INCORRECT_ONLY" => Ok(Self::IncorrectOnly),
            "FILTER" => Ok(Self::Filter),
            _ => Err(ConfigError::InvalidValue {
                key: "style".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AnnotateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Silver => "SILVER",
            Self::Relabel => "RELABEL",
            Self::Incorrect => "INCORRECT",
            Self::IncorrectOnly => "INCORRECT_ONLY",
            Self::Filter => "FILTER",
        };
        write!(f, "{name}")
    }
}

/// Target text and labels for the rewriting styles
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Entity text the non-silver styles act on
    pub target: String,
    /// New label for `Relabel`
    pub relabel_to: String,
    /// Span group key for `Incorrect` and `IncorrectOnly`
    pub incorrect_key: String,
}

impl AnnotateOptions {
    pub fn new(target: impl Into<String>, incorrect_key: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            relabel_to: "PERSON".to_string(),
            incorrect_key: incorrect_key.into(),
        }
    }

    pub fn with_relabel_to(mut self, label: impl Into<String>) -> Self {
        self.relabel_to = label.into();
        self
    }
}

/// Predict `text` and rewrite the prediction in `style`
pub fn annotate_text(
    recognizer: &dyn EntityRecognizer,
    text: &str,
    style: AnnotateStyle,
    options: &AnnotateOptions,
) -> Result<Doc> {
    let mut doc = recognizer.predict(text)?;
    if style == AnnotateStyle::Silver {
        return Ok(doc);
    }

    let (targets, others): (Vec<Span>, Vec<Span>) = doc
        .ents()
        .iter()
        .cloned()
        .partition(|span| doc.span_text(span) == options.target);

    match style {
        AnnotateStyle::Silver => {}
        AnnotateStyle::Relabel => {
            let mut ents = others;
            ents.extend(targets.iter().map(|s| s.with_label(options.relabel_to.as_str())));
            doc.set_ents(ents, GapPolicy::Outside)?;
        }
        AnnotateStyle::Incorrect => {
            doc.set_ents(others, GapPolicy::Outside)?;
            doc.set_span_group(options.incorrect_key.as_str(), targets)?;
        }
        AnnotateStyle::IncorrectOnly => {
            doc.set_ents(Vec::new(), GapPolicy::Outside)?;
            doc.set_span_group(options.incorrect_key.as_str(), targets)?;
        }
        AnnotateStyle::Filter => {
            doc.set_ents(others, GapPolicy::Outside)?;
        }
    }
    Ok(doc)
}

/// Annotate every non-blank line of `reader`
pub fn annotate_lines<R: BufRead>(
    recognizer: &dyn EntityRecognizer,
    reader: R,
    style: AnnotateStyle,
    options: &AnnotateOptions,
) -> Result<DocStore> {
    let mut store = DocStore::new();
    let mut targeted = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| NerprepError::InvalidInput {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        let text = line.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            continue;
        }
        let doc = annotate_text(recognizer, text, style, options)?;
        if doc
            .spans(&options.incorrect_key)
            .is_some_and(|spans| !spans.is_empty())
        {
            targeted += 1;
        }
        store.add(doc);
    }

    tracing::info!(
        "Annotated {} documents in {} style ({} with incorrect spans)",
        store.len(),
        style,
        targeted
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ner::{ModelArtifact, RuleBasedNer, TermRule};
    use nerprep_core::EntIob;

    fn recognizer() -> RuleBasedNer {
        RuleBasedNer::from_artifact(ModelArtifact {
            name: "toy".to_string(),
            incorrect_spans_key: None,
            patterns: vec![],
            terms: vec![
                TermRule {
                    term: "Emerson".to_string(),
                    label: "PERSON".to_string(),
                    aliases: vec![],
                },
                TermRule {
                    term: "Boston".to_string(),
                    label: "GPE".to_string(),
                    aliases: vec![],
                },
            ],
        })
        .unwrap()
    }

    fn options() -> AnnotateOptions {
        AnnotateOptions::new("Emerson", "incorrect_spans")
    }

    const TEXT: &str = "Emerson lived in Boston";

    #[test]
    fn test_style_from_str() {
        assert_eq!("silver".parse::<AnnotateStyle>().unwrap(), AnnotateStyle::Silver);
        assert_eq!(
            "INCORRECT_ONLY".parse::<AnnotateStyle>().unwrap(),
            AnnotateStyle::IncorrectOnly
        );
        assert!("GOLD".parse::<AnnotateStyle>().is_err());
        assert_eq!(AnnotateStyle::Filter.to_string(), "FILTER");
        assert_eq!(AnnotateStyle::Relabel.default_file_name(), "relabeled.json");
    }

    #[test]
    fn test_silver() {
        let doc = annotate_text(&recognizer(), TEXT, AnnotateStyle::Silver, &options()).unwrap();
        assert_eq!(
            doc.ents(),
            &[Span::new(0, 1, "PERSON"), Span::new(3, 4, "GPE")]
        );
    }

    #[test]
    fn test_relabel() {
        let opts = options().with_relabel_to("ORG");
        let doc = annotate_text(&recognizer(), TEXT, AnnotateStyle::Relabel, &opts).unwrap();
        assert_eq!(doc.ents(), &[Span::new(0, 1, "ORG"), Span::new(3, 4, "GPE")]);
    }

    #[test]
    fn test_incorrect() {
        let doc =
            annotate_text(&recognizer(), TEXT, AnnotateStyle::Incorrect, &options()).unwrap();
        assert_eq!(doc.ents(), &[Span::new(3, 4, "GPE")]);
        assert_eq!(
            doc.spans("incorrect_spans"),
            Some(&[Span::new(0, 1, "PERSON")][..])
        );
        assert_eq!(doc.ent_iob()[0], EntIob::Outside);
    }

    #[test]
    fn test_incorrect_only() {
        let doc =
            annotate_text(&recognizer(), TEXT, AnnotateStyle::IncorrectOnly, &options()).unwrap();
        assert!(doc.ents().is_empty());
        assert!(doc.ent_iob().iter().all(|iob| *iob == EntIob::Outside));
        assert_eq!(doc.spans("incorrect_spans").map(<[Span]>::len), Some(1));
    }

    #[test]
    fn test_filter() {
        let doc = annotate_text(&recognizer(), TEXT, AnnotateStyle::Filter, &options()).unwrap();
        assert_eq!(doc.ents(), &[Span::new(3, 4, "GPE")]);
        assert!(doc.spans("incorrect_spans").is_none());
    }

    #[test]
    fn test_annotate_lines_skips_blank() {
        let input = "Emerson lived in Boston\n\n   \nBoston is cold\n";
        let store = annotate_lines(
            &recognizer(),
            input.as_bytes(),
            AnnotateStyle::Incorrect,
            &options(),
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        let texts: Vec<&str> = store.iter().map(Doc::text).collect();
        assert_eq!(texts, vec!["Emerson lived in Boston", "Boston is cold"]);
    }
}
