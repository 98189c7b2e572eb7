//! nerprep CLI - shared setup and pipeline runners for the binaries
//!
//! Each binary parses its own arguments, then calls into one of the
//! `run_*` functions here so the pipelines can be exercised end to end
//! without spawning processes.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use nerprep_core::{AppConfig, Doc, DocStore, LoggingConfig, ReconcileConfig, RelationConfig};
use nerprep_extractor::annotate::{annotate_lines, AnnotateOptions, AnnotateStyle};
use nerprep_extractor::ner::RuleBasedNer;
use nerprep_extractor::reconcile::{ReconcileOutcome, Reconciler};
use nerprep_extractor::relation::{CorpusStats, RelationCorpusBuilder};
use nerprep_extractor::report::MistakeReport;
use nerprep_extractor::EntityRecognizer;

// ============================================================================
// Setup
// ============================================================================

/// Initialize the tracing subscriber; `RUST_LOG` wins over the configured level
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    // A subscriber may already be installed when running under tests.
    let _ = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Load the configuration file (if any) and environment overrides
pub fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let display = path.as_ref().map(|p| p.display().to_string());
    AppConfig::load(path).with_context(|| match display {
        Some(p) => format!("Failed to load configuration from {p}"),
        None => "Failed to load configuration from environment".to_string(),
    })
}

/// Load a model artifact, applying a threshold flag over the configured one
pub fn load_recognizer(
    path: &Path,
    config: &AppConfig,
    threshold: Option<f32>,
) -> Result<RuleBasedNer> {
    let threshold = threshold.unwrap_or(config.model.threshold);
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("Threshold must be within [0, 1], got {threshold}");
    }
    let ner = RuleBasedNer::from_file(path)
        .with_context(|| format!("Failed to load model {}", path.display()))?
        .with_threshold(threshold);
    tracing::info!("Loaded model {} (threshold {})", ner.name(), threshold);
    Ok(ner)
}

// ============================================================================
// Pipelines
// ============================================================================

/// Convert a benchmark file into a relation document store
pub fn run_parse_semeval(
    data_file: &Path,
    output_file: &Path,
    config: &RelationConfig,
) -> Result<CorpusStats> {
    let file = File::open(data_file)
        .with_context(|| format!("Failed to open {}", data_file.display()))?;
    let corpus = RelationCorpusBuilder::new(config.clone())
        .build(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", data_file.display()))?;

    corpus
        .docs
        .to_disk(output_file)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;
    tracing::info!(
        "Wrote {} relation documents with {} labels to {}",
        corpus.docs.len(),
        corpus.labels.len(),
        output_file.display()
    );
    Ok(corpus.stats)
}

/// Output file for a reconciled corpus
pub fn binary_output_path(corpus: &Path, output_dir: &Path) -> PathBuf {
    let stem = corpus
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string());
    output_dir.join(format!("{stem}_correct_incorrect.json"))
}

/// Reconcile predictions with a gold corpus and write the kept documents
pub fn run_create_binary_data(
    recognizer: &dyn EntityRecognizer,
    corpus: &Path,
    output_dir: &Path,
    config: &ReconcileConfig,
) -> Result<(PathBuf, ReconcileOutcome)> {
    let gold: DocStore = DocStore::from_disk(corpus)
        .with_context(|| format!("Failed to read corpus {}", corpus.display()))?;

    let outcome = Reconciler::new(config.clone())
        .reconcile_corpus(recognizer, gold)
        .context("Reconciliation failed")?;

    let output = binary_output_path(corpus, output_dir);
    outcome
        .docs
        .to_disk(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok((output, outcome))
}

/// Annotate a plain-text file in one style and write it under `corpus_dir`
pub fn run_create_data(
    recognizer: &dyn EntityRecognizer,
    input_text: &Path,
    corpus_dir: &Path,
    style: AnnotateStyle,
    options: &AnnotateOptions,
) -> Result<(PathBuf, DocStore)> {
    let file = File::open(input_text)
        .with_context(|| format!("Failed to open {}", input_text.display()))?;
    let store = annotate_lines(recognizer, BufReader::new(file), style, options)
        .with_context(|| format!("Failed to annotate {}", input_text.display()))?;

    let output = corpus_dir.join(style.default_file_name());
    store
        .to_disk(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok((output, store))
}

/// Compare fresh predictions with a gold store
pub fn run_inspect_mistakes(
    recognizer: &dyn EntityRecognizer,
    gold_file: &Path,
) -> Result<MistakeReport> {
    let gold: DocStore<Doc> = DocStore::from_disk(gold_file)
        .with_context(|| format!("Failed to read gold file {}", gold_file.display()))?;
    MistakeReport::build(recognizer, &gold).context("Prediction failed")
}
