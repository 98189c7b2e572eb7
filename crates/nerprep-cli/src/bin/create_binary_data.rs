//! Reconcile model predictions with a gold corpus into training documents
//!
//! Usage:
//!   create-binary-data <model> <corpus> <output_dir> [--keep-missing] [--threshold 0.5]

use std::path::PathBuf;

use clap::Parser;

use nerprep_cli::{init_logging, load_config, load_recognizer, run_create_binary_data};

#[derive(Parser)]
#[command(name = "create-binary-data")]
#[command(about = "Split predictions into correct, incorrect and missing spans against gold data")]
#[command(version)]
struct Cli {
    /// Model artifact (JSON)
    model: PathBuf,

    /// Gold document store
    corpus: PathBuf,

    /// Directory for the output store
    output_dir: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drop correctly predicted spans
    #[arg(long)]
    no_keep_correct: bool,

    /// Do not record incorrect predictions
    #[arg(long)]
    no_keep_incorrect: bool,

    /// Add gold spans the model missed as entities
    #[arg(long)]
    keep_missing: bool,

    /// Span group key for incorrect predictions
    #[arg(long)]
    incorrect_key: Option<String>,

    /// Minimum prediction confidence
    #[arg(long)]
    threshold: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config)?;
    if cli.no_keep_correct {
        config.reconcile.keep_correct = false;
    }
    if cli.no_keep_incorrect {
        config.reconcile.keep_incorrect = false;
    }
    if cli.keep_missing {
        config.reconcile.keep_missing = true;
    }
    if let Some(key) = cli.incorrect_key {
        config.reconcile.incorrect_spans_key = key;
    }
    init_logging(&config.logging);

    let recognizer = load_recognizer(&cli.model, &config, cli.threshold)?;

    let (output, outcome) =
        run_create_binary_data(&recognizer, &cli.corpus, &cli.output_dir, &config.reconcile)?;

    print!("{}", outcome.metrics.report());
    println!(
        "Wrote {} documents to {} ({} dropped, {} without complete annotation)",
        outcome.docs.len(),
        output.display(),
        outcome.dropped,
        outcome.incomplete
    );

    Ok(())
}
