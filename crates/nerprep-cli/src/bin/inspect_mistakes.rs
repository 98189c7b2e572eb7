//! Print the NER mistakes a model makes on a gold document store
//!
//! Usage:
//!   inspect-mistakes <model> <gold_file> [--threshold 0.5]

use std::path::PathBuf;

use clap::Parser;

use nerprep_cli::{init_logging, load_config, load_recognizer, run_inspect_mistakes};
use nerprep_extractor::report::MistakeKind;

#[derive(Parser)]
#[command(name = "inspect-mistakes")]
#[command(about = "List missing, wrong and mislabeled entity predictions")]
#[command(version)]
struct Cli {
    /// Model artifact (JSON)
    model: PathBuf,

    /// Gold document store
    gold_file: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum prediction confidence
    #[arg(long)]
    threshold: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config)?;
    init_logging(&config.logging);

    let recognizer = load_recognizer(&cli.model, &config, cli.threshold)?;
    let report = run_inspect_mistakes(&recognizer, &cli.gold_file)?;

    print!("{report}");
    tracing::info!(
        "{} documents: {} missing, {} wrong, {} mislabeled",
        report.docs.len(),
        report.count(MistakeKind::MissingPrediction),
        report.count(MistakeKind::WronglyPredicted),
        report.count(MistakeKind::LabelNotCorrect)
    );

    Ok(())
}
