//! Generate annotation variants from plain text with a model
//!
//! Usage:
//!   create-data <model> <input_text> <corpus_dir> <style> [--target Emerson]
//!
//! Styles: SILVER, RELABEL, INCORRECT, INCORRECT_ONLY, FILTER

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use nerprep_cli::{init_logging, load_config, load_recognizer, run_create_data};
use nerprep_extractor::annotate::{AnnotateOptions, AnnotateStyle};
use nerprep_extractor::EntityRecognizer;

#[derive(Parser)]
#[command(name = "create-data")]
#[command(about = "Write silver, relabeled, incorrect or filtered annotations of a text file")]
#[command(version)]
struct Cli {
    /// Model artifact (JSON)
    model: PathBuf,

    /// Plain text, one document per line
    input_text: PathBuf,

    /// Directory for the output store
    corpus_dir: PathBuf,

    /// Annotation style
    style: String,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Entity text the non-silver styles act on
    #[arg(long, default_value = "Emerson")]
    target: String,

    /// Label assigned by RELABEL
    #[arg(long, default_value = "PERSON")]
    relabel_to: String,

    /// Minimum prediction confidence
    #[arg(long)]
    threshold: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config)?;
    init_logging(&config.logging);

    let style = cli
        .style
        .parse::<AnnotateStyle>()
        .with_context(|| format!("Unknown annotation style {:?}", cli.style))?;
    let recognizer = load_recognizer(&cli.model, &config, cli.threshold)?;

    let incorrect_key = config
        .reconcile
        .incorrect_key(recognizer.incorrect_spans_key());
    let options = AnnotateOptions::new(cli.target, incorrect_key)
        .with_relabel_to(cli.relabel_to);

    let (output, store) =
        run_create_data(&recognizer, &cli.input_text, &cli.corpus_dir, style, &options)?;

    println!("Wrote {} {} documents to {}", store.len(), style, output.display());

    Ok(())
}
