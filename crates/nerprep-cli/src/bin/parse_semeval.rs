//! Convert a SemEval-2010 Task 8 style benchmark into a relation document store
//!
//! Usage:
//!   parse-semeval <data_file> <output_file> [--config <toml>]

use std::path::PathBuf;

use clap::Parser;

use nerprep_cli::{init_logging, load_config, run_parse_semeval};

#[derive(Parser)]
#[command(name = "parse-semeval")]
#[command(about = "Convert an inline-markup relation benchmark into a document store")]
#[command(version)]
struct Cli {
    /// Benchmark file (4 lines per instance)
    data_file: PathBuf,

    /// Output document store
    output_file: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Label given to both marked entities
    #[arg(long)]
    entity_label: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config)?;
    if let Some(label) = cli.entity_label {
        config.relation.entity_label = label;
    }
    init_logging(&config.logging);

    let stats = run_parse_semeval(&cli.data_file, &cli.output_file, &config.relation)?;
    println!(
        "Parsed {} of {} instances ({} skipped, {:.1}%)",
        stats.parsed,
        stats.instances,
        stats.skipped,
        stats.skip_rate() * 100.0
    );

    Ok(())
}
