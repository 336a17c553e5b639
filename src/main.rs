use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use velocity_limits::{log::init_logging, run, Config, RunOptions};

/// Fund load velocity limits engine
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Line-delimited JSON transactions filename, overrides the config's input file
    #[clap(value_parser, value_name = "TRANSACTIONS_FILE", value_hint = clap::ValueHint::FilePath)]
    transactions_filename: Option<PathBuf>,

    /// Decisions filename, overrides the config's output file; stdout if neither is set
    #[clap(short, long, value_parser, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// TOML configuration file with velocity limits
    #[clap(short, long, value_parser, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Process customers concurrently
    #[clap(long)]
    concurrent: bool,

    /// Enable verbose logging
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::default(),
    };
    let input = args
        .transactions_filename
        .or(config.input_file)
        .context("No transactions file given on the command line or in the config")?;

    let result = run(RunOptions {
        input,
        output: args.output.or(config.output_file),
        limits: config.limits,
        concurrent: args.concurrent,
    })
    .await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Processing failed");
    }
    result.map(|_| ())
}
