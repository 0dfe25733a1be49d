//! Proof-of-work ledger CLI
//!
//! Mines a chain of blocks from the command line, or validates a saved one.

use clap::Parser;
use pow_ledger::cli::{self, RunConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ledger")]
#[command(version)]
#[command(about = "A minimal proof-of-work ledger", long_about = None)]
struct Cli {
    /// Number of leading '0' characters required in the proof-of-work hash [default: 4]
    difficulty: Option<String>,

    /// Number of blocks to mine after genesis [default: 10]
    blocks: Option<String>,

    /// Give up on a block after this many nonce attempts
    #[arg(long)]
    max_attempts: Option<u64>,

    /// Skip checking the stored block hash against the payload on append
    #[arg(long)]
    lenient_hash_check: bool,

    /// Export the final ledger as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Validate a previously exported ledger instead of mining.
    /// DIFFICULTY sets the difficulty every block must meet.
    #[arg(long, conflicts_with_all = ["output", "max_attempts", "blocks"])]
    verify: Option<PathBuf>,

    /// Do not dump the full chain when done
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    let mut config = RunConfig::from_args(args.difficulty.as_deref(), args.blocks.as_deref());
    config.ledger.strict_hash_check = !args.lenient_hash_check;

    if let Some(path) = &args.verify {
        cli::cmd_verify(path, &config.ledger)?;
        return Ok(());
    }

    config.ledger.max_attempts = args.max_attempts;
    config.output = args.output;
    config.print_chain = !args.quiet;

    cli::cmd_run(&config)?;

    Ok(())
}
