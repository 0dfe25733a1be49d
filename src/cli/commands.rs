//! CLI commands for the ledger
//!
//! Implements the command handlers for the CLI interface.

use crate::cli::config::RunConfig;
use crate::core::{AppendOutcome, Ledger, LedgerConfig};
use crate::storage::{load_verified, save_to_file};
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Mine `config.blocks` blocks on a fresh ledger and report the chain
pub fn cmd_run(config: &RunConfig) -> CliResult<Ledger> {
    let mut ledger = Ledger::with_config(config.ledger.clone());

    println!(
        "⛏️  Mining {} block(s) at difficulty {}",
        config.blocks,
        ledger.difficulty()
    );
    println!("   Genesis hash: {}", ledger.latest_block().hash());

    let mut rejected = 0u64;
    for i in 1..=config.blocks {
        let payload = ledger.create_block(format!("Block {}", i))?;
        let mined = ledger.mine_block(&payload)?;

        println!(
            "\n   Block {} mined in {}ms ({} attempts, {:.2} H/s)",
            payload.sequence, mined.stats.time_ms, mined.stats.hash_attempts, mined.stats.hash_rate
        );

        match ledger.append_block(mined.block) {
            AppendOutcome::Accepted => println!("   └─ Appended"),
            AppendOutcome::Rejected(reason) => {
                rejected += 1;
                println!("   └─ Rejected: {}", reason);
            }
        }
    }

    let stats = ledger.stats();
    println!("\n⛓️  Ledger");
    println!("   ├─ Height: {}", stats.height);
    println!("   ├─ Total blocks: {}", stats.total_blocks);
    println!("   ├─ Rejected: {}", rejected);
    println!("   └─ Latest hash: {}", stats.latest_hash);

    if config.print_chain {
        println!("\n--- BLOCKCHAIN ---\n");
        println!("{}", serde_json::to_string_pretty(ledger.chain())?);
    }

    if let Some(path) = &config.output {
        save_to_file(&ledger, path)?;
        println!("📦 Ledger exported to {:?}", path);
    }

    Ok(ledger)
}

/// Load a saved ledger and validate every block against `expected`
pub fn cmd_verify(path: &Path, expected: &LedgerConfig) -> CliResult<Ledger> {
    println!(
        "🔍 Validating ledger at {:?} (difficulty {})...",
        path, expected.difficulty
    );

    match load_verified(path, expected) {
        Ok(ledger) => {
            println!("✅ Ledger is valid!");
            println!(
                "   {} blocks verified at difficulty {}",
                ledger.len(),
                ledger.difficulty()
            );
            Ok(ledger)
        }
        Err(e) => {
            println!("❌ Ledger validation FAILED!");
            Err(e.into())
        }
    }
}
