//! pow-ledger: a minimal single-node proof-of-work ledger
//!
//! This crate provides:
//! - SHA-256 payload hashing and a prefix-based difficulty predicate
//! - An append-only chain seeded with a genesis block
//! - Brute-force nonce search with optional attempt caps and cancellation
//! - Block verification (linkage, sequencing, hash consistency, proof of work)
//! - JSON export/import with full re-validation
//!
//! # Example
//!
//! ```rust
//! use pow_ledger::core::{AppendOutcome, Ledger};
//!
//! let mut ledger = Ledger::with_difficulty(1);
//!
//! let payload = ledger.create_block("Block 1").unwrap();
//! let mined = ledger.mine_block(&payload).unwrap();
//! println!("Mined block {} in {}ms", mined.block.payload.sequence, mined.stats.time_ms);
//!
//! assert_eq!(ledger.append_block(mined.block), AppendOutcome::Accepted);
//! assert_eq!(ledger.chain().len(), 2);
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{
    AppendOutcome, Block, BlockHeader, BlockPayload, Ledger, LedgerConfig, LedgerError,
    RejectReason, DEFAULT_DIFFICULTY,
};
pub use crate::crypto::{meets_target, sha256_hex, DEFAULT_POW_PREFIX};
pub use crate::mining::{CancelToken, MinedBlock, Miner, MiningError, StopPolicy};
pub use crate::storage::{load_from_file, load_verified, save_to_file, StorageError};
