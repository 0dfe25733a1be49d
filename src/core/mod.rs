//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Blocks (header/payload split, canonical hashing)
//! - Ledger (genesis, creation, verification, append-only chain)

pub mod block;
pub mod ledger;

pub use block::{short_hash, Block, BlockHeader, BlockPayload, GENESIS_DATA};
pub use ledger::{
    AppendOutcome, ChainStats, Ledger, LedgerConfig, LedgerError, RejectReason,
    DEFAULT_DIFFICULTY,
};
