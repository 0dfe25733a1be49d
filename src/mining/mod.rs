//! Mining module for proof-of-work nonce search

pub mod miner;

pub use miner::{
    hash_rate, search_nonce, CancelToken, MinedBlock, Miner, MiningError, MiningStats,
    NonceSolution, StopPolicy, CANCEL_CHECK_INTERVAL,
};
