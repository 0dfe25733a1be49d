//! Mining engine for the ledger
//!
//! Brute-force nonce search against a prefix target, with an optional
//! stop policy so callers can bound or cancel the search.

use crate::core::block::{short_hash, Block, BlockHeader, BlockPayload};
use crate::crypto::{meets_target, pow_hash};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How many attempts pass between two reads of the cancel flag
pub const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// Reasons a nonce search can end without a solution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiningError {
    #[error("Mining exhausted after {attempts} attempts")]
    Exhausted { attempts: u64 },
    #[error("Mining cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
}

/// Shared flag used to stop a running search from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// When a nonce search gives up. The default never does.
#[derive(Debug, Clone, Default)]
pub struct StopPolicy {
    max_attempts: Option<u64>,
    cancel: Option<CancelToken>,
}

impl StopPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn max_attempts(&self) -> Option<u64> {
        self.max_attempts
    }

    /// Decide whether to stop before making attempt number `attempts + 1`
    fn check(&self, attempts: u64) -> Result<(), MiningError> {
        if let Some(token) = &self.cancel {
            if attempts % CANCEL_CHECK_INTERVAL == 0 && token.is_cancelled() {
                return Err(MiningError::Cancelled { attempts });
            }
        }

        match self.max_attempts {
            Some(max) if attempts >= max => Err(MiningError::Exhausted { attempts }),
            _ => Ok(()),
        }
    }
}

/// Winning nonce and the hash that satisfied the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceSolution {
    pub nonce: u64,
    pub pow_hash: String,
    /// Number of hashes computed, including the winning one
    pub attempts: u64,
}

/// Search nonces `0, 1, 2, ...` for the first one whose proof-of-work hash
/// meets the target.
pub fn search_nonce(
    block_hash: &str,
    difficulty: u32,
    prefix: char,
    policy: &StopPolicy,
) -> Result<NonceSolution, MiningError> {
    let mut nonce = 0u64;

    loop {
        policy.check(nonce)?;

        let candidate = pow_hash(block_hash, nonce);
        if meets_target(&candidate, difficulty, prefix) {
            return Ok(NonceSolution {
                nonce,
                pow_hash: candidate,
                attempts: nonce + 1,
            });
        }

        nonce = nonce
            .checked_add(1)
            .ok_or(MiningError::Exhausted { attempts: u64::MAX })?;
    }
}

/// Hashes per second; zero when no measurable time has passed
pub fn hash_rate(attempts: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > f64::EPSILON {
        attempts as f64 / secs
    } else {
        0.0
    }
}

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash attempts
    pub hash_attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
}

/// A freshly mined block, not yet appended
#[derive(Debug, Clone)]
pub struct MinedBlock {
    pub block: Block,
    pub stats: MiningStats,
}

/// Miner bound to a difficulty target
#[derive(Debug, Clone)]
pub struct Miner {
    pub difficulty: u32,
    pub prefix: char,
    pub policy: StopPolicy,
}

impl Miner {
    /// Create a miner that searches without limit
    pub fn new(difficulty: u32, prefix: char) -> Self {
        Self {
            difficulty,
            prefix,
            policy: StopPolicy::unbounded(),
        }
    }

    pub fn with_policy(mut self, policy: StopPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Mine a payload. The payload itself is never modified; the result
    /// carries a copy of it.
    pub fn mine(&self, payload: &BlockPayload) -> Result<MinedBlock, MiningError> {
        let start = Instant::now();
        let block_hash = payload.hash();

        debug!(
            "Mining block #{} with difficulty {}...",
            payload.sequence, self.difficulty
        );

        let solution = search_nonce(&block_hash, self.difficulty, self.prefix, &self.policy)?;

        let elapsed = start.elapsed();
        let time_ms = elapsed.as_millis();
        let rate = hash_rate(solution.attempts, elapsed);

        info!(
            "Block #{} mined in {:.3}s Hash: {} ({} attempts)",
            payload.sequence,
            elapsed.as_secs_f64(),
            short_hash(&block_hash),
            solution.attempts
        );

        Ok(MinedBlock {
            block: Block {
                header: BlockHeader {
                    nonce: solution.nonce,
                    block_hash,
                },
                payload: payload.clone(),
            },
            stats: MiningStats {
                hash_attempts: solution.attempts,
                time_ms,
                hash_rate: rate,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{sha256_hex, DEFAULT_POW_PREFIX};
    use serde_json::Value;
    use std::thread;

    fn payload() -> BlockPayload {
        BlockPayload {
            sequence: 1,
            timestamp: 1_700_000_000_000,
            data: Value::from("Block 1"),
            previous_hash: sha256_hex(b"genesis"),
        }
    }

    #[test]
    fn test_search_nonce_finds_first_valid() {
        let block_hash = sha256_hex(b"payload");
        let solution =
            search_nonce(&block_hash, 2, DEFAULT_POW_PREFIX, &StopPolicy::unbounded()).unwrap();

        assert!(solution.pow_hash.starts_with("00"));
        assert_eq!(solution.pow_hash, pow_hash(&block_hash, solution.nonce));
        assert_eq!(solution.attempts, solution.nonce + 1);
        for earlier in 0..solution.nonce {
            assert!(!meets_target(&pow_hash(&block_hash, earlier), 2, DEFAULT_POW_PREFIX));
        }
    }

    #[test]
    fn test_zero_difficulty_takes_one_attempt() {
        let solution =
            search_nonce("anything", 0, DEFAULT_POW_PREFIX, &StopPolicy::unbounded()).unwrap();
        assert_eq!(solution.nonce, 0);
        assert_eq!(solution.attempts, 1);
    }

    #[test]
    fn test_max_attempts_exhausts() {
        let policy = StopPolicy::unbounded().with_max_attempts(3);
        // 64 leading zeros cannot be reached in three attempts
        let result = search_nonce("abc", 64, DEFAULT_POW_PREFIX, &policy);
        assert_eq!(result, Err(MiningError::Exhausted { attempts: 3 }));
    }

    #[test]
    fn test_zero_max_attempts_never_hashes() {
        let policy = StopPolicy::unbounded().with_max_attempts(0);
        let result = search_nonce("abc", 0, DEFAULT_POW_PREFIX, &policy);
        assert_eq!(result, Err(MiningError::Exhausted { attempts: 0 }));
    }

    #[test]
    fn test_cancelled_token_stops_search() {
        let token = CancelToken::new();
        token.cancel();
        let policy = StopPolicy::unbounded().with_cancel(token);

        let result = search_nonce("abc", 64, DEFAULT_POW_PREFIX, &policy);
        assert_eq!(result, Err(MiningError::Cancelled { attempts: 0 }));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancelToken::new();
        let policy = StopPolicy::unbounded().with_cancel(token.clone());

        let handle = thread::spawn(move || search_nonce("abc", 64, DEFAULT_POW_PREFIX, &policy));
        token.cancel();

        let result = handle.join().unwrap();
        assert!(matches!(result, Err(MiningError::Cancelled { .. })));
    }

    #[test]
    fn test_hash_rate() {
        assert_eq!(hash_rate(500, Duration::ZERO), 0.0);
        assert_eq!(hash_rate(500, Duration::from_millis(500)), 1000.0);
        assert_eq!(hash_rate(0, Duration::from_secs(2)), 0.0);
    }

    #[test]
    fn test_miner_keeps_payload() {
        let miner = Miner::new(1, DEFAULT_POW_PREFIX);
        let payload = payload();

        let mined = miner.mine(&payload).unwrap();

        assert_eq!(mined.block.payload, payload);
        assert_eq!(mined.block.header.block_hash, payload.hash());
        assert!(mined.block.is_valid_pow(1, DEFAULT_POW_PREFIX));
        assert_eq!(mined.stats.hash_attempts, mined.block.header.nonce + 1);
    }

    #[test]
    fn test_mining_is_deterministic() {
        let miner = Miner::new(1, DEFAULT_POW_PREFIX);
        let payload = payload();

        let first = miner.mine(&payload).unwrap();
        let second = miner.mine(&payload).unwrap();

        assert_eq!(first.block.header, second.block.header);
    }
}
