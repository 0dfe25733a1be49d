//! Ledger implementation
//!
//! Owns the chain of blocks and mediates block creation, mining,
//! verification and appending.

use crate::core::block::{short_hash, Block, BlockPayload};
use crate::crypto::DEFAULT_POW_PREFIX;
use crate::mining::{MinedBlock, Miner, MiningError, StopPolicy};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default mining difficulty (number of leading prefix characters)
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Ledger-related errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid block data: {0}")]
    InvalidData(#[from] serde_json::Error),
    #[error(transparent)]
    Mining(#[from] MiningError),
    #[error("Invalid chain: {0}")]
    InvalidChain(String),
}

/// Why a submitted block was turned away
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("The previous hash is {} and not {}", short_hash(.expected), short_hash(.found))]
    LinkageMismatch { expected: String, found: String },
    #[error("Sequence should be {expected} and not {found}")]
    SequenceMismatch { expected: u64, found: u64 },
    #[error("Stored hash {} does not match payload hash {}", short_hash(.stored), short_hash(.computed))]
    BlockHashMismatch { stored: String, computed: String },
    #[error("Nonce {nonce} is invalid and cannot be verified")]
    ProofOfWorkInvalid { nonce: u64 },
}

/// Result of submitting a block to the ledger
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl AppendOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, AppendOutcome::Accepted)
    }
}

/// Settings fixed when the ledger is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub difficulty: u32,
    pub pow_prefix: char,
    /// Also require `header.block_hash` to match the payload when verifying
    pub strict_hash_check: bool,
    /// Upper bound on nonce attempts per block; `None` searches forever
    #[serde(default)]
    pub max_attempts: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            pow_prefix: DEFAULT_POW_PREFIX,
            strict_hash_check: true,
            max_attempts: None,
        }
    }
}

impl LedgerConfig {
    /// True when blocks accepted under `self` must also pass under `expected`
    pub fn is_at_least(&self, expected: &LedgerConfig) -> bool {
        self.difficulty >= expected.difficulty
            && (self.pow_prefix == expected.pow_prefix || expected.difficulty == 0)
            && (self.strict_hash_check || !expected.strict_hash_check)
    }
}

/// The append-only chain of blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LedgerRecord")]
pub struct Ledger {
    config: LedgerConfig,
    blocks: Vec<Block>,
}

/// Unvalidated form a ledger is deserialized through
#[derive(Deserialize)]
struct LedgerRecord {
    config: LedgerConfig,
    blocks: Vec<Block>,
}

impl TryFrom<LedgerRecord> for Ledger {
    type Error = LedgerError;

    fn try_from(record: LedgerRecord) -> Result<Self, Self::Error> {
        Ledger::from_blocks(record.config, record.blocks)
    }
}

impl Ledger {
    /// Create a new ledger with the default difficulty
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create a ledger with custom difficulty
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self::with_config(LedgerConfig {
            difficulty,
            ..Default::default()
        })
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            config,
            blocks: vec![Block::genesis()],
        }
    }

    /// Rebuild a ledger from existing blocks, checking every invariant
    pub fn from_blocks(config: LedgerConfig, blocks: Vec<Block>) -> Result<Self, LedgerError> {
        let ledger = Self { config, blocks };
        ledger.validate_chain()?;
        Ok(ledger)
    }

    /// Read-only view of the chain
    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    pub fn pow_prefix(&self) -> char {
        self.config.pow_prefix
    }

    /// Get the latest block
    pub fn latest_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("Ledger should have at least genesis block")
    }

    /// Get a block by sequence number
    pub fn get_block(&self, index: u64) -> Option<&Block> {
        self.blocks.get(usize::try_from(index).ok()?)
    }

    /// Get ledger height (sequence of the latest block)
    pub fn height(&self) -> u64 {
        self.latest_block().sequence()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block is present from construction
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Build the unmined payload for the next block
    pub fn create_block<D: Serialize>(&self, data: D) -> Result<BlockPayload, LedgerError> {
        let latest = self.latest_block();
        let payload = BlockPayload::new(
            latest.sequence() + 1,
            serde_json::to_value(data)?,
            latest.hash(),
        );

        info!(
            "Block #{} created: {}",
            payload.sequence,
            payload.canonical_json()
        );

        Ok(payload)
    }

    /// Mine a payload using the ledger's difficulty and attempt limit
    pub fn mine_block(&self, payload: &BlockPayload) -> Result<MinedBlock, LedgerError> {
        let policy = match self.config.max_attempts {
            Some(max) => StopPolicy::unbounded().with_max_attempts(max),
            None => StopPolicy::unbounded(),
        };
        self.mine_block_with(payload, &policy)
    }

    /// Mine a payload with a caller-supplied stop policy
    pub fn mine_block_with(
        &self,
        payload: &BlockPayload,
        policy: &StopPolicy,
    ) -> Result<MinedBlock, LedgerError> {
        let miner = Miner::new(self.config.difficulty, self.config.pow_prefix)
            .with_policy(policy.clone());

        miner.mine(payload).map_err(|e| {
            warn!("Block #{} not mined: {}", payload.sequence, e);
            LedgerError::from(e)
        })
    }

    /// Check a block against the current tail of the chain
    pub fn verify_block(&self, block: &Block) -> Result<(), RejectReason> {
        self.verify_successor(self.latest_block(), block)
    }

    /// Verify a block and append it if it holds
    pub fn append_block(&mut self, block: Block) -> AppendOutcome {
        if let Err(reason) = self.verify_block(&block) {
            warn!("Block #{} invalid. {}", block.sequence(), reason);
            return AppendOutcome::Rejected(reason);
        }

        info!(
            "Block #{} has been added to the ledger: {}",
            block.sequence(),
            short_hash(block.hash())
        );
        if let Ok(json) = serde_json::to_string_pretty(&block) {
            debug!("{}", json);
        }

        self.blocks.push(block);
        AppendOutcome::Accepted
    }

    /// Linkage, sequencing, hash consistency and proof of work of `block`
    /// as the successor of `previous`
    fn verify_successor(&self, previous: &Block, block: &Block) -> Result<(), RejectReason> {
        if block.payload.previous_hash != previous.header.block_hash {
            return Err(RejectReason::LinkageMismatch {
                expected: previous.header.block_hash.clone(),
                found: block.payload.previous_hash.clone(),
            });
        }

        let expected_sequence = previous.sequence() + 1;
        if block.sequence() != expected_sequence {
            return Err(RejectReason::SequenceMismatch {
                expected: expected_sequence,
                found: block.sequence(),
            });
        }

        if self.config.strict_hash_check && !block.verify_hash() {
            return Err(RejectReason::BlockHashMismatch {
                stored: block.header.block_hash.clone(),
                computed: block.payload.hash(),
            });
        }

        if !block.is_valid_pow(self.config.difficulty, self.config.pow_prefix) {
            return Err(RejectReason::ProofOfWorkInvalid {
                nonce: block.header.nonce,
            });
        }

        Ok(())
    }

    /// Validate the entire chain, genesis included
    pub fn validate_chain(&self) -> Result<(), LedgerError> {
        let genesis = self
            .blocks
            .first()
            .ok_or_else(|| LedgerError::InvalidChain("chain has no genesis block".to_string()))?;

        if genesis.sequence() != 0 || !genesis.payload.previous_hash.is_empty() {
            return Err(LedgerError::InvalidChain(
                "malformed genesis block".to_string(),
            ));
        }

        if !genesis.verify_hash() {
            return Err(LedgerError::InvalidChain(
                "genesis block hash does not match its payload".to_string(),
            ));
        }

        for pair in self.blocks.windows(2) {
            self.verify_successor(&pair[0], &pair[1]).map_err(|reason| {
                LedgerError::InvalidChain(format!("block #{}: {}", pair[1].sequence(), reason))
            })?;
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate_chain().is_ok()
    }

    /// Get chain statistics
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            height: self.height(),
            total_blocks: self.blocks.len() as u64,
            difficulty: self.config.difficulty,
            latest_hash: self.latest_block().hash().to_string(),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Chain statistics
#[derive(Debug, Clone)]
pub struct ChainStats {
    pub height: u64,
    pub total_blocks: u64,
    pub difficulty: u32,
    pub latest_hash: String,
}
