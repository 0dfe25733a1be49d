//! Block implementation for the ledger
//!
//! A block is split into a header (proof-of-work result) and a payload
//! (the data that gets hashed and linked to the previous block).

use crate::crypto::{meets_target, pow_hash, sha256_hex};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data carried by the genesis block
pub const GENESIS_DATA: &str = "Initial block";

/// Block header holding the mining result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Nonce that satisfied the difficulty target
    pub nonce: u64,
    /// Hash of the serialized payload, computed once at mining time
    pub block_hash: String,
}

/// The hashed part of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPayload {
    /// Position in the chain (genesis = 0)
    pub sequence: u64,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Opaque application data
    pub data: Value,
    /// Block hash of the block this payload extends
    pub previous_hash: String,
}

impl BlockPayload {
    /// Create a payload stamped with the current time
    pub fn new(sequence: u64, data: Value, previous_hash: impl Into<String>) -> Self {
        Self {
            sequence,
            timestamp: Utc::now().timestamp_millis(),
            data,
            previous_hash: previous_hash.into(),
        }
    }

    /// Compact JSON encoding used for hashing.
    ///
    /// Keys appear as `sequence, timestamp, data, previousHash` with no
    /// whitespace, the same bytes `JSON.stringify` gives for a payload.
    /// Objects inside `data` keep their insertion order.
    pub fn canonical_json(&self) -> String {
        format!(
            r#"{{"sequence":{},"timestamp":{},"data":{},"previousHash":{}}}"#,
            self.sequence,
            self.timestamp,
            self.data,
            Value::from(self.previous_hash.as_str())
        )
    }

    /// Digest of the canonical encoding
    pub fn hash(&self) -> String {
        sha256_hex(self.canonical_json().as_bytes())
    }

    /// Decode `data` into an application type
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

/// A block in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub payload: BlockPayload,
}

impl Block {
    /// Create the genesis block. No proof of work is performed.
    pub fn genesis() -> Self {
        let payload = BlockPayload::new(0, Value::from(GENESIS_DATA), "");
        let block_hash = payload.hash();

        Self {
            header: BlockHeader {
                nonce: 0,
                block_hash,
            },
            payload,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.payload.sequence
    }

    pub fn hash(&self) -> &str {
        &self.header.block_hash
    }

    /// Check that the stored block hash matches the payload
    pub fn verify_hash(&self) -> bool {
        self.header.block_hash == self.payload.hash()
    }

    /// Check the proof of work, recomputing the payload hash from scratch
    pub fn is_valid_pow(&self, difficulty: u32, prefix: char) -> bool {
        let test_hash = pow_hash(&self.payload.hash(), self.header.nonce);
        meets_target(&test_hash, difficulty, prefix)
    }
}

/// First 12 characters of a hash, for log lines
pub fn short_hash(hash: &str) -> String {
    hash.chars().take(12).collect()
}
