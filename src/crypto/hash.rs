//! Cryptographic hashing utilities for the ledger
//!
//! Provides the SHA-256 digest used for payload hashes and the
//! prefix predicate that decides whether a proof-of-work hash is accepted.

use sha2::{Digest, Sha256};

/// Character repeated `difficulty` times at the start of an accepted hash
pub const DEFAULT_POW_PREFIX: char = '0';

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Second-layer hash checked against the difficulty target:
/// the digest of the payload hash followed by the decimal nonce.
pub fn pow_hash(block_hash: &str, nonce: u64) -> String {
    sha256_hex(format!("{}{}", block_hash, nonce).as_bytes())
}

/// Checks if a hex hash starts with `prefix` repeated `difficulty` times.
///
/// A difficulty of zero is always satisfied.
pub fn meets_target(hash: &str, difficulty: u32, prefix: char) -> bool {
    let mut chars = hash.chars();
    (0..difficulty).all(|_| chars.next() == Some(prefix))
}
