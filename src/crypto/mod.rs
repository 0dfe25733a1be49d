//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - SHA-256 hashing
//! - The proof-of-work prefix predicate

pub mod hash;

pub use hash::{meets_target, pow_hash, sha256, sha256_hex, DEFAULT_POW_PREFIX};
