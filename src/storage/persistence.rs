//! Ledger persistence layer
//!
//! Saves a ledger as pretty JSON and loads it back, re-validating every
//! block on the way in.

use crate::core::{Ledger, LedgerConfig};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        // Chain validation failures surface as custom data errors
        if err.is_data() {
            StorageError::InvalidData(err.to_string())
        } else {
            StorageError::SerializationError(err)
        }
    }
}

/// Save ledger to a specific file path
pub fn save_to_file(ledger: &Ledger, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, ledger)?;
    writer.flush()?;
    Ok(())
}

/// Load ledger from a specific file path
pub fn load_from_file(path: &Path) -> Result<Ledger, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let ledger: Ledger = serde_json::from_reader(reader)?;
    Ok(ledger)
}

/// Load a ledger and check it against the caller's expected settings
/// rather than the settings recorded in the file.
pub fn load_verified(path: &Path, expected: &LedgerConfig) -> Result<Ledger, StorageError> {
    let stored = load_from_file(path)?;

    if !stored.config().is_at_least(expected) {
        return Err(StorageError::InvalidData(format!(
            "stored settings (difficulty {}, prefix '{}', strict {}) are weaker than expected \
             (difficulty {}, prefix '{}', strict {})",
            stored.difficulty(),
            stored.pow_prefix(),
            stored.config().strict_hash_check,
            expected.difficulty,
            expected.pow_prefix,
            expected.strict_hash_check
        )));
    }

    Ledger::from_blocks(expected.clone(), stored.chain().to_vec())
        .map_err(|e| StorageError::InvalidData(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{meets_target, pow_hash};
    use serde_json::Value;

    /// A difficulty-2 chain whose block 1 was rewritten without redoing the work
    fn forged_blocks() -> Vec<crate::core::Block> {
        let mut ledger = Ledger::with_difficulty(2);
        let payload = ledger.create_block("Block 1").unwrap();
        let mined = ledger.mine_block(&payload).unwrap();
        assert!(ledger.append_block(mined.block).is_accepted());

        let mut blocks = ledger.chain().to_vec();
        blocks[1].payload.data = Value::from("FORGED");
        blocks[1].header.block_hash = blocks[1].payload.hash();
        let mut nonce = 0;
        while meets_target(&pow_hash(&blocks[1].header.block_hash, nonce), 2, '0') {
            nonce += 1;
        }
        blocks[1].header.nonce = nonce;
        blocks
    }

    fn mined_ledger() -> Ledger {
        let mut ledger = Ledger::with_difficulty(1);
        for i in 1..=3 {
            let payload = ledger.create_block(format!("Block {}", i)).unwrap();
            let mined = ledger.mine_block(&payload).unwrap();
            assert!(ledger.append_block(mined.block).is_accepted());
        }
        ledger
    }

    #[test]
    fn test_save_load_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");
        let ledger = mined_ledger();

        save_to_file(&ledger, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();

        assert_eq!(loaded.chain(), ledger.chain());
        assert_eq!(loaded.config(), ledger.config());
    }

    #[test]
    fn test_tampered_file_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");
        save_to_file(&mined_ledger(), &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        fs::write(&path, contents.replace("Block 2", "Block 9")).unwrap();

        let result = load_from_file(&path);
        assert!(matches!(result, Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_forged_low_difficulty_file_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");
        let weak = LedgerConfig {
            difficulty: 0,
            strict_hash_check: false,
            ..Default::default()
        };
        let forged = Ledger::from_blocks(weak, forged_blocks()).unwrap();
        save_to_file(&forged, &path).unwrap();

        // The file is self-consistent under its own settings
        assert!(load_from_file(&path).is_ok());

        let expected = LedgerConfig {
            difficulty: 2,
            ..Default::default()
        };
        let result = load_verified(&path, &expected);
        assert!(matches!(result, Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_forged_blocks_fail_expected_difficulty() {
        let expected = LedgerConfig {
            difficulty: 2,
            ..Default::default()
        };
        assert!(Ledger::from_blocks(expected, forged_blocks()).is_err());
    }

    #[test]
    fn test_load_verified_accepts_harder_chain() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");
        let ledger = mined_ledger();
        save_to_file(&ledger, &path).unwrap();

        let expected = LedgerConfig {
            difficulty: 0,
            ..Default::default()
        };
        let loaded = load_verified(&path, &expected).unwrap();
        assert_eq!(loaded.chain(), ledger.chain());
        assert_eq!(loaded.config(), &expected);
    }

    #[test]
    fn test_malformed_file_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");
        fs::write(&path, "{ not json").unwrap();

        let result = load_from_file(&path);
        assert!(matches!(result, Err(StorageError::SerializationError(_))));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_from_file(&temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(StorageError::IoError(_))));
    }
}
