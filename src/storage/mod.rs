//! Storage module for ledger export and import

pub mod persistence;

pub use persistence::{load_from_file, load_verified, save_to_file, StorageError};
