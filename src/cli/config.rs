//! Run configuration for the driver

use crate::core::{LedgerConfig, DEFAULT_DIFFICULTY};
use std::path::PathBuf;
use std::str::FromStr;

/// Number of blocks mined when no count is given
pub const DEFAULT_BLOCK_COUNT: u64 = 10;

/// Parse a positional argument, falling back to `default` when it is
/// missing, non-numeric or zero.
pub fn parse_or_default<T>(raw: Option<&str>, default: T) -> T
where
    T: FromStr + PartialEq + Default,
{
    raw.and_then(|s| s.trim().parse::<T>().ok())
        .filter(|v| *v != T::default())
        .unwrap_or(default)
}

/// Everything a mining run needs
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ledger: LedgerConfig,
    pub blocks: u64,
    pub output: Option<PathBuf>,
    pub print_chain: bool,
}

impl RunConfig {
    /// Build from raw positional arguments
    pub fn from_args(difficulty: Option<&str>, blocks: Option<&str>) -> Self {
        Self {
            ledger: LedgerConfig {
                difficulty: parse_or_default(difficulty, DEFAULT_DIFFICULTY),
                ..Default::default()
            },
            blocks: parse_or_default(blocks, DEFAULT_BLOCK_COUNT),
            output: None,
            print_chain: true,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from_args(None, None)
    }
}
