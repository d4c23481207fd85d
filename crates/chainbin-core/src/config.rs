use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration (loaded from chainbin.toml).
///
/// Built once at startup and passed to every component that needs it;
/// nothing in the workspace reads ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainbinConfig {
    pub chain: ChainConfig,
    pub note: NoteConfig,
    pub ledger: LedgerConfig,
    /// Log level (default: info)
    pub log_level: String,
}

impl Default for ChainbinConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            note: NoteConfig::default(),
            ledger: LedgerConfig::default(),
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the chain node
    pub rpc_endpoint: String,
    /// Chain id the wallet is expected to be on
    pub chain_id: u64,
    /// Average seconds between blocks, used for expiry estimates
    pub block_interval_secs: u64,
    /// Bound on each RPC round-trip
    pub rpc_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteConfig {
    /// Maximum note size in UTF-8 bytes, checked before encryption
    pub max_note_size: usize,
    /// Whether password encryption is offered at all
    pub encryption_enabled: bool,
    /// Syntax language assumed when none is given
    pub default_language: String,
    /// Default TTL in blocks for new notes
    pub default_ttl_blocks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory holding the local transaction ledger
    pub dir: PathBuf,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: "http://localhost:8545".into(),
            chain_id: 600606,
            block_interval_secs: 2,
            rpc_timeout_secs: 30,
        }
    }
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            max_note_size: 1024,
            encryption_enabled: true,
            default_language: "plaintext".into(),
            default_ttl_blocks: 300,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("~/.local/share/chainbin"),
        }
    }
}
