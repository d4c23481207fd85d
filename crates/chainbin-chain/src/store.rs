//! Collaborator traits for the entity store and the submitting wallet

use async_trait::async_trait;
use chainbin_core::{ChainbinResult, KvPair};

use crate::receipt::TransactionReceipt;

/// An entity as read back from the store: raw payload bytes plus the two
/// flat annotation channels and the block at which it expires.
#[derive(Debug, Clone)]
pub struct StoredEntity {
    pub payload: Vec<u8>,
    pub string_annotations: Vec<KvPair<String>>,
    pub numeric_annotations: Vec<KvPair<u64>>,
    pub expires_at_block: u64,
}

/// A fully prepared entity creation: payload, TTL in blocks, and the
/// annotations to attach. This is what a note turns into at submission.
#[derive(Debug, Clone)]
pub struct EntityCreate {
    pub payload: Vec<u8>,
    pub ttl_blocks: u64,
    pub string_annotations: Vec<KvPair<String>>,
    pub numeric_annotations: Vec<KvPair<u64>>,
}

/// Handle returned the moment the wallet accepts a submission, before
/// any chain confirmation.
#[derive(Debug, Clone)]
pub struct TxHandle {
    pub tx_id: String,
}

/// Read side of the storage collaborator.
#[async_trait]
pub trait EntityReader: Send + Sync {
    /// Fetch an entity by id. `Ok(None)` means absent or past its TTL,
    /// which callers treat as a normal state, not a fault.
    async fn entity(&self, id: &str) -> ChainbinResult<Option<StoredEntity>>;

    /// Current chain height, used for wall-clock expiry estimates.
    async fn current_block_height(&self) -> ChainbinResult<u64>;
}

/// Write side of the storage collaborator. Implementations own the
/// wallet interaction; the core never sees keys or signatures.
#[async_trait]
pub trait EntityWriter: Send + Sync {
    /// Hand a creation to the wallet. Returns as soon as the wallet
    /// accepts; the mined receipt arrives out of band via [`Self::receipt`].
    async fn submit(&self, create: EntityCreate) -> ChainbinResult<TxHandle>;

    /// Poll for the mined receipt. `Ok(None)` while still pending.
    async fn receipt(&self, tx_id: &str) -> ChainbinResult<Option<TransactionReceipt>>;
}
