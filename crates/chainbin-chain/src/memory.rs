//! In-memory chain double for tests and offline wiring
//!
//! Behaves like a one-node chain: `submit` accepts immediately and the
//! receipt becomes available on the next poll, or only after `mine_all`
//! when constructed with held receipts (to exercise the pending state).

use async_trait::async_trait;
use chainbin_core::ChainbinResult;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::receipt::{ReceiptLog, TransactionReceipt};
use crate::store::{EntityCreate, EntityReader, EntityWriter, StoredEntity, TxHandle};

/// Topic 0 of the creation log; tests only care that it is not the id.
const CREATED_TOPIC: &str = "0x00000000000000000000000000000000000000000000000000000000000000c0";

#[derive(Default)]
struct Inner {
    entities: HashMap<String, StoredEntity>,
    mined: HashMap<String, TransactionReceipt>,
    held: HashMap<String, TransactionReceipt>,
    height: u64,
    next_seq: u64,
}

pub struct MemoryChain {
    inner: Mutex<Inner>,
    hold_receipts: bool,
}

impl Default for MemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryChain {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            hold_receipts: false,
        }
    }

    /// Receipts stay unavailable until [`Self::mine_all`] is called.
    pub fn with_held_receipts() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            hold_receipts: true,
        }
    }

    pub fn set_height(&self, height: u64) {
        self.inner.lock().expect("memory chain lock").height = height;
    }

    /// Release all held receipts, as if the pending transactions mined.
    pub fn mine_all(&self) {
        let mut inner = self.inner.lock().expect("memory chain lock");
        let held = std::mem::take(&mut inner.held);
        inner.mined.extend(held);
    }

    /// Drop a stored entity, simulating TTL expiry.
    pub fn expire_entity(&self, id: &str) {
        self.inner.lock().expect("memory chain lock").entities.remove(id);
    }
}

#[async_trait]
impl EntityReader for MemoryChain {
    async fn entity(&self, id: &str) -> ChainbinResult<Option<StoredEntity>> {
        let inner = self.inner.lock().expect("memory chain lock");
        Ok(inner.entities.get(id).cloned())
    }

    async fn current_block_height(&self) -> ChainbinResult<u64> {
        Ok(self.inner.lock().expect("memory chain lock").height)
    }
}

#[async_trait]
impl EntityWriter for MemoryChain {
    async fn submit(&self, create: EntityCreate) -> ChainbinResult<TxHandle> {
        let mut inner = self.inner.lock().expect("memory chain lock");
        inner.next_seq += 1;
        let seq = inner.next_seq;

        let tx_id = format!("0x{seq:064x}");
        let entity_id = format!("0x{:064x}", 0xe000_0000_u64 + seq);
        let expires_at_block = inner.height + create.ttl_blocks;

        inner.entities.insert(
            entity_id.clone(),
            StoredEntity {
                payload: create.payload,
                string_annotations: create.string_annotations,
                numeric_annotations: create.numeric_annotations,
                expires_at_block,
            },
        );

        let receipt = TransactionReceipt {
            logs: vec![ReceiptLog {
                topics: vec![CREATED_TOPIC.into(), entity_id],
                data: format!("0x{expires_at_block:x}"),
            }],
        };
        if self.hold_receipts {
            inner.held.insert(tx_id.clone(), receipt);
        } else {
            inner.mined.insert(tx_id.clone(), receipt);
        }

        Ok(TxHandle { tx_id })
    }

    async fn receipt(&self, tx_id: &str) -> ChainbinResult<Option<TransactionReceipt>> {
        let inner = self.inner.lock().expect("memory chain lock");
        Ok(inner.mined.get(tx_id).cloned())
    }
}
