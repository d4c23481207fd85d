//! Per-account transaction state machine over the durable blob
//!
//! Entries move one way: `Pending` (the wallet accepted the submission)
//! to `Complete` (a mined receipt told us which note was created and
//! when it expires). Nothing here deletes entries.
//!
//! Persistence discipline: every operation reads the whole blob from
//! the store, applies its change, and writes the whole blob back. An
//! in-process mutex serializes those cycles; separate processes sharing
//! one store still race last-writer-wins, which is accepted and
//! documented rather than papered over.

use chainbin_core::ChainbinResult;
use chainbin_chain::receipt::{parse_receipt, TransactionReceipt};
use chainbin_chain::expiry::estimate_expiry;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::kv::LocalKv;

/// Fixed key of the ledger blob in the local store.
pub const LEDGER_KEY: &str = "transactions";

/// State of one tracked submission.
///
/// The serialized form is a durable contract shared with other
/// deployments reading the same store; field and tag names must not
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TxState {
    Pending,
    #[serde(rename_all = "camelCase")]
    Complete {
        note_id: String,
        expiration_date: DateTime<Utc>,
    },
}

/// What resolving a receipt yields.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNoteData {
    pub note_id: String,
    pub expiration_date: DateTime<Utc>,
}

/// account → tx → state, both levels in insertion order.
type TransactionMap = IndexMap<String, IndexMap<String, TxState>>;

pub struct Ledger<K: LocalKv> {
    kv: Mutex<K>,
}

impl<K: LocalKv> Ledger<K> {
    pub fn new(kv: K) -> Self {
        Self { kv: Mutex::new(kv) }
    }

    fn load(kv: &K) -> ChainbinResult<TransactionMap> {
        match kv.get(LEDGER_KEY)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(TransactionMap::new()),
        }
    }

    fn store(kv: &mut K, map: &TransactionMap) -> ChainbinResult<()> {
        kv.set(LEDGER_KEY, &serde_json::to_string(map)?)
    }

    /// Record a submission the wallet just accepted. Idempotent: marking
    /// the same transaction pending again overwrites without error and
    /// keeps the entry's position.
    pub fn mark_pending(&self, account: &str, tx_id: &str) -> ChainbinResult<()> {
        let mut kv = self.kv.lock().expect("ledger lock poisoned");
        let mut map = Self::load(&kv)?;

        map.entry(account.to_string())
            .or_default()
            .insert(tx_id.to_string(), TxState::Pending);

        tracing::debug!(account, tx_id, "transaction pending");
        Self::store(&mut kv, &map)
    }

    /// Reconcile a mined receipt: extract the created note and its
    /// expiry block, estimate the wall-clock expiry, and mark the entry
    /// complete.
    ///
    /// Deterministic for a given receipt and chain height, so two
    /// callers racing on the same transaction persist the same result
    /// regardless of order.
    pub fn resolve(
        &self,
        account: &str,
        tx_id: &str,
        receipt: &TransactionReceipt,
        current_block: u64,
        block_interval_secs: u64,
    ) -> ChainbinResult<NewNoteData> {
        let new_entity = parse_receipt(receipt)?;
        let expiration_date = estimate_expiry(
            new_entity.expires_at_block,
            current_block,
            block_interval_secs,
        );

        let mut kv = self.kv.lock().expect("ledger lock poisoned");
        let mut map = Self::load(&kv)?;

        map.entry(account.to_string()).or_default().insert(
            tx_id.to_string(),
            TxState::Complete {
                note_id: new_entity.entity_id.clone(),
                expiration_date,
            },
        );

        tracing::debug!(account, tx_id, note_id = %new_entity.entity_id, "transaction complete");
        Self::store(&mut kv, &map)?;

        Ok(NewNoteData {
            note_id: new_entity.entity_id,
            expiration_date,
        })
    }

    /// All tracked submissions for an account, in first-seen order.
    pub fn list(&self, account: &str) -> ChainbinResult<Vec<(String, TxState)>> {
        let kv = self.kv.lock().expect("ledger lock poisoned");
        let map = Self::load(&kv)?;

        Ok(map
            .get(account)
            .map(|txs| txs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use chainbin_chain::receipt::ReceiptLog;
    use chrono::Duration;

    fn receipt(entity_id: &str, expires_at_block: u64) -> TransactionReceipt {
        TransactionReceipt {
            logs: vec![ReceiptLog {
                topics: vec!["0xevent".into(), entity_id.into()],
                data: format!("0x{expires_at_block:x}"),
            }],
        }
    }

    fn ledger() -> Ledger<MemoryKv> {
        Ledger::new(MemoryKv::new())
    }

    #[test]
    fn pending_then_complete() {
        let ledger = ledger();
        ledger.mark_pending("0xacc", "0xtx1").unwrap();

        assert_eq!(
            ledger.list("0xacc").unwrap(),
            vec![("0xtx1".to_string(), TxState::Pending)]
        );

        let data = ledger
            .resolve("0xacc", "0xtx1", &receipt("0xnote", 100), 90, 2)
            .unwrap();
        assert_eq!(data.note_id, "0xnote");

        let listed = ledger.list("0xacc").unwrap();
        assert_eq!(listed.len(), 1);
        match &listed[0].1 {
            TxState::Complete { note_id, .. } => assert_eq!(note_id, "0xnote"),
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn mark_pending_is_idempotent() {
        let ledger = ledger();
        ledger.mark_pending("0xacc", "0xtx1").unwrap();
        ledger.mark_pending("0xacc", "0xtx1").unwrap();

        assert_eq!(ledger.list("0xacc").unwrap().len(), 1);
    }

    #[test]
    fn resolve_twice_converges() {
        let ledger = ledger();
        ledger.mark_pending("0xacc", "0xtx1").unwrap();

        let first = ledger
            .resolve("0xacc", "0xtx1", &receipt("0xnote", 100), 90, 2)
            .unwrap();
        let second = ledger
            .resolve("0xacc", "0xtx1", &receipt("0xnote", 100), 90, 2)
            .unwrap();

        assert_eq!(first.note_id, second.note_id);
        // Estimates are taken from "now" so they differ by the test's own
        // runtime, never by more than a moment.
        let drift = (second.expiration_date - first.expiration_date).num_seconds();
        assert!(drift.abs() <= 1);
        assert_eq!(ledger.list("0xacc").unwrap().len(), 1);
    }

    #[test]
    fn resolve_without_pending_entry_still_lands() {
        // Another tab may have resolved first, or the pending write may
        // have been lost to a race; the receipt is still authoritative.
        let ledger = ledger();
        let data = ledger
            .resolve("0xacc", "0xtx9", &receipt("0xnote9", 50), 40, 2)
            .unwrap();
        assert_eq!(data.note_id, "0xnote9");
        assert_eq!(ledger.list("0xacc").unwrap().len(), 1);
    }

    #[test]
    fn malformed_receipt_keeps_entry_pending() {
        let ledger = ledger();
        ledger.mark_pending("0xacc", "0xtx1").unwrap();

        let bad = TransactionReceipt { logs: vec![] };
        assert!(ledger.resolve("0xacc", "0xtx1", &bad, 90, 2).is_err());

        assert_eq!(
            ledger.list("0xacc").unwrap(),
            vec![("0xtx1".to_string(), TxState::Pending)]
        );
    }

    #[test]
    fn insertion_order_is_stable_across_completion() {
        let ledger = ledger();
        ledger.mark_pending("0xacc", "0xtx1").unwrap();
        ledger.mark_pending("0xacc", "0xtx2").unwrap();
        ledger.mark_pending("0xacc", "0xtx3").unwrap();

        // Completing the middle entry must not move it.
        ledger
            .resolve("0xacc", "0xtx2", &receipt("0xnote2", 100), 90, 2)
            .unwrap();

        let order: Vec<_> = ledger
            .list("0xacc")
            .unwrap()
            .into_iter()
            .map(|(tx, _)| tx)
            .collect();
        assert_eq!(order, vec!["0xtx1", "0xtx2", "0xtx3"]);
    }

    #[test]
    fn accounts_are_isolated() {
        let ledger = ledger();
        ledger.mark_pending("0xalice", "0xtx1").unwrap();
        ledger.mark_pending("0xbob", "0xtx2").unwrap();

        assert_eq!(ledger.list("0xalice").unwrap().len(), 1);
        assert_eq!(ledger.list("0xbob").unwrap().len(), 1);
        assert!(ledger.list("0xnobody").unwrap().is_empty());
    }

    #[test]
    fn past_expiry_block_resolves_to_past_date() {
        let ledger = ledger();
        let data = ledger
            .resolve("0xacc", "0xtx1", &receipt("0xnote", 80), 90, 2)
            .unwrap();
        assert!(data.expiration_date < Utc::now());
    }

    #[test]
    fn serialized_shape_is_the_durable_contract() {
        let mut map = TransactionMap::new();
        let mut txs = IndexMap::new();
        txs.insert("0xtx1".to_string(), TxState::Pending);
        txs.insert(
            "0xtx2".to_string(),
            TxState::Complete {
                note_id: "0xnote".into(),
                expiration_date: DateTime::parse_from_rfc3339("2026-08-06T10:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            },
        );
        map.insert("0xacc".to_string(), txs);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"{"0xacc":{"0xtx1":{"type":"pending"},"0xtx2":{"type":"complete","noteId":"0xnote","expirationDate":"2026-08-06T10:00:00Z"}}}"#
        );

        // And it parses back unchanged.
        let parsed: TransactionMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }

    #[test]
    fn expiration_survives_as_a_fixed_timestamp() {
        let ledger = ledger();
        let data = ledger
            .resolve("0xacc", "0xtx1", &receipt("0xnote", 100), 90, 2)
            .unwrap();

        // Re-reading later must return the stored timestamp, not a fresh
        // estimate.
        std::thread::sleep(std::time::Duration::from_millis(20));
        match &ledger.list("0xacc").unwrap()[0].1 {
            TxState::Complete {
                expiration_date, ..
            } => assert_eq!(*expiration_date, data.expiration_date),
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn expiry_estimate_is_roughly_now_plus_delta() {
        let ledger = ledger();
        let before = Utc::now();
        let data = ledger
            .resolve("0xacc", "0xtx1", &receipt("0xnote", 100), 90, 2)
            .unwrap();

        // 10 blocks at 2s
        assert!(data.expiration_date >= before + Duration::seconds(20));
        assert!(data.expiration_date <= Utc::now() + Duration::seconds(21));
    }
}
