//! Transaction receipt shape and extraction of the created entity
//!
//! A successful note submission creates exactly one entity, which the
//! chain reports as the first log's second topic; the log data carries
//! the expiry block as a hex quantity. Anything else means the
//! submission did not do what this application requires, and the whole
//! receipt is rejected as malformed.

use chainbin_core::{ChainbinError, ChainbinResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
    pub topics: Vec<String>,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub logs: Vec<ReceiptLog>,
}

/// What a receipt resolves to: the created entity and its expiry block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    pub entity_id: String,
    pub expires_at_block: u64,
}

/// Extract the created entity from a mined receipt.
pub fn parse_receipt(receipt: &TransactionReceipt) -> ChainbinResult<NewEntity> {
    let log = receipt.logs.first().ok_or_else(|| malformed("no logs"))?;

    if log.topics.len() < 2 {
        return Err(malformed("first log has fewer than two topics"));
    }
    let entity_id = log.topics[1].clone();
    if entity_id.is_empty() {
        return Err(malformed("entity id topic is empty"));
    }

    let expires_at_block = parse_hex_quantity(&log.data)
        .ok_or_else(|| malformed("log data is not a hex block number"))?;

    Ok(NewEntity {
        entity_id,
        expires_at_block,
    })
}

fn malformed(reason: &str) -> ChainbinError {
    tracing::warn!(reason, "rejecting transaction receipt");
    ChainbinError::MalformedReceipt {
        reason: reason.into(),
    }
}

/// Parse an `0x`-prefixed hex quantity as the chain RPC encodes numbers.
pub(crate) fn parse_hex_quantity(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}
