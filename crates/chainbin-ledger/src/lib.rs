//! chainbin-ledger: local record of note submissions
//!
//! A submission is in flight from the moment the wallet accepts it
//! until its receipt is mined, which can span page reloads and process
//! restarts. This crate keeps that state in one durable JSON blob,
//! keyed account → transaction, and reconciles pending entries against
//! receipts to recover the created note's id and expiry.

pub mod kv;
pub mod ledger;

pub use kv::{expand_tilde, JsonFileKv, LocalKv, MemoryKv};
pub use ledger::{Ledger, NewNoteData, TxState, LEDGER_KEY};
