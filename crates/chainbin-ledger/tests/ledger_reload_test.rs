//! Ledger durability across process restarts: state written through one
//! ledger instance must be visible to a fresh instance over the same
//! store directory, matching the page-reload behavior of the app.

use chainbin_chain::receipt::{ReceiptLog, TransactionReceipt};
use chainbin_ledger::{JsonFileKv, Ledger, TxState, LEDGER_KEY};

fn receipt(entity_id: &str, expires_at_block: u64) -> TransactionReceipt {
    TransactionReceipt {
        logs: vec![ReceiptLog {
            topics: vec!["0xevent".into(), entity_id.into()],
            data: format!("0x{expires_at_block:x}"),
        }],
    }
}

#[test]
fn pending_entry_survives_reload() {
    let dir = tempfile::tempdir().unwrap();

    {
        let ledger = Ledger::new(JsonFileKv::new(dir.path()));
        ledger.mark_pending("0xacc", "0xtx1").unwrap();
    }

    let ledger = Ledger::new(JsonFileKv::new(dir.path()));
    assert_eq!(
        ledger.list("0xacc").unwrap(),
        vec![("0xtx1".to_string(), TxState::Pending)]
    );
}

#[test]
fn completion_written_by_one_instance_is_read_by_another() {
    let dir = tempfile::tempdir().unwrap();

    let first = Ledger::new(JsonFileKv::new(dir.path()));
    first.mark_pending("0xacc", "0xtx1").unwrap();

    // A second instance over the same store (another tab, or the app
    // after a reload) resolves the receipt.
    let second = Ledger::new(JsonFileKv::new(dir.path()));
    let data = second
        .resolve("0xacc", "0xtx1", &receipt("0xnote", 100), 90, 2)
        .unwrap();

    // The first instance re-reads the store on every query and sees it.
    match &first.list("0xacc").unwrap()[0].1 {
        TxState::Complete {
            note_id,
            expiration_date,
        } => {
            assert_eq!(note_id, "0xnote");
            assert_eq!(*expiration_date, data.expiration_date);
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[test]
fn blob_on_disk_matches_the_durable_contract() {
    let dir = tempfile::tempdir().unwrap();

    let ledger = Ledger::new(JsonFileKv::new(dir.path()));
    ledger.mark_pending("0xacc", "0xtx1").unwrap();

    let blob = std::fs::read_to_string(dir.path().join(format!("{LEDGER_KEY}.json"))).unwrap();
    assert_eq!(blob, r#"{"0xacc":{"0xtx1":{"type":"pending"}}}"#);
}
