//! End-to-end lending flows run through the host double, one invocation per
//! operation.

use lend_ledger::{ErrorKind, LedgerError, LibraryContract, LibraryLedger};
use lend_store::{invoke, simulate, InMemoryWorldState, WorldState};
use lend_types::{EntityKind, Timestamp};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn t(text: &str) -> Timestamp {
    Timestamp::parse(text).unwrap()
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn seeded(contract: &LibraryContract) -> InMemoryWorldState {
    let state = InMemoryWorldState::new();
    invoke(&state, |tx| contract.init_ledger(tx)).unwrap();
    state
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[test]
fn add_book_then_exists_then_duplicate() {
    init_tracing();
    let contract = LibraryContract::default();
    let state = InMemoryWorldState::new();

    invoke(&state, |tx| contract.add_book(tx, "b1", "Dune", "Herbert", 15)).unwrap();
    let exists = invoke(&state, |tx| contract.book_exists(tx, "b1")).unwrap();
    assert!(exists.output);
    assert_eq!(exists.receipt.writes, 0);

    let err = invoke(&state, |tx| contract.add_book(tx, "b1", "Dune", "Herbert", 15)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[test]
fn delete_missing_then_existing() {
    let contract = LibraryContract::default();
    let state = seeded(&contract);

    let err = invoke(&state, |tx| contract.delete_book(tx, "book9")).unwrap_err();
    assert_eq!(
        err,
        LedgerError::NotFound {
            kind: EntityKind::Book,
            key: "book9".into()
        }
    );

    invoke(&state, |tx| contract.delete_book(tx, "book4")).unwrap();
    assert!(!contract.book_exists(&state, "book4").unwrap());
}

#[test]
fn seeded_catalog_aggregates_to_four_titles() {
    let contract = LibraryContract::default();
    let state = seeded(&contract);
    let counts = contract.get_all_books(&state).unwrap();
    assert_eq!(counts.len(), 4);
    assert!(counts.values().all(|&n| n == 1));
    assert_eq!(state.open_cursors(), 0);
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[test]
fn borrow_and_return_round_trip() {
    init_tracing();
    let contract = LibraryContract::default();
    let state = seeded(&contract);
    let t0 = t("2024-02-01T10:00:00Z");
    let t1 = t("2024-02-09T16:30:00.250Z");

    let borrowed =
        invoke(&state, |tx| contract.borrow_book(tx, "r1", "book1", "alice", t0)).unwrap();
    assert_eq!(borrowed.receipt.writes, 2);

    let book = contract.query_book(&state, "book1").unwrap();
    assert!(!book.valid);
    assert_eq!(book.owner, "alice");
    let record = contract.query_record(&state, "r1").unwrap();
    assert_eq!(record.start_time, t0);
    assert_eq!(record.end_time, None);

    let list = contract
        .get_borrow_list(&state, "Journey to the West")
        .unwrap();
    assert_eq!(list.len(), 1);
    assert!(!list[0].valid);

    invoke(&state, |tx| contract.return_book(tx, "r1", "book1", t1)).unwrap();
    let book = contract.query_book(&state, "book1").unwrap();
    assert!(book.valid);
    assert_eq!(book.owner, "library");
    assert_eq!(contract.query_record(&state, "r1").unwrap().end_time, Some(t1));

    let report = contract.audit(&state).unwrap();
    assert!(report.is_valid());
    assert_eq!(report.record_count, 1);
    assert_eq!(report.open_loans, 0);
}

#[test]
fn failed_borrow_leaves_state_unchanged() {
    let contract = LibraryContract::default();
    let state = seeded(&contract);
    let t0 = t("2024-02-01T10:00:00Z");
    invoke(&state, |tx| contract.borrow_book(tx, "r1", "book1", "alice", t0)).unwrap();
    let before: Vec<(String, Vec<u8>)> = state
        .keys()
        .unwrap()
        .into_iter()
        .map(|k| {
            let v = state.get_state(&k).unwrap().unwrap();
            (k, v)
        })
        .collect();

    let err = invoke(&state, |tx| contract.borrow_book(tx, "r1", "book2", "bob", t0)).unwrap_err();
    assert_eq!(
        err,
        LedgerError::AlreadyExists {
            kind: EntityKind::Record,
            key: "r1".into()
        }
    );

    for (key, value) in before {
        assert_eq!(state.get_state(&key).unwrap(), Some(value));
    }
    assert!(contract.query_book(&state, "book2").unwrap().valid);
}

#[test]
fn loan_history_across_invocations() {
    let contract = LibraryContract::default();
    let state = seeded(&contract);
    for (i, borrower) in ["alice", "bob", "carol"].iter().enumerate() {
        let record_id = format!("r{i}");
        let start = t(&format!("2024-03-0{}T09:00:00Z", i + 1));
        let end = t(&format!("2024-03-0{}T18:00:00Z", i + 1));
        invoke(&state, |tx| {
            contract.borrow_book(tx, &record_id, "book3", borrower, start)
        })
        .unwrap();
        invoke(&state, |tx| contract.return_book(tx, &record_id, "book3", end)).unwrap();
    }

    let history = contract.get_loan_history(&state, "book3").unwrap();
    let borrowers: Vec<&str> = history.iter().map(|r| r.borrower.as_str()).collect();
    assert_eq!(borrowers, vec!["alice", "bob", "carol"]);
    assert!(history.iter().all(|r| !r.is_open()));
}

#[test]
fn far_future_start_never_reaches_state() {
    let contract = LibraryContract::default();
    let state = seeded(&contract);

    assert!(Timestamp::from_unix_millis(253_402_300_800_000).is_err());
    let last = Timestamp::from_unix_millis(253_402_300_799_999).unwrap();
    invoke(&state, |tx| contract.add_record(tx, "r9", "book1", last, "zed")).unwrap();

    assert_eq!(contract.query_record(&state, "r9").unwrap().start_time, last);
    assert_eq!(contract.get_all_books(&state).unwrap().len(), 4);
    assert_eq!(contract.get_open_loans(&state).unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn independent_hosts_produce_identical_write_sets() {
    let contract = LibraryContract::default();
    let host_a = seeded(&contract);
    let host_b = seeded(&contract);
    let start = t("2024-02-01T10:00:00.123456Z");

    let (_, writes_a) =
        simulate(&host_a, |tx| contract.borrow_book(tx, "r1", "book2", "alice", start)).unwrap();
    let (_, writes_b) =
        simulate(&host_b, |tx| contract.borrow_book(tx, "r1", "book2", "alice", start)).unwrap();

    assert_eq!(writes_a, writes_b);
    assert_eq!(writes_a.digest_hex(), writes_b.digest_hex());
    assert_eq!(writes_a.len(), 2);
    assert!(!host_a.contains_key("r1").unwrap());
}

#[test]
fn dispatch_through_host() {
    init_tracing();
    let contract = LibraryContract::default();
    let state = InMemoryWorldState::new();

    invoke(&state, |tx| contract.invoke(tx, "InitLedger", &[])).unwrap();
    invoke(&state, |tx| {
        contract.invoke(
            tx,
            "BorrowBook",
            &args(&["r1", "book4", "dave", "2024-04-01T08:00:00Z"]),
        )
    })
    .unwrap();

    let open = invoke(&state, |tx| contract.invoke(tx, "GetOpenLoans", &[])).unwrap();
    let open: Vec<lend_types::Record> = serde_json::from_slice(&open.output).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].borrower, "dave");

    let err = invoke(&state, |tx| contract.invoke(tx, "Burn", &[])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invocation);
}
