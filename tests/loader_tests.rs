//! Load behaviour against the in-memory store: commit, rollback on insert,
//! commit and begin failures, cancellation, and retry after rollback.

mod common;

use std::time::Duration;

use bulk_seeder::persistence::InMemoryRecordStore;
use bulk_seeder::{plan, Batch, LoadError, Record, TransactionalLoader};
use common::*;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

fn committed_indices(store: &InMemoryRecordStore) -> Vec<i64> {
    store.rows().iter().map(|row| row.sequence_index).collect()
}

#[tokio::test]
async fn successful_load_commits_once_in_index_order() {
    let store = InMemoryRecordStore::new();

    let report = TransactionalLoader::new()
        .load(&store, plan(23, 5).unwrap())
        .await
        .unwrap();

    assert_eq!(report.batches_committed, 5);
    assert_eq!(report.records_committed, 23);

    let counters = store.counters();
    assert_eq!(counters.begins, 1);
    assert_eq!(counters.commits, 1);
    assert_eq!(counters.rollbacks, 0);
    assert_eq!(counters.abandoned, 0);
    assert_eq!(committed_indices(&store), (0..23).collect::<Vec<_>>());
    assert_eq!(store.rows()[7].label, "Value 7");
}

#[tokio::test]
async fn third_of_five_batches_failing_rolls_back_all() {
    let store = InMemoryRecordStore::new();
    store.fail_insert_at(3);

    let error = TransactionalLoader::new()
        .load(&store, plan(25, 5).unwrap())
        .await
        .unwrap_err();

    match error {
        LoadError::InsertFailure { batch_index, .. } => assert_eq!(batch_index, 3),
        other => panic!("expected InsertFailure, got {other:?}"),
    }

    let counters = store.counters();
    assert_eq!(counters.insert_attempts, 3);
    assert_eq!(counters.inserts_succeeded, 2);
    assert_eq!(counters.rollbacks, 1);
    assert_eq!(counters.commits, 0);
    assert_eq!(store.row_count(), 0);
}

#[tokio::test]
async fn retry_after_rollback_loads_cleanly() {
    let store = InMemoryRecordStore::new();
    store.fail_insert_at(3);

    let loader = TransactionalLoader::new();
    assert_err!(loader.load(&store, plan(25, 5).unwrap()).await);
    assert_eq!(store.row_count(), 0);

    let report = loader.load(&store, plan(25, 5).unwrap()).await.unwrap();

    assert_eq!(report.records_committed, 25);
    assert_eq!(committed_indices(&store), (0..25).collect::<Vec<_>>());
    let counters = store.counters();
    assert_eq!(counters.begins, 2);
    assert_eq!(counters.rollbacks, 1);
    assert_eq!(counters.commits, 1);
}

#[tokio::test]
async fn commit_failure_leaves_no_rows_and_no_rollback() {
    let store = InMemoryRecordStore::new();
    store.fail_next_commit();

    let error = TransactionalLoader::new()
        .load(&store, plan(10, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(error, LoadError::CommitFailure { .. }));
    let counters = store.counters();
    assert_eq!(counters.inserts_succeeded, 2);
    assert_eq!(counters.commits, 1);
    assert_eq!(counters.rollbacks, 0);
    assert_eq!(store.row_count(), 0);
}

#[tokio::test]
async fn rollback_failure_does_not_mask_insert_failure() {
    let store = InMemoryRecordStore::new();
    store.fail_insert_at(2).fail_next_rollback();

    let error = TransactionalLoader::new()
        .load(&store, plan(15, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(error, LoadError::InsertFailure { batch_index: 2, .. }));
    assert_eq!(store.counters().rollbacks, 1);
    assert_eq!(store.row_count(), 0);
}

#[tokio::test]
async fn begin_failure_is_reported_without_inserts() {
    let store = InMemoryRecordStore::new();
    store.fail_next_begin();

    let error = TransactionalLoader::new()
        .load(&store, plan(10, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(error, LoadError::BeginFailure { .. }));
    assert_eq!(store.counters().insert_attempts, 0);
}

#[tokio::test]
async fn cancellation_mid_sequence_stops_and_rolls_back() {
    let token = CancellationToken::new();
    let store = HookedStore::new(InsertHook::CancelAfter(2, token.clone()));

    let error = TransactionalLoader::new()
        .with_cancellation(token)
        .load(&store, plan(25, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(error, LoadError::Cancelled { batches_inserted: 2 }));
    let counters = store.inner.counters();
    assert_eq!(counters.insert_attempts, 2);
    assert_eq!(counters.rollbacks, 1);
    assert_eq!(counters.commits, 0);
    assert_eq!(store.inner.row_count(), 0);
}

#[tokio::test]
async fn cancellation_after_last_batch_prevents_commit() {
    let token = CancellationToken::new();
    let store = HookedStore::new(InsertHook::CancelAfter(2, token.clone()));

    let error = TransactionalLoader::new()
        .with_cancellation(token)
        .load(&store, plan(10, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(error, LoadError::Cancelled { batches_inserted: 2 }));
    assert_eq!(store.inner.counters().commits, 0);
    assert_eq!(store.inner.row_count(), 0);
}

#[tokio::test]
async fn cancellation_interrupts_a_stalled_insert() {
    let token = CancellationToken::new();
    let store = HookedStore::new(InsertHook::HangAt(3));

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let loader = TransactionalLoader::new().with_cancellation(token);
    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        loader.load(&store, plan(25, 5).unwrap()),
    )
    .await
    .expect("cancellation should end the stalled load");

    assert!(matches!(outcome, Err(LoadError::Cancelled { batches_inserted: 2 })));
    let counters = store.inner.counters();
    assert_eq!(counters.inserts_succeeded, 2);
    assert_eq!(counters.rollbacks, 1);
    assert_eq!(counters.commits, 0);
    assert_eq!(counters.abandoned, 0);
    assert_eq!(store.inner.row_count(), 0);
}

#[tokio::test]
async fn dropped_load_future_leaves_no_rows() {
    let store = HookedStore::new(InsertHook::HangAt(3));

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        TransactionalLoader::new().load(&store, plan(25, 5).unwrap()),
    )
    .await;

    assert!(outcome.is_err(), "load should still be stalled at batch 3");
    let counters = store.inner.counters();
    assert_eq!(counters.inserts_succeeded, 2);
    assert_eq!(counters.abandoned, 1);
    assert_eq!(counters.commits + counters.rollbacks, 0);
    assert_eq!(store.inner.row_count(), 0);
}

#[tokio::test]
async fn caller_built_batches_are_loaded_in_given_order() {
    let store = InMemoryRecordStore::new();
    let batches = vec![
        Batch::new(0, (0..2).map(Record::new).collect()).unwrap(),
        Batch::new(1, (2..3).map(Record::new).collect()).unwrap(),
    ];

    let report = assert_ok!(bulk_seeder::load(&store, batches).await);

    assert_eq!(report.batches_committed, 2);
    assert_eq!(committed_indices(&store), vec![0, 1, 2]);
}

#[tokio::test]
async fn concurrent_loads_use_disjoint_transactions() {
    let store = InMemoryRecordStore::new();
    let loader = TransactionalLoader::new();

    let (first, second) = tokio::join!(
        loader.load(&store, plan(10, 3).unwrap()),
        loader.load(&store, plan(7, 2).unwrap()),
    );

    assert_eq!(first.unwrap().records_committed, 10);
    assert_eq!(second.unwrap().records_committed, 7);
    assert_eq!(store.row_count(), 17);
    assert_eq!(store.counters().begins, 2);
    assert_eq!(store.counters().commits, 2);
}
