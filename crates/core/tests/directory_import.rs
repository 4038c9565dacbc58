//! Integration tests for the import pipeline and lookup service over the
//! in-memory store.

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::{json, Value};
use userdir_core::directory::{DirectoryStore, MemoryStore, NewRecord, Record};
use userdir_core::error::CoreError;
use userdir_core::import::{import_rows, RawRow};
use userdir_core::lookup::{lookup_by_email, LookupOutcome, NOT_FOUND_MESSAGE};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rows(values: Value) -> Vec<RawRow> {
    values
        .as_array()
        .expect("rows must be a JSON array")
        .iter()
        .map(|v| v.as_object().expect("row must be an object").clone())
        .collect()
}

fn record(id: i64, name: &str, email: &str) -> Record {
    Record {
        id,
        name: name.to_string(),
        email: email.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Test: stored emails are unique, lower-case, ids contiguous from 1
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_produces_contiguous_ids_and_lowercase_emails() {
    let store = MemoryStore::new();
    let input = rows(json!([
        { "Usuario": "Ana", "Correo": "ANA@Example.com" },
        { "usuario": "Luis", "correo": " luis@example.com " },
        { "name": "Marta", "email": "Marta@Example.com" },
    ]));

    let summary = import_rows(&store, input).await.unwrap();
    assert_eq!(summary.accepted, 3);
    assert_eq!(summary.stored, 3);

    let all = store.list_all().await.unwrap();
    assert_eq!(
        all,
        vec![
            record(1, "Ana", "ana@example.com"),
            record(2, "Luis", "luis@example.com"),
            record(3, "Marta", "marta@example.com"),
        ]
    );
}

// ---------------------------------------------------------------------------
// Test: importing the same rows twice yields the same directory
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_import_is_idempotent() {
    let store = MemoryStore::new();
    let input = json!([
        { "name": "A", "email": "a@x.com" },
        { "name": "B", "email": "b@x.com" },
    ]);

    import_rows(&store, rows(input.clone())).await.unwrap();
    let first = store.list_all().await.unwrap();

    import_rows(&store, rows(input)).await.unwrap();
    let second = store.list_all().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second[0].id, 1);
}

// ---------------------------------------------------------------------------
// Test: duplicate emails within one import keep the later name
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_email_last_write_wins() {
    let store = MemoryStore::new();
    let input = rows(json!([
        { "name": "A", "email": "x@y.com" },
        { "name": "B", "email": "X@Y.com" },
    ]));

    let summary = import_rows(&store, input).await.unwrap();

    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.stored, 1);
    assert_eq!(store.list_all().await.unwrap(), vec![record(1, "B", "x@y.com")]);
}

// ---------------------------------------------------------------------------
// Test: unusable rows are dropped without failing the import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unusable_rows_are_dropped_silently() {
    let store = MemoryStore::new();
    let input = rows(json!([
        { "name": "", "email": "a@b.com" },
        { "name": "C", "email": "not-an-email" },
        { "name": "D", "email": "d@e.com" },
    ]));

    let summary = import_rows(&store, input).await.unwrap();

    assert_eq!(summary.accepted, 1);
    assert_eq!(store.list_all().await.unwrap(), vec![record(1, "D", "d@e.com")]);
}

// ---------------------------------------------------------------------------
// Test: an import with no valid rows leaves the store untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_without_valid_rows_is_rejected_and_store_unchanged() {
    let store = MemoryStore::new();
    import_rows(&store, rows(json!([{ "name": "Keep", "email": "keep@x.com" }])))
        .await
        .unwrap();
    let before = store.list_all().await.unwrap();

    let err = import_rows(
        &store,
        rows(json!([
            { "name": "", "email": "a@b.com" },
            { "Nombre": "Wrong column", "Mail": "w@x.com" },
        ])),
    )
    .await
    .unwrap_err();

    assert_matches!(err, CoreError::NoValidRows);
    assert_eq!(store.list_all().await.unwrap(), before);
}

#[tokio::test]
async fn import_of_empty_input_is_rejected() {
    let store = MemoryStore::new();

    let err = import_rows(&store, Vec::new()).await.unwrap_err();

    assert_matches!(err, CoreError::NoValidRows);
    assert!(store.is_empty().await);
}

// ---------------------------------------------------------------------------
// Test: lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lookup_is_case_insensitive() {
    let store = MemoryStore::new();
    store.insert(&NewRecord::new("E", "e@f.com")).await.unwrap();

    let outcome = lookup_by_email(&store, "E@F.COM").await.unwrap();

    assert!(outcome.is_found());
    assert_eq!(outcome.name(), Some("E"));
}

#[tokio::test]
async fn lookup_of_absent_email_is_not_found() {
    let store = MemoryStore::new();
    store.insert(&NewRecord::new("E", "e@f.com")).await.unwrap();

    let outcome = lookup_by_email(&store, "nobody@f.com").await.unwrap();

    assert_eq!(
        outcome,
        LookupOutcome::NotFound {
            message: NOT_FOUND_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn lookup_of_malformed_email_is_an_error() {
    let store = MemoryStore::new();

    let err = lookup_by_email(&store, "definitely not email").await.unwrap_err();

    assert_matches!(err, CoreError::InvalidEmail(_));
}

// ---------------------------------------------------------------------------
// Test: readers never observe a partially replaced directory
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_readers_see_old_or_new_directory() {
    let store = Arc::new(MemoryStore::new());
    let old: Vec<NewRecord> = (0..200)
        .map(|i| NewRecord::new(format!("old-{i}"), format!("user{i}@x.com")))
        .collect();
    let new: Vec<NewRecord> = (0..200)
        .map(|i| NewRecord::new(format!("new-{i}"), format!("user{i}@x.com")))
        .collect();
    store.bulk_replace(&old).await.unwrap();

    let reader = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for _ in 0..200 {
                let all = store.list_all().await.unwrap();
                let old_count = all.iter().filter(|r| r.name.starts_with("old-")).count();
                assert!(
                    old_count == 0 || old_count == all.len(),
                    "observed a mixed directory: {old_count} old of {}",
                    all.len()
                );
                tokio::task::yield_now().await;
            }
        })
    };

    for round in 0..20 {
        let batch = if round % 2 == 0 { &new } else { &old };
        store.bulk_replace(batch).await.unwrap();
        tokio::task::yield_now().await;
    }

    reader.await.unwrap();
}
