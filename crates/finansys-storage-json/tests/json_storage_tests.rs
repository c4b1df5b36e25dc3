use std::fs;

use chrono::{NaiveDate, TimeZone, Utc};
use finansys_core::{SnapshotStorage, DEFAULT_STORAGE_KEY};
use finansys_domain::{
    default_categories, Category, LedgerSnapshot, Subscription, Transaction, TransactionType,
};
use finansys_storage_json::JsonSnapshotStorage;
use tempfile::tempdir;

fn sample_snapshot() -> LedgerSnapshot {
    let mut snapshot = LedgerSnapshot::default();
    snapshot.categories.push(Category {
        id: "m1x9pet".into(),
        name: "Pets".into(),
        icon: "heart".into(),
        color: "#ec4899".into(),
    });
    snapshot.transactions.push(Transaction {
        id: "m1x9tx1".into(),
        amount: 120.5,
        kind: TransactionType::Expense,
        category_id: "m1x9pet".into(),
        date: Utc.with_ymd_and_hms(2025, 3, 4, 15, 30, 0).unwrap(),
        description: "Vet".into(),
    });
    snapshot.subscriptions.push(Subscription {
        id: "m1x9sub".into(),
        name: "Netflix".into(),
        amount: 39.5,
        due_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        icon: "tv".into(),
        color: "#8b5cf6".into(),
    });
    snapshot
}

#[test]
fn json_storage_round_trips_the_snapshot() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::with_default_key(dir.path()).expect("create storage");
    let snapshot = sample_snapshot();

    storage.save(&snapshot).expect("save snapshot");
    let loaded = storage.load().expect("load snapshot").expect("snapshot present");

    assert_eq!(loaded, snapshot);
    let path = storage.snapshot_path();
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("finansys-storage-v2.json")
    );
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn json_storage_writes_camel_case_fields() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::with_default_key(dir.path()).expect("create storage");
    storage.save(&sample_snapshot()).expect("save snapshot");

    let raw = fs::read_to_string(storage.snapshot_path()).expect("read file");
    assert!(raw.contains("\"categoryId\""));
    assert!(raw.contains("\"dueDate\": \"2025-03-10\""));
    assert!(raw.contains("\"type\": \"EXPENSE\""));
}

#[test]
fn missing_file_loads_as_absent_and_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::with_default_key(dir.path()).expect("create storage");

    assert!(storage.load().expect("load").is_none());
    let snapshot = storage.load_or_default();
    assert_eq!(snapshot.categories, default_categories());
    assert!(snapshot.transactions.is_empty());
}

#[test]
fn corrupted_file_falls_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::with_default_key(dir.path()).expect("create storage");
    fs::write(storage.snapshot_path(), "{ not json").expect("write garbage");

    assert!(storage.load().is_err());
    assert_eq!(storage.load_or_default(), LedgerSnapshot::default());
}

#[test]
fn missing_lists_are_filled_in_on_load() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::with_default_key(dir.path()).expect("create storage");
    fs::write(storage.snapshot_path(), r#"{"transactions": []}"#).expect("write partial");

    let loaded = storage.load().expect("load").expect("present");
    assert_eq!(loaded.categories.len(), 5);
    assert!(loaded.subscriptions.is_empty());
}

#[test]
fn changing_the_key_orphans_previous_data() {
    let dir = tempdir().expect("tempdir");
    let old = JsonSnapshotStorage::new(dir.path(), "finansys-storage-v1").expect("old storage");
    old.save(&sample_snapshot()).expect("save old");

    let current = JsonSnapshotStorage::new(dir.path(), DEFAULT_STORAGE_KEY).expect("new storage");
    assert_eq!(current.storage_key(), DEFAULT_STORAGE_KEY);
    assert!(current.load().expect("load").is_none());
    assert!(old.load().expect("load old").is_some());
}

#[test]
fn saving_replaces_the_previous_snapshot() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonSnapshotStorage::with_default_key(dir.path()).expect("create storage");
    storage.save(&sample_snapshot()).expect("first save");
    storage.save(&LedgerSnapshot::default()).expect("second save");

    let loaded = storage.load().expect("load").expect("present");
    assert!(loaded.transactions.is_empty());
    assert_eq!(loaded.categories.len(), 5);
}
