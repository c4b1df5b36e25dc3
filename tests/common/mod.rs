#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use finansys::App;
use finansys_config::{Config, OutboxSettings};
use finansys_core::{FixedClock, MemoryStorage};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Config pointing at `data_dir` with retries that never sleep.
pub fn test_config(data_dir: PathBuf) -> Config {
    Config {
        data_dir: Some(data_dir),
        outbox: OutboxSettings {
            max_attempts: 2,
            backoff_ms: 0,
        },
        ..Config::default()
    }
}

/// An app over in-memory storage with a pinned clock.
pub fn memory_app(now: DateTime<Utc>) -> (App, Arc<MemoryStorage>, Arc<FixedClock>) {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(FixedClock::new(now));
    let app = App::assemble(
        test_config(temp_home()),
        temp_home(),
        storage.clone(),
        clock.clone(),
    )
    .expect("assemble app");
    (app, storage, clock)
}
