use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use finansys_domain::{Identifiable, LedgerSnapshot};

use crate::CoreError;

/// Versioned slot the ledger is persisted under. Changing it orphans older data.
pub const DEFAULT_STORAGE_KEY: &str = "finansys-storage-v2";

/// Abstraction over durable key-value slots holding one ledger snapshot.
pub trait SnapshotStorage: Send + Sync {
    /// Name of the versioned slot this backend reads and writes.
    fn storage_key(&self) -> &str;

    /// Returns the last saved snapshot, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<LedgerSnapshot>, CoreError>;

    /// Replaces the stored snapshot.
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), CoreError>;

    /// Loads the stored snapshot, falling back to the seeded default when the
    /// slot is absent or unreadable.
    fn load_or_default(&self) -> LedgerSnapshot {
        match self.load() {
            Ok(Some(snapshot)) => {
                for warning in snapshot_warnings(&snapshot) {
                    tracing::debug!(key = self.storage_key(), "{warning}");
                }
                snapshot
            }
            Ok(None) => {
                tracing::info!(key = self.storage_key(), "no stored ledger, starting fresh");
                LedgerSnapshot::default()
            }
            Err(err) => {
                tracing::warn!(key = self.storage_key(), error = %err, "failed to load ledger, starting fresh");
                LedgerSnapshot::default()
            }
        }
    }
}

/// Detects dangling references and duplicate ids within a snapshot.
///
/// Dangling category references are a tolerated state; these are reported for
/// diagnostics only.
pub fn snapshot_warnings(snapshot: &LedgerSnapshot) -> Vec<String> {
    let category_ids: HashSet<&str> = snapshot.categories.iter().map(|c| c.id()).collect();
    let mut warnings = Vec::new();

    for txn in &snapshot.transactions {
        if !category_ids.contains(txn.category_id.as_str()) {
            warnings.push(format!(
                "transaction {} references missing category {}",
                txn.id, txn.category_id
            ));
        }
    }

    let mut seen = HashSet::new();
    let ids = snapshot
        .transactions
        .iter()
        .map(|t| t.id())
        .chain(snapshot.subscriptions.iter().map(|s| s.id()))
        .chain(snapshot.categories.iter().map(|c| c.id()));
    for id in ids {
        if !seen.insert(id) {
            warnings.push(format!("duplicate id {id}"));
        }
    }
    warnings
}

/// Keeps the snapshot in memory. Useful for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<LedgerSnapshot>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Makes every following `save` fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.fail_saves.store(failing, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<LedgerSnapshot> {
        self.slot.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn storage_key(&self) -> &str {
        DEFAULT_STORAGE_KEY
    }

    fn load(&self) -> Result<Option<LedgerSnapshot>, CoreError> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| CoreError::Storage("memory slot poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), CoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("memory storage set to fail".into()));
        }
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| CoreError::Storage("memory slot poisoned".into()))?;
        *guard = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
