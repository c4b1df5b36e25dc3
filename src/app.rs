//! Composition root: wires storage, reminders, the outbox worker and the
//! ledger store together from a [`Config`].

use std::{path::PathBuf, sync::Arc, thread::JoinHandle};

use chrono::{DateTime, Duration, Local};
use finansys_config::Config;
use finansys_core::{
    group_by_day, outbox, total_volume, Clock, DayGroup, DrainReport, InMemoryReminders,
    LedgerStatistics, LedgerStore, OutboxWorker, PendingReminder, ReminderRequest,
    ReminderScheduler, RetryPolicy, SnapshotStorage, SystemClock, TimeRandomIds,
};
use finansys_domain::LedgerSnapshot;
use finansys_storage_json::JsonSnapshotStorage;

use crate::FinansysError;

pub struct App {
    config: Config,
    data_dir: PathBuf,
    clock: Arc<dyn Clock>,
    store: LedgerStore,
    reminders: Arc<InMemoryReminders<Local>>,
    worker: JoinHandle<DrainReport>,
}

impl App {
    /// Opens the JSON snapshot under the configured data dir.
    pub fn bootstrap(config: Config) -> Result<Self, FinansysError> {
        let data_dir = config.resolve_data_dir();
        let storage = JsonSnapshotStorage::new(&data_dir, config.storage_key.clone())?;
        Self::assemble(config, data_dir, Arc::new(storage), Arc::new(SystemClock))
    }

    pub fn assemble(
        config: Config,
        data_dir: PathBuf,
        storage: Arc<dyn SnapshotStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, FinansysError> {
        let initial = storage.load_or_default();

        let lead = Duration::hours(i64::from(config.reminder_lead_hours));
        let reminders = Arc::new(InMemoryReminders::with_lead(Arc::clone(&clock), Local, lead));
        // Pending notices live in memory only, so rebuild them for what was loaded.
        for subscription in &initial.subscriptions {
            let request = ReminderRequest::for_subscription(subscription);
            if let Err(err) = reminders.schedule(&request) {
                tracing::warn!(subscription = %subscription.id, error = %err, "could not restore reminder");
            }
        }

        let (outbox, receiver) = outbox();
        let policy = RetryPolicy::new(config.outbox.max_attempts, config.outbox.backoff());
        let worker = OutboxWorker::new(receiver, storage, reminders.clone())
            .with_policy(policy)
            .spawn()?;

        let ids = Arc::new(TimeRandomIds::new(Arc::clone(&clock)));
        let store = LedgerStore::new(ids, initial, outbox);
        tracing::info!(
            data_dir = %data_dir.display(),
            transactions = store.snapshot().transactions.len(),
            subscriptions = store.snapshot().subscriptions.len(),
            "ledger opened"
        );

        Ok(Self {
            config,
            data_dir,
            clock,
            store,
            reminders,
            worker,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LedgerStore {
        &mut self.store
    }

    pub fn snapshot(&self) -> Arc<LedgerSnapshot> {
        self.store.snapshot()
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now().with_timezone(&Local)
    }

    pub fn statistics(&self) -> LedgerStatistics {
        LedgerStatistics::compute_with_limit(&self.snapshot(), &self.now(), self.config.recent_limit)
    }

    /// All transactions grouped by local calendar day, newest day first.
    pub fn day_groups(&self) -> Vec<DayGroup> {
        group_by_day(&self.snapshot().transactions, &Local)
    }

    pub fn total_volume(&self) -> f64 {
        total_volume(&self.snapshot().transactions)
    }

    pub fn pending_reminders(&self) -> Vec<PendingReminder> {
        self.reminders.pending()
    }

    /// Closes the outbox and waits for queued writes to land.
    pub fn shutdown(self) -> Result<DrainReport, FinansysError> {
        let Self { store, worker, .. } = self;
        drop(store);
        let report = worker.join().map_err(|_| FinansysError::WorkerPanicked)?;
        tracing::debug!(?report, "outbox drained on shutdown");
        Ok(report)
    }
}
