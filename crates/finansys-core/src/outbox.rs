//! Side effects requested by ledger mutations, processed off the mutation path.
//!
//! The store enqueues [`SideEffect`]s and moves on. An [`OutboxWorker`]
//! drains them, retries failures a bounded number of times and logs what it
//! had to give up on. Nothing flows back into the store.

use std::{
    sync::{
        mpsc::{self, Receiver, Sender, TryRecvError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use finansys_domain::LedgerSnapshot;

use crate::{
    reminder::{ReminderRequest, ReminderScheduler},
    storage::SnapshotStorage,
    CoreError,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    /// Write the full snapshot. A later persist supersedes an earlier one.
    Persist(Arc<LedgerSnapshot>),
    ScheduleReminder(ReminderRequest),
    CancelReminder { subscription_id: String },
}

impl SideEffect {
    fn label(&self) -> &'static str {
        match self {
            SideEffect::Persist(_) => "persist",
            SideEffect::ScheduleReminder(_) => "schedule_reminder",
            SideEffect::CancelReminder { .. } => "cancel_reminder",
        }
    }
}

/// Sending half of the outbox. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: Sender<SideEffect>,
}

impl Outbox {
    pub fn enqueue(&self, effect: SideEffect) -> Result<(), CoreError> {
        self.sender
            .send(effect)
            .map_err(|_| CoreError::OutboxClosed)
    }
}

/// Receiving half of the outbox, consumed by an [`OutboxWorker`].
#[derive(Debug)]
pub struct OutboxReceiver {
    receiver: Receiver<SideEffect>,
}

pub fn outbox() -> (Outbox, OutboxReceiver) {
    let (sender, receiver) = mpsc::channel();
    (Outbox { sender }, OutboxReceiver { receiver })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Retries without sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}

/// Counts of what a drain pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub persisted: usize,
    pub superseded: usize,
    pub scheduled: usize,
    /// Schedule requests whose trigger point had already passed.
    pub skipped: usize,
    pub cancelled: usize,
    pub failed: usize,
}

impl DrainReport {
    fn absorb(&mut self, other: DrainReport) {
        self.persisted += other.persisted;
        self.superseded += other.superseded;
        self.scheduled += other.scheduled;
        self.skipped += other.skipped;
        self.cancelled += other.cancelled;
        self.failed += other.failed;
    }

    pub fn processed(&self) -> usize {
        self.persisted + self.superseded + self.scheduled + self.skipped + self.cancelled + self.failed
    }
}

pub struct OutboxWorker {
    receiver: OutboxReceiver,
    storage: Arc<dyn SnapshotStorage>,
    reminders: Arc<dyn ReminderScheduler>,
    policy: RetryPolicy,
}

impl OutboxWorker {
    pub fn new(
        receiver: OutboxReceiver,
        storage: Arc<dyn SnapshotStorage>,
        reminders: Arc<dyn ReminderScheduler>,
    ) -> Self {
        Self {
            receiver,
            storage,
            reminders,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Processes everything queued right now without waiting for more.
    pub fn drain_pending(&self) -> DrainReport {
        let mut batch = Vec::new();
        loop {
            match self.receiver.receiver.try_recv() {
                Ok(effect) => batch.push(effect),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.process_batch(batch)
    }

    /// Blocks processing effects until every [`Outbox`] handle is dropped.
    pub fn run(self) -> DrainReport {
        let mut total = DrainReport::default();
        while let Ok(first) = self.receiver.receiver.recv() {
            let mut batch = vec![first];
            batch.extend(self.receiver.receiver.try_iter());
            total.absorb(self.process_batch(batch));
        }
        tracing::debug!(?total, "outbox closed, worker exiting");
        total
    }

    /// Runs [`OutboxWorker::run`] on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<DrainReport>> {
        thread::Builder::new()
            .name("finansys-outbox".into())
            .spawn(move || self.run())
    }

    fn process_batch(&self, batch: Vec<SideEffect>) -> DrainReport {
        let mut report = DrainReport::default();
        let last_persist = batch
            .iter()
            .rposition(|effect| matches!(effect, SideEffect::Persist(_)));

        for (index, effect) in batch.into_iter().enumerate() {
            let label = effect.label();
            match effect {
                SideEffect::Persist(_) if Some(index) != last_persist => {
                    report.superseded += 1;
                }
                SideEffect::Persist(snapshot) => {
                    match self.attempt(label, || self.storage.save(&snapshot)) {
                        Some(()) => report.persisted += 1,
                        None => report.failed += 1,
                    }
                }
                SideEffect::ScheduleReminder(request) => {
                    match self.attempt(label, || self.reminders.schedule(&request)) {
                        Some(Some(_)) => report.scheduled += 1,
                        Some(None) => report.skipped += 1,
                        None => report.failed += 1,
                    }
                }
                SideEffect::CancelReminder { subscription_id } => {
                    match self.attempt(label, || self.reminders.cancel(&subscription_id)) {
                        Some(()) => report.cancelled += 1,
                        None => report.failed += 1,
                    }
                }
            }
        }
        if report.processed() > 0 {
            tracing::debug!(?report, "outbox batch processed");
        }
        report
    }

    fn attempt<T>(
        &self,
        label: &'static str,
        mut op: impl FnMut() -> Result<T, CoreError>,
    ) -> Option<T> {
        for attempt in 1..=self.policy.max_attempts {
            match op() {
                Ok(value) => return Some(value),
                Err(err) => {
                    tracing::warn!(effect = label, attempt, error = %err, "side effect failed");
                    if attempt < self.policy.max_attempts && !self.policy.backoff.is_zero() {
                        thread::sleep(self.policy.backoff);
                    }
                }
            }
        }
        tracing::error!(
            effect = label,
            attempts = self.policy.max_attempts,
            "giving up on side effect"
        );
        None
    }
}
