//! The single owner of ledger state.
//!
//! Mutations go through `&mut self`, build a fresh snapshot and publish it
//! whole. Durable writes and reminder work are handed to the [`Outbox`].

use std::sync::{Arc, RwLock};

use finansys_domain::{
    Category, CategoryInput, LedgerSnapshot, Subscription, SubscriptionInput, Transaction,
    TransactionInput,
};

use crate::{
    ids::IdSource,
    outbox::{Outbox, SideEffect},
    reminder::ReminderRequest,
};

type Observer = Box<dyn Fn(&Arc<LedgerSnapshot>) + Send + Sync>;

/// Handle returned by [`LedgerStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Shared slot holding the latest published snapshot.
#[derive(Debug)]
struct SnapshotCell {
    current: RwLock<Arc<LedgerSnapshot>>,
}

impl SnapshotCell {
    fn new(initial: LedgerSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    fn load(&self) -> Arc<LedgerSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn publish(&self, next: Arc<LedgerSnapshot>) {
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Read-only view of the store usable from other threads.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    cell: Arc<SnapshotCell>,
}

impl SnapshotReader {
    pub fn current(&self) -> Arc<LedgerSnapshot> {
        self.cell.load()
    }
}

pub struct LedgerStore {
    cell: Arc<SnapshotCell>,
    ids: Arc<dyn IdSource>,
    outbox: Outbox,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl LedgerStore {
    pub fn new(ids: Arc<dyn IdSource>, initial: LedgerSnapshot, outbox: Outbox) -> Self {
        Self {
            cell: Arc::new(SnapshotCell::new(initial)),
            ids,
            outbox,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn snapshot(&self) -> Arc<LedgerSnapshot> {
        self.cell.load()
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            cell: Arc::clone(&self.cell),
        }
    }

    /// Registers a callback run after every mutation with the new snapshot.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: Fn(&Arc<LedgerSnapshot>) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn add_transaction(&mut self, input: TransactionInput) -> Transaction {
        let transaction = Transaction::from_input(self.ids.next_id(), input);
        let created = transaction.clone();
        self.commit("add_transaction", Vec::new(), move |snapshot| {
            snapshot.transactions.insert(0, transaction);
        });
        created
    }

    pub fn delete_transaction(&mut self, id: &str) {
        self.commit("delete_transaction", Vec::new(), |snapshot| {
            snapshot.transactions.retain(|transaction| transaction.id != id);
        });
    }

    pub fn add_subscription(&mut self, input: SubscriptionInput) -> Subscription {
        let subscription = Subscription::from_input(self.ids.next_id(), input);
        let created = subscription.clone();
        let effects = vec![SideEffect::ScheduleReminder(
            ReminderRequest::for_subscription(&subscription),
        )];
        self.commit("add_subscription", effects, move |snapshot| {
            snapshot.subscriptions.insert(0, subscription);
        });
        created
    }

    pub fn delete_subscription(&mut self, id: &str) {
        let effects = vec![SideEffect::CancelReminder {
            subscription_id: id.to_string(),
        }];
        self.commit("delete_subscription", effects, |snapshot| {
            snapshot.subscriptions.retain(|subscription| subscription.id != id);
        });
    }

    pub fn add_category(&mut self, input: CategoryInput) -> Category {
        let category = Category::from_input(self.ids.next_id(), input);
        let created = category.clone();
        self.commit("add_category", Vec::new(), move |snapshot| {
            snapshot.categories.push(category);
        });
        created
    }

    /// Transactions pointing at the removed category are left as they are.
    pub fn delete_category(&mut self, id: &str) {
        self.commit("delete_category", Vec::new(), |snapshot| {
            snapshot.categories.retain(|category| category.id != id);
        });
    }

    fn commit(
        &mut self,
        operation: &'static str,
        effects: Vec<SideEffect>,
        mutate: impl FnOnce(&mut LedgerSnapshot),
    ) {
        let mut next = LedgerSnapshot::clone(&self.cell.load());
        mutate(&mut next);
        let next = Arc::new(next);
        self.cell.publish(Arc::clone(&next));

        let queued = std::iter::once(SideEffect::Persist(Arc::clone(&next))).chain(effects);
        for effect in queued {
            if let Err(err) = self.outbox.enqueue(effect) {
                tracing::warn!(operation, error = %err, "side effect not queued");
            }
        }

        for (_, observer) in &self.observers {
            observer(&next);
        }

        tracing::debug!(
            operation,
            transactions = next.transactions.len(),
            subscriptions = next.subscriptions.len(),
            categories = next.categories.len(),
            "ledger updated"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicU64, AtomicUsize, Ordering},
            Mutex,
        },
        thread,
    };

    use chrono::{NaiveDate, TimeZone, Utc};
    use finansys_domain::{TransactionType, FALLBACK_CATEGORY_NAME};

    use super::*;
    use crate::{
        ids::TimeRandomIds,
        outbox::{outbox, OutboxReceiver, OutboxWorker},
        reminder::ReminderScheduler,
        storage::MemoryStorage,
        CoreError, ReminderId,
    };

    struct SequentialIds(AtomicU64);

    impl IdSource for SequentialIds {
        fn next_id(&self) -> String {
            format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    #[derive(Default)]
    struct RecordingReminders {
        calls: Mutex<Vec<String>>,
    }

    impl ReminderScheduler for RecordingReminders {
        fn schedule(&self, request: &ReminderRequest) -> Result<Option<ReminderId>, CoreError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("schedule:{}:{}", request.subscription_id, request.due_day()));
            Ok(Some(ReminderId(request.subscription_id.clone())))
        }

        fn cancel(&self, subscription_id: &str) -> Result<(), CoreError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("cancel:{subscription_id}"));
            Ok(())
        }
    }

    fn store() -> (LedgerStore, OutboxReceiver) {
        let (outbox, receiver) = outbox();
        let ids = Arc::new(SequentialIds(AtomicU64::new(100)));
        (LedgerStore::new(ids, LedgerSnapshot::default(), outbox), receiver)
    }

    fn expense(amount: f64, category: &str, day: u32) -> TransactionInput {
        TransactionInput::expense(
            amount,
            category,
            Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
            "test",
        )
    }

    #[test]
    fn new_transactions_are_prepended_with_fresh_ids() {
        let (mut store, _rx) = store();
        let first = store.add_transaction(expense(10.0, "1", 1));
        let second = store.add_transaction(expense(20.0, "1", 2));

        let snapshot = store.snapshot();
        assert_ne!(first.id, second.id);
        assert_eq!(snapshot.transactions[0].id, second.id);
        assert_eq!(snapshot.transactions[1].id, first.id);
        assert_eq!(snapshot.transactions[0].kind, TransactionType::Expense);
    }

    #[test]
    fn ids_stay_unique_across_entity_kinds() {
        let (outbox, _rx) = outbox();
        let mut store = LedgerStore::new(
            Arc::new(TimeRandomIds::default()),
            LedgerSnapshot::default(),
            outbox,
        );
        let mut seen = HashSet::new();
        for i in 0..50 {
            assert!(seen.insert(store.add_transaction(expense(1.0, "1", 1)).id));
            assert!(seen.insert(store.add_category(CategoryInput::new(format!("c{i}"), "tag", "#000000")).id));
        }
    }

    #[test]
    fn categories_are_appended_after_defaults() {
        let (mut store, _rx) = store();
        let created = store.add_category(CategoryInput::new("Pets", "heart", "#ec4899"));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.categories.len(), 6);
        assert_eq!(snapshot.categories.last(), Some(&created));
    }

    #[test]
    fn deleting_twice_or_unknown_ids_is_harmless() {
        let (mut store, receiver) = store();
        let txn = store.add_transaction(expense(10.0, "1", 1));
        store.delete_transaction(&txn.id);
        store.delete_transaction(&txn.id);
        store.delete_transaction("missing");
        store.delete_category("missing");

        let snapshot = store.snapshot();
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.categories.len(), 5);

        let storage = Arc::new(MemoryStorage::new());
        let report = OutboxWorker::new(receiver, storage.clone(), Arc::new(RecordingReminders::default()))
            .drain_pending();
        assert_eq!(report.persisted, 1);
        assert_eq!(report.superseded, 4);
        assert_eq!(storage.stored().as_ref(), Some(snapshot.as_ref()));
    }

    #[test]
    fn deleting_a_category_keeps_its_transactions() {
        let (mut store, _rx) = store();
        let category = store.add_category(CategoryInput::new("Pets", "heart", "#ec4899"));
        store.add_transaction(expense(30.0, &category.id, 3));
        store.delete_category(&category.id);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(
            snapshot.category_display(&snapshot.transactions[0].category_id).name,
            FALLBACK_CATEGORY_NAME
        );
    }

    #[test]
    fn subscription_changes_queue_reminder_work() {
        let (mut store, receiver) = store();
        let due = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let sub = store.add_subscription(SubscriptionInput::new("Netflix", 39.9, due));
        store.delete_subscription(&sub.id);

        let reminders = Arc::new(RecordingReminders::default());
        let report = OutboxWorker::new(receiver, Arc::new(MemoryStorage::new()), reminders.clone())
            .drain_pending();

        assert_eq!(report.scheduled, 1);
        assert_eq!(report.cancelled, 1);
        assert_eq!(
            *reminders.calls.lock().unwrap(),
            vec![format!("schedule:{}:10", sub.id), format!("cancel:{}", sub.id)]
        );
        assert!(store.snapshot().subscriptions.is_empty());
    }

    #[test]
    fn observers_see_every_mutation_until_unsubscribed() {
        let (mut store, _rx) = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = store.subscribe(move |snapshot| {
            assert!(!snapshot.categories.is_empty());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.add_transaction(expense(1.0, "1", 1));
        store.delete_transaction("missing");
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add_transaction(expense(1.0, "1", 1));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn readers_on_other_threads_see_whole_snapshots() {
        let (mut store, _rx) = store();
        let reader = store.reader();
        let before = reader.current();

        store.add_transaction(expense(5.0, "1", 1));

        let seen = thread::spawn(move || reader.current().transactions.len())
            .join()
            .unwrap();
        assert_eq!(seen, 1);
        assert!(before.transactions.is_empty());
    }

    #[test]
    fn mutations_survive_a_closed_outbox() {
        let (mut store, receiver) = store();
        drop(receiver);
        let txn = store.add_transaction(expense(5.0, "1", 1));
        assert_eq!(store.snapshot().transactions[0], txn);
    }
}
