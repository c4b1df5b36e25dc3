//! finansys-core
//!
//! Ledger store, statistics engine, reminder scheduling contract and the
//! outbox that carries persistence and reminder side effects off the
//! mutation path. Depends on finansys-domain. No CLI, no terminal I/O,
//! no filesystem access.

pub mod error;
pub mod ids;
pub mod ledger_store;
pub mod outbox;
pub mod reminder;
pub mod statistics;
pub mod storage;
pub mod time;

pub use error::CoreError;
pub use ids::{IdSource, TimeRandomIds};
pub use ledger_store::{LedgerStore, ObserverId, SnapshotReader};
pub use outbox::{outbox, DrainReport, Outbox, OutboxReceiver, OutboxWorker, RetryPolicy, SideEffect};
pub use reminder::{
    next_reminder, InMemoryReminders, PendingReminder, ReminderId, ReminderRequest,
    ReminderSchedule, ReminderScheduler, DEFAULT_REMINDER_LEAD_HOURS,
};
pub use statistics::{
    group_by_day, total_volume, ChartSlice, DayGroup, LedgerStatistics, MonthWindow,
    DEFAULT_RECENT_LIMIT,
};
pub use storage::{snapshot_warnings, MemoryStorage, SnapshotStorage, DEFAULT_STORAGE_KEY};
pub use time::{Clock, FixedClock, SystemClock};
