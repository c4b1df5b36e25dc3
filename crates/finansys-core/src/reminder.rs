//! Advance notices for subscription due dates.
//!
//! The store only hands out [`ReminderRequest`]s; a [`ReminderScheduler`]
//! decides when the notice fires and keeps track of what is pending.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use finansys_domain::{clamped_day, shift_month, Subscription};

use crate::{
    time::{local_midnight, Clock},
    CoreError,
};

pub const DEFAULT_REMINDER_LEAD_HOURS: i64 = 48;

/// Scheduling request emitted when a subscription is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    pub subscription_id: String,
    pub name: String,
    pub due_date: NaiveDate,
}

impl ReminderRequest {
    pub fn for_subscription(subscription: &Subscription) -> Self {
        Self {
            subscription_id: subscription.id.clone(),
            name: subscription.name.clone(),
            due_date: subscription.due_date,
        }
    }

    pub fn due_day(&self) -> u32 {
        self.due_date.day()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderId(pub String);

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Next occurrence of a due day and the instant its notice should fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSchedule {
    pub due_date: NaiveDate,
    pub trigger_at: DateTime<Utc>,
}

/// Computes when the notice for `due_day` should fire, seen from `now`.
///
/// The due instant is local midnight of the due day in `now`'s timezone,
/// clamped to the month's last day. This month's occurrence is used while its
/// trigger (`due - lead`) is still ahead of `now`; otherwise next month's.
/// Returns `None` when neither trigger lies in the future, including when
/// `lead` reaches past the representable range.
pub fn next_reminder<Tz: TimeZone>(
    due_day: u32,
    now: &DateTime<Tz>,
    lead: Duration,
) -> Option<ReminderSchedule> {
    let tz = now.timezone();
    let today = now.date_naive();
    let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?;

    for months_ahead in 0..=1 {
        let month = shift_month(month_start, months_ahead);
        let due_date = clamped_day(month.year(), month.month(), due_day)?;
        let due_at = local_midnight(&tz, due_date)?;
        let trigger = due_at.checked_sub_signed(lead)?;
        if trigger > *now {
            return Some(ReminderSchedule {
                due_date,
                trigger_at: trigger.with_timezone(&Utc),
            });
        }
    }
    None
}

/// External collaborator that arranges one-time advance notices.
pub trait ReminderScheduler: Send + Sync {
    /// Replaces any pending notice for the same subscription. `Ok(None)` means
    /// the trigger point already passed and nothing was scheduled.
    fn schedule(&self, request: &ReminderRequest) -> Result<Option<ReminderId>, CoreError>;

    /// Cancels every pending notice tagged with `subscription_id`. No match is fine.
    fn cancel(&self, subscription_id: &str) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminder {
    pub id: ReminderId,
    pub subscription_id: String,
    pub due_date: NaiveDate,
    pub trigger_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// Process-local scheduler that records pending notices.
pub struct InMemoryReminders<Tz: TimeZone> {
    clock: Arc<dyn Clock>,
    tz: Tz,
    lead: Duration,
    pending: Mutex<Vec<PendingReminder>>,
    sequence: AtomicU64,
}

impl<Tz> InMemoryReminders<Tz>
where
    Tz: TimeZone + Send + Sync,
{
    pub fn new(clock: Arc<dyn Clock>, tz: Tz) -> Self {
        Self::with_lead(clock, tz, Duration::hours(DEFAULT_REMINDER_LEAD_HOURS))
    }

    pub fn with_lead(clock: Arc<dyn Clock>, tz: Tz, lead: Duration) -> Self {
        Self {
            clock,
            tz,
            lead,
            pending: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(1),
        }
    }

    /// All pending notices, earliest trigger first.
    pub fn pending(&self) -> Vec<PendingReminder> {
        let mut items = match self.pending.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        items.sort_by_key(|item| item.trigger_at);
        items
    }

    pub fn pending_for(&self, subscription_id: &str) -> Vec<PendingReminder> {
        self.pending()
            .into_iter()
            .filter(|item| item.subscription_id == subscription_id)
            .collect()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<PendingReminder>>, CoreError> {
        self.pending
            .lock()
            .map_err(|_| CoreError::Reminder("reminder registry poisoned".into()))
    }
}

impl<Tz> ReminderScheduler for InMemoryReminders<Tz>
where
    Tz: TimeZone + Send + Sync,
{
    fn schedule(&self, request: &ReminderRequest) -> Result<Option<ReminderId>, CoreError> {
        self.cancel(&request.subscription_id)?;

        let now = self.clock.now().with_timezone(&self.tz);
        let Some(schedule) = next_reminder(request.due_day(), &now, self.lead) else {
            tracing::debug!(
                subscription = %request.subscription_id,
                "reminder trigger already passed, nothing scheduled"
            );
            return Ok(None);
        };

        let id = ReminderId(format!(
            "reminder-{}",
            self.sequence.fetch_add(1, Ordering::SeqCst)
        ));
        let reminder = PendingReminder {
            id: id.clone(),
            subscription_id: request.subscription_id.clone(),
            due_date: schedule.due_date,
            trigger_at: schedule.trigger_at,
            title: "Vencimento Próximo!".into(),
            body: format!(
                "Sua assinatura de {} vence em {} horas.",
                request.name,
                self.lead.num_hours()
            ),
        };
        self.lock()?.push(reminder);
        tracing::debug!(
            subscription = %request.subscription_id,
            trigger = %schedule.trigger_at,
            "reminder scheduled"
        );
        Ok(Some(id))
    }

    fn cancel(&self, subscription_id: &str) -> Result<(), CoreError> {
        self.lock()?
            .retain(|item| item.subscription_id != subscription_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;
    use crate::time::FixedClock;

    fn lead() -> Duration {
        Duration::hours(DEFAULT_REMINDER_LEAD_HOURS)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn early_in_month_schedules_current_occurrence() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let schedule = next_reminder(10, &now, lead()).expect("scheduled");
        assert_eq!(schedule.due_date, date(2025, 3, 10));
        assert_eq!(
            schedule.trigger_at,
            Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn inside_lead_window_rolls_to_next_month() {
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap();
        let schedule = next_reminder(10, &now, lead()).expect("scheduled");
        assert_eq!(schedule.due_date, date(2025, 4, 10));
        assert_eq!(
            schedule.trigger_at,
            Utc.with_ymd_and_hms(2025, 4, 8, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn trigger_exactly_now_is_not_in_the_future() {
        let now = Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap();
        let schedule = next_reminder(10, &now, lead()).expect("scheduled");
        assert_eq!(schedule.due_date, date(2025, 4, 10));
    }

    #[test]
    fn due_day_is_clamped_to_month_length() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let schedule = next_reminder(31, &now, lead()).expect("scheduled");
        assert_eq!(schedule.due_date, date(2025, 2, 28));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let now = Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap();
        let schedule = next_reminder(5, &now, lead()).expect("scheduled");
        assert_eq!(schedule.due_date, date(2026, 1, 5));
    }

    #[test]
    fn lead_longer_than_a_month_yields_none() {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap();
        assert_eq!(next_reminder(1, &now, Duration::days(60)), None);
    }

    #[test]
    fn out_of_range_lead_yields_none() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(next_reminder(10, &now, Duration::hours(u32::MAX.into())), None);
    }

    #[test]
    fn oversized_lead_schedules_nothing() {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        ));
        let reminders =
            InMemoryReminders::with_lead(clock, Utc, Duration::hours(u32::MAX.into()));
        let request = ReminderRequest {
            subscription_id: "sub-1".into(),
            name: "Streaming".into(),
            due_date: date(2025, 3, 10),
        };
        assert_eq!(reminders.schedule(&request).unwrap(), None);
        assert!(reminders.pending().is_empty());
    }

    #[test]
    fn midnight_follows_the_local_timezone() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let schedule = next_reminder(10, &now, lead()).expect("scheduled");
        assert_eq!(
            schedule.trigger_at,
            Utc.with_ymd_and_hms(2025, 3, 8, 3, 0, 0).unwrap()
        );
    }

    #[test]
    fn scheduling_twice_replaces_the_pending_notice() {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        ));
        let reminders = InMemoryReminders::new(clock, Utc);
        let request = ReminderRequest {
            subscription_id: "sub-1".into(),
            name: "Streaming".into(),
            due_date: date(2025, 3, 10),
        };
        let first = reminders.schedule(&request).unwrap().expect("first id");
        let second = reminders.schedule(&request).unwrap().expect("second id");
        assert_ne!(first, second);

        let pending = reminders.pending_for("sub-1");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second);
        assert_eq!(pending[0].title, "Vencimento Próximo!");
        assert_eq!(pending[0].body, "Sua assinatura de Streaming vence em 48 horas.");
    }

    #[test]
    fn rescheduling_after_the_trigger_moves_to_next_month() {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        ));
        let reminders = InMemoryReminders::new(Arc::clone(&clock) as Arc<dyn Clock>, Utc);
        let request = ReminderRequest {
            subscription_id: "sub-1".into(),
            name: "Streaming".into(),
            due_date: date(2025, 3, 10),
        };
        reminders.schedule(&request).unwrap().expect("scheduled");
        assert_eq!(reminders.pending()[0].due_date, date(2025, 3, 10));

        clock.advance(Duration::days(7));
        reminders.schedule(&request).unwrap().expect("rescheduled");
        let pending = reminders.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].due_date, date(2025, 4, 10));
    }

    #[test]
    fn cancel_without_match_is_not_an_error() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let reminders = InMemoryReminders::new(clock, Utc);
        reminders.cancel("missing").expect("cancel is best-effort");
        assert!(reminders.pending().is_empty());
    }
}
