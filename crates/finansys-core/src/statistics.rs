//! Derived figures over a ledger snapshot.
//!
//! Everything here is a pure function of `(snapshot, now)`. Nothing is cached;
//! callers recompute whenever the store publishes a new snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use finansys_domain::{total_amount, LedgerSnapshot, Subscription, Transaction, TransactionType};

use crate::time::local_midnight;

/// Number of entries shown in the recent-activity list.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// The current calendar month as seen from a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
}

impl MonthWindow {
    /// Window for the month containing `now`, in `now`'s timezone.
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .and_then(|first| local_midnight(&now.timezone(), first))
            .map(|start| start.with_timezone(&Utc))
            .unwrap_or_else(|| now.with_timezone(&Utc));
        Self { start }
    }

    /// Strictly after the month's first instant; the start instant itself is excluded.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant > self.start
    }
}

/// One slice of the expense distribution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub category_id: String,
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Transactions sharing one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub transactions: Vec<Transaction>,
}

impl DayGroup {
    /// `YYYY-MM-DD` label of the day.
    pub fn key(&self) -> String {
        self.day.format("%Y-%m-%d").to_string()
    }

    pub fn total(&self) -> f64 {
        total_amount(&self.transactions)
    }
}

/// Summary figures for the current month.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStatistics {
    pub window: MonthWindow,
    pub income: f64,
    pub expense: f64,
    pub subscription_total: f64,
    pub projected_balance: f64,
    /// Current-month expense per category id, in first-seen order.
    pub category_totals: Vec<(String, f64)>,
    pub chart: Vec<ChartSlice>,
    pub recent_transactions: Vec<Transaction>,
}

impl LedgerStatistics {
    pub fn compute<Tz: TimeZone>(snapshot: &LedgerSnapshot, now: &DateTime<Tz>) -> Self {
        Self::compute_with_limit(snapshot, now, DEFAULT_RECENT_LIMIT)
    }

    pub fn compute_with_limit<Tz: TimeZone>(
        snapshot: &LedgerSnapshot,
        now: &DateTime<Tz>,
        recent_limit: usize,
    ) -> Self {
        let window = MonthWindow::containing(now);
        let mut income = 0.0;
        let mut expense = 0.0;

        for txn in snapshot
            .transactions
            .iter()
            .filter(|txn| window.contains(&txn.date))
        {
            match txn.kind {
                TransactionType::Income => income += txn.amount,
                TransactionType::Expense => expense += txn.amount,
            }
        }

        let category_totals = category_totals(&snapshot.transactions, window);
        let chart = chart_series(snapshot, &category_totals);
        let subscription_total = subscription_total(&snapshot.subscriptions);

        Self {
            window,
            income,
            expense,
            subscription_total,
            projected_balance: income - expense - subscription_total,
            category_totals,
            chart,
            recent_transactions: recent_transactions(&snapshot.transactions, recent_limit),
        }
    }

    pub fn category_total(&self, category_id: &str) -> Option<f64> {
        self.category_totals
            .iter()
            .find(|(id, _)| id == category_id)
            .map(|(_, total)| *total)
    }
}

/// Current-month expenses summed per category id, in first-seen order.
pub fn category_totals(transactions: &[Transaction], window: MonthWindow) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for txn in transactions
        .iter()
        .filter(|txn| txn.is_expense() && window.contains(&txn.date))
    {
        match totals.iter_mut().find(|(id, _)| *id == txn.category_id) {
            Some((_, total)) => *total += txn.amount,
            None => totals.push((txn.category_id.clone(), txn.amount)),
        }
    }
    totals
}

/// Resolves category totals to display slices, largest first. Ties keep their
/// first-seen order.
pub fn chart_series(snapshot: &LedgerSnapshot, totals: &[(String, f64)]) -> Vec<ChartSlice> {
    let mut slices: Vec<ChartSlice> = totals
        .iter()
        .map(|(category_id, value)| {
            let display = snapshot.category_display(category_id);
            ChartSlice {
                category_id: category_id.clone(),
                name: display.name.to_string(),
                value: *value,
                color: display.color.to_string(),
            }
        })
        .collect();
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));
    slices
}

/// Every subscription recurs monthly, so all of them count against the month.
pub fn subscription_total(subscriptions: &[Subscription]) -> f64 {
    total_amount(subscriptions)
}

/// Sum of every transaction amount, regardless of type or date.
pub fn total_volume(transactions: &[Transaction]) -> f64 {
    total_amount(transactions)
}

/// The first `limit` transactions by insertion, re-sorted newest first.
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut recent: Vec<Transaction> = transactions.iter().take(limit).cloned().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent
}

/// Partitions transactions by calendar day in `tz`, newest day first.
pub fn group_by_day<Tz: TimeZone>(transactions: &[Transaction], tz: &Tz) -> Vec<DayGroup> {
    let mut groups: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
    for txn in transactions {
        let day = txn.date.with_timezone(tz).date_naive();
        groups.entry(day).or_default().push(txn.clone());
    }
    groups
        .into_iter()
        .rev()
        .map(|(day, transactions)| DayGroup { day, transactions })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset};
    use finansys_domain::{SubscriptionInput, TransactionInput, FALLBACK_CATEGORY_NAME};

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn txn(id: &str, input: TransactionInput) -> Transaction {
        Transaction::from_input(id, input)
    }

    fn now() -> DateTime<Utc> {
        at(2025, 3, 15, 12)
    }

    #[test]
    fn month_start_instant_is_excluded() {
        let start = at(2025, 3, 1, 0);
        let mut snapshot = LedgerSnapshot::default();
        snapshot.transactions = vec![
            txn("a", TransactionInput::income(100.0, "5", start, "boundary")),
            txn(
                "b",
                TransactionInput::income(7.0, "5", start + Duration::milliseconds(1), "just after"),
            ),
        ];
        let stats = LedgerStatistics::compute(&snapshot, &now());
        assert_eq!(stats.income, 7.0);
    }

    #[test]
    fn month_window_follows_the_reference_timezone() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        let window = MonthWindow::containing(&now);
        assert_eq!(window.start, at(2025, 3, 1, 3));
        assert!(!window.contains(&at(2025, 3, 1, 2)));
    }

    #[test]
    fn projected_balance_subtracts_expenses_and_subscriptions() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.transactions = vec![
            txn("i", TransactionInput::income(1000.0, "5", at(2025, 3, 5, 9), "Salary")),
            txn("e", TransactionInput::expense(300.0, "1", at(2025, 3, 6, 9), "Groceries")),
            txn("old", TransactionInput::expense(999.0, "1", at(2025, 2, 6, 9), "Last month")),
        ];
        snapshot.subscriptions = vec![
            Subscription::from_input(
                "s1",
                SubscriptionInput::new("Music", 100.0, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()),
            ),
            Subscription::from_input(
                "s2",
                SubscriptionInput::new("Cloud", 50.0, NaiveDate::from_ymd_opt(2024, 7, 20).unwrap()),
            ),
        ];
        let stats = LedgerStatistics::compute(&snapshot, &now());
        assert_eq!(stats.income, 1000.0);
        assert_eq!(stats.expense, 300.0);
        assert_eq!(stats.subscription_total, 150.0);
        assert_eq!(stats.projected_balance, 550.0);
    }

    #[test]
    fn category_totals_group_expenses_and_sort_chart() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.transactions = vec![
            txn("1", TransactionInput::expense(20.0, "2", at(2025, 3, 3, 9), "Bus")),
            txn("2", TransactionInput::expense(50.0, "1", at(2025, 3, 4, 9), "Market")),
            txn("3", TransactionInput::expense(30.0, "1", at(2025, 3, 5, 9), "Bakery")),
            txn("4", TransactionInput::income(500.0, "5", at(2025, 3, 5, 9), "Salary")),
        ];
        let stats = LedgerStatistics::compute(&snapshot, &now());
        assert_eq!(stats.category_total("1"), Some(80.0));
        assert_eq!(stats.category_total("2"), Some(20.0));
        assert_eq!(stats.category_total("5"), None);

        let names: Vec<(&str, f64)> = stats
            .chart
            .iter()
            .map(|slice| (slice.category_id.as_str(), slice.value))
            .collect();
        assert_eq!(names, vec![("1", 80.0), ("2", 20.0)]);
        assert_eq!(stats.chart[0].name, "Alimentação");
        assert_eq!(stats.chart[0].color, "#f59e0b");
    }

    #[test]
    fn dangling_category_resolves_to_fallback_slice() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.transactions = vec![txn(
            "x",
            TransactionInput::expense(12.0, "deleted", at(2025, 3, 2, 9), "Mystery"),
        )];
        let stats = LedgerStatistics::compute(&snapshot, &now());
        assert_eq!(stats.chart.len(), 1);
        assert_eq!(stats.chart[0].name, FALLBACK_CATEGORY_NAME);
        assert_eq!(stats.chart[0].color, "#94a3b8");
    }

    #[test]
    fn recent_transactions_take_first_ten_then_sort_by_date() {
        let transactions: Vec<Transaction> = (0..12)
            .map(|i| {
                txn(
                    &format!("t{i}"),
                    TransactionInput::expense(1.0, "1", at(2025, 3, 1 + i, 9), "item"),
                )
            })
            .collect();
        let recent = recent_transactions(&transactions, DEFAULT_RECENT_LIMIT);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].id, "t9");
        assert_eq!(recent[9].id, "t0");
    }

    #[test]
    fn recent_transactions_keep_relative_order_on_ties() {
        let same = at(2025, 3, 2, 9);
        let transactions = vec![
            txn("first", TransactionInput::expense(1.0, "1", same, "a")),
            txn("older", TransactionInput::expense(1.0, "1", at(2025, 3, 1, 9), "b")),
            txn("second", TransactionInput::expense(1.0, "1", same, "c")),
        ];
        let ids: Vec<String> = recent_transactions(&transactions, 10)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "older"]);
    }

    #[test]
    fn group_by_day_orders_days_descending_and_keeps_insertion_order() {
        let transactions = vec![
            txn("late", TransactionInput::expense(1.0, "1", at(2025, 3, 2, 8), "a")),
            txn("new", TransactionInput::expense(1.0, "1", at(2025, 3, 3, 9), "b")),
            txn("early", TransactionInput::expense(1.0, "1", at(2025, 3, 2, 20), "c")),
        ];
        let groups = group_by_day(&transactions, &Utc);
        let keys: Vec<String> = groups.iter().map(DayGroup::key).collect();
        assert_eq!(keys, vec!["2025-03-03", "2025-03-02"]);
        let ids: Vec<&str> = groups[1].transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["late", "early"]);
        assert_eq!(groups[1].total(), 2.0);
    }

    #[test]
    fn group_by_day_uses_the_given_timezone() {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let transactions = vec![txn(
            "night",
            TransactionInput::expense(1.0, "1", at(2025, 3, 3, 1), "late snack"),
        )];
        let groups = group_by_day(&transactions, &tz);
        assert_eq!(groups[0].key(), "2025-03-02");
    }

    #[test]
    fn total_volume_ignores_type_and_month() {
        let transactions = vec![
            txn("a", TransactionInput::income(10.0, "5", at(2024, 1, 1, 0), "old")),
            txn("b", TransactionInput::expense(5.5, "1", at(2025, 3, 1, 9), "new")),
        ];
        assert_eq!(total_volume(&transactions), 15.5);
    }
}
