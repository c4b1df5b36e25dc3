//! Recurring monthly charges.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::common::*;

pub const DEFAULT_SUBSCRIPTION_ICON: &str = "bell";
pub const DEFAULT_SUBSCRIPTION_COLOR: &str = "#8b5cf6";

/// A monthly charge anchored on the day-of-month of `due_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub icon: String,
    pub color: String,
}

impl Subscription {
    pub fn from_input(id: impl Into<String>, input: SubscriptionInput) -> Self {
        Self {
            id: id.into(),
            name: input.name,
            amount: input.amount,
            due_date: input.due_date,
            icon: input.icon,
            color: input.color,
        }
    }

    /// Day-of-month the charge recurs on. The year and month of `due_date` carry no meaning.
    pub fn due_day(&self) -> u32 {
        self.due_date.day()
    }
}

impl Identifiable for Subscription {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Amounted for Subscription {
    fn amount(&self) -> f64 {
        self.amount
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionInput {
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub icon: String,
    pub color: String,
}

impl SubscriptionInput {
    pub fn new(name: impl Into<String>, amount: f64, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            due_date,
            icon: DEFAULT_SUBSCRIPTION_ICON.into(),
            color: DEFAULT_SUBSCRIPTION_COLOR.into(),
        }
    }
}
