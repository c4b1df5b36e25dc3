//! Domain models for income and expense transactions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;

/// A single recorded movement of money. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: String,
    pub date: DateTime<Utc>,
    pub description: String,
}

impl Transaction {
    pub fn from_input(id: impl Into<String>, input: TransactionInput) -> Self {
        Self {
            id: id.into(),
            amount: input.amount,
            kind: input.kind,
            category_id: input.category_id,
            date: input.date,
            description: input.description,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Amounted for Transaction {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Caller-supplied fields for a new transaction; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    pub amount: f64,
    pub kind: TransactionType,
    pub category_id: String,
    pub date: DateTime<Utc>,
    pub description: String,
}

impl TransactionInput {
    pub fn new(
        kind: TransactionType,
        amount: f64,
        category_id: impl Into<String>,
        date: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            kind,
            category_id: category_id.into(),
            date,
            description: description.into(),
        }
    }

    pub fn income(
        amount: f64,
        category_id: impl Into<String>,
        date: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(TransactionType::Income, amount, category_id, date, description)
    }

    pub fn expense(
        amount: f64,
        category_id: impl Into<String>,
        date: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(TransactionType::Expense, amount, category_id, date, description)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "in" => Some(TransactionType::Income),
            "expense" | "out" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        };
        f.write_str(label)
    }
}
