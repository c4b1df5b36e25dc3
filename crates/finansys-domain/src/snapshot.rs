//! Immutable, complete copies of the ledger's three collections.

use serde::{Deserialize, Serialize};

use crate::{
    category::{default_categories, Category, CategoryDisplay},
    subscription::Subscription,
    transaction::Transaction,
};

/// The persisted ledger state. Transactions and subscriptions are ordered
/// most-recent-first; categories keep declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            subscriptions: Vec::new(),
            categories: default_categories(),
        }
    }
}

impl LedgerSnapshot {
    /// A snapshot with no categories at all, unlike [`LedgerSnapshot::default`].
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            subscriptions: Vec::new(),
            categories: Vec::new(),
        }
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn subscription(&self, id: &str) -> Option<&Subscription> {
        self.subscriptions.iter().find(|sub| sub.id == id)
    }

    /// Resolves a category reference for display, never failing on dangling ids.
    pub fn category_display(&self, id: &str) -> CategoryDisplay<'_> {
        CategoryDisplay::of(self.category(id))
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_seeded_with_categories() {
        let snapshot = LedgerSnapshot::default();
        assert!(snapshot.transactions.is_empty());
        assert!(snapshot.subscriptions.is_empty());
        assert_eq!(snapshot.categories, default_categories());
    }

    #[test]
    fn missing_categories_field_deserializes_to_defaults() {
        let snapshot: LedgerSnapshot =
            serde_json::from_str(r#"{"transactions":[],"subscriptions":[]}"#).unwrap();
        assert_eq!(snapshot.categories.len(), 5);
    }

    #[test]
    fn dangling_category_display_uses_fallback() {
        let snapshot = LedgerSnapshot::default();
        assert!(!snapshot.category_display("1").dangling);
        assert!(snapshot.category_display("gone").dangling);
    }
}
