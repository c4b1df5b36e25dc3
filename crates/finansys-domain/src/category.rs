//! Domain types representing spending categories.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Label shown for transactions whose category no longer exists.
pub const FALLBACK_CATEGORY_NAME: &str = "Outros";
/// Color token shown for transactions whose category no longer exists.
pub const FALLBACK_CATEGORY_COLOR: &str = "#94a3b8";
/// Icon name shown for transactions whose category no longer exists.
pub const FALLBACK_CATEGORY_ICON: &str = "tag";

/// Groups transactions for reporting. Categories are appended or removed, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
}

impl Category {
    pub fn from_input(id: impl Into<String>, input: CategoryInput) -> Self {
        Self {
            id: id.into(),
            name: input.name,
            icon: input.icon,
            color: input.color,
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Caller-supplied fields for a new category; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub icon: String,
    pub color: String,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
        }
    }
}

/// Presentation fields of a category reference, resolved with the fallback when dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDisplay<'a> {
    pub name: &'a str,
    pub icon: &'a str,
    pub color: &'a str,
    pub dangling: bool,
}

impl<'a> CategoryDisplay<'a> {
    pub fn of(category: Option<&'a Category>) -> Self {
        match category {
            Some(category) => Self {
                name: &category.name,
                icon: &category.icon,
                color: &category.color,
                dangling: false,
            },
            None => Self::fallback(),
        }
    }

    pub fn fallback() -> Self {
        Self {
            name: FALLBACK_CATEGORY_NAME,
            icon: FALLBACK_CATEGORY_ICON,
            color: FALLBACK_CATEGORY_COLOR,
            dangling: true,
        }
    }
}

/// The five categories every fresh ledger starts with.
pub fn default_categories() -> Vec<Category> {
    [
        ("1", "Alimentação", "utensils", "#f59e0b"),
        ("2", "Transporte", "car", "#3b82f6"),
        ("3", "Lazer", "gamepad-2", "#8b5cf6"),
        ("4", "Moradia", "home", "#ef4444"),
        ("5", "Salário", "briefcase", "#10b981"),
    ]
    .into_iter()
    .map(|(id, name, icon, color)| Category {
        id: id.into(),
        name: name.into(),
        icon: icon.into(),
        color: color.into(),
    })
    .collect()
}
