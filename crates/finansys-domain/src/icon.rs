//! Closed mapping from symbolic icon names to rendering handles.
//!
//! Categories and subscriptions store icon names as free strings. Front ends
//! resolve them through [`Icon`] so unknown names land on a defined fallback
//! instead of failing.

use std::{collections::HashMap, fmt};

use once_cell::sync::Lazy;

/// Icon names offered when creating a category.
pub const AVAILABLE_ICONS: [&str; 16] = [
    "shopping-cart",
    "coffee",
    "car",
    "home",
    "heart",
    "briefcase",
    "utensils",
    "film",
    "gamepad-2",
    "gift",
    "plane",
    "dumbbell",
    "zap",
    "tv",
    "music",
    "smartphone",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    ShoppingCart,
    Coffee,
    Car,
    Home,
    Heart,
    Briefcase,
    Utensils,
    Film,
    Gamepad2,
    Gift,
    Plane,
    Dumbbell,
    Zap,
    Tv,
    Music,
    Smartphone,
    Bell,
    Tag,
    /// Rendered for any name outside the known set.
    Unknown,
}

const KNOWN: [Icon; 18] = [
    Icon::ShoppingCart,
    Icon::Coffee,
    Icon::Car,
    Icon::Home,
    Icon::Heart,
    Icon::Briefcase,
    Icon::Utensils,
    Icon::Film,
    Icon::Gamepad2,
    Icon::Gift,
    Icon::Plane,
    Icon::Dumbbell,
    Icon::Zap,
    Icon::Tv,
    Icon::Music,
    Icon::Smartphone,
    Icon::Bell,
    Icon::Tag,
];

static BY_NAME: Lazy<HashMap<&'static str, Icon>> =
    Lazy::new(|| KNOWN.iter().map(|icon| (icon.name(), *icon)).collect());

impl Icon {
    /// Looks up a known icon; `None` when the name is not part of the vocabulary.
    pub fn from_name(name: &str) -> Option<Icon> {
        BY_NAME.get(name.trim()).copied()
    }

    /// Looks up an icon, falling back to [`Icon::Unknown`].
    pub fn resolve(name: &str) -> Icon {
        Self::from_name(name).unwrap_or(Icon::Unknown)
    }

    /// Whether the name belongs to the set offered in the category picker.
    pub fn is_pickable(name: &str) -> bool {
        AVAILABLE_ICONS.contains(&name.trim())
    }

    pub fn name(self) -> &'static str {
        match self {
            Icon::ShoppingCart => "shopping-cart",
            Icon::Coffee => "coffee",
            Icon::Car => "car",
            Icon::Home => "home",
            Icon::Heart => "heart",
            Icon::Briefcase => "briefcase",
            Icon::Utensils => "utensils",
            Icon::Film => "film",
            Icon::Gamepad2 => "gamepad-2",
            Icon::Gift => "gift",
            Icon::Plane => "plane",
            Icon::Dumbbell => "dumbbell",
            Icon::Zap => "zap",
            Icon::Tv => "tv",
            Icon::Music => "music",
            Icon::Smartphone => "smartphone",
            Icon::Bell => "bell",
            Icon::Tag => "tag",
            Icon::Unknown => "help-circle",
        }
    }

    /// Terminal glyph used as the rendering handle.
    pub fn glyph(self) -> char {
        match self {
            Icon::ShoppingCart => '🛒',
            Icon::Coffee => '☕',
            Icon::Car => '🚗',
            Icon::Home => '🏠',
            Icon::Heart => '♥',
            Icon::Briefcase => '💼',
            Icon::Utensils => '🍴',
            Icon::Film => '🎬',
            Icon::Gamepad2 => '🎮',
            Icon::Gift => '🎁',
            Icon::Plane => '✈',
            Icon::Dumbbell => '🏋',
            Icon::Zap => '⚡',
            Icon::Tv => '📺',
            Icon::Music => '♪',
            Icon::Smartphone => '📱',
            Icon::Bell => '🔔',
            Icon::Tag => '🏷',
            Icon::Unknown => '?',
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
