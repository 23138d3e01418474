//! Item rows - the `items` table and its two qualifier tables
//!
//! - `Item`: one row per distinct tradable item
//! - `ItemSubtype`: a valid subtype label for an item (`item_subtypes`)
//! - `ItemModRank`: a valid mod rank for an item (`item_mod_ranks`)

use serde::{Deserialize, Serialize};

/// An item entity.
///
/// `url_name` is the URL-safe slug; `thumb` is a relative thumbnail
/// reference, not a full URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable item identifier (primary key)
    pub id: String,
    /// Display name
    pub item_name: String,
    /// Item category, e.g. "mod", "relic"
    pub item_type: Option<String>,
    /// URL-safe slug
    pub url_name: String,
    /// Thumbnail reference
    pub thumb: Option<String>,
}

impl Item {
    /// Create an item with the required fields. The slug is derived from the
    /// display name; use `with_url_name` to override it.
    pub fn new(id: impl Into<String>, item_name: impl Into<String>) -> Self {
        let item_name = item_name.into();
        let url_name = slugify(&item_name);
        Self {
            id: id.into(),
            item_name,
            item_type: None,
            url_name,
            thumb: None,
        }
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    pub fn with_url_name(mut self, url_name: impl Into<String>) -> Self {
        self.url_name = url_name.into();
        self
    }

    pub fn with_thumb(mut self, thumb: impl Into<String>) -> Self {
        self.thumb = Some(thumb.into());
        self
    }
}

/// Lowercase, ASCII-alphanumeric words joined by underscores.
///
/// "Primed Continuity" -> "primed_continuity", "Ash Prime: Set" -> "ash_prime_set"
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// A valid subtype label for an item. `(item_id, sub_type)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSubtype {
    pub item_id: String,
    pub sub_type: String,
}

impl ItemSubtype {
    pub fn new(item_id: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            sub_type: sub_type.into(),
        }
    }
}

/// A valid mod rank for an item. `(item_id, mod_rank)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemModRank {
    pub item_id: String,
    pub mod_rank: u32,
}

impl ItemModRank {
    pub fn new(item_id: impl Into<String>, mod_rank: u32) -> Self {
        Self {
            item_id: item_id.into(),
            mod_rank,
        }
    }
}
