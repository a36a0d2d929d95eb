use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Catalog entry persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Stable external identifier (unique across the collection).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Optional how-to-play text.
    pub instructions: Option<String>,
    /// Location of the playable resource.
    pub url: String,
    /// Category name. Not enforced against the categories collection.
    pub category: String,
    /// Comma-separated tags.
    pub tags: String,
    /// Thumbnail image URL.
    pub thumb: String,
    /// Display width (numeric string).
    pub width: String,
    /// Display height (numeric string).
    pub height: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last write timestamp.
    pub updated_at: SystemTime,
}

/// Partial overwrite of a [`GameEntity`]. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub thumb: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl GameEntity {
    /// Overwrite the fields supplied in `patch` and stamp `updated_at`.
    pub fn apply_patch(&mut self, patch: GamePatch, updated_at: SystemTime) {
        let GamePatch {
            title,
            description,
            instructions,
            url,
            category,
            tags,
            thumb,
            width,
            height,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(instructions) = instructions {
            self.instructions = Some(instructions);
        }
        if let Some(url) = url {
            self.url = url;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if let Some(thumb) = thumb {
            self.thumb = thumb;
        }
        if let Some(width) = width {
            self.width = width;
        }
        if let Some(height) = height {
            self.height = height;
        }
        self.updated_at = updated_at;
    }

    /// Case-insensitive substring match on the category field.
    ///
    /// `needle` must already be lowercased.
    pub fn category_contains(&self, needle: &str) -> bool {
        self.category.to_lowercase().contains(needle)
    }

    /// Case-insensitive substring match across title, description, category and tags.
    ///
    /// `needle` must already be lowercased.
    pub fn text_contains(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.category, &self.tags]
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl GamePatch {
    /// True when the patch would not change any catalog field.
    pub fn is_empty(&self) -> bool {
        self == &GamePatch::default()
    }
}

/// Named grouping label persisted in the categories collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntity {
    /// Unique category name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last write timestamp.
    pub updated_at: SystemTime,
}

impl CategoryEntity {
    /// Build a freshly stamped category.
    pub fn new(name: impl Into<String>, now: SystemTime) -> Self {
        Self {
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outcome of a category rename and its cascade over the games collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenameOutcome {
    /// Whether a category document carried the old name.
    pub renamed: bool,
    /// Number of games moved to the new name.
    pub games_updated: u64,
}
