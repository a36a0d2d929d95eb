use mongodb::bson::{DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::dao::models::{CategoryEntity, GameEntity, GamePatch};

/// Layout of a document in the `games` collection. `_id` is left to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoGameDocument {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    url: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: String,
    #[serde(default)]
    thumb: String,
    #[serde(default)]
    width: String,
    #[serde(default)]
    height: String,
    created_at: DateTime,
    updated_at: DateTime,
}

impl MongoGameDocument {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            instructions: value.instructions,
            url: value.url,
            category: value.category,
            tags: value.tags,
            thumb: value.thumb,
            width: value.width,
            height: value.height,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            instructions: value.instructions,
            url: value.url,
            category: value.category,
            tags: value.tags,
            thumb: value.thumb,
            width: value.width,
            height: value.height,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Layout of a document in the `categories` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoCategoryDocument {
    name: String,
    #[serde(default = "DateTime::now")]
    created_at: DateTime,
    #[serde(default = "DateTime::now")]
    updated_at: DateTime,
}

impl From<CategoryEntity> for MongoCategoryDocument {
    fn from(value: CategoryEntity) -> Self {
        Self {
            name: value.name,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoCategoryDocument> for CategoryEntity {
    fn from(value: MongoCategoryDocument) -> Self {
        Self {
            name: value.name,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Build the `$set` body for a partial game update.
pub fn patch_set_document(patch: GamePatch, updated_at: DateTime) -> Document {
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

    let mut set = Document::new();
    let fields = [
        ("title", title),
        ("description", description),
        ("instructions", instructions),
        ("url", url),
        ("category", category),
        ("tags", tags),
        ("thumb", thumb),
        ("width", width),
        ("height", height),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            set.insert(key, value);
        }
    }
    set.insert("updatedAt", updated_at);
    set
}

/// Case-insensitive literal substring filter for `field`.
pub fn contains_filter(field: &str, needle: &str) -> Document {
    let mut condition = Document::new();
    condition.insert("$regex", escape_regex(needle));
    condition.insert("$options", "i");

    let mut filter = Document::new();
    filter.insert(field, condition);
    filter
}

/// Escape regex metacharacters so `input` matches literally.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
                | '#' | '&' | '-' | '~'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
