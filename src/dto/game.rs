use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{GameEntity, GamePatch},
    dto::{
        format_system_time,
        validation::{validate_dimension, validate_not_blank},
    },
};

/// Catalog entry as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameDto {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub url: String,
    pub category: String,
    pub tags: String,
    pub thumb: String,
    pub width: String,
    pub height: String,
    /// RFC 3339 creation time, stamped by the server.
    #[serde(default)]
    pub created_at: String,
    /// RFC 3339 time of the last write, stamped by the server.
    #[serde(default)]
    pub updated_at: String,
}

impl From<GameEntity> for GameDto {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            instructions: entity.instructions,
            url: entity.url,
            category: entity.category,
            tags: entity.tags,
            thumb: entity.thumb,
            width: entity.width,
            height: entity.height,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Payload used to add a game to the catalog, alone or as part of a bulk import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// Optional external identifier. A UUID is generated when absent or blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub url: String,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub category: String,
    /// Comma-separated tags.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    #[validate(custom(function = "validate_dimension"))]
    pub width: String,
    #[serde(default)]
    #[validate(custom(function = "validate_dimension"))]
    pub height: String,
}

impl CreateGameRequest {
    /// The caller-supplied id, exactly as sent, unless it is missing or only whitespace.
    pub fn supplied_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Build the entity to persist under `id`, stamping both timestamps with `now`.
    pub fn into_entity(self, id: String, now: SystemTime) -> GameEntity {
        GameEntity {
            id,
            title: self.title,
            description: self.description,
            instructions: self.instructions,
            url: self.url,
            category: self.category,
            tags: self.tags,
            thumb: self.thumb,
            width: self.width,
            height: self.height,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial game update. Omitted fields keep their stored value; an `id` in the body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateGameRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank"))]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_not_blank"))]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_dimension"))]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_dimension"))]
    pub height: Option<String>,
}

impl From<UpdateGameRequest> for GamePatch {
    fn from(request: UpdateGameRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            instructions: request.instructions,
            url: request.url,
            category: request.category,
            tags: request.tags,
            thumb: request.thumb,
            width: request.width,
            height: request.height,
        }
    }
}

/// Optional filters accepted by `GET /api/games`. `search` wins over `category`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameListQuery {
    /// Case-insensitive substring matched against title, description, category and tags.
    pub search: Option<String>,
    /// Case-insensitive substring matched against the category.
    pub category: Option<String>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportSummary {
    pub inserted_count: usize,
    /// Entries not inserted: id already stored, repeated in the batch, or invalid.
    pub skipped_count: usize,
    pub inserted_ids: Vec<String>,
}
