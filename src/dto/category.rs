use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dao::models::RenameOutcome;

/// Payload used to create a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Payload used to rename a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameCategoryRequest {
    #[serde(default)]
    pub new_name: Option<String>,
}

/// Result of a rename and its cascade over the games referencing the old name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenameCategoryResponse {
    /// Whether a category carried the old name.
    pub renamed: bool,
    /// Number of games moved to the new name.
    pub games_updated: u64,
}

impl From<RenameOutcome> for RenameCategoryResponse {
    fn from(outcome: RenameOutcome) -> Self {
        Self {
            renamed: outcome.renamed,
            games_updated: outcome.games_updated,
        }
    }
}
