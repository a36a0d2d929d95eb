use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the catalog API.
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::games::list_games,
        crate::routes::games::search_games,
        crate::routes::games::games_by_category,
        crate::routes::games::get_game,
        crate::routes::games::create_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
        crate::routes::games::bulk_import,
        crate::routes::categories::list_categories,
        crate::routes::categories::create_category,
        crate::routes::categories::rename_category,
        crate::routes::categories::delete_category,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::ActionResponse,
            crate::dto::common::ErrorBody,
            crate::dto::game::GameDto,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::game::BulkImportSummary,
            crate::dto::category::CreateCategoryRequest,
            crate::dto::category::RenameCategoryRequest,
            crate::dto::category::RenameCategoryResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game catalog"),
        (name = "categories", description = "Category names and the rename cascade"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_catalog_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/games",
            "/api/games/{id}",
            "/api/games/bulk-import",
            "/api/categories",
            "/api/categories/{name}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
