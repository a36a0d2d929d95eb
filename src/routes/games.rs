use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::{
        common::{ActionResponse, ErrorBody},
        game::{BulkImportSummary, CreateGameRequest, GameDto, GameListQuery, UpdateGameRequest},
    },
    error::{ApiJson, AppError},
    services::game_service,
    state::SharedState,
};

const GAME_NOT_FOUND: &str = "Game not found";

/// Catalog endpoints for games.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route("/api/games/bulk-import", post(bulk_import))
        .route("/api/games/search/{query}", get(search_games))
        .route("/api/games/category/{category}", get(games_by_category))
        .route(
            "/api/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}

/// List games, optionally filtered by a free-text `search` or a `category` substring.
#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    params(GameListQuery),
    responses(
        (status = 200, description = "Matching games", body = [GameDto]),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Query(query): Query<GameListQuery>,
) -> Result<Json<Vec<GameDto>>, AppError> {
    let search = non_blank(query.search.as_deref());
    let category = non_blank(query.category.as_deref());

    let games = match (search, category) {
        (Some(search), _) => game_service::search_games(&state, search).await?,
        (None, Some(category)) => game_service::games_by_category(&state, category).await?,
        (None, None) => game_service::list_games(&state).await?,
    };
    Ok(Json(games))
}

#[utoipa::path(
    get,
    path = "/api/games/search/{query}",
    tag = "games",
    params(("query" = String, Path, description = "Case-insensitive substring")),
    responses((status = 200, description = "Matching games", body = [GameDto]))
)]
pub async fn search_games(
    State(state): State<SharedState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<GameDto>>, AppError> {
    Ok(Json(game_service::search_games(&state, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/games/category/{category}",
    tag = "games",
    params(("category" = String, Path, description = "Case-insensitive category substring")),
    responses((status = 200, description = "Games in matching categories", body = [GameDto]))
)]
pub async fn games_by_category(
    State(state): State<SharedState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<GameDto>>, AppError> {
    Ok(Json(
        game_service::games_by_category(&state, &category).await?,
    ))
}

/// Retrieve a game by its id.
#[utoipa::path(
    get,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game found", body = GameDto),
        (status = 404, description = "Unknown id", body = ErrorBody)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameDto>, AppError> {
    game_service::get_game(&state, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(GAME_NOT_FOUND.into()))
}

/// Add a game to the catalog. An id is generated when none is supplied.
#[utoipa::path(
    post,
    path = "/api/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameDto),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 409, description = "Id already taken", body = ErrorBody)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameDto>), AppError> {
    let game = game_service::create_game(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// Overwrite the supplied fields of a game.
#[utoipa::path(
    put,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameDto),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "Unknown id", body = ErrorBody)
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateGameRequest>,
) -> Result<Json<GameDto>, AppError> {
    game_service::update_game(&state, &id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(GAME_NOT_FOUND.into()))
}

#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game deleted", body = ActionResponse),
        (status = 404, description = "Unknown id", body = ErrorBody)
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    if game_service::delete_game(&state, &id).await? {
        Ok(Json(ActionResponse::new(format!("game `{id}` deleted"))))
    } else {
        Err(AppError::NotFound(GAME_NOT_FOUND.into()))
    }
}

/// Insert every game whose id is not stored yet.
#[utoipa::path(
    post,
    path = "/api/games/bulk-import",
    tag = "games",
    request_body = [CreateGameRequest],
    responses(
        (status = 201, description = "Import summary", body = BulkImportSummary),
        (status = 400, description = "Body is not an array of games", body = ErrorBody)
    )
)]
pub async fn bulk_import(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<Vec<CreateGameRequest>>,
) -> Result<(StatusCode, Json<BulkImportSummary>), AppError> {
    let summary = game_service::bulk_import(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
