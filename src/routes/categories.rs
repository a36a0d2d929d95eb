use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    dto::{
        category::{CreateCategoryRequest, RenameCategoryRequest, RenameCategoryResponse},
        common::{ActionResponse, ErrorBody},
    },
    error::{ApiJson, AppError},
    services::category_service,
    state::SharedState,
};

/// Catalog endpoints for category names.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/{name}",
            put(rename_category).delete(delete_category),
        )
}

/// List category names, seeding the defaults on first use.
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses((status = 200, description = "Category names", body = [String]))
)]
pub async fn list_categories(
    State(state): State<SharedState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(category_service::list_categories(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ActionResponse),
        (status = 400, description = "Missing name", body = ErrorBody),
        (status = 409, description = "Category already exists", body = ErrorBody)
    )
)]
pub async fn create_category(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ActionResponse>), AppError> {
    let name = category_service::create_category(&state, payload.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::new(format!("category `{name}` created"))),
    ))
}

/// Rename a category and move its games to the new name.
#[utoipa::path(
    put,
    path = "/api/categories/{name}",
    tag = "categories",
    params(("name" = String, Path, description = "Current category name")),
    request_body = RenameCategoryRequest,
    responses(
        (status = 200, description = "Category renamed", body = RenameCategoryResponse),
        (status = 400, description = "Missing new name", body = ErrorBody),
        (status = 409, description = "New name already taken", body = ErrorBody)
    )
)]
pub async fn rename_category(
    State(state): State<SharedState>,
    Path(old_name): Path<String>,
    ApiJson(payload): ApiJson<RenameCategoryRequest>,
) -> Result<Json<RenameCategoryResponse>, AppError> {
    let outcome = category_service::rename_category(&state, &old_name, payload.new_name).await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{name}",
    tag = "categories",
    params(("name" = String, Path, description = "Category name")),
    responses(
        (status = 200, description = "Category deleted (or already absent)", body = ActionResponse),
        (status = 400, description = "Games still reference the category", body = ErrorBody)
    )
)]
pub async fn delete_category(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let message = if category_service::delete_category(&state, &name).await? {
        format!("category `{name}` deleted")
    } else {
        format!("category `{name}` did not exist")
    };
    Ok(Json(ActionResponse::new(message)))
}
