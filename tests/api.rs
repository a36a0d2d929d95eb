use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use igrite_back::{
    config::AppConfig,
    dao::catalog_store::memory::MemoryCatalogStore,
    dto::{
        category::RenameCategoryResponse,
        game::{BulkImportSummary, GameDto},
    },
    routes,
    state::AppState,
};

fn server() -> TestServer {
    let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryCatalogStore::new()));
    TestServer::try_new(routes::router(state)).expect("Could not create test server.")
}

fn game(id: &str, title: &str, category: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{title}, playable in the browser"),
        "url": format!("https://games.example.com/{id}/index.html"),
        "category": category,
        "tags": "html5,retro",
        "thumb": format!("https://games.example.com/{id}/thumb.png"),
        "width": "800",
        "height": "600"
    })
}

fn error_message(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn game_crud_round_trip() {
    let server = server();

    let created = server.post("/api/games").json(&game("1", "Snake", "Arcade")).await;
    created.assert_status(StatusCode::CREATED);
    let created: GameDto = created.json();
    assert_eq!(created.id, "1");
    assert!(!created.created_at.is_empty());

    let fetched: GameDto = server.get("/api/games/1").await.json();
    assert_eq!(fetched, created);

    let updated = server
        .put("/api/games/1")
        .json(&json!({ "id": "ignored", "title": "Snake II" }))
        .await;
    updated.assert_status_ok();
    let updated: GameDto = updated.json();
    assert_eq!(updated.id, "1");
    assert_eq!(updated.title, "Snake II");
    assert_eq!(updated.category, created.category);
    assert_eq!(updated.url, created.url);

    server.delete("/api/games/1").await.assert_status_ok();

    let missing = server.get("/api/games/1").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_message(&missing.json()), "Game not found");

    server
        .delete("/api/games/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .put("/api/games/1")
        .json(&json!({ "title": "Ghost" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_without_id_generates_one() {
    let server = server();
    let mut body = game("", "Tetris", "Puzzle");
    body.as_object_mut().unwrap().remove("id");

    let response = server.post("/api/games").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    let created: GameDto = response.json();
    assert!(!created.id.is_empty());

    server
        .get(&format!("/api/games/{}", created.id))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn padded_id_round_trips_through_create_and_get() {
    let server = server();
    let response = server.post("/api/games").json(&game(" 7 ", "Pong", "Arcade")).await;
    response.assert_status(StatusCode::CREATED);
    let created: GameDto = response.json();
    assert_eq!(created.id, " 7 ");

    let fetched = server.get("/api/games/%207%20").await;
    fetched.assert_status_ok();
    assert_eq!(fetched.json::<GameDto>(), created);

    server
        .get("/api/games/7")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_invalid_and_duplicate_games() {
    let server = server();
    server
        .post("/api/games")
        .json(&game("1", "Snake", "Arcade"))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .post("/api/games")
        .json(&game("1", "Snake", "Arcade"))
        .await
        .assert_status(StatusCode::CONFLICT);

    let no_category = server
        .post("/api/games")
        .json(&json!({ "title": "Untitled", "url": "https://games.example.com/x" }))
        .await;
    no_category.assert_status(StatusCode::BAD_REQUEST);
    assert!(!error_message(&no_category.json()).is_empty());

    server
        .post("/api/games")
        .json(&json!({ "title": "Wide", "url": "u", "category": "Arcade", "width": "80%" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/games")
        .text("{ not json")
        .content_type("application/json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_by_search_and_category() {
    let server = server();
    for body in [
        game("1", "Space Racer", "Racing"),
        game("2", "Chess", "Strategy"),
        game("3", "Kart", "Racing"),
    ] {
        server
            .post("/api/games")
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);
    }

    let all: Vec<GameDto> = server.get("/api/games").await.json();
    assert_eq!(all.len(), 3);

    let searched: Vec<GameDto> = server
        .get("/api/games")
        .add_query_param("search", "CHESS")
        .await
        .json();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].id, "2");

    let by_category: Vec<GameDto> = server
        .get("/api/games")
        .add_query_param("category", "rac")
        .await
        .json();
    assert_eq!(by_category.len(), 2);

    let blank: Vec<GameDto> = server
        .get("/api/games")
        .add_query_param("search", "  ")
        .await
        .json();
    assert_eq!(blank.len(), 3);

    let legacy_search: Vec<GameDto> = server.get("/api/games/search/kart").await.json();
    assert_eq!(legacy_search.len(), 1);
    let legacy_category: Vec<GameDto> = server.get("/api/games/category/strat").await.json();
    assert_eq!(legacy_category.len(), 1);
}

#[tokio::test]
async fn bulk_import_skips_existing_ids() {
    let server = server();
    server
        .post("/api/games")
        .json(&game("1", "Snake", "Arcade"))
        .await
        .assert_status(StatusCode::CREATED);

    let batch = json!([game("1", "Snake again", "Arcade"), game("2", "Tetris", "Puzzle")]);
    let first = server.post("/api/games/bulk-import").json(&batch).await;
    first.assert_status(StatusCode::CREATED);
    let first: BulkImportSummary = first.json();
    assert_eq!(first.inserted_ids, vec!["2".to_string()]);
    assert_eq!(first.skipped_count, 1);

    let second: BulkImportSummary = server.post("/api/games/bulk-import").json(&batch).await.json();
    assert_eq!(second.inserted_count, 0);

    let snake: GameDto = server.get("/api/games/1").await.json();
    assert_eq!(snake.title, "Snake");

    let not_array = server
        .post("/api/games/bulk-import")
        .json(&game("3", "Pong", "Arcade"))
        .await;
    not_array.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn categories_seed_create_and_conflict() {
    let server = server();

    let seeded: Vec<String> = server.get("/api/categories").await.json();
    assert_eq!(seeded.len(), 9);
    assert_eq!(seeded[0], "Action");
    let again: Vec<String> = server.get("/api/categories").await.json();
    assert_eq!(again, seeded);

    server
        .post("/api/categories")
        .json(&json!({ "name": "Retro" }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/categories")
        .json(&json!({ "name": "Retro" }))
        .await
        .assert_status(StatusCode::CONFLICT);
    server
        .post("/api/categories")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let all: Vec<String> = server.get("/api/categories").await.json();
    assert_eq!(all.len(), 10);
}

#[tokio::test]
async fn rename_cascades_to_games() {
    let server = server();
    for name in ["Action", "Puzzle"] {
        server
            .post("/api/categories")
            .json(&json!({ "name": name }))
            .await
            .assert_status(StatusCode::CREATED);
    }
    server
        .post("/api/games")
        .json(&game("1", "Brawler", "Action"))
        .await
        .assert_status(StatusCode::CREATED);

    let renamed = server
        .put("/api/categories/Action")
        .json(&json!({ "newName": "Retro" }))
        .await;
    renamed.assert_status_ok();
    let renamed: RenameCategoryResponse = renamed.json();
    assert!(renamed.renamed);
    assert_eq!(renamed.games_updated, 1);

    let game: GameDto = server.get("/api/games/1").await.json();
    assert_eq!(game.category, "Retro");

    let categories: Vec<String> = server.get("/api/categories").await.json();
    assert!(!categories.contains(&"Action".to_string()));
    assert!(categories.contains(&"Retro".to_string()));

    server
        .put("/api/categories/Retro")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .put("/api/categories/Retro")
        .json(&json!({ "newName": "Puzzle" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_category_is_blocked_by_referencing_games() {
    let server = server();
    server
        .post("/api/categories")
        .json(&json!({ "name": "Action" }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/games")
        .json(&game("1", "Brawler", "Action"))
        .await
        .assert_status(StatusCode::CREATED);

    let blocked = server.delete("/api/categories/Action").await;
    blocked.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&blocked.json()),
        "Cannot delete category with 1 games"
    );

    server.delete("/api/games/1").await.assert_status_ok();
    server
        .delete("/api/categories/Action")
        .await
        .assert_status_ok();
    server
        .delete("/api/categories/Action")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn health_reports_status_and_timestamp() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].as_str().is_some_and(|ts| ts.contains('T')));
}

#[tokio::test]
async fn degraded_mode_answers_generic_errors() {
    let state = AppState::new(AppConfig::default());
    let server = TestServer::try_new(routes::router(state)).expect("Could not create test server.");

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["status"], "degraded");

    let response = server.get("/api/games").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&response.json()), "internal server error");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let server = server();
    let doc: Value = server.get("/api-doc/openapi.json").await.json();
    assert!(doc["paths"]["/api/games/bulk-import"].is_object());
}
