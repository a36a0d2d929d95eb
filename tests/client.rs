#![cfg(feature = "client")]

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use reqwest::StatusCode;
use tokio::{net::TcpListener, task::JoinHandle};

use igrite_back::{
    client::{
        CatalogClient, ClientError, FallbackCatalogClient, HttpCatalogClient, LocalCatalogClient,
    },
    config::AppConfig,
    dao::catalog_store::memory::MemoryCatalogStore,
    dto::game::{CreateGameRequest, UpdateGameRequest},
    routes,
    state::AppState,
};

async fn spawn_server() -> (SocketAddr, JoinHandle<()>) {
    let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryCatalogStore::new()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, routes::router(state)).await.unwrap();
    });
    (addr, handle)
}

fn scratch_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("igrite-back-client-{}", uuid::Uuid::new_v4()))
        .join("catalog.json")
}

fn game(id: &str, category: &str) -> CreateGameRequest {
    CreateGameRequest {
        id: Some(id.into()),
        title: format!("Game {id}"),
        url: format!("https://games.example.com/{id}"),
        category: category.into(),
        ..CreateGameRequest::default()
    }
}

#[tokio::test]
async fn http_client_drives_the_api() {
    let (addr, server) = spawn_server().await;
    let client = HttpCatalogClient::new(&format!("http://{addr}")).unwrap();

    let created = client.create_game(game("1", "Board Games")).await.unwrap();
    assert_eq!(created.id, "1");
    assert_eq!(client.get_game("1".into()).await.unwrap(), Some(created));
    assert_eq!(client.get_game("nope".into()).await.unwrap(), None);

    let by_category = client
        .games_by_category("board".into())
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);

    let updated = client
        .update_game(
            "1".into(),
            UpdateGameRequest {
                tags: Some("cards".into()),
                ..UpdateGameRequest::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.tags, "cards");
    assert_eq!(client.search_games("CARDS".into()).await.unwrap().len(), 1);

    client.create_category("Board Games".into()).await.unwrap();
    let err = client
        .delete_category("Board Games".into())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert!(err.to_string().contains("Cannot delete category with 1 games"));

    let renamed = client
        .rename_category("Board Games".into(), "Tabletop".into())
        .await
        .unwrap();
    assert_eq!(renamed.games_updated, 1);

    let summary = client
        .bulk_import(vec![game("1", "Tabletop"), game("2", "Puzzle")])
        .await
        .unwrap();
    assert_eq!(summary.inserted_ids, vec!["2".to_string()]);

    assert!(client.delete_game("2".into()).await.unwrap());
    assert!(!client.delete_game("2".into()).await.unwrap());
    assert_eq!(client.list_games().await.unwrap().len(), 1);

    server.abort();
}

#[tokio::test]
async fn fallback_uses_the_offline_catalog_when_the_server_is_down() {
    let path = scratch_file();
    // Nothing listens on port 1.
    let remote = HttpCatalogClient::new("http://127.0.0.1:1").unwrap();
    let local = LocalCatalogClient::open(&path).await.unwrap();
    let client = FallbackCatalogClient::new(remote, local);

    assert_eq!(client.list_categories().await.unwrap().len(), 9);
    client.create_game(game("1", "Arcade")).await.unwrap();
    assert_eq!(client.list_games().await.unwrap().len(), 1);
    assert!(path.exists());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[tokio::test]
async fn fallback_surfaces_server_answers() {
    let (addr, server) = spawn_server().await;
    let path = scratch_file();
    let remote = HttpCatalogClient::new(&format!("http://{addr}")).unwrap();
    let local = LocalCatalogClient::open(&path).await.unwrap();
    let client = FallbackCatalogClient::new(remote, local);

    client.create_game(game("1", "Arcade")).await.unwrap();
    let err = client.create_game(game("1", "Arcade")).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status, .. } if status == StatusCode::CONFLICT));

    // The offline catalog saw none of it.
    assert!(client.local().list_games().await.unwrap().is_empty());

    server.abort();
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
