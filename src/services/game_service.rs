use std::time::SystemTime;

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, GamePatch},
    dto::game::{BulkImportSummary, CreateGameRequest, GameDto, UpdateGameRequest},
    error::ServiceError,
    state::SharedState,
};

/// Every game, in store order.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameDto>, ServiceError> {
    let store = state.require_catalog_store().await?;
    let games = store.list_games().await?;
    Ok(into_dtos(games))
}

/// Games whose category contains `category`, ignoring case. `"Act"` matches `"Action"`.
pub async fn games_by_category(
    state: &SharedState,
    category: &str,
) -> Result<Vec<GameDto>, ServiceError> {
    let store = state.require_catalog_store().await?;
    let games = store.games_in_category_like(category.to_owned()).await?;
    Ok(into_dtos(games))
}

/// Games whose title, description, category or tags contain `query`, ignoring case.
pub async fn search_games(state: &SharedState, query: &str) -> Result<Vec<GameDto>, ServiceError> {
    let store = state.require_catalog_store().await?;
    let games = store.search_games(query.to_owned()).await?;
    Ok(into_dtos(games))
}

/// Look a game up by id. Absence is `Ok(None)`, not an error.
pub async fn get_game(state: &SharedState, id: &str) -> Result<Option<GameDto>, ServiceError> {
    let store = state.require_catalog_store().await?;
    let game = store.find_game(id.to_owned()).await?;
    Ok(game.map(Into::into))
}

/// Validate and store a new game. A missing id is replaced by a fresh UUID; a taken id is a
/// [`ServiceError::Conflict`].
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameDto, ServiceError> {
    request.validate()?;
    let store = state.require_catalog_store().await?;

    let id = resolve_id(&request);
    let game = request.into_entity(id, SystemTime::now());
    store.insert_game(game.clone()).await?;

    info!(id = %game.id, category = %game.category, "game created");
    Ok(game.into())
}

/// Overwrite the supplied fields of game `id` and return the stored result.
///
/// Returns `Ok(None)` when no game carries `id`. An empty patch performs no write.
pub async fn update_game(
    state: &SharedState,
    id: &str,
    request: UpdateGameRequest,
) -> Result<Option<GameDto>, ServiceError> {
    request.validate()?;
    let store = state.require_catalog_store().await?;

    let patch: GamePatch = request.into();
    if !patch.is_empty() {
        let updated = store
            .update_game(id.to_owned(), patch, SystemTime::now())
            .await?;
        if !updated {
            return Ok(None);
        }
    }

    let game = store.find_game(id.to_owned()).await?;
    Ok(game.map(Into::into))
}

/// Remove game `id`. Returns whether a game was removed; removing an absent id is a no-op.
pub async fn delete_game(state: &SharedState, id: &str) -> Result<bool, ServiceError> {
    let store = state.require_catalog_store().await?;
    let removed = store.delete_game(id.to_owned()).await?;
    if removed {
        info!(id, "game deleted");
    }
    Ok(removed)
}

/// Insert the games whose id is not stored yet.
///
/// Entries repeating an id already seen earlier in the batch and entries failing validation are
/// skipped as well. Re-running the same import inserts nothing. Nothing is rolled back when the
/// store fails part way through.
pub async fn bulk_import(
    state: &SharedState,
    requests: Vec<CreateGameRequest>,
) -> Result<BulkImportSummary, ServiceError> {
    let store = state.require_catalog_store().await?;
    let total = requests.len();

    let mut taken = store.game_ids().await?;
    let now = SystemTime::now();
    let batch: Vec<GameEntity> = requests
        .into_iter()
        .filter_map(|request| {
            if let Err(err) = request.validate() {
                debug!(error = %err, "skipping invalid game in bulk import");
                return None;
            }
            let id = resolve_id(&request);
            if !taken.insert(id.clone()) {
                debug!(id, "skipping game already present");
                return None;
            }
            Some(request.into_entity(id, now))
        })
        .collect();

    let inserted_ids = if batch.is_empty() {
        Vec::new()
    } else {
        store.insert_games(batch).await?
    };

    let summary = BulkImportSummary {
        inserted_count: inserted_ids.len(),
        skipped_count: total - inserted_ids.len(),
        inserted_ids,
    };
    info!(
        inserted = summary.inserted_count,
        skipped = summary.skipped_count,
        "bulk import finished"
    );
    Ok(summary)
}

fn resolve_id(request: &CreateGameRequest) -> String {
    request
        .supplied_id()
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn into_dtos(games: Vec<GameEntity>) -> Vec<GameDto> {
    games.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::catalog_store::memory::MemoryCatalogStore, state::AppState,
    };

    fn state() -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(MemoryCatalogStore::new()))
    }

    fn request(id: &str, title: &str, category: &str) -> CreateGameRequest {
        CreateGameRequest {
            id: Some(id.into()),
            title: title.into(),
            description: format!("{title} in the browser"),
            url: format!("https://games.example.com/{id}"),
            category: category.into(),
            tags: "html5,retro".into(),
            width: "800".into(),
            height: "600".into(),
            ..CreateGameRequest::default()
        }
    }

    #[tokio::test]
    async fn created_game_reads_back_unchanged() {
        let state = state();
        let created = create_game(&state, request("1", "Snake", "Arcade"))
            .await
            .unwrap();

        let fetched = get_game(&state, "1").await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Snake");
        assert_eq!(fetched.width, "800");
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn create_generates_an_id_when_missing() {
        let state = state();
        let mut input = request("", "Tetris", "Puzzle");
        input.id = None;

        let created = create_game(&state, input).await.unwrap();
        assert!(Uuid::parse_str(&created.id).is_ok());
    }

    #[tokio::test]
    async fn padded_ids_are_stored_as_given() {
        let state = state();
        let created = create_game(&state, request(" 7 ", "Pong", "Arcade"))
            .await
            .unwrap();
        assert_eq!(created.id, " 7 ");
        assert_eq!(get_game(&state, " 7 ").await.unwrap(), Some(created));
        assert_eq!(get_game(&state, "7").await.unwrap(), None);

        let summary = bulk_import(&state, vec![request(" 8", "Breakout", "Arcade")])
            .await
            .unwrap();
        assert_eq!(summary.inserted_ids, vec![" 8".to_string()]);
        assert!(get_game(&state, " 8").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_rejects_taken_id_and_invalid_payload() {
        let state = state();
        create_game(&state, request("1", "Snake", "Arcade"))
            .await
            .unwrap();

        let duplicate = create_game(&state, request("1", "Other", "Arcade")).await;
        assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

        let invalid = create_game(&state, request("2", "  ", "Arcade")).await;
        assert!(matches!(invalid, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let state = state();
        let before = create_game(&state, request("1", "Snake", "Arcade"))
            .await
            .unwrap();

        let patch = UpdateGameRequest {
            title: Some("Snake II".into()),
            ..UpdateGameRequest::default()
        };
        let after = update_game(&state, "1", patch).await.unwrap().unwrap();

        assert_eq!(after.title, "Snake II");
        assert_eq!(
            GameDto {
                title: before.title.clone(),
                updated_at: before.updated_at.clone(),
                ..after.clone()
            },
            before
        );
    }

    #[tokio::test]
    async fn update_of_absent_game_is_none() {
        let state = state();
        let patch = UpdateGameRequest {
            title: Some("Ghost".into()),
            ..UpdateGameRequest::default()
        };
        assert!(update_game(&state, "missing", patch).await.unwrap().is_none());
        assert!(
            update_game(&state, "missing", UpdateGameRequest::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_twice_is_a_no_op() {
        let state = state();
        create_game(&state, request("1", "Snake", "Arcade"))
            .await
            .unwrap();

        assert!(delete_game(&state, "1").await.unwrap());
        assert!(get_game(&state, "1").await.unwrap().is_none());
        assert!(!delete_game(&state, "1").await.unwrap());
    }

    #[tokio::test]
    async fn bulk_import_skips_known_ids_and_is_idempotent() {
        let state = state();
        create_game(&state, request("1", "Snake", "Arcade"))
            .await
            .unwrap();

        let batch = vec![
            request("1", "Snake again", "Arcade"),
            request("2", "Tetris", "Puzzle"),
        ];
        let first = bulk_import(&state, batch.clone()).await.unwrap();
        assert_eq!(first.inserted_ids, vec!["2".to_string()]);
        assert_eq!(first.skipped_count, 1);

        let after_first = list_games(&state).await.unwrap();
        let second = bulk_import(&state, batch).await.unwrap();
        assert_eq!(second.inserted_count, 0);
        assert_eq!(second.skipped_count, 2);
        assert_eq!(list_games(&state).await.unwrap(), after_first);
        assert_eq!(get_game(&state, "1").await.unwrap().unwrap().title, "Snake");
    }

    #[tokio::test]
    async fn bulk_import_skips_in_batch_repeats_and_invalid_entries() {
        let state = state();
        let summary = bulk_import(
            &state,
            vec![
                request("1", "Snake", "Arcade"),
                request("1", "Snake copy", "Arcade"),
                request("3", "", "Arcade"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(summary.inserted_count, 1);
        assert_eq!(summary.skipped_count, 2);
        assert_eq!(list_games(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_returns_each_game_once() {
        let state = state();
        create_game(&state, request("1", "Space Race", "Racing"))
            .await
            .unwrap();
        create_game(&state, request("2", "Chess", "Strategy"))
            .await
            .unwrap();

        let lower = search_games(&state, "rac").await.unwrap();
        let upper = search_games(&state, "RAC").await.unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].id, "1");

        // Matches description and tags of both games.
        assert_eq!(search_games(&state, "RETRO").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn category_filter_matches_substrings() {
        let state = state();
        create_game(&state, request("1", "Brawler", "Action"))
            .await
            .unwrap();
        create_game(&state, request("2", "Tetris", "Puzzle"))
            .await
            .unwrap();

        let games = games_by_category(&state, "act").await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].category, "Action");
        assert!(games_by_category(&state, "a.t").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn degraded_state_fails_with_degraded() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            list_games(&state).await,
            Err(ServiceError::Degraded)
        ));
    }
}
