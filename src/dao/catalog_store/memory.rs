//! Process-local [`CatalogStore`] used for development runs, the offline client and tests.

use std::{collections::HashSet, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::dao::{
    catalog_store::CatalogStore,
    models::{CategoryEntity, GameEntity, GamePatch, RenameOutcome},
    storage::{StorageError, StorageResult},
};

/// Full contents of a catalog, used to persist and restore the in-memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub games: Vec<GameEntity>,
    pub categories: Vec<CategoryEntity>,
}

/// In-memory store keeping insertion order, with the same uniqueness rules as the database
/// indexes (`games.id`, `categories.name`).
#[derive(Clone, Default)]
pub struct MemoryCatalogStore {
    inner: Arc<RwLock<CatalogSnapshot>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a previously captured snapshot.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Copy the current contents.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.inner.read().await.clone()
    }

    /// Replace the current contents with `snapshot`.
    pub async fn restore(&self, snapshot: CatalogSnapshot) {
        *self.inner.write().await = snapshot;
    }

    async fn filter_games<F>(&self, predicate: F) -> Vec<GameEntity>
    where
        F: Fn(&GameEntity) -> bool,
    {
        let guard = self.inner.read().await;
        guard
            .games
            .iter()
            .filter(|game| predicate(game))
            .cloned()
            .collect()
    }

    async fn insert_game(&self, game: GameEntity) -> StorageResult<()> {
        let mut guard = self.inner.write().await;
        if guard.games.iter().any(|existing| existing.id == game.id) {
            return Err(StorageError::duplicate(game.id));
        }
        guard.games.push(game);
        Ok(())
    }

    async fn insert_games(&self, games: Vec<GameEntity>) -> Vec<String> {
        let mut guard = self.inner.write().await;
        let mut taken: HashSet<String> = guard.games.iter().map(|g| g.id.clone()).collect();
        let mut inserted = Vec::new();
        for game in games {
            if taken.insert(game.id.clone()) {
                inserted.push(game.id.clone());
                guard.games.push(game);
            }
        }
        inserted
    }

    async fn update_game(&self, id: &str, patch: GamePatch, updated_at: SystemTime) -> bool {
        let mut guard = self.inner.write().await;
        match guard.games.iter_mut().find(|game| game.id == id) {
            Some(game) => {
                game.apply_patch(patch, updated_at);
                true
            }
            None => false,
        }
    }

    async fn delete_game(&self, id: &str) -> bool {
        let mut guard = self.inner.write().await;
        let before = guard.games.len();
        guard.games.retain(|game| game.id != id);
        guard.games.len() != before
    }

    async fn insert_category(&self, category: CategoryEntity) -> StorageResult<()> {
        let mut guard = self.inner.write().await;
        if guard.categories.iter().any(|c| c.name == category.name) {
            return Err(StorageError::duplicate(category.name));
        }
        guard.categories.push(category);
        Ok(())
    }

    async fn rename_category(
        &self,
        old_name: &str,
        new_name: &str,
        updated_at: SystemTime,
    ) -> StorageResult<RenameOutcome> {
        // Both writes happen under one guard, so the cascade is atomic here.
        let mut guard = self.inner.write().await;
        // Same outcome as the unique index on `name`: only a live old name can collide.
        let old_exists = guard.categories.iter().any(|c| c.name == old_name);
        if old_exists && guard.categories.iter().any(|c| c.name == new_name) {
            return Err(StorageError::duplicate(new_name));
        }

        let mut outcome = RenameOutcome::default();
        if let Some(category) = guard.categories.iter_mut().find(|c| c.name == old_name) {
            category.name = new_name.to_owned();
            category.updated_at = updated_at;
            outcome.renamed = true;
        }

        for game in guard.games.iter_mut().filter(|g| g.category == old_name) {
            game.category = new_name.to_owned();
            game.updated_at = updated_at;
            outcome.games_updated += 1;
        }

        Ok(outcome)
    }

    async fn delete_category(&self, name: &str) -> bool {
        let mut guard = self.inner.write().await;
        let before = guard.categories.len();
        guard.categories.retain(|c| c.name != name);
        guard.categories.len() != before
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.games.clone()) })
    }

    fn find_game(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard.games.iter().find(|game| game.id == id).cloned())
        })
    }

    fn games_in_category_like(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let needle = needle.to_lowercase();
            Ok(store
                .filter_games(|game| game.category_contains(&needle))
                .await)
        })
    }

    fn search_games(&self, needle: String) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let needle = needle.to_lowercase();
            Ok(store.filter_games(|game| game.text_contains(&needle)).await)
        })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await })
    }

    fn insert_games(
        &self,
        games: Vec<GameEntity>,
    ) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.insert_games(games).await) })
    }

    fn update_game(
        &self,
        id: String,
        patch: GamePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.update_game(&id, patch, updated_at).await) })
    }

    fn delete_game(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete_game(&id).await) })
    }

    fn game_ids(&self) -> BoxFuture<'static, StorageResult<HashSet<String>>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard.games.iter().map(|game| game.id.clone()).collect())
        })
    }

    fn count_games_in_category(&self, name: String) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let guard = store.inner.read().await;
            Ok(guard.games.iter().filter(|g| g.category == name).count() as u64)
        })
    }

    fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.read().await.categories.clone()) })
    }

    fn insert_category(&self, category: CategoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_category(category).await })
    }

    fn rename_category(
        &self,
        old_name: String,
        new_name: String,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<RenameOutcome>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .rename_category(&old_name, &new_name, updated_at)
                .await
        })
    }

    fn delete_category(&self, name: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete_category(&name).await) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: &str, category: &str) -> GameEntity {
        GameEntity {
            id: id.into(),
            title: format!("Game {id}"),
            description: String::new(),
            instructions: None,
            url: format!("https://games.example.com/{id}"),
            category: category.into(),
            tags: String::new(),
            thumb: String::new(),
            width: "800".into(),
            height: "600".into(),
            created_at: SystemTime::UNIX_EPOCH,
            updated_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn insert_rejects_taken_id() {
        let store = MemoryCatalogStore::new();
        CatalogStore::insert_game(&store, game("1", "Action"))
            .await
            .unwrap();
        let err = CatalogStore::insert_game(&store, game("1", "Puzzle"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn insert_many_skips_taken_ids_and_batch_repeats() {
        let store = MemoryCatalogStore::new();
        CatalogStore::insert_game(&store, game("1", "Action"))
            .await
            .unwrap();

        let inserted = CatalogStore::insert_games(
            &store,
            vec![game("1", "Action"), game("2", "Puzzle"), game("2", "Racing")],
        )
        .await
        .unwrap();

        assert_eq!(inserted, vec!["2".to_string()]);
        let games = CatalogStore::list_games(&store).await.unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].category, "Puzzle");
    }

    #[tokio::test]
    async fn rename_refuses_existing_target() {
        let now = SystemTime::now();
        let store = MemoryCatalogStore::new();
        CatalogStore::insert_category(&store, CategoryEntity::new("Action", now))
            .await
            .unwrap();
        CatalogStore::insert_category(&store, CategoryEntity::new("Puzzle", now))
            .await
            .unwrap();

        let err = CatalogStore::rename_category(&store, "Action".into(), "Puzzle".into(), now)
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn rename_finishes_a_half_applied_cascade() {
        let now = SystemTime::now();
        let store = MemoryCatalogStore::new();
        // Category already renamed, games still on the old name.
        CatalogStore::insert_category(&store, CategoryEntity::new("Retro", now))
            .await
            .unwrap();
        CatalogStore::insert_game(&store, game("1", "Action"))
            .await
            .unwrap();

        let outcome = CatalogStore::rename_category(&store, "Action".into(), "Retro".into(), now)
            .await
            .unwrap();
        assert!(!outcome.renamed);
        assert_eq!(outcome.games_updated, 1);
        assert_eq!(
            CatalogStore::count_games_in_category(&store, "Retro".into())
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn snapshot_round_trips_contents() {
        let store = MemoryCatalogStore::new();
        CatalogStore::insert_game(&store, game("7", "Arcade"))
            .await
            .unwrap();

        let restored = MemoryCatalogStore::from_snapshot(store.snapshot().await);
        let found = CatalogStore::find_game(&restored, "7".into()).await.unwrap();
        assert_eq!(found.map(|g| g.category), Some("Arcade".to_string()));
    }
}
