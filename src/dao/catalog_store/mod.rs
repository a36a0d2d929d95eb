pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::{collections::HashSet, time::SystemTime};

use crate::dao::models::{CategoryEntity, GameEntity, GamePatch, RenameOutcome};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for the `games` and `categories` collections.
///
/// Implementations hold no cached copies: every call reads through to the backend.
pub trait CatalogStore: Send + Sync {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn find_game(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Games whose category contains `needle`, ignoring case.
    fn games_in_category_like(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Games whose title, description, category or tags contain `needle`, ignoring case.
    fn search_games(&self, needle: String) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Insert a game, failing with `Duplicate` when the id is taken.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert many games, skipping (not failing on) ids already taken. Returns the ids inserted.
    fn insert_games(&self, games: Vec<GameEntity>)
    -> BoxFuture<'static, StorageResult<Vec<String>>>;
    /// Apply a partial update. Returns `false` when no game carries `id`.
    fn update_game(
        &self,
        id: String,
        patch: GamePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Returns `false` when no game carried `id`.
    fn delete_game(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;
    fn game_ids(&self) -> BoxFuture<'static, StorageResult<HashSet<String>>>;
    /// Number of games whose category equals `name` exactly.
    fn count_games_in_category(&self, name: String) -> BoxFuture<'static, StorageResult<u64>>;

    fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>>;
    /// Insert a category, failing with `Duplicate` when the name is taken.
    fn insert_category(&self, category: CategoryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Rename a category and move every game referencing it to the new name.
    fn rename_category(
        &self,
        old_name: String,
        new_name: String,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<RenameOutcome>>;
    /// Returns `false` when no category carried `name`.
    fn delete_category(&self, name: String) -> BoxFuture<'static, StorageResult<bool>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
