use std::{collections::HashSet, sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, ClientSession, Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult, is_duplicate_key, rejected_insert_indexes},
    models::{MongoCategoryDocument, MongoGameDocument, contains_filter, patch_set_document},
};
use crate::dao::{
    catalog_store::CatalogStore,
    models::{CategoryEntity, GameEntity, GamePatch, RenameOutcome},
    storage::{StorageError, StorageResult},
};

const GAME_COLLECTION_NAME: &str = "games";
const CATEGORY_COLLECTION_NAME: &str = "categories";

#[derive(Clone)]
pub struct MongoCatalogStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoCatalogStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        let games = database.collection::<Document>(GAME_COLLECTION_NAME);

        let game_indexes = [
            (
                "id",
                IndexModel::builder()
                    .keys(doc! {"id": 1})
                    .options(
                        IndexOptions::builder()
                            .name(Some("game_id_idx".to_owned()))
                            .unique(Some(true))
                            .build(),
                    )
                    .build(),
            ),
            (
                "title,description,tags",
                IndexModel::builder()
                    .keys(doc! {"title": "text", "description": "text", "tags": "text"})
                    .options(
                        IndexOptions::builder()
                            .name(Some("game_text_idx".to_owned()))
                            .build(),
                    )
                    .build(),
            ),
            (
                "category",
                IndexModel::builder()
                    .keys(doc! {"category": 1})
                    .options(
                        IndexOptions::builder()
                            .name(Some("game_category_idx".to_owned()))
                            .build(),
                    )
                    .build(),
            ),
        ];

        for (index, model) in game_indexes {
            games
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: GAME_COLLECTION_NAME,
                    index,
                    source,
                })?;
        }

        let category_index = IndexModel::builder()
            .keys(doc! {"name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("category_name_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        database
            .collection::<Document>(CATEGORY_COLLECTION_NAME)
            .create_index(category_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: CATEGORY_COLLECTION_NAME,
                index: "name",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn client(&self) -> Client {
        let guard = self.inner.state.read().await;
        guard.client.clone()
    }

    async fn collection(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn category_collection(&self) -> Collection<MongoCategoryDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoCategoryDocument>(CATEGORY_COLLECTION_NAME)
    }

    async fn find_games(&self, filter: Document) -> MongoResult<Vec<GameEntity>> {
        let collection = self.collection().await;

        let documents: Vec<MongoGameDocument> = collection
            .find(filter)
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_game(&self, id: String) -> MongoResult<Option<GameEntity>> {
        let collection = self.collection().await;

        let document = collection
            .find_one(doc! {"id": id.as_str()})
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn search_games(&self, needle: &str) -> MongoResult<Vec<GameEntity>> {
        let fields = ["title", "description", "category", "tags"];
        let clauses: Vec<Document> = fields
            .into_iter()
            .map(|field| contains_filter(field, needle))
            .collect();
        self.find_games(doc! {"$or": clauses}).await
    }

    async fn insert_game(&self, game: GameEntity) -> StorageResult<()> {
        let id = game.id.clone();
        let document: MongoGameDocument = game.into();
        let collection = self.collection().await;

        match collection.insert_one(&document).await {
            Ok(_) => Ok(()),
            Err(source) if is_duplicate_key(&source) => Err(StorageError::duplicate(id)),
            Err(source) => Err(MongoDaoError::SaveGame { id, source }.into()),
        }
    }

    async fn insert_games(&self, games: Vec<GameEntity>) -> MongoResult<Vec<String>> {
        if games.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<MongoGameDocument> = games.into_iter().map(Into::into).collect();
        let ids: Vec<String> = documents.iter().map(|d| d.id().to_owned()).collect();
        let collection = self.collection().await;

        // Unordered so one taken id does not stop the rest of the batch.
        match collection.insert_many(&documents).ordered(false).await {
            Ok(_) => Ok(ids),
            Err(source) if is_duplicate_key(&source) => {
                let rejected: HashSet<usize> = rejected_insert_indexes(&source).into_iter().collect();
                debug!(
                    rejected = rejected.len(),
                    "bulk insert skipped ids already present"
                );
                Ok(ids
                    .into_iter()
                    .enumerate()
                    .filter(|(index, _)| !rejected.contains(index))
                    .map(|(_, id)| id)
                    .collect())
            }
            Err(source) => Err(MongoDaoError::InsertGames {
                count: documents.len(),
                source,
            }),
        }
    }

    async fn update_game(
        &self,
        id: String,
        patch: GamePatch,
        updated_at: SystemTime,
    ) -> MongoResult<bool> {
        let set = patch_set_document(patch, DateTime::from_system_time(updated_at));
        let collection = self.collection().await;

        let result = collection
            .update_one(doc! {"id": id.as_str()}, doc! {"$set": set})
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;
        Ok(result.matched_count > 0)
    }

    async fn delete_game(&self, id: String) -> MongoResult<bool> {
        let collection = self.collection().await;
        let result = collection
            .delete_one(doc! {"id": id.as_str()})
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn game_ids(&self) -> MongoResult<HashSet<String>> {
        let collection = self.collection().await;
        let values = collection
            .distinct("id", doc! {})
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;

        Ok(values
            .into_iter()
            .filter_map(|value| value.as_str().map(str::to_owned))
            .collect())
    }

    async fn count_games_in_category(&self, name: String) -> MongoResult<u64> {
        let collection = self.collection().await;
        collection
            .count_documents(doc! {"category": name})
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })
    }

    async fn list_categories(&self) -> MongoResult<Vec<CategoryEntity>> {
        let collection = self.category_collection().await;

        let documents: Vec<MongoCategoryDocument> = collection
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListCategories { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListCategories { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn insert_category(&self, category: CategoryEntity) -> StorageResult<()> {
        let name = category.name.clone();
        let document: MongoCategoryDocument = category.into();
        let collection = self.category_collection().await;

        match collection.insert_one(&document).await {
            Ok(_) => Ok(()),
            Err(source) if is_duplicate_key(&source) => Err(StorageError::duplicate(name)),
            Err(source) => Err(MongoDaoError::SaveCategory { name, source }.into()),
        }
    }

    async fn rename_category(
        &self,
        old_name: String,
        new_name: String,
        updated_at: SystemTime,
    ) -> StorageResult<RenameOutcome> {
        let stamp = DateTime::from_system_time(updated_at);
        let rename_error = |source| MongoDaoError::RenameCategory {
            old_name: old_name.clone(),
            new_name: new_name.clone(),
            source,
        };

        let result = if self.inner.config.transactional_rename {
            let mut session = self
                .client()
                .await
                .start_session()
                .await
                .map_err(rename_error)?;
            session.start_transaction().await.map_err(rename_error)?;

            match self
                .apply_rename(&old_name, &new_name, stamp, Some(&mut session))
                .await
            {
                Ok(outcome) => session
                    .commit_transaction()
                    .await
                    .map(|_| outcome)
                    .map_err(|source| (source, false)),
                Err(failure) => {
                    if let Err(abort_err) = session.abort_transaction().await {
                        debug!(error = %abort_err, "failed to abort category rename transaction");
                    }
                    Err(failure)
                }
            }
        } else {
            // Two independent writes: a failure between them leaves games on the old name
            // until the rename is re-run.
            self.apply_rename(&old_name, &new_name, stamp, None).await
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err((_, true)) => Err(StorageError::duplicate(new_name.clone())),
            Err((source, false)) => Err(rename_error(source).into()),
        }
    }

    /// Run the category rename then the game cascade, optionally inside `session`.
    ///
    /// Errors carry a flag telling whether the failure was a duplicate-key conflict.
    async fn apply_rename(
        &self,
        old_name: &str,
        new_name: &str,
        stamp: DateTime,
        mut session: Option<&mut ClientSession>,
    ) -> Result<RenameOutcome, (mongodb::error::Error, bool)> {
        let categories = self.category_collection().await;
        let games = self.collection().await;

        let category_filter = doc! {"name": old_name};
        let category_update = doc! {"$set": {"name": new_name, "updatedAt": stamp}};
        let renamed = match session.as_deref_mut() {
            Some(session) => {
                categories
                    .update_one(category_filter, category_update)
                    .session(session)
                    .await
            }
            None => categories.update_one(category_filter, category_update).await,
        }
        .map_err(|err| {
            let duplicate = is_duplicate_key(&err);
            (err, duplicate)
        })?;

        let game_filter = doc! {"category": old_name};
        let game_update = doc! {"$set": {"category": new_name, "updatedAt": stamp}};
        let cascaded = match session {
            Some(session) => {
                games
                    .update_many(game_filter, game_update)
                    .session(session)
                    .await
            }
            None => games.update_many(game_filter, game_update).await,
        }
        .map_err(|err| (err, false))?;

        Ok(RenameOutcome {
            renamed: renamed.matched_count > 0,
            games_updated: cascaded.modified_count,
        })
    }

    async fn delete_category(&self, name: String) -> MongoResult<bool> {
        let collection = self.category_collection().await;
        let result = collection
            .delete_one(doc! {"name": name.as_str()})
            .await
            .map_err(|source| MongoDaoError::DeleteCategory { name, source })?;
        Ok(result.deleted_count > 0)
    }
}

impl CatalogStore for MongoCatalogStore {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_games(doc! {}).await.map_err(Into::into) })
    }

    fn find_game(&self, id: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn games_in_category_like(
        &self,
        needle: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_games(contains_filter("category", &needle))
                .await
                .map_err(Into::into)
        })
    }

    fn search_games(&self, needle: String) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.search_games(&needle).await.map_err(Into::into) })
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
        Box::pin(async move { store.insert_games(games).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        id: String,
        patch: GamePatch,
        updated_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(id, patch, updated_at)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_game(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn game_ids(&self) -> BoxFuture<'static, StorageResult<HashSet<String>>> {
        let store = self.clone();
        Box::pin(async move { store.game_ids().await.map_err(Into::into) })
    }

    fn count_games_in_category(&self, name: String) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_games_in_category(name).await.map_err(Into::into) })
    }

    fn list_categories(&self) -> BoxFuture<'static, StorageResult<Vec<CategoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_categories().await.map_err(Into::into) })
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
        Box::pin(async move { store.rename_category(old_name, new_name, updated_at).await })
    }

    fn delete_category(&self, name: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_category(name).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
