use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};

use crate::{
    config::{AppConfig, StoreBackend},
    dao::catalog_store::memory::{CatalogSnapshot, MemoryCatalogStore},
    dto::{
        category::RenameCategoryResponse,
        game::{BulkImportSummary, CreateGameRequest, GameDto, UpdateGameRequest},
    },
    error::ServiceError,
    services::{category_service, game_service},
    state::{AppState, SharedState},
};

use super::{CatalogClient, ClientError, ClientResult};

/// Offline [`CatalogClient`]: the catalog lives in memory and is written back to a JSON file
/// after every change.
///
/// Requests run through the same services as the server, so validation, id generation, default
/// categories and the rename cascade behave identically.
pub struct LocalCatalogClient {
    state: SharedState,
    store: MemoryCatalogStore,
    path: PathBuf,
    write_gate: Mutex<()>,
}

impl LocalCatalogClient {
    /// Open the catalog stored at `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let snapshot = read_snapshot(&path).await?;
        debug!(
            path = %path.display(),
            games = snapshot.games.len(),
            categories = snapshot.categories.len(),
            "opened offline catalog"
        );

        let store = MemoryCatalogStore::from_snapshot(snapshot);
        let config = AppConfig {
            store: StoreBackend::Memory,
            ..AppConfig::default()
        };
        let state = AppState::with_store(config, Arc::new(store.clone()));

        Ok(Self {
            state,
            store,
            path,
            write_gate: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `write` and save the catalog when `changed` says it moved.
    ///
    /// Writes are serialized. When saving fails the in-memory catalog is put back to its state
    /// before `write`, so memory and disk never disagree.
    async fn commit<T, Fut>(
        &self,
        write: Fut,
        changed: impl FnOnce(&CatalogSnapshot, &T) -> bool,
    ) -> ClientResult<T>
    where
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let _gate = self.write_gate.lock().await;
        let before = self.store.snapshot().await;
        let value = write.await?;
        if !changed(&before, &value) {
            return Ok(value);
        }

        if let Err(err) = self.persist().await {
            warn!(
                path = %self.path.display(),
                error = %err,
                "offline catalog not saved; change reverted"
            );
            self.store.restore(before).await;
            return Err(err);
        }
        Ok(value)
    }

    /// Write the current catalog to disk through a temporary file so readers never see a
    /// partially written catalog. Callers hold the write gate.
    async fn persist(&self) -> ClientResult<()> {
        let snapshot = self.store.snapshot().await;
        let bytes = serde_json::to_vec_pretty(&snapshot).map_err(|source| {
            ClientError::SnapshotFormat {
                path: self.path.clone(),
                source,
            }
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| self.io_error(source))?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), "offline catalog saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> ClientError {
        ClientError::SnapshotIo {
            path: self.path.clone(),
            source,
        }
    }
}

async fn read_snapshot(path: &Path) -> ClientResult<CatalogSnapshot> {
    match fs::read(path).await {
        Ok(bytes) => {
            serde_json::from_slice(&bytes).map_err(|source| ClientError::SnapshotFormat {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no offline catalog yet; starting empty");
            Ok(CatalogSnapshot::default())
        }
        Err(source) => Err(ClientError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl CatalogClient for LocalCatalogClient {
    fn list_games(&self) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        Box::pin(async move { Ok(game_service::list_games(&self.state).await?) })
    }

    fn search_games(&self, query: String) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        Box::pin(async move { Ok(game_service::search_games(&self.state, &query).await?) })
    }

    fn games_by_category(&self, category: String) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        Box::pin(async move { Ok(game_service::games_by_category(&self.state, &category).await?) })
    }

    fn get_game(&self, id: String) -> BoxFuture<'_, ClientResult<Option<GameDto>>> {
        Box::pin(async move { Ok(game_service::get_game(&self.state, &id).await?) })
    }

    fn create_game(&self, request: CreateGameRequest) -> BoxFuture<'_, ClientResult<GameDto>> {
        Box::pin(self.commit(game_service::create_game(&self.state, request), |_, _| true))
    }

    fn update_game(
        &self,
        id: String,
        request: UpdateGameRequest,
    ) -> BoxFuture<'_, ClientResult<Option<GameDto>>> {
        Box::pin(async move {
            self.commit(
                game_service::update_game(&self.state, &id, request),
                |_, game: &Option<GameDto>| game.is_some(),
            )
            .await
        })
    }

    fn delete_game(&self, id: String) -> BoxFuture<'_, ClientResult<bool>> {
        Box::pin(async move {
            self.commit(
                game_service::delete_game(&self.state, &id),
                |_, removed: &bool| *removed,
            )
            .await
        })
    }

    fn bulk_import(
        &self,
        requests: Vec<CreateGameRequest>,
    ) -> BoxFuture<'_, ClientResult<BulkImportSummary>> {
        Box::pin(self.commit(
            game_service::bulk_import(&self.state, requests),
            |_, summary: &BulkImportSummary| summary.inserted_count > 0,
        ))
    }

    fn list_categories(&self) -> BoxFuture<'_, ClientResult<Vec<String>>> {
        // The first listing seeds the defaults, which is a write.
        Box::pin(self.commit(
            category_service::list_categories(&self.state),
            |before, _| before.categories.is_empty(),
        ))
    }

    fn create_category(&self, name: String) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            self.commit(
                category_service::create_category(&self.state, Some(name)),
                |_, _| true,
            )
            .await?;
            Ok(())
        })
    }

    fn rename_category(
        &self,
        old_name: String,
        new_name: String,
    ) -> BoxFuture<'_, ClientResult<RenameCategoryResponse>> {
        Box::pin(async move {
            let outcome = self
                .commit(
                    category_service::rename_category(&self.state, &old_name, Some(new_name)),
                    |_, _| true,
                )
                .await?;
            Ok(outcome.into())
        })
    }

    fn delete_category(&self, name: String) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            self.commit(
                category_service::delete_category(&self.state, &name),
                |_, removed: &bool| *removed,
            )
            .await?;
            Ok(())
        })
    }
}
