use futures::future::BoxFuture;
use tracing::warn;

use crate::dto::{
    category::RenameCategoryResponse,
    game::{BulkImportSummary, CreateGameRequest, GameDto, UpdateGameRequest},
};

use super::{CatalogClient, ClientResult, HttpCatalogClient, LocalCatalogClient};

/// [`CatalogClient`] preferring `remote` and switching to `local` for any call the remote could
/// not deliver.
///
/// Only transport failures trigger the switch; an answer from the server, error statuses
/// included, is returned as is. Writes made locally are never replayed against the server.
pub struct FallbackCatalogClient<R = HttpCatalogClient, L = LocalCatalogClient> {
    remote: R,
    local: L,
}

impl<R, L> FallbackCatalogClient<R, L>
where
    R: CatalogClient,
    L: CatalogClient,
{
    pub fn new(remote: R, local: L) -> Self {
        Self { remote, local }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    async fn with_fallback<'a, T, F>(
        &'a self,
        operation: &'static str,
        remote: BoxFuture<'a, ClientResult<T>>,
        local: F,
    ) -> ClientResult<T>
    where
        F: FnOnce(&'a L) -> BoxFuture<'a, ClientResult<T>>,
    {
        match remote.await {
            Err(err) if err.is_transport() => {
                warn!(operation, error = %err, "catalog API unreachable; using offline catalog");
                local(&self.local).await
            }
            other => other,
        }
    }
}

impl<R, L> CatalogClient for FallbackCatalogClient<R, L>
where
    R: CatalogClient,
    L: CatalogClient,
{
    fn list_games(&self) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        Box::pin(self.with_fallback("list_games", self.remote.list_games(), |local| {
            local.list_games()
        }))
    }

    fn search_games(&self, query: String) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        let remote = self.remote.search_games(query.clone());
        Box::pin(self.with_fallback("search_games", remote, move |local| {
            local.search_games(query)
        }))
    }

    fn games_by_category(&self, category: String) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        let remote = self.remote.games_by_category(category.clone());
        Box::pin(self.with_fallback("games_by_category", remote, move |local| {
            local.games_by_category(category)
        }))
    }

    fn get_game(&self, id: String) -> BoxFuture<'_, ClientResult<Option<GameDto>>> {
        let remote = self.remote.get_game(id.clone());
        Box::pin(self.with_fallback("get_game", remote, move |local| local.get_game(id)))
    }

    fn create_game(&self, request: CreateGameRequest) -> BoxFuture<'_, ClientResult<GameDto>> {
        let remote = self.remote.create_game(request.clone());
        Box::pin(self.with_fallback("create_game", remote, move |local| {
            local.create_game(request)
        }))
    }

    fn update_game(
        &self,
        id: String,
        request: UpdateGameRequest,
    ) -> BoxFuture<'_, ClientResult<Option<GameDto>>> {
        let remote = self.remote.update_game(id.clone(), request.clone());
        Box::pin(self.with_fallback("update_game", remote, move |local| {
            local.update_game(id, request)
        }))
    }

    fn delete_game(&self, id: String) -> BoxFuture<'_, ClientResult<bool>> {
        let remote = self.remote.delete_game(id.clone());
        Box::pin(self.with_fallback("delete_game", remote, move |local| {
            local.delete_game(id)
        }))
    }

    fn bulk_import(
        &self,
        requests: Vec<CreateGameRequest>,
    ) -> BoxFuture<'_, ClientResult<BulkImportSummary>> {
        let remote = self.remote.bulk_import(requests.clone());
        Box::pin(self.with_fallback("bulk_import", remote, move |local| {
            local.bulk_import(requests)
        }))
    }

    fn list_categories(&self) -> BoxFuture<'_, ClientResult<Vec<String>>> {
        Box::pin(self.with_fallback(
            "list_categories",
            self.remote.list_categories(),
            |local| local.list_categories(),
        ))
    }

    fn create_category(&self, name: String) -> BoxFuture<'_, ClientResult<()>> {
        let remote = self.remote.create_category(name.clone());
        Box::pin(self.with_fallback("create_category", remote, move |local| {
            local.create_category(name)
        }))
    }

    fn rename_category(
        &self,
        old_name: String,
        new_name: String,
    ) -> BoxFuture<'_, ClientResult<RenameCategoryResponse>> {
        let remote = self
            .remote
            .rename_category(old_name.clone(), new_name.clone());
        Box::pin(self.with_fallback("rename_category", remote, move |local| {
            local.rename_category(old_name, new_name)
        }))
    }

    fn delete_category(&self, name: String) -> BoxFuture<'_, ClientResult<()>> {
        let remote = self.remote.delete_category(name.clone());
        Box::pin(self.with_fallback("delete_category", remote, move |local| {
            local.delete_category(name)
        }))
    }
}
