use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::dto::{
    category::{CreateCategoryRequest, RenameCategoryRequest, RenameCategoryResponse},
    common::ErrorBody,
    game::{BulkImportSummary, CreateGameRequest, GameDto, UpdateGameRequest},
};

use super::{CatalogClient, ClientError, ClientResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// [`CatalogClient`] talking to the REST API over HTTP.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    /// Client for the API served at `base_url`, e.g. `http://localhost:3001`.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let parsed = Url::parse(base_url).map_err(|err| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "url cannot carry a path".into(),
            });
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|source| ClientError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Endpoint URL built from percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.endpoint(segments))
    }

    /// Send `builder`, turning non-success answers into [`ClientError::Status`].
    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await.map_err(|source| ClientError::Transport {
            url: source
                .url()
                .map(ToString::to_string)
                .unwrap_or_else(|| self.base_url.to_string()),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_owned(),
        };
        Err(ClientError::Status {
            url,
            status,
            message,
        })
    }

    /// Like [`Self::send`] but maps a 404 to `None`.
    async fn send_optional(&self, builder: RequestBuilder) -> ClientResult<Option<Response>> {
        match self.send(builder).await {
            Ok(response) => Ok(Some(response)),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn decode<T>(response: Response) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }

    async fn fetch_games(&self, builder: RequestBuilder) -> ClientResult<Vec<GameDto>> {
        let response = self.send(builder).await?;
        Self::decode(response).await
    }
}

impl CatalogClient for HttpCatalogClient {
    fn list_games(&self) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        Box::pin(self.fetch_games(self.request(Method::GET, &["api", "games"])))
    }

    fn search_games(&self, query: String) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        let builder = self
            .request(Method::GET, &["api", "games"])
            .query(&[("search", query)]);
        Box::pin(self.fetch_games(builder))
    }

    fn games_by_category(&self, category: String) -> BoxFuture<'_, ClientResult<Vec<GameDto>>> {
        let builder = self
            .request(Method::GET, &["api", "games"])
            .query(&[("category", category)]);
        Box::pin(self.fetch_games(builder))
    }

    fn get_game(&self, id: String) -> BoxFuture<'_, ClientResult<Option<GameDto>>> {
        Box::pin(async move {
            let builder = self.request(Method::GET, &["api", "games", &id]);
            match self.send_optional(builder).await? {
                Some(response) => Self::decode(response).await.map(Some),
                None => Ok(None),
            }
        })
    }

    fn create_game(&self, request: CreateGameRequest) -> BoxFuture<'_, ClientResult<GameDto>> {
        Box::pin(async move {
            let builder = self
                .request(Method::POST, &["api", "games"])
                .json(&request);
            let response = self.send(builder).await?;
            Self::decode(response).await
        })
    }

    fn update_game(
        &self,
        id: String,
        request: UpdateGameRequest,
    ) -> BoxFuture<'_, ClientResult<Option<GameDto>>> {
        Box::pin(async move {
            let builder = self
                .request(Method::PUT, &["api", "games", &id])
                .json(&request);
            match self.send_optional(builder).await? {
                Some(response) => Self::decode(response).await.map(Some),
                None => Ok(None),
            }
        })
    }

    fn delete_game(&self, id: String) -> BoxFuture<'_, ClientResult<bool>> {
        Box::pin(async move {
            let builder = self.request(Method::DELETE, &["api", "games", &id]);
            Ok(self.send_optional(builder).await?.is_some())
        })
    }

    fn bulk_import(
        &self,
        requests: Vec<CreateGameRequest>,
    ) -> BoxFuture<'_, ClientResult<BulkImportSummary>> {
        Box::pin(async move {
            let builder = self
                .request(Method::POST, &["api", "games", "bulk-import"])
                .json(&requests);
            let response = self.send(builder).await?;
            Self::decode(response).await
        })
    }

    fn list_categories(&self) -> BoxFuture<'_, ClientResult<Vec<String>>> {
        Box::pin(async move {
            let response = self
                .send(self.request(Method::GET, &["api", "categories"]))
                .await?;
            Self::decode(response).await
        })
    }

    fn create_category(&self, name: String) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            let builder = self
                .request(Method::POST, &["api", "categories"])
                .json(&CreateCategoryRequest { name: Some(name) });
            self.send(builder).await.map(drop)
        })
    }

    fn rename_category(
        &self,
        old_name: String,
        new_name: String,
    ) -> BoxFuture<'_, ClientResult<RenameCategoryResponse>> {
        Box::pin(async move {
            let builder = self
                .request(Method::PUT, &["api", "categories", &old_name])
                .json(&RenameCategoryRequest {
                    new_name: Some(new_name),
                });
            let response = self.send(builder).await?;
            Self::decode(response).await
        })
    }

    fn delete_category(&self, name: String) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            let builder = self.request(Method::DELETE, &["api", "categories", &name]);
            self.send(builder).await.map(drop)
        })
    }
}
