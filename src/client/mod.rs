//! Client-side adapters for the catalog API: a network client, an offline store persisted to a
//! local file, and a client that falls back from the first to the second when the server is
//! unreachable.

mod fallback;
mod http;
mod local;

use std::path::PathBuf;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use thiserror::Error;

use crate::{
    dto::{
        category::RenameCategoryResponse,
        game::{BulkImportSummary, CreateGameRequest, GameDto, UpdateGameRequest},
    },
    error::ServiceError,
};

pub use fallback::FallbackCatalogClient;
pub use http::HttpCatalogClient;
pub use local::LocalCatalogClient;

/// Convenient result alias returning [`ClientError`] failures.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures surfaced by catalog clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL cannot address the API.
    #[error("invalid catalog API base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// Building the HTTP client failed.
    #[error("failed to build HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an answer: refused connection, DNS failure, timeout.
    #[error("failed to reach catalog API at `{url}`")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("catalog API answered {status} for `{url}`: {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },
    /// The response body did not match the expected payload.
    #[error("failed to decode catalog API response for `{url}`")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The offline catalog rejected the operation.
    #[error(transparent)]
    Local(#[from] ServiceError),
    /// Reading or writing the offline catalog file failed.
    #[error("failed to access offline catalog file `{}`", path.display())]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The offline catalog file holds something other than a catalog.
    #[error("offline catalog file `{}` is corrupt", path.display())]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Whether the failure means the server could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }

    /// HTTP status of the failure, when the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Operations of the catalog REST API, shared by every client adapter.
///
/// Absent games surface as `None` / `false` rather than errors, matching the service layer.
pub trait CatalogClient: Send + Sync {
    fn list_games(&self) -> BoxFuture<'_, ClientResult<Vec<GameDto>>>;
    fn search_games(&self, query: String) -> BoxFuture<'_, ClientResult<Vec<GameDto>>>;
    fn games_by_category(&self, category: String) -> BoxFuture<'_, ClientResult<Vec<GameDto>>>;
    fn get_game(&self, id: String) -> BoxFuture<'_, ClientResult<Option<GameDto>>>;
    fn create_game(&self, request: CreateGameRequest) -> BoxFuture<'_, ClientResult<GameDto>>;
    fn update_game(
        &self,
        id: String,
        request: UpdateGameRequest,
    ) -> BoxFuture<'_, ClientResult<Option<GameDto>>>;
    /// Returns `false` when no game carried `id`.
    fn delete_game(&self, id: String) -> BoxFuture<'_, ClientResult<bool>>;
    fn bulk_import(
        &self,
        requests: Vec<CreateGameRequest>,
    ) -> BoxFuture<'_, ClientResult<BulkImportSummary>>;

    fn list_categories(&self) -> BoxFuture<'_, ClientResult<Vec<String>>>;
    fn create_category(&self, name: String) -> BoxFuture<'_, ClientResult<()>>;
    fn rename_category(
        &self,
        old_name: String,
        new_name: String,
    ) -> BoxFuture<'_, ClientResult<RenameCategoryResponse>>;
    fn delete_category(&self, name: String) -> BoxFuture<'_, ClientResult<()>>;
}
