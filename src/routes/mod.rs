use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use tokio::time::timeout;
use tracing::warn;

use crate::{error::AppError, state::SharedState};

pub mod categories;
pub mod docs;
pub mod games;
pub mod health;

/// Compose all route trees, wiring in shared state, the request timeout and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(games::router())
        .merge(categories::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_request_timeout,
        ));

    api_router.merge(docs::router()).with_state(state)
}

/// Abort handlers that outlive the configured request timeout with a 503.
async fn enforce_request_timeout(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.config().request_timeout;
    let method = req.method().clone();
    let uri = req.uri().clone();

    timeout(limit, next.run(req)).await.map_err(|_| {
        warn!(%method, %uri, timeout_ms = limit.as_millis() as u64, "request timed out");
        AppError::Timeout
    })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{http::StatusCode, routing::get};
    use axum_test::TestServer;

    use super::*;
    use crate::{
        config::AppConfig, dao::catalog_store::memory::MemoryCatalogStore, state::AppState,
    };

    fn server_with_timeout(limit: Duration) -> TestServer {
        let config = AppConfig {
            request_timeout: limit,
            ..AppConfig::default()
        };
        let state = AppState::with_store(config, Arc::new(MemoryCatalogStore::new()));
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                enforce_request_timeout,
            ))
            .with_state(state);
        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn slow_requests_answer_service_unavailable() {
        let server = server_with_timeout(Duration::from_millis(20));

        let response = server.get("/slow").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        response.assert_json(&serde_json::json!({ "error": "operation timed out" }));

        server.get("/fast").await.assert_status_ok();
    }
}
