use std::time::SystemTime;

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the installed store and report `OK`, or `degraded` when it is missing or unhealthy.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let healthy = match state.require_catalog_store().await {
        Ok(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                false
            }
        },
        Err(_) => {
            warn!("storage unavailable (degraded mode)");
            false
        }
    };

    if healthy && !state.is_degraded().await {
        HealthResponse::ok(SystemTime::now())
    } else {
        HealthResponse::degraded(SystemTime::now())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::catalog_store::memory::MemoryCatalogStore, state::AppState,
    };

    #[tokio::test]
    async fn reports_ok_with_a_healthy_store() {
        let state =
            AppState::with_store(AppConfig::default(), Arc::new(MemoryCatalogStore::new()));
        assert_eq!(health_status(&state).await.status, "OK");
    }

    #[tokio::test]
    async fn reports_degraded_without_a_store() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).await.status, "degraded");
    }
}
