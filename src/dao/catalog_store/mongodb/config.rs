use std::time::Duration;

use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DB: &str = "igrite-bg";

/// How hard to try reaching the server before giving up on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingRetry {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for PingRetry {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl PingRetry {
    /// Delay to wait after `current`, doubled and capped at `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    pub database_name: String,
    /// Wrap the category rename cascade in a multi-document transaction (replica sets only).
    pub transactional_rename: bool,
    pub ping_retry: PingRetry,
}

impl MongoConfig {
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or(DEFAULT_DB).to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
            transactional_rename: false,
            ping_retry: PingRetry::default(),
        })
    }

    pub fn with_transactional_rename(mut self, enabled: bool) -> Self {
        self.transactional_rename = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_delay_doubles_up_to_the_cap() {
        let retry = PingRetry {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        let second = retry.next_delay(retry.initial_delay);
        assert_eq!(second, Duration::from_millis(200));
        assert_eq!(retry.next_delay(second), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn uri_defaults_the_database_name() {
        let config = MongoConfig::from_uri("mongodb://localhost:27017", None)
            .await
            .unwrap();
        assert_eq!(config.database_name, DEFAULT_DB);
        assert!(!config.transactional_rename);
        assert_eq!(config.ping_retry, PingRetry::default());

        let invalid = MongoConfig::from_uri("postgres://localhost", Some("games")).await;
        assert!(matches!(invalid, Err(MongoDaoError::InvalidUri { .. })));
    }
}
