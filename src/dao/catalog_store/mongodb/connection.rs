use mongodb::{Client, Database, bson::doc};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

/// Build a client for `config` and ping the catalog database until it answers, following
/// `config.ping_retry`.
pub async fn establish_connection(config: &MongoConfig) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let retry = config.ping_retry;
    let mut delay = retry.initial_delay;
    let mut attempts = 0;

    while let Err(err) = database.run_command(doc! { "ping": 1 }).await {
        attempts += 1;
        if attempts >= retry.max_attempts {
            return Err(MongoDaoError::InitialPing {
                attempts,
                source: err,
            });
        }
        warn!(
            database = %config.database_name,
            attempt = attempts,
            max_attempts = retry.max_attempts,
            retry_in_ms = delay.as_millis() as u64,
            error = %err,
            "catalog database did not answer ping"
        );
        sleep(delay).await;
        delay = retry.next_delay(delay);
    }

    debug!(database = %config.database_name, attempts = attempts + 1, "catalog database reachable");
    Ok((client, database))
}
