use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Server error code reported when a unique index rejects a write.
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save game `{id}`")]
    SaveGame {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to bulk insert {count} game(s)")]
    InsertGames {
        count: usize,
        #[source]
        source: MongoError,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete game `{id}`")]
    DeleteGame {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to query games")]
    QueryGames {
        #[source]
        source: MongoError,
    },
    #[error("failed to list categories")]
    ListCategories {
        #[source]
        source: MongoError,
    },
    #[error("failed to save category `{name}`")]
    SaveCategory {
        name: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to rename category `{old_name}` to `{new_name}`")]
    RenameCategory {
        old_name: String,
        new_name: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete category `{name}`")]
    DeleteCategory {
        name: String,
        #[source]
        source: MongoError,
    },
}

/// Whether `err` was raised by a unique index rejecting a write.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::InsertMany(insert_error) => {
            insert_error.write_concern_error.is_none()
                && insert_error
                    .write_errors
                    .as_ref()
                    .is_some_and(|errors| errors.iter().all(|e| e.code == DUPLICATE_KEY_CODE))
        }
        _ => false,
    }
}

/// Positions of the documents a partially failed unordered `insert_many` rejected.
pub fn rejected_insert_indexes(err: &MongoError) -> Vec<usize> {
    match err.kind.as_ref() {
        ErrorKind::InsertMany(insert_error) => insert_error
            .write_errors
            .as_ref()
            .map(|errors| errors.iter().map(|e| e.index).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
