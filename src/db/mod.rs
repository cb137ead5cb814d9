pub mod conversation;
pub mod message;

use sqlx::PgPool;
use tracing::Instrument;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.message().to_string())
            }
            err => StoreError::Database(err),
        }
    }
}

/// Empties both tables. Test support only, never routed.
pub async fn truncate(pool: &PgPool) -> Result<(), StoreError> {
    let query_span = tracing::info_span!("Truncate conversations and messages.");
    sqlx::query("TRUNCATE messages, conversations RESTART IDENTITY CASCADE")
        .execute(pool)
        .instrument(query_span)
        .await
        .map(|_| ())
        .map_err(|err| {
            tracing::error!("Failed to truncate tables: {:?}", err);
            StoreError::from(err)
        })
}
