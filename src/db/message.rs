use crate::db::StoreError;
use crate::models::{Conversation, Message};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i32,
    user_name: String,
    txt: String,
    created_at: DateTime<Utc>,
    conversation_id: i32,
    conversation_subject: String,
    conversation_created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        let conversation = Conversation {
            id: row.conversation_id,
            subject: row.conversation_subject,
            created_at: row.conversation_created_at,
            messages: vec![],
        };
        Message {
            id: row.id,
            user_name: row.user_name,
            txt: row.txt,
            created_at: row.created_at,
            conversation_id: row.conversation_id,
            conversation: Some(Box::new(conversation)),
        }
    }
}

pub async fn insert(
    pool: &PgPool,
    conversation_id: i32,
    user_name: &str,
    txt: &str,
) -> Result<Message, StoreError> {
    let query_span = tracing::info_span!("Saving new message into the database", conversation_id);
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (conversation_id, user_name, txt)
        VALUES ($1, $2, $3)
        RETURNING id, user_name, txt, created_at, conversation_id
        "#,
    )
    .bind(conversation_id)
    .bind(user_name)
    .bind(txt)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to insert message: {:?}", err);
        StoreError::from(err)
    })
}

#[tracing::instrument(name = "Delete message.", skip(pool))]
pub async fn delete(pool: &PgPool, id: i32) -> Result<u64, StoreError> {
    sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map(|result| result.rows_affected())
        .map_err(|err| {
            tracing::error!("Failed to delete message: {:?}", err);
            StoreError::from(err)
        })
}

/// Fetches a message together with its owning conversation (without the
/// conversation's own messages).
pub async fn fetch(pool: &PgPool, id: i32) -> Result<Message, StoreError> {
    let query_span = tracing::info_span!("Fetch message.", id);
    sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT
            m.id,
            m.user_name,
            m.txt,
            m.created_at,
            m.conversation_id,
            c.subject AS conversation_subject,
            c.created_at AS conversation_created_at
        FROM messages m
        JOIN conversations c ON c.id = m.conversation_id
        WHERE m.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch message {}: {:?}", id, err);
        StoreError::from(err)
    })?
    .map(Message::from)
    .ok_or(StoreError::NotFound)
}
