use crate::db::StoreError;
use crate::models::{Conversation, Message};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;

/// One conversation joined with at most one of its messages.
#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: i32,
    subject: String,
    created_at: DateTime<Utc>,
    message_id: Option<i32>,
    user_name: Option<String>,
    txt: Option<String>,
    message_created_at: Option<DateTime<Utc>>,
}

const SELECT_WITH_MESSAGES: &str = r#"
    SELECT
        c.id,
        c.subject,
        c.created_at,
        m.id AS message_id,
        m.user_name,
        m.txt,
        m.created_at AS message_created_at
    FROM conversations c
    LEFT JOIN messages m ON m.conversation_id = c.id
"#;

// Rows must arrive ordered by conversation id, then message id.
fn group_rows(rows: Vec<ConversationRow>) -> Vec<Conversation> {
    let mut conversations: Vec<Conversation> = Vec::new();
    for row in rows {
        if conversations.last().map(|c| c.id) != Some(row.id) {
            conversations.push(Conversation {
                id: row.id,
                subject: row.subject,
                created_at: row.created_at,
                messages: vec![],
            });
        }

        let Some(current) = conversations.last_mut() else {
            continue;
        };
        if let (Some(id), Some(user_name), Some(txt), Some(created_at)) =
            (row.message_id, row.user_name, row.txt, row.message_created_at)
        {
            current.messages.push(Message {
                id,
                user_name,
                txt,
                created_at,
                conversation_id: row.id,
                conversation: None,
            });
        }
    }
    conversations
}

pub async fn insert(pool: &PgPool, subject: &str) -> Result<Conversation, StoreError> {
    let query_span = tracing::info_span!("Saving new conversation into the database");
    sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO conversations (subject)
        VALUES ($1)
        RETURNING id, subject, created_at
        "#,
    )
    .bind(subject)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map_err(|err| match StoreError::from(err) {
        StoreError::Conflict(msg) => {
            tracing::warn!("Conversation subject {:?} is taken: {}", subject, msg);
            StoreError::Conflict(format!("conversation {:?} already exists", subject))
        }
        err => {
            tracing::error!("Failed to insert conversation: {:?}", err);
            err
        }
    })
}

/// Returns the number of deleted rows; messages go with their conversation.
#[tracing::instrument(name = "Delete conversation.", skip(pool))]
pub async fn delete(pool: &PgPool, id: i32) -> Result<u64, StoreError> {
    sqlx::query("DELETE FROM conversations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map(|result| result.rows_affected())
        .map_err(|err| {
            tracing::error!("Failed to delete conversation: {:?}", err);
            StoreError::from(err)
        })
}

pub async fn list(pool: &PgPool) -> Result<Vec<Conversation>, StoreError> {
    let query_span = tracing::info_span!("Fetch all conversations with messages.");
    let sql = format!("{} ORDER BY c.id, m.id", SELECT_WITH_MESSAGES);
    sqlx::query_as::<_, ConversationRow>(&sql)
        .fetch_all(pool)
        .instrument(query_span)
        .await
        .map(group_rows)
        .map_err(|err| {
            tracing::error!("Failed to fetch conversations: {:?}", err);
            StoreError::from(err)
        })
}

pub async fn fetch(
    pool: &PgPool,
    id: i32,
    with_messages: bool,
) -> Result<Conversation, StoreError> {
    let query_span = tracing::info_span!("Fetch conversation.", id, with_messages);
    let conversation = if with_messages {
        let sql = format!("{} WHERE c.id = $1 ORDER BY m.id", SELECT_WITH_MESSAGES);
        sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(id)
            .fetch_all(pool)
            .instrument(query_span)
            .await
            .map(|rows| group_rows(rows).into_iter().next())
    } else {
        sqlx::query_as::<_, Conversation>(
            "SELECT id, subject, created_at FROM conversations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span)
        .await
    };

    conversation
        .map_err(|err| {
            tracing::error!("Failed to fetch conversation {}: {:?}", id, err);
            StoreError::from(err)
        })?
        .ok_or(StoreError::NotFound)
}
