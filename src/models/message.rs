use crate::models::Conversation;
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i32,
    pub user_name: String,
    pub txt: String,
    pub created_at: DateTime<Utc>,
    pub conversation_id: i32,
    /// Owning conversation, populated only when fetched through a join.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Box<Conversation>>,
}

impl Message {
    pub fn belongs_to(&self, conversation: &Conversation) -> bool {
        self.conversation_id == conversation.id
    }
}
