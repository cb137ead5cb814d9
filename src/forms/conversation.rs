use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Body of `POST /conversations`. Generated fields sent by a client are ignored.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ConversationForm {
    #[validate(min_length = 1)]
    pub subject: String,
}
