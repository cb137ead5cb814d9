use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Body of `POST /conversations/{conversation}/messages`.
/// The owning conversation always comes from the path, never from the body.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MessageForm {
    #[validate(min_length = 1)]
    pub user_name: String,
    #[validate(min_length = 1)]
    pub txt: String,
}
