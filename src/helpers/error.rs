use crate::db::StoreError;
use actix_web::{error, error::ResponseError, http::StatusCode, HttpRequest, HttpResponse};
use serde_json::json;

/// Failures a handler reports to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input (400)
    #[error("{0}")]
    BadRequest(String),
    /// Uniqueness violation (409)
    #[error("{0}")]
    Conflict(String),
    /// Referenced entity absent (404)
    #[error("{0}")]
    NotFound(String),
    /// Unclassified store or I/O failure (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn label(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "Bad request",
            Self::Conflict(_) => "Conflict",
            Self::NotFound(_) => "Not found",
            Self::Internal(_) => "Internal error",
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.label(),
            "details": self.to_string(),
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::NotFound => Self::NotFound("record not found".to_string()),
            // the driver error is already logged by the store layer
            StoreError::Database(_) => {
                Self::Internal("could not access the data store".to_string())
            }
        }
    }
}

impl From<serde_valid::validation::Errors> for ApiError {
    fn from(errors: serde_valid::validation::Errors) -> Self {
        Self::BadRequest(format!("Invalid data received: {}", errors))
    }
}

/// Error handler for `web::JsonConfig`: undecodable bodies are a 400 with a position hint.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let msg = match err {
        error::JsonPayloadError::Deserialize(err) => format!(
            "could not deserialize body at line {}, column {}: {}",
            err.line(),
            err.column(),
            err
        ),
        err => err.to_string(),
    };
    tracing::debug!("Rejected request body: {}", msg);
    ApiError::BadRequest(msg).into()
}
