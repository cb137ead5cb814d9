use crate::db::{self, StoreError};
use crate::forms::MessageForm;
use crate::helpers::{id_from_path, ApiError};
use crate::models::{Conversation, Message};
use crate::routes::conversation::conversation_from_path;
use crate::routes::rest::Resource;
use actix_web::{web, HttpRequest, HttpResponse, Result, Route};
use serde_valid::Validate;
use sqlx::PgPool;

/// Path segment holding the message id.
pub const MESSAGE: &str = "message";

/// `/conversations/{conversation}/messages`: every operation is scoped to the parent.
pub struct Messages;

impl Resource for Messages {
    fn create(&self) -> Option<Route> {
        Some(web::route().to(create))
    }

    fn list(&self) -> Option<Route> {
        Some(web::route().to(list))
    }

    fn fetch(&self) -> Option<Route> {
        Some(web::route().to(fetch))
    }

    fn delete(&self) -> Option<Route> {
        Some(web::route().to(delete))
    }
}

/// Resolves the message named by the path. A message of another conversation
/// is reported as missing.
async fn message_from_path(
    req: &HttpRequest,
    pool: &PgPool,
    conversation: &Conversation,
) -> Result<Message, ApiError> {
    let id = id_from_path(req, MESSAGE)?;
    let not_found = || ApiError::NotFound(format!("message {} not found", id));

    let message = db::message::fetch(pool, id).await.map_err(|err| match err {
        StoreError::NotFound => not_found(),
        err => err.into(),
    })?;

    if !message.belongs_to(conversation) {
        tracing::debug!(
            "Message {} belongs to conversation {}, not {}",
            message.id,
            message.conversation_id,
            conversation.id
        );
        return Err(not_found());
    }
    Ok(message)
}

// The body is extracted fallibly so that a missing parent wins over a bad body.
#[tracing::instrument(name = "Create message.", skip(pg_pool))]
pub async fn create(
    req: HttpRequest,
    form: Result<web::Json<MessageForm>>,
    pg_pool: web::Data<PgPool>,
) -> Result<web::Json<Message>> {
    let conversation = conversation_from_path(&req, pg_pool.get_ref(), false).await?;

    let form = form?;
    if let Err(errors) = form.validate() {
        return Err(ApiError::from(errors).into());
    }

    db::message::insert(
        pg_pool.get_ref(),
        conversation.id,
        &form.user_name,
        &form.txt,
    )
    .await
    .map(web::Json)
    .map_err(|err| ApiError::from(err).into())
}

#[tracing::instrument(name = "List messages.", skip(pg_pool))]
pub async fn list(req: HttpRequest, pg_pool: web::Data<PgPool>) -> Result<web::Json<Vec<Message>>> {
    let conversation = conversation_from_path(&req, pg_pool.get_ref(), true).await?;
    Ok(web::Json(conversation.messages))
}

#[tracing::instrument(name = "Get message.", skip(pg_pool))]
pub async fn fetch(req: HttpRequest, pg_pool: web::Data<PgPool>) -> Result<web::Json<Message>> {
    let conversation = conversation_from_path(&req, pg_pool.get_ref(), false).await?;
    let message = message_from_path(&req, pg_pool.get_ref(), &conversation).await?;
    Ok(web::Json(message))
}

#[tracing::instrument(name = "Delete message.", skip(pg_pool))]
pub async fn delete(req: HttpRequest, pg_pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let conversation = conversation_from_path(&req, pg_pool.get_ref(), false).await?;
    let message = message_from_path(&req, pg_pool.get_ref(), &conversation).await?;

    let deleted = db::message::delete(pg_pool.get_ref(), message.id)
        .await
        .map_err(ApiError::from)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!("message {} not found", message.id)).into());
    }

    Ok(HttpResponse::Ok().finish())
}
