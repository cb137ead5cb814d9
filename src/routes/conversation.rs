use crate::db::{self, StoreError};
use crate::forms::ConversationForm;
use crate::helpers::{id_from_path, ApiError};
use crate::models::Conversation;
use crate::routes::rest::Resource;
use actix_web::{web, HttpRequest, HttpResponse, Result, Route};
use serde_valid::Validate;
use sqlx::PgPool;

/// Path segment holding the conversation id.
pub const CONVERSATION: &str = "conversation";

/// `/conversations`: create, list, fetch and delete.
pub struct Conversations;

impl Resource for Conversations {
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

/// Resolves the conversation named by the path, 404 when it does not exist.
pub(crate) async fn conversation_from_path(
    req: &HttpRequest,
    pool: &PgPool,
    with_messages: bool,
) -> Result<Conversation, ApiError> {
    let id = id_from_path(req, CONVERSATION)?;
    db::conversation::fetch(pool, id, with_messages)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::NotFound(format!("conversation {} not found", id)),
            err => err.into(),
        })
}

#[tracing::instrument(name = "Create conversation.", skip(pg_pool))]
pub async fn create(
    form: web::Json<ConversationForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<web::Json<Conversation>> {
    if let Err(errors) = form.validate() {
        return Err(ApiError::from(errors).into());
    }

    let conversation = db::conversation::insert(pg_pool.get_ref(), &form.subject)
        .await
        .map_err(ApiError::from)?;
    tracing::info!("Created {}", conversation);
    Ok(web::Json(conversation))
}

#[tracing::instrument(name = "List conversations.", skip(pg_pool))]
pub async fn list(pg_pool: web::Data<PgPool>) -> Result<web::Json<Vec<Conversation>>> {
    db::conversation::list(pg_pool.get_ref())
        .await
        .map(web::Json)
        .map_err(|err| ApiError::from(err).into())
}

#[tracing::instrument(name = "Get conversation.", skip(pg_pool))]
pub async fn fetch(
    req: HttpRequest,
    pg_pool: web::Data<PgPool>,
) -> Result<web::Json<Conversation>> {
    let conversation = conversation_from_path(&req, pg_pool.get_ref(), true).await?;
    Ok(web::Json(conversation))
}

#[tracing::instrument(name = "Delete conversation.", skip(pg_pool))]
pub async fn delete(req: HttpRequest, pg_pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let conversation = conversation_from_path(&req, pg_pool.get_ref(), false).await?;

    let deleted = db::conversation::delete(pg_pool.get_ref(), conversation.id)
        .await
        .map_err(ApiError::from)?;
    if deleted == 0 {
        let msg = format!("conversation {} not found", conversation.id);
        return Err(ApiError::NotFound(msg).into());
    }

    tracing::info!("Deleted {}", conversation);
    Ok(HttpResponse::Ok().finish())
}
