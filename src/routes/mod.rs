pub mod conversation;
pub mod health_checks;
pub mod message;
pub mod rest;

pub use conversation::Conversations;
pub use health_checks::*;
pub use message::Messages;

use actix_web::web;

/// Mounts the REST surface; `web::Data<PgPool>` must be registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
    rest::crud(cfg, "conversations", &Conversations);
    rest::crud(cfg, "conversations/:/messages", &Messages);
}
