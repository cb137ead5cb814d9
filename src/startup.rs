use crate::configuration::DatabaseSettings;
use crate::helpers::json_error_handler;
use crate::routes;
use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/// Opens the store pool. Connection failures surface here, not on the first request.
pub async fn get_connection_pool(settings: &DatabaseSettings) -> Result<PgPool, anyhow::Error> {
    let connect_options = settings.connect_options()?;

    tracing::info!(
        db_host = %connect_options.get_host(),
        db_port = connect_options.get_port(),
        db_name = connect_options.get_database().unwrap_or_default(),
        "Connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect_with(connect_options)
        .await?;
    Ok(pool)
}

/// Creates the tables when they are absent.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Applying database migrations");
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn run(listener: TcpListener, pg_pool: PgPool) -> Result<Server, std::io::Error> {
    let pg_pool = web::Data::new(pg_pool);
    let json_config = web::JsonConfig::default().error_handler(json_error_handler);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .configure(routes::configure)
            .app_data(json_config.clone())
            .app_data(pg_pool.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
