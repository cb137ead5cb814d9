use anyhow::Context;
use parley::configuration::get_configuration;
use parley::startup::{get_connection_pool, migrate, run};
use parley::telemetry::{get_subscriber, init_subscriber};
use std::net::TcpListener;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("parley".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration().context("Failed to read configuration.")?;

    let pg_pool = get_connection_pool(&settings.database)
        .await
        .context("Failed to connect to database.")?;
    migrate(&pg_pool)
        .await
        .context("Failed to create database schema.")?;

    let address = settings.application.address();
    tracing::info!("Start server at {:?}", &address);
    let listener =
        TcpListener::bind(&address).with_context(|| format!("failed to bind to {}", address))?;

    run(listener, pg_pool.clone())?.await?;

    pg_pool.close().await;
    Ok(())
}
