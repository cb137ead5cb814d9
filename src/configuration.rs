use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    /// Full connection url, e.g. taken from `DATABASE_URL`. Wins over the discrete fields.
    pub url: Option<String>,
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port,
        )
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Builds driver options. A url without a database name is rejected, a url
    /// without credentials falls back to the driver defaults (PGUSER or the OS user).
    pub fn connect_options(&self) -> Result<PgConnectOptions, config::ConfigError> {
        match self.url.as_deref() {
            Some(url) => {
                let options = PgConnectOptions::from_str(url).map_err(|err| {
                    config::ConfigError::Message(format!("invalid database url: {}", err))
                })?;
                if options.get_database().map_or(true, str::is_empty) {
                    return Err(config::ConfigError::Message(
                        "database url has no database name".to_string(),
                    ));
                }
                Ok(options)
            }
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.username)
                .password(&self.password)
                .database(&self.database_name)
                .ssl_mode(PgSslMode::Prefer)),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8080_i64)?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432_i64)?
        .set_default("database.database_name", "parley")?
        .set_default("database.max_connections", 5_i64)?
        .set_default("database.acquire_timeout_secs", 30_i64)?
        // configuration.yaml is optional, the defaults above are enough for local runs
        .add_source(config::File::with_name("configuration").required(false))
        // APP_APPLICATION__PORT=9000 overrides application.port
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?;

    let config: Settings = settings.try_deserialize()?;

    // fail on startup rather than on the first request
    config.database.connect_options()?;

    Ok(config)
}
