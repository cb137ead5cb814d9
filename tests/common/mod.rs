#![allow(dead_code)]

use parley::configuration::{get_configuration, DatabaseSettings};
use parley::models::{Conversation, Message};
use sqlx::{Connection, Executor, PgConnection, PgPool};

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub client: reqwest::Client,
}

/// Set to `1` (or `true`) in CI so an unreachable postgres fails the suite instead of skipping it.
pub const REQUIRE_DB_VAR: &str = "APP_TEST_REQUIRE_DB";

pub fn database_required(flag: Option<&str>) -> bool {
    matches!(
        flag.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

/// Starts the server on a random port against a brand new database.
/// Returns `None` when postgres is unreachable so the calling test can bail out,
/// unless `APP_TEST_REQUIRE_DB` is set, in which case it panics.
pub async fn spawn_app() -> Option<TestApp> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to get configuration");
    configuration.database.url = None;
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();

    let connection_pool = match configure_database(&configuration.database).await {
        Ok(pool) => pool,
        Err(err) if database_required(std::env::var(REQUIRE_DB_VAR).ok().as_deref()) => {
            panic!("{} is set but postgres is unavailable: {}", REQUIRE_DB_VAR, err);
        }
        Err(err) => {
            eprintln!("Skipping tests: failed to connect to postgres: {}", err);
            return None;
        }
    };

    let server = parley::startup::run(listener, connection_pool.clone())
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    Some(TestApp {
        address,
        db_pool: connection_pool,
        client: reqwest::Client::new(),
    })
}

pub async fn configure_database(config: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;

    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let connection_pool = PgPool::connect(&config.connection_string()).await?;
    parley::startup::migrate(&connection_pool).await?;

    Ok(connection_pool)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_conversation(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/conversations"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_conversation(&self, subject: &str) -> Conversation {
        let response = self
            .post_conversation(serde_json::json!({ "subject": subject }))
            .await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("conversation json")
    }

    pub async fn post_message(
        &self,
        conversation_id: i32,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/conversations/{}/messages", conversation_id)))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_message(&self, conversation: &Conversation, txt: &str) -> Message {
        let response = self
            .post_message(
                conversation.id,
                serde_json::json!({ "user_name": "trey", "txt": txt }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("message json")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_conversation(&self, id: i32) -> Conversation {
        let response = self.get(&format!("/conversations/{}", id)).await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("conversation json")
    }

    pub async fn list_conversations(&self) -> Vec<Conversation> {
        let response = self.get("/conversations").await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.expect("conversations json")
    }
}
