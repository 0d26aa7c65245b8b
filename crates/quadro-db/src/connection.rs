//! Connection bootstrap for the board store.
//!
//! A [`DbManager`] is a connected, authenticated, fully migrated
//! SurrealDB session; [`DbManager::store`] hands out store handles
//! over it. Tests on the in-memory engine skip this and run
//! [`crate::run_migrations`] themselves.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::SurrealStore;
use crate::schema;

/// Connection settings for the board store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket endpoint, `host:port`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    /// Local-development defaults. Deployments override every field
    /// through `QUADRO_DB_*` environment variables.
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "quadro".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// A live SurrealDB session with the schema at the current version.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open the WebSocket session, sign in as root, select the
    /// namespace and database, and apply any pending migrations.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        schema::run_migrations(&db).await?;

        info!("board store ready");

        Ok(Self { db })
    }

    /// A store handle sharing this connection.
    pub fn store(&self) -> SurrealStore<Client> {
        SurrealStore::new(self.db.clone())
    }
}
