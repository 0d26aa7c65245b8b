//! Shared test harness: an in-memory store behind the full API.

use quadro_api::{Api, EventBus};
use quadro_auth::AuthConfig;
use quadro_core::access::Identity;
use quadro_db::SurrealStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

pub async fn api() -> Api<SurrealStore<Db>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quadro_db::run_migrations(&db).await.unwrap();
    let store = SurrealStore::new(db);
    let config = AuthConfig {
        access_token_secret: "access-secret-for-tests".into(),
        refresh_token_secret: "refresh-secret-for-tests".into(),
        ..Default::default()
    };
    Api::new(store, config, EventBus::new(32))
}

pub async fn register(api: &Api<SurrealStore<Db>>, email: &str, name: &str) -> Identity {
    let session = api
        .register(quadro_api::input::RegisterRequest {
            email: email.into(),
            name: name.into(),
            password: "hunter2hunter2".into(),
        })
        .await
        .unwrap();
    Identity {
        id: session.user.id,
        email: session.user.email,
    }
}
