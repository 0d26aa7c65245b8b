//! End-to-end auth flow tests against an in-memory SurrealDB store.

use quadro_auth::service::identity_of;
use quadro_auth::{AuthConfig, AuthService, RegisterInput};
use quadro_core::error::QuadroError;
use quadro_db::SurrealStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

fn test_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "access-secret-for-tests".into(),
        refresh_token_secret: "refresh-secret-for-tests".into(),
        ..Default::default()
    }
}

async fn service() -> AuthService<SurrealStore<Db>, SurrealStore<Db>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quadro_db::run_migrations(&db).await.unwrap();
    let store = SurrealStore::new(db);
    AuthService::new(store.clone(), store, test_config())
}

fn register_input(email: &str) -> RegisterInput {
    RegisterInput {
        email: email.into(),
        name: "Alice".into(),
        password: "hunter2hunter2".into(),
    }
}

#[tokio::test]
async fn register_issues_a_verifiable_token_pair() {
    let auth = service().await;
    let session = auth.register(register_input("alice@example.com")).await.unwrap();

    assert_eq!(session.user.email, "alice@example.com");
    assert_eq!(session.expires_in, 900);

    let identity = auth.verify_access(&session.access_token).unwrap();
    assert_eq!(identity.id, session.user.id);
    assert_eq!(identity.email, "alice@example.com");
}

#[tokio::test]
async fn duplicate_registration_fails_with_user_exists() {
    let auth = service().await;
    auth.register(register_input("alice@example.com")).await.unwrap();

    let err = auth
        .register(register_input("alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::UserExists));
}

#[tokio::test]
async fn login_verifies_password() {
    let auth = service().await;
    auth.register(register_input("alice@example.com")).await.unwrap();

    let session = auth
        .login("alice@example.com", "hunter2hunter2")
        .await
        .unwrap();
    assert_eq!(session.user.email, "alice@example.com");

    let err = auth
        .login("alice@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::InvalidCredentials));

    // Unknown accounts fail identically to bad passwords.
    let err = auth
        .login("nobody@example.com", "hunter2hunter2")
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::InvalidCredentials));
}

#[tokio::test]
async fn refresh_rotates_and_consumes_the_token() {
    let auth = service().await;
    let session = auth.register(register_input("alice@example.com")).await.unwrap();

    let rotated = auth.refresh(&session.refresh_token).await.unwrap();
    assert_eq!(rotated.user.id, session.user.id);
    assert_ne!(rotated.refresh_token, session.refresh_token);

    // The consumed token's session row is gone.
    let err = auth.refresh(&session.refresh_token).await.unwrap_err();
    assert!(matches!(err, QuadroError::SessionExpired));

    // The rotated token still works.
    auth.refresh(&rotated.refresh_token).await.unwrap();
}

#[tokio::test]
async fn refresh_rejects_garbage_tokens() {
    let auth = service().await;
    let err = auth.refresh("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, QuadroError::InvalidToken));
}

#[tokio::test]
async fn access_token_is_not_a_refresh_token() {
    let auth = service().await;
    let session = auth.register(register_input("alice@example.com")).await.unwrap();

    // Signed with the access secret, so the refresh decode must fail.
    let err = auth.refresh(&session.access_token).await.unwrap_err();
    assert!(matches!(err, QuadroError::InvalidToken));
}

#[tokio::test]
async fn logout_invalidates_every_session() {
    let auth = service().await;
    let first = auth.register(register_input("alice@example.com")).await.unwrap();
    let second = auth
        .login("alice@example.com", "hunter2hunter2")
        .await
        .unwrap();

    let identity = identity_of(first.user.id, first.user.email.clone());
    auth.logout(&identity).await.unwrap();

    for token in [&first.refresh_token, &second.refresh_token] {
        let err = auth.refresh(token).await.unwrap_err();
        assert!(matches!(err, QuadroError::SessionExpired));
    }
}

#[tokio::test]
async fn me_returns_the_authenticated_user() {
    let auth = service().await;
    let session = auth.register(register_input("alice@example.com")).await.unwrap();

    let identity = auth.verify_access(&session.access_token).unwrap();
    let user = auth.me(&identity).await.unwrap();
    assert_eq!(user.id, session.user.id);
    assert_eq!(user.name, "Alice");
}
