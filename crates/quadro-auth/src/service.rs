//! Authentication service — register, login, logout, and refresh
//! token rotation.

use chrono::{Duration, Utc};
use quadro_core::access::Identity;
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::session::CreateSession;
use quadro_core::models::user::{CreateUser, User};
use quadro_core::repository::{SessionRepository, UserRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for registration. Structural validation (email shape,
/// password length) happens at the API boundary before this is built.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// A user plus a freshly issued token pair.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    /// Signed access token (short-lived, verified statelessly).
    pub access_token: String,
    /// Signed refresh token (long-lived, backed by a session row).
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Credential service.
///
/// Generic over repository implementations so that the auth layer has
/// no dependency on the database crate.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    /// Create a new account and issue its first token pair.
    ///
    /// Email uniqueness is checked case-as-stored; a duplicate fails
    /// with `USER_EXISTS`.
    pub async fn register(&self, input: RegisterInput) -> QuadroResult<AuthSession> {
        if self.user_repo.user_by_email(&input.email).await?.is_some() {
            return Err(QuadroError::UserExists);
        }

        let password_hash =
            password::hash_password(&input.password).map_err(QuadroError::from)?;

        let user = self
            .user_repo
            .create_user(CreateUser {
                email: input.email,
                name: input.name,
                password_hash,
            })
            .await?;

        self.open_session(user).await
    }

    /// Authenticate with email + password and issue a fresh pair.
    ///
    /// Previous sessions stay valid — concurrent devices are allowed.
    pub async fn login(&self, email: &str, password_input: &str) -> QuadroResult<AuthSession> {
        let user = self
            .user_repo
            .user_by_email(email)
            .await?
            .ok_or(QuadroError::InvalidCredentials)?;

        let valid = password::verify_password(password_input, &user.password_hash)
            .map_err(QuadroError::from)?;
        if !valid {
            return Err(QuadroError::InvalidCredentials);
        }

        self.open_session(user).await
    }

    /// Invalidate every session for the user (all devices).
    pub async fn logout(&self, identity: &Identity) -> QuadroResult<()> {
        self.session_repo.delete_user_sessions(identity.id).await
    }

    /// Rotate a refresh token: verify the signature, require that the
    /// matching session row still exists and has not expired, then
    /// atomically replace it with a new one.
    ///
    /// Each refresh token is single-use — reusing a consumed token
    /// fails because its session row is gone.
    pub async fn refresh(&self, raw_refresh_token: &str) -> QuadroResult<AuthSession> {
        // 1. Signature check — necessary but not sufficient.
        token::decode_refresh_token(raw_refresh_token, &self.config).map_err(|e| {
            tracing::debug!(error = %e, "refresh token failed verification");
            QuadroError::InvalidToken
        })?;

        // 2. Revocation check via session-row presence.
        let token_hash = token::hash_refresh_token(raw_refresh_token);
        let session = self
            .session_repo
            .session_by_token_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                tracing::debug!("refresh token has no live session");
                QuadroError::SessionExpired
            })?;

        if session.expires_at <= Utc::now() {
            // Remove the stale row and reject.
            let _ = self.session_repo.delete_session(session.id).await;
            tracing::debug!(user_id = %session.user_id, "refresh session expired");
            return Err(QuadroError::SessionExpired);
        }

        // 3. Consume the old session (single-use guarantee).
        self.session_repo.delete_session(session.id).await?;

        let user = self.user_repo.user_by_id(session.user_id).await?;
        self.open_session(user).await
    }

    /// Statelessly verify an access token into a caller identity.
    pub fn verify_access(&self, access_token: &str) -> Result<Identity, AuthError> {
        token::verify_access_token(access_token, &self.config)
    }

    /// The current user behind a verified access token.
    pub async fn me(&self, identity: &Identity) -> QuadroResult<User> {
        self.user_repo.user_by_id(identity.id).await
    }

    /// Issue an access/refresh pair and persist the session row bound
    /// to the refresh token.
    async fn open_session(&self, user: User) -> QuadroResult<AuthSession> {
        let access_token =
            token::issue_access_token(user.id, &user.email, &self.config).map_err(QuadroError::from)?;
        let refresh_token =
            token::issue_refresh_token(user.id, &user.email, &self.config).map_err(QuadroError::from)?;

        let expires_at =
            Utc::now() + Duration::seconds(self.config.refresh_token_lifetime_secs as i64);

        self.session_repo
            .create_session(CreateSession {
                user_id: user.id,
                token_hash: token::hash_refresh_token(&refresh_token),
                expires_at,
            })
            .await?;

        Ok(AuthSession {
            user,
            access_token,
            refresh_token,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }
}

/// Convenience for building an [`Identity`] from a known user id and
/// email without a token roundtrip (used by tests and internal tasks).
pub fn identity_of(id: Uuid, email: impl Into<String>) -> Identity {
    Identity {
        id,
        email: email.into(),
    }
}
