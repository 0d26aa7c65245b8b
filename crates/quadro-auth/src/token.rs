//! JWT access/refresh token issuance and verification.
//!
//! Both token kinds carry the same claims but are signed with
//! independent HS256 secrets and have independent expiries; a refresh
//! token is additionally backed by a session row (its SHA-256 hash is
//! what the store keeps).

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quadro_core::access::Identity;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims embedded in both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user ID (UUID string).
    pub sub: String,
    /// User email.
    pub email: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

fn issue(
    user_id: Uuid,
    email: &str,
    secret: &str,
    lifetime_secs: u64,
    issuer: &str,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iss: issuer.to_string(),
        iat: now,
        exp: now + lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

fn decode(token: &str, secret: &str, issuer: &str) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Issue a signed access token.
pub fn issue_access_token(
    user_id: Uuid,
    email: &str,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    issue(
        user_id,
        email,
        &config.access_token_secret,
        config.access_token_lifetime_secs,
        &config.issuer,
    )
}

/// Issue a signed refresh token.
pub fn issue_refresh_token(
    user_id: Uuid,
    email: &str,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    issue(
        user_id,
        email,
        &config.refresh_token_secret,
        config.refresh_token_lifetime_secs,
        &config.issuer,
    )
}

/// Decode and verify a refresh token's signature and expiry.
///
/// Signature validity is necessary but not sufficient — revocation is
/// enforced by session-row presence, which the auth service checks.
pub fn decode_refresh_token(token: &str, config: &AuthConfig) -> Result<TokenClaims, AuthError> {
    decode(token, &config.refresh_token_secret, &config.issuer)
}

/// Verify an access token and extract the caller identity.
///
/// Purely stateless — no database lookup is performed. This is the
/// entry point for request-level authentication.
pub fn verify_access_token(token: &str, config: &AuthConfig) -> Result<Identity, AuthError> {
    let claims = decode(token, &config.access_token_secret, &config.issuer)?;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))?;
    Ok(Identity {
        id,
        email: claims.email,
    })
}

/// SHA-256 hash of a raw refresh token, hex-encoded.
///
/// This is the value stored in the database as `session.token_hash`.
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            access_token_secret: "test-access-secret".into(),
            refresh_token_secret: "test-refresh-secret".into(),
            access_token_lifetime_secs: 900,
            refresh_token_lifetime_secs: 604_800,
            issuer: "quadro-test".into(),
        }
    }

    #[test]
    fn access_token_roundtrip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = issue_access_token(user_id, "alice@example.com", &config).unwrap();
        let identity = verify_access_token(&token, &config).unwrap();

        assert_eq!(identity.id, user_id);
        assert_eq!(identity.email, "alice@example.com");
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let refresh = issue_refresh_token(user_id, "alice@example.com", &config).unwrap();
        assert!(verify_access_token(&refresh, &config).is_err());

        let access = issue_access_token(user_id, "alice@example.com", &config).unwrap();
        assert!(decode_refresh_token(&access, &config).is_err());
    }

    #[test]
    fn jti_is_unique() {
        let config = test_config();
        let uid = Uuid::new_v4();

        let t1 = issue_refresh_token(uid, "a@b.c", &config).unwrap();
        let t2 = issue_refresh_token(uid, "a@b.c", &config).unwrap();

        let c1 = decode_refresh_token(&t1, &config).unwrap();
        let c2 = decode_refresh_token(&t2, &config).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let config = test_config();
        let other = AuthConfig {
            issuer: "someone-else".into(),
            ..test_config()
        };
        let token = issue_access_token(Uuid::new_v4(), "a@b.c", &other).unwrap();
        assert!(verify_access_token(&token, &config).is_err());
    }

    #[test]
    fn refresh_token_hash_is_deterministic() {
        let raw = "some-refresh-token";
        assert_eq!(hash_refresh_token(raw), hash_refresh_token(raw));
        assert_ne!(hash_refresh_token(raw), hash_refresh_token("other"));
    }
}
