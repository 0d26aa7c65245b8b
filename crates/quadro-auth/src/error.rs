//! Authentication error types.

use quadro_core::error::QuadroError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for QuadroError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => QuadroError::InvalidCredentials,
            AuthError::TokenExpired | AuthError::TokenInvalid(_) => QuadroError::InvalidToken,
            AuthError::Crypto(msg) => QuadroError::Internal(msg),
        }
    }
}
