//! Error types for the Quadro system.

use serde::Serialize;
use thiserror::Error;

/// Machine-readable error code surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    Unauthenticated,
    Forbidden,
    NotFound,
    UserExists,
    InvalidCredentials,
    SessionExpired,
    InvalidToken,
    SlugExists,
    AlreadyMember,
    UserNotFound,
    ValidationError,
    Conflict,
    InternalError,
}

impl ErrorCode {
    /// Wire representation of the code (matches the client contract).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UserExists => "USER_EXISTS",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::SessionExpired => "SESSION_EXPIRED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::SlugExists => "SLUG_EXISTS",
            ErrorCode::AlreadyMember => "ALREADY_MEMBER",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// A single violated input field. Validation reports every violation
/// in the request, not just the first.
#[derive(Debug, Clone, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum QuadroError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Access denied: {reason}")]
    Forbidden { reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("User already exists with this email")]
    UserExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Workspace slug already exists")]
    SlugExists,

    #[error("User is already a member of this workspace")]
    AlreadyMember,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {}", format_violations(violations))]
    Validation { violations: Vec<FieldViolation> },

    #[error("Conflict: {entity} already exists")]
    Conflict { entity: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuadroError {
    pub fn code(&self) -> ErrorCode {
        match self {
            QuadroError::Unauthenticated => ErrorCode::Unauthenticated,
            QuadroError::Forbidden { .. } => ErrorCode::Forbidden,
            QuadroError::NotFound { .. } => ErrorCode::NotFound,
            QuadroError::UserExists => ErrorCode::UserExists,
            QuadroError::InvalidCredentials => ErrorCode::InvalidCredentials,
            QuadroError::SessionExpired => ErrorCode::SessionExpired,
            QuadroError::InvalidToken => ErrorCode::InvalidToken,
            QuadroError::SlugExists => ErrorCode::SlugExists,
            QuadroError::AlreadyMember => ErrorCode::AlreadyMember,
            QuadroError::UserNotFound => ErrorCode::UserNotFound,
            QuadroError::Validation { .. } => ErrorCode::ValidationError,
            QuadroError::Conflict { .. } => ErrorCode::Conflict,
            QuadroError::Database(_) | QuadroError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        QuadroError::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        QuadroError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type QuadroResult<T> = Result<T, QuadroError>;
