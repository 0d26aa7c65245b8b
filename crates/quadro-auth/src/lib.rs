//! Quadro Auth — password hashing, JWT issuance/validation, and the
//! register / login / logout / refresh-rotation flows.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, AuthSession, RegisterInput};
pub use token::TokenClaims;
