//! Quadro Core — domain models, repository traits, error taxonomy,
//! and the access-control resolver shared by every other crate.

pub mod access;
pub mod error;
pub mod models;
pub mod repository;

pub use access::{AccessLevel, Identity, ResourceRef};
pub use error::{ErrorCode, FieldViolation, QuadroError, QuadroResult};
