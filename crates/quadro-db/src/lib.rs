//! SurrealDB persistence layer for Quadro.
//!
//! Provides the connection manager, the schema migration runner, and
//! [`SurrealStore`], which implements every repository trait defined
//! in `quadro-core`.

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::SurrealStore;
pub use schema::{run_migrations, schema_v1};
