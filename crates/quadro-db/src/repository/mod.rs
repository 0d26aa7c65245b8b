//! SurrealDB implementation of the Quadro store.
//!
//! [`SurrealStore`] implements every repository trait from
//! `quadro-core`; each entity's queries live in its own module as an
//! `impl` block on the store.

mod activity;
mod board;
mod column;
mod column_value;
mod group;
mod item;
mod membership;
mod notification;
mod session;
mod update;
mod user;
mod view;
mod workspace;

use quadro_core::error::QuadroError;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

/// SurrealDB-backed implementation of the full data-access surface.
#[derive(Clone)]
pub struct SurrealStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    pub(crate) fn db(&self) -> &Surreal<C> {
        &self.db
    }
}

/// Parse a stored UUID string, attributing failures to the field.
pub(crate) fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Query(format!("invalid {what} UUID: {e}")))
}

/// Map a create-time failure on a unique index to its typed domain
/// conflict; everything else stays a database error.
pub(crate) fn map_unique_violation(
    err: DbError,
    index: &str,
    conflict: QuadroError,
) -> QuadroError {
    if err.to_string().contains(index) {
        conflict
    } else {
        err.into()
    }
}

/// Whether a failed transaction may be retried (SurrealDB reports
/// read/write conflicts with a retry hint).
pub(crate) fn is_retryable(err: &DbError) -> bool {
    let msg = err.to_string();
    msg.contains("can be retried") || msg.contains("read or write conflict")
}
