//! SurrealDB implementation of [`ViewRepository`] and
//! [`AutomationRepository`]. Both tables are read-only through the
//! current API; rows are seeded at board creation or out of band.

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::automation::Automation;
use quadro_core::models::view::{View, ViewKind};
use quadro_core::repository::{AutomationRepository, ViewRepository};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, parse_uuid};

pub(crate) fn parse_view_kind(s: &str) -> Result<ViewKind, DbError> {
    match s {
        "TABLE" => Ok(ViewKind::Table),
        "KANBAN" => Ok(ViewKind::Kanban),
        "CALENDAR" => Ok(ViewKind::Calendar),
        other => Err(DbError::Query(format!("unknown view kind: {other}"))),
    }
}

#[derive(Debug, SurrealValue)]
struct ViewRowWithId {
    record_id: String,
    board_id: String,
    name: String,
    kind: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AutomationRowWithId {
    record_id: String,
    board_id: String,
    name: String,
    enabled: bool,
    config: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl<C: Connection> ViewRepository for SurrealStore<C> {
    async fn views_by_board(&self, board_id: Uuid) -> QuadroResult<Vec<View>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM board_view \
                 WHERE board_id = $board_id ORDER BY created_at ASC",
            )
            .bind(("board_id", board_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ViewRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| {
                Ok(View {
                    id: parse_uuid(&r.record_id, "view")?,
                    board_id: parse_uuid(&r.board_id, "board")?,
                    name: r.name,
                    kind: parse_view_kind(&r.kind)?,
                    is_default: r.is_default,
                    created_at: r.created_at,
                })
            })
            .collect::<Result<_, DbError>>()
            .map_err(QuadroError::from)
    }
}

impl<C: Connection> AutomationRepository for SurrealStore<C> {
    async fn automations_by_board(&self, board_id: Uuid) -> QuadroResult<Vec<Automation>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM automation \
                 WHERE board_id = $board_id ORDER BY created_at ASC",
            )
            .bind(("board_id", board_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AutomationRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| {
                Ok(Automation {
                    id: parse_uuid(&r.record_id, "automation")?,
                    board_id: parse_uuid(&r.board_id, "board")?,
                    name: r.name,
                    enabled: r.enabled,
                    config: r.config,
                    created_at: r.created_at,
                })
            })
            .collect::<Result<_, DbError>>()
            .map_err(QuadroError::from)
    }
}
