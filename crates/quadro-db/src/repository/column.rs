//! SurrealDB implementation of [`ColumnRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::column::{Column, ColumnKind, CreateColumn};
use quadro_core::repository::ColumnRepository;
use serde_json::json;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, parse_uuid};

pub(crate) fn parse_column_kind(s: &str) -> Result<ColumnKind, DbError> {
    match s {
        "TEXT" => Ok(ColumnKind::Text),
        "STATUS" => Ok(ColumnKind::Status),
        "PERSON" => Ok(ColumnKind::Person),
        "DATE" => Ok(ColumnKind::Date),
        "NUMBER" => Ok(ColumnKind::Number),
        other => Err(DbError::Query(format!("unknown column kind: {other}"))),
    }
}

pub(crate) fn column_kind_to_string(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Text => "TEXT",
        ColumnKind::Status => "STATUS",
        ColumnKind::Person => "PERSON",
        ColumnKind::Date => "DATE",
        ColumnKind::Number => "NUMBER",
    }
}

#[derive(Debug, SurrealValue)]
struct ColumnRow {
    board_id: String,
    title: String,
    kind: String,
    position: i64,
    width: Option<i64>,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ColumnRowWithId {
    record_id: String,
    board_id: String,
    title: String,
    kind: String,
    position: i64,
    width: Option<i64>,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl ColumnRow {
    fn into_column(self, id: Uuid) -> Result<Column, DbError> {
        Ok(Column {
            id,
            board_id: parse_uuid(&self.board_id, "board")?,
            title: self.title,
            kind: parse_column_kind(&self.kind)?,
            position: self.position,
            width: self.width,
            settings: self.settings,
            created_at: self.created_at,
        })
    }
}

impl ColumnRowWithId {
    fn try_into_column(self) -> Result<Column, DbError> {
        let id = parse_uuid(&self.record_id, "column")?;
        ColumnRow {
            board_id: self.board_id,
            title: self.title,
            kind: self.kind,
            position: self.position,
            width: self.width,
            settings: self.settings,
            created_at: self.created_at,
        }
        .into_column(id)
    }
}

impl<C: Connection> ColumnRepository for SurrealStore<C> {
    async fn create_column(&self, board_id: Uuid, input: CreateColumn) -> QuadroResult<Column> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let settings = input.settings.unwrap_or_else(|| json!({}));

        // Position is computed inside the insert transaction when the
        // caller does not supply one.
        let sql = match input.position {
            Some(_) => {
                "CREATE type::record('column', $id) SET \
                 board_id = $board_id, title = $title, kind = $kind, \
                 position = $position, width = $width, settings = $settings"
            }
            None => {
                "BEGIN TRANSACTION;
                 LET $last = (SELECT VALUE position FROM column \
                     WHERE board_id = $board_id \
                     ORDER BY position DESC LIMIT 1);
                 LET $pos = IF array::len($last) == 0 { 0 } \
                     ELSE { $last[0] + 1 };
                 CREATE type::record('column', $id) SET \
                     board_id = $board_id, title = $title, kind = $kind, \
                     position = $pos, width = $width, settings = $settings;
                 COMMIT TRANSACTION;"
            }
        };
        // In the transaction, BEGIN is statement 0 and the CREATE
        // follows the two LETs at index 3.
        let take_index = if input.position.is_some() { 0 } else { 3 };

        let mut query = self
            .db()
            .query(sql)
            .bind(("id", id_str.clone()))
            .bind(("board_id", board_id.to_string()))
            .bind(("title", input.title))
            .bind(("kind", column_kind_to_string(input.kind).to_string()))
            .bind(("width", input.width))
            .bind(("settings", settings));
        if let Some(position) = input.position {
            query = query.bind(("position", position));
        }

        let mut result = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ColumnRow> = result.take(take_index).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "column".into(),
            id: id_str,
        })?;
        row.into_column(id).map_err(Into::into)
    }

    async fn columns_by_board(&self, board_id: Uuid) -> QuadroResult<Vec<Column>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM column \
                 WHERE board_id = $board_id ORDER BY position ASC",
            )
            .bind(("board_id", board_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ColumnRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_column().map_err(QuadroError::from))
            .collect()
    }
}
