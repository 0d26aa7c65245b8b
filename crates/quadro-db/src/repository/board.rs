//! SurrealDB implementation of [`BoardRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::board::{Board, BoardKind, CreateBoard, UpdateBoard};
use quadro_core::repository::BoardRepository;
use serde_json::json;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, parse_uuid};

pub(crate) fn parse_board_kind(s: &str) -> Result<BoardKind, DbError> {
    match s {
        "MAIN" => Ok(BoardKind::Main),
        "PRIVATE" => Ok(BoardKind::Private),
        "SHAREABLE" => Ok(BoardKind::Shareable),
        other => Err(DbError::Query(format!("unknown board kind: {other}"))),
    }
}

pub(crate) fn board_kind_to_string(kind: BoardKind) -> &'static str {
    match kind {
        BoardKind::Main => "MAIN",
        BoardKind::Private => "PRIVATE",
        BoardKind::Shareable => "SHAREABLE",
    }
}

#[derive(Debug, SurrealValue)]
struct BoardRow {
    workspace_id: String,
    name: String,
    description: Option<String>,
    kind: String,
    settings: serde_json::Value,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct BoardRowWithId {
    record_id: String,
    workspace_id: String,
    name: String,
    description: Option<String>,
    kind: String,
    settings: serde_json::Value,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BoardRow {
    fn into_board(self, id: Uuid) -> Result<Board, DbError> {
        Ok(Board {
            id,
            workspace_id: parse_uuid(&self.workspace_id, "workspace")?,
            name: self.name,
            description: self.description,
            kind: parse_board_kind(&self.kind)?,
            settings: self.settings,
            created_by: parse_uuid(&self.created_by, "user")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl BoardRowWithId {
    fn try_into_board(self) -> Result<Board, DbError> {
        let id = parse_uuid(&self.record_id, "board")?;
        BoardRow {
            workspace_id: self.workspace_id,
            name: self.name,
            description: self.description,
            kind: self.kind,
            settings: self.settings,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_board(id)
    }
}

/// Settings for the default Status column.
fn default_status_settings() -> serde_json::Value {
    json!({
        "labels": [
            { "id": "1", "value": "To Do", "color": "#e2445c" },
            { "id": "2", "value": "In Progress", "color": "#fdab3d" },
            { "id": "3", "value": "Done", "color": "#00c875" },
        ]
    })
}

impl<C: Connection> BoardRepository for SurrealStore<C> {
    async fn create_board(&self, input: CreateBoard) -> QuadroResult<Board> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // Board plus default columns, group, and view in one
        // transaction; nested records get fresh UUID record ids.
        let mut result = self
            .db()
            .query(
                "BEGIN TRANSACTION;
                 CREATE type::record('board', $id) SET \
                     workspace_id = $workspace_id, \
                     name = $name, \
                     description = $description, \
                     kind = $kind, \
                     created_by = $created_by;
                 CREATE type::record('column', <string> rand::uuid::v4()) SET \
                     board_id = $id, title = 'Name', kind = 'TEXT', \
                     position = 0, width = 200, settings = {};
                 CREATE type::record('column', <string> rand::uuid::v4()) SET \
                     board_id = $id, title = 'Status', kind = 'STATUS', \
                     position = 1, width = 150, \
                     settings = $status_settings;
                 CREATE type::record('column', <string> rand::uuid::v4()) SET \
                     board_id = $id, title = 'Person', kind = 'PERSON', \
                     position = 2, width = 150, settings = {};
                 CREATE type::record('column', <string> rand::uuid::v4()) SET \
                     board_id = $id, title = 'Date', kind = 'DATE', \
                     position = 3, width = 150, settings = {};
                 CREATE type::record('board_group', <string> rand::uuid::v4()) SET \
                     board_id = $id, title = 'New Group', \
                     color = '#579bfc', position = 0;
                 CREATE type::record('board_view', <string> rand::uuid::v4()) SET \
                     board_id = $id, name = 'Main Table', kind = 'TABLE', \
                     is_default = true;
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("workspace_id", input.workspace_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("kind", board_kind_to_string(input.kind).to_string()))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("status_settings", default_status_settings()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        // Statement 0 is BEGIN TRANSACTION; the board CREATE is 1.
        let rows: Vec<BoardRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "board".into(),
            id: id_str,
        })?;
        row.into_board(id).map_err(Into::into)
    }

    async fn board_by_id(&self, id: Uuid) -> QuadroResult<Board> {
        let id_str = id.to_string();
        let mut result = self
            .db()
            .query("SELECT * FROM type::record('board', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BoardRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "board".into(),
            id: id_str,
        })?;
        row.into_board(id).map_err(Into::into)
    }

    async fn boards_by_workspace(&self, workspace_id: Uuid) -> QuadroResult<Vec<Board>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM board \
                 WHERE workspace_id = $workspace_id \
                 ORDER BY created_at DESC",
            )
            .bind(("workspace_id", workspace_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BoardRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_board().map_err(QuadroError::from))
            .collect()
    }

    async fn update_board(&self, id: Uuid, input: UpdateBoard) -> QuadroResult<Board> {
        let id_str = id.to_string();

        let mut sets = vec!["updated_at = time::now()".to_string()];
        if input.name.is_some() {
            sets.push("name = $name".into());
        }
        if input.description.is_some() {
            sets.push("description = $description".into());
        }
        if input.settings.is_some() {
            sets.push("settings = $settings".into());
        }

        let sql = format!(
            "UPDATE type::record('board', $id) SET {}",
            sets.join(", ")
        );

        let mut query = self.db().query(sql).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            query = query.bind(("name", name));
        }
        if let Some(description) = input.description {
            query = query.bind(("description", description));
        }
        if let Some(settings) = input.settings {
            query = query.bind(("settings", settings));
        }

        let mut result = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BoardRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "board".into(),
            id: id_str,
        })?;
        row.into_board(id).map_err(Into::into)
    }

    async fn search_boards(
        &self,
        workspace_ids: &[Uuid],
        query: &str,
        limit: u64,
    ) -> QuadroResult<Vec<Board>> {
        let ids: Vec<String> = workspace_ids.iter().map(|id| id.to_string()).collect();
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM board \
                 WHERE workspace_id IN $workspace_ids \
                 AND (string::contains(string::lowercase(name), $q) \
                 OR string::contains(string::lowercase(description ?? ''), $q)) \
                 LIMIT $limit",
            )
            .bind(("workspace_ids", ids))
            .bind(("q", query.to_lowercase()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BoardRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_board().map_err(QuadroError::from))
            .collect()
    }
}
