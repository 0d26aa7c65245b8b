//! SurrealDB implementation of [`GroupRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::group::{CreateGroup, Group};
use quadro_core::repository::GroupRepository;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, parse_uuid};

#[derive(Debug, SurrealValue)]
struct GroupRow {
    board_id: String,
    title: String,
    color: Option<String>,
    position: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct GroupRowWithId {
    record_id: String,
    board_id: String,
    title: String,
    color: Option<String>,
    position: i64,
    created_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self, id: Uuid) -> Result<Group, DbError> {
        Ok(Group {
            id,
            board_id: parse_uuid(&self.board_id, "board")?,
            title: self.title,
            color: self.color,
            position: self.position,
            created_at: self.created_at,
        })
    }
}

impl GroupRowWithId {
    fn try_into_group(self) -> Result<Group, DbError> {
        let id = parse_uuid(&self.record_id, "group")?;
        GroupRow {
            board_id: self.board_id,
            title: self.title,
            color: self.color,
            position: self.position,
            created_at: self.created_at,
        }
        .into_group(id)
    }
}

impl<C: Connection> GroupRepository for SurrealStore<C> {
    async fn create_group(&self, board_id: Uuid, input: CreateGroup) -> QuadroResult<Group> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let sql = match input.position {
            Some(_) => {
                "CREATE type::record('board_group', $id) SET \
                 board_id = $board_id, title = $title, color = $color, \
                 position = $position"
            }
            None => {
                "BEGIN TRANSACTION;
                 LET $last = (SELECT VALUE position FROM board_group \
                     WHERE board_id = $board_id \
                     ORDER BY position DESC LIMIT 1);
                 LET $pos = IF array::len($last) == 0 { 0 } \
                     ELSE { $last[0] + 1 };
                 CREATE type::record('board_group', $id) SET \
                     board_id = $board_id, title = $title, color = $color, \
                     position = $pos;
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
            .bind(("color", input.color));
        if let Some(position) = input.position {
            query = query.bind(("position", position));
        }

        let mut result = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GroupRow> = result.take(take_index).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "group".into(),
            id: id_str,
        })?;
        row.into_group(id).map_err(Into::into)
    }

    async fn groups_by_board(&self, board_id: Uuid) -> QuadroResult<Vec<Group>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM board_group \
                 WHERE board_id = $board_id ORDER BY position ASC",
            )
            .bind(("board_id", board_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_group().map_err(QuadroError::from))
            .collect()
    }
}
