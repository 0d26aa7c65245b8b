//! SurrealDB implementation of [`ItemRepository`].
//!
//! Item creation computes the position inside the insert transaction
//! when the caller does not supply one, and retries on transaction
//! conflict, so concurrent creations under the same group can never be
//! assigned the same position.

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::item::{CreateItem, Item, UpdateItem};
use quadro_core::repository::{ItemRepository, Page, Pagination};
use serde_json::json;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, is_retryable, parse_uuid};

const CREATE_RETRY_LIMIT: u32 = 5;

#[derive(Debug, SurrealValue)]
struct ItemRow {
    board_id: String,
    group_id: String,
    name: String,
    position: i64,
    parent_item_id: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ItemRowWithId {
    record_id: String,
    board_id: String,
    group_id: String,
    name: String,
    position: i64,
    parent_item_id: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

impl ItemRow {
    fn into_item(self, id: Uuid) -> Result<Item, DbError> {
        let parent_item_id = self
            .parent_item_id
            .as_deref()
            .map(|s| parse_uuid(s, "parent item"))
            .transpose()?;
        Ok(Item {
            id,
            board_id: parse_uuid(&self.board_id, "board")?,
            group_id: parse_uuid(&self.group_id, "group")?,
            name: self.name,
            position: self.position,
            parent_item_id,
            created_by: parse_uuid(&self.created_by, "user")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ItemRowWithId {
    fn try_into_item(self) -> Result<Item, DbError> {
        let id = parse_uuid(&self.record_id, "item")?;
        ItemRow {
            board_id: self.board_id,
            group_id: self.group_id,
            name: self.name,
            position: self.position,
            parent_item_id: self.parent_item_id,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_item(id)
    }
}

impl<C: Connection> SurrealStore<C> {
    async fn try_create_item(&self, input: &CreateItem) -> Result<Item, DbError> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let sql = match input.position {
            Some(_) => {
                "BEGIN TRANSACTION;
                 CREATE type::record('item', $id) SET \
                     board_id = $board_id, group_id = $group_id, \
                     name = $name, position = $position, \
                     parent_item_id = $parent_item_id, \
                     created_by = $created_by;
                 FOR $cv IN $column_values {
                     CREATE type::record('column_value', <string> rand::uuid::v4()) SET \
                         item_id = $id, column_id = $cv.column_id, \
                         value = $cv.value, last_modified_by = $created_by;
                 };
                 COMMIT TRANSACTION;"
            }
            None => {
                "BEGIN TRANSACTION;
                 LET $last = (SELECT VALUE position FROM item \
                     WHERE group_id = $group_id \
                     ORDER BY position DESC LIMIT 1);
                 LET $pos = IF array::len($last) == 0 { 0 } \
                     ELSE { $last[0] + 1 };
                 CREATE type::record('item', $id) SET \
                     board_id = $board_id, group_id = $group_id, \
                     name = $name, position = $pos, \
                     parent_item_id = $parent_item_id, \
                     created_by = $created_by;
                 FOR $cv IN $column_values {
                     CREATE type::record('column_value', <string> rand::uuid::v4()) SET \
                         item_id = $id, column_id = $cv.column_id, \
                         value = $cv.value, last_modified_by = $created_by;
                 };
                 COMMIT TRANSACTION;"
            }
        };
        // BEGIN is statement 0; the item CREATE is at 1, or at 3 after
        // the two position-computing LETs.
        let take_index = if input.position.is_some() { 1 } else { 3 };

        let column_values: Vec<serde_json::Value> = input
            .column_values
            .iter()
            .map(|cv| {
                json!({
                    "column_id": cv.column_id.to_string(),
                    "value": cv.value,
                })
            })
            .collect();

        let mut query = self
            .db()
            .query(sql)
            .bind(("id", id_str.clone()))
            .bind(("board_id", input.board_id.to_string()))
            .bind(("group_id", input.group_id.to_string()))
            .bind(("name", input.name.clone()))
            .bind((
                "parent_item_id",
                input.parent_item_id.map(|p| p.to_string()),
            ))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("column_values", column_values));
        if let Some(position) = input.position {
            query = query.bind(("position", position));
        }

        let mut result = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ItemRow> = result.take(take_index)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "item".into(),
            id: id_str,
        })?;
        row.into_item(id)
    }
}

impl<C: Connection> ItemRepository for SurrealStore<C> {
    async fn create_item(&self, input: CreateItem) -> QuadroResult<Item> {
        let mut attempt = 0;
        loop {
            match self.try_create_item(&input).await {
                Ok(item) => return Ok(item),
                Err(e) if is_retryable(&e) && attempt < CREATE_RETRY_LIMIT => {
                    attempt += 1;
                    tracing::debug!(attempt, "retrying item creation after conflict");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn item_by_id(&self, id: Uuid) -> QuadroResult<Item> {
        let id_str = id.to_string();
        let mut result = self
            .db()
            .query("SELECT * FROM type::record('item', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ItemRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "item".into(),
            id: id_str,
        })?;
        row.into_item(id).map_err(Into::into)
    }

    async fn update_item(&self, id: Uuid, input: UpdateItem) -> QuadroResult<Item> {
        let id_str = id.to_string();

        let mut sets = vec!["updated_at = time::now()".to_string()];
        if input.name.is_some() {
            sets.push("name = $name".into());
        }
        if input.group_id.is_some() {
            sets.push("group_id = $group_id".into());
        }
        if input.position.is_some() {
            sets.push("position = $position".into());
        }

        let sql = format!("UPDATE type::record('item', $id) SET {}", sets.join(", "));

        let mut query = self.db().query(sql).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            query = query.bind(("name", name));
        }
        if let Some(group_id) = input.group_id {
            query = query.bind(("group_id", group_id.to_string()));
        }
        if let Some(position) = input.position {
            query = query.bind(("position", position));
        }

        let mut result = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ItemRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "item".into(),
            id: id_str,
        })?;
        row.into_item(id).map_err(Into::into)
    }

    async fn delete_item(&self, id: Uuid) -> QuadroResult<()> {
        // Cascade to the item's cells, comments (and their mention
        // rows), audit trail, and direct subitems. Notifications are
        // inbox entries and stay.
        self.db()
            .query(
                "BEGIN TRANSACTION;
                 DELETE column_value WHERE item_id = $id;
                 DELETE mention WHERE update_id IN \
                     (SELECT VALUE meta::id(id) FROM item_update \
                      WHERE item_id = $id);
                 DELETE item_update WHERE item_id = $id;
                 DELETE activity WHERE item_id = $id;
                 DELETE item WHERE parent_item_id = $id;
                 DELETE type::record('item', $id);
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    async fn items_page(
        &self,
        board_id: Uuid,
        group_id: Option<Uuid>,
        page: Pagination,
    ) -> QuadroResult<Page<Item>> {
        let group_filter = if group_id.is_some() {
            "AND group_id = $group_id "
        } else {
            ""
        };
        let sql = format!(
            "SELECT *, meta::id(id) AS record_id FROM item \
                 WHERE board_id = $board_id {group_filter}\
                 ORDER BY position ASC LIMIT $limit START $offset;
             SELECT count() AS total FROM item \
                 WHERE board_id = $board_id {group_filter}GROUP ALL"
        );

        let mut query = self
            .db()
            .query(sql)
            .bind(("board_id", board_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset));
        if let Some(group_id) = group_id {
            query = query.bind(("group_id", group_id.to_string()));
        }

        let mut result = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ItemRowWithId> = result.take(0).map_err(DbError::from)?;
        let counts: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        let total_count = counts.first().map(|c| c.total).unwrap_or(0);

        let items: Vec<Item> = rows
            .into_iter()
            .map(|r| r.try_into_item().map_err(QuadroError::from))
            .collect::<QuadroResult<_>>()?;

        let has_more = page.offset + (items.len() as u64) < total_count;
        Ok(Page {
            items,
            total_count,
            has_more,
        })
    }

    async fn subitems(&self, parent_item_id: Uuid) -> QuadroResult<Vec<Item>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM item \
                 WHERE parent_item_id = $parent_item_id \
                 ORDER BY position ASC",
            )
            .bind(("parent_item_id", parent_item_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ItemRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_item().map_err(QuadroError::from))
            .collect()
    }

    async fn search_items(
        &self,
        workspace_ids: &[Uuid],
        query: &str,
        limit: u64,
    ) -> QuadroResult<Vec<Item>> {
        let ids: Vec<String> = workspace_ids.iter().map(|id| id.to_string()).collect();
        let mut result = self
            .db()
            .query(
                "LET $boards = (SELECT VALUE meta::id(id) FROM board \
                     WHERE workspace_id IN $workspace_ids);
                 SELECT *, meta::id(id) AS record_id FROM item \
                     WHERE board_id IN $boards \
                     AND string::contains(string::lowercase(name), $q) \
                     LIMIT $limit",
            )
            .bind(("workspace_ids", ids))
            .bind(("q", query.to_lowercase()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ItemRowWithId> = result.take(1).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_item().map_err(QuadroError::from))
            .collect()
    }
}
