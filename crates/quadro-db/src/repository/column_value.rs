//! SurrealDB implementation of [`ColumnValueRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::column_value::ColumnValue;
use quadro_core::repository::ColumnValueRepository;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ColumnValueRowWithId {
    record_id: String,
    item_id: String,
    column_id: String,
    value: serde_json::Value,
    last_modified_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ColumnValueRowWithId {
    fn try_into_column_value(self) -> Result<ColumnValue, DbError> {
        Ok(ColumnValue {
            id: parse_uuid(&self.record_id, "column value")?,
            item_id: parse_uuid(&self.item_id, "item")?,
            column_id: parse_uuid(&self.column_id, "column")?,
            value: self.value,
            last_modified_by: parse_uuid(&self.last_modified_by, "user")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl<C: Connection> ColumnValueRepository for SurrealStore<C> {
    async fn upsert_column_value(
        &self,
        item_id: Uuid,
        column_id: Uuid,
        value: serde_json::Value,
        actor_id: Uuid,
    ) -> QuadroResult<ColumnValue> {
        // Update-or-create inside one transaction so the unique
        // (item, column) index never sees two inserts race.
        let mut result = self
            .db()
            .query(
                "BEGIN TRANSACTION;
                 LET $existing = (SELECT VALUE meta::id(id) FROM column_value \
                     WHERE item_id = $item_id AND column_id = $column_id \
                     LIMIT 1);
                 IF array::len($existing) == 0 {
                     CREATE type::record('column_value', <string> rand::uuid::v4()) SET \
                         item_id = $item_id, column_id = $column_id, \
                         value = $value, last_modified_by = $actor_id
                 } ELSE {
                     UPDATE type::record('column_value', $existing[0]) SET \
                         value = $value, last_modified_by = $actor_id, \
                         updated_at = time::now()
                 };
                 SELECT *, meta::id(id) AS record_id FROM column_value \
                     WHERE item_id = $item_id AND column_id = $column_id \
                     LIMIT 1;
                 COMMIT TRANSACTION;",
            )
            .bind(("item_id", item_id.to_string()))
            .bind(("column_id", column_id.to_string()))
            .bind(("value", value))
            .bind(("actor_id", actor_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        // BEGIN(0), LET(1), IF(2); the SELECT is statement 3.
        let rows: Vec<ColumnValueRowWithId> = result.take(3).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "column_value".into(),
            id: format!("{item_id}/{column_id}"),
        })?;
        row.try_into_column_value().map_err(Into::into)
    }

    async fn column_values_by_item(&self, item_id: Uuid) -> QuadroResult<Vec<ColumnValue>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM column_value \
                 WHERE item_id = $item_id",
            )
            .bind(("item_id", item_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ColumnValueRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_column_value().map_err(QuadroError::from))
            .collect()
    }
}
