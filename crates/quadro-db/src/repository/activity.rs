//! SurrealDB implementation of [`ActivityRepository`].
//!
//! The activity table is append-only; nothing here issues UPDATE or
//! standalone DELETE against it.

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::activity::{Activity, ActivityKind, CreateActivity};
use quadro_core::repository::ActivityRepository;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, parse_uuid};

pub(crate) fn parse_activity_kind(s: &str) -> Result<ActivityKind, DbError> {
    match s {
        "ITEM_CREATED" => Ok(ActivityKind::ItemCreated),
        "ITEM_UPDATED" => Ok(ActivityKind::ItemUpdated),
        "ITEM_DELETED" => Ok(ActivityKind::ItemDeleted),
        "COLUMN_VALUE_UPDATED" => Ok(ActivityKind::ColumnValueUpdated),
        "UPDATE_POSTED" => Ok(ActivityKind::UpdatePosted),
        other => Err(DbError::Query(format!("unknown activity kind: {other}"))),
    }
}

#[derive(Debug, SurrealValue)]
struct ActivityRow {
    item_id: String,
    actor_id: String,
    kind: String,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ActivityRowWithId {
    record_id: String,
    item_id: String,
    actor_id: String,
    kind: String,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl ActivityRow {
    fn into_activity(self, id: Uuid) -> Result<Activity, DbError> {
        Ok(Activity {
            id,
            item_id: parse_uuid(&self.item_id, "item")?,
            actor_id: parse_uuid(&self.actor_id, "user")?,
            kind: parse_activity_kind(&self.kind)?,
            data: self.data,
            created_at: self.created_at,
        })
    }
}

impl<C: Connection> ActivityRepository for SurrealStore<C> {
    async fn append_activity(&self, input: CreateActivity) -> QuadroResult<Activity> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut result = self
            .db()
            .query(
                "CREATE type::record('activity', $id) SET \
                 item_id = $item_id, actor_id = $actor_id, \
                 kind = $kind, data = $data",
            )
            .bind(("id", id_str.clone()))
            .bind(("item_id", input.item_id.to_string()))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("data", input.data))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ActivityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "activity".into(),
            id: id_str,
        })?;
        row.into_activity(id).map_err(Into::into)
    }

    async fn activities_by_item(&self, item_id: Uuid) -> QuadroResult<Vec<Activity>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM activity \
                 WHERE item_id = $item_id ORDER BY created_at DESC",
            )
            .bind(("item_id", item_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ActivityRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| {
                let id = parse_uuid(&r.record_id, "activity")?;
                ActivityRow {
                    item_id: r.item_id,
                    actor_id: r.actor_id,
                    kind: r.kind,
                    data: r.data,
                    created_at: r.created_at,
                }
                .into_activity(id)
                .map_err(QuadroError::from)
            })
            .collect()
    }
}
