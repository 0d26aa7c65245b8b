//! SurrealDB implementation of [`NotificationRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::notification::{CreateNotification, Notification, NotificationKind};
use quadro_core::repository::NotificationRepository;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, parse_uuid};

pub(crate) fn parse_notification_kind(s: &str) -> Result<NotificationKind, DbError> {
    match s {
        "MENTION" => Ok(NotificationKind::Mention),
        other => Err(DbError::Query(format!("unknown notification kind: {other}"))),
    }
}

#[derive(Debug, SurrealValue)]
struct NotificationRow {
    user_id: String,
    kind: String,
    title: String,
    body: String,
    data: serde_json::Value,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct NotificationRowWithId {
    record_id: String,
    user_id: String,
    kind: String,
    title: String,
    body: String,
    data: serde_json::Value,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self, id: Uuid) -> Result<Notification, DbError> {
        Ok(Notification {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            kind: parse_notification_kind(&self.kind)?,
            title: self.title,
            body: self.body,
            data: self.data,
            is_read: self.is_read,
            read_at: self.read_at,
            created_at: self.created_at,
        })
    }
}

impl<C: Connection> NotificationRepository for SurrealStore<C> {
    async fn create_notification(&self, input: CreateNotification) -> QuadroResult<Notification> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut result = self
            .db()
            .query(
                "CREATE type::record('notification', $id) SET \
                 user_id = $user_id, kind = $kind, title = $title, \
                 body = $body, data = $data",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("title", input.title))
            .bind(("body", input.body))
            .bind(("data", input.data))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;
        row.into_notification(id).map_err(Into::into)
    }

    async fn notifications_for_user(&self, user_id: Uuid) -> QuadroResult<Vec<Notification>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM notification \
                 WHERE user_id = $user_id ORDER BY created_at DESC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NotificationRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| {
                let id = parse_uuid(&r.record_id, "notification")?;
                NotificationRow {
                    user_id: r.user_id,
                    kind: r.kind,
                    title: r.title,
                    body: r.body,
                    data: r.data,
                    is_read: r.is_read,
                    read_at: r.read_at,
                    created_at: r.created_at,
                }
                .into_notification(id)
                .map_err(QuadroError::from)
            })
            .collect()
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> QuadroResult<Notification> {
        let id_str = id.to_string();

        // The WHERE clause scopes the write to the owner; marking
        // someone else's notification matches nothing.
        let mut result = self
            .db()
            .query(
                "UPDATE type::record('notification', $id) SET \
                 is_read = true, read_at = time::now() \
                 WHERE user_id = $user_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;
        row.into_notification(id).map_err(Into::into)
    }
}
