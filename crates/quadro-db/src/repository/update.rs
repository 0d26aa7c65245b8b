//! SurrealDB implementation of [`UpdateRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::update::{CreateUpdate, Update};
use quadro_core::models::user::User;
use quadro_core::repository::UpdateRepository;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, parse_uuid};

#[derive(Debug, SurrealValue)]
struct UpdateRow {
    item_id: String,
    user_id: String,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct UpdateRowWithId {
    record_id: String,
    item_id: String,
    user_id: String,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct MentionedUserRow {
    record_id: String,
    email: String,
    name: String,
    password_hash: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UpdateRow {
    fn into_update(self, id: Uuid) -> Result<Update, DbError> {
        Ok(Update {
            id,
            item_id: parse_uuid(&self.item_id, "item")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            body: self.body,
            created_at: self.created_at,
        })
    }
}

impl<C: Connection> UpdateRepository for SurrealStore<C> {
    async fn create_update(&self, input: CreateUpdate) -> QuadroResult<Update> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mentions: Vec<String> = input
            .mention_user_ids
            .iter()
            .map(|u| u.to_string())
            .collect();

        let mut result = self
            .db()
            .query(
                "BEGIN TRANSACTION;
                 CREATE type::record('item_update', $id) SET \
                     item_id = $item_id, user_id = $user_id, body = $body;
                 FOR $mentioned IN $mentions {
                     CREATE type::record('mention', <string> rand::uuid::v4()) SET \
                         update_id = $id, mentioned_user_id = $mentioned;
                 };
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("item_id", input.item_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("body", input.body))
            .bind(("mentions", mentions))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        // Statement 0 is BEGIN TRANSACTION; the item_update CREATE is 1.
        let rows: Vec<UpdateRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "update".into(),
            id: id_str,
        })?;
        row.into_update(id).map_err(Into::into)
    }

    async fn updates_by_item(&self, item_id: Uuid) -> QuadroResult<Vec<Update>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM item_update \
                 WHERE item_id = $item_id ORDER BY created_at DESC",
            )
            .bind(("item_id", item_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UpdateRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| {
                let id = parse_uuid(&r.record_id, "update")?;
                UpdateRow {
                    item_id: r.item_id,
                    user_id: r.user_id,
                    body: r.body,
                    created_at: r.created_at,
                }
                .into_update(id)
                .map_err(QuadroError::from)
            })
            .collect()
    }

    async fn update_mentions(&self, update_id: Uuid) -> QuadroResult<Vec<User>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM user \
                 WHERE meta::id(id) IN (SELECT VALUE mentioned_user_id \
                     FROM mention WHERE update_id = $update_id)",
            )
            .bind(("update_id", update_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<MentionedUserRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| {
                Ok(User {
                    id: parse_uuid(&r.record_id, "user")?,
                    email: r.email,
                    name: r.name,
                    password_hash: r.password_hash,
                    avatar_url: r.avatar_url,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
