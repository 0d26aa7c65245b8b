//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::user::{CreateUser, UpdateUser, User};
use quadro_core::repository::UserRepository;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, map_unique_violation, parse_uuid};

#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    name: String,
    password_hash: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    email: String,
    name: String,
    password_hash: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid(&self.record_id, "user")?;
        Ok(User {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl<C: Connection> UserRepository for SurrealStore<C> {
    async fn create_user(&self, input: CreateUser) -> QuadroResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db()
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, \
                 name = $name, \
                 password_hash = $password_hash, \
                 avatar_url = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()));

        let mut result = match result {
            Ok(r) => r,
            Err(e) => {
                return Err(map_unique_violation(
                    e,
                    "idx_user_email",
                    QuadroError::UserExists,
                ));
            }
        };

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;
        Ok(row.into_user(id))
    }

    async fn user_by_id(&self, id: Uuid) -> QuadroResult<User> {
        let id_str = id.to_string();
        let mut result = self
            .db()
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;
        Ok(row.into_user(id))
    }

    async fn user_by_email(&self, email: &str) -> QuadroResult<Option<User>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM user \
                 WHERE email = $email LIMIT 1",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|r| r.try_into_user().map_err(QuadroError::from))
            .transpose()
    }

    async fn update_user(&self, id: Uuid, input: UpdateUser) -> QuadroResult<User> {
        let id_str = id.to_string();

        let mut sets = vec!["updated_at = time::now()".to_string()];
        if input.name.is_some() {
            sets.push("name = $name".into());
        }
        if input.avatar_url.is_some() {
            sets.push("avatar_url = $avatar_url".into());
        }

        let sql = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut query = self.db().query(sql).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            query = query.bind(("name", name));
        }
        if let Some(avatar_url) = input.avatar_url {
            query = query.bind(("avatar_url", avatar_url));
        }

        let mut result = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;
        Ok(row.into_user(id))
    }

    async fn search_users(
        &self,
        workspace_id: Uuid,
        query: &str,
        limit: u64,
    ) -> QuadroResult<Vec<User>> {
        let mut result = self
            .db()
            .query(
                "LET $uids = (SELECT VALUE user_id FROM membership \
                     WHERE workspace_id = $workspace_id);
                 SELECT *, meta::id(id) AS record_id FROM user \
                     WHERE meta::id(id) IN $uids \
                     AND (string::contains(string::lowercase(name), $q) \
                     OR string::contains(string::lowercase(email), $q)) \
                     LIMIT $limit",
            )
            .bind(("workspace_id", workspace_id.to_string()))
            .bind(("q", query.to_lowercase()))
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRowWithId> = result.take(1).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_user().map_err(QuadroError::from))
            .collect()
    }
}
