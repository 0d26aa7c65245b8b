//! SurrealDB implementation of [`MembershipRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::membership::{CreateMembership, Membership, Role, WorkspaceMember};
use quadro_core::models::user::User;
use quadro_core::repository::MembershipRepository;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, map_unique_violation, parse_uuid};

pub(crate) fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "ADMIN" => Ok(Role::Admin),
        "MEMBER" => Ok(Role::Member),
        "VIEWER" => Ok(Role::Viewer),
        "GUEST" => Ok(Role::Guest),
        other => Err(DbError::Query(format!("unknown role: {other}"))),
    }
}

pub(crate) fn role_to_string(role: Role) -> &'static str {
    match role {
        Role::Admin => "ADMIN",
        Role::Member => "MEMBER",
        Role::Viewer => "VIEWER",
        Role::Guest => "GUEST",
    }
}

#[derive(Debug, SurrealValue)]
struct MembershipRow {
    user_id: String,
    workspace_id: String,
    role: String,
    joined_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct MembershipRowWithId {
    record_id: String,
    user_id: String,
    workspace_id: String,
    role: String,
    joined_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct MemberUserRow {
    record_id: String,
    email: String,
    name: String,
    password_hash: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self, id: Uuid) -> Result<Membership, DbError> {
        Ok(Membership {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            workspace_id: parse_uuid(&self.workspace_id, "workspace")?,
            role: parse_role(&self.role)?,
            joined_at: self.joined_at,
        })
    }
}

impl MembershipRowWithId {
    fn try_into_membership(self) -> Result<Membership, DbError> {
        Ok(Membership {
            id: parse_uuid(&self.record_id, "membership")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            workspace_id: parse_uuid(&self.workspace_id, "workspace")?,
            role: parse_role(&self.role)?,
            joined_at: self.joined_at,
        })
    }
}

impl<C: Connection> MembershipRepository for SurrealStore<C> {
    async fn create_membership(&self, input: CreateMembership) -> QuadroResult<Membership> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db()
            .query(
                "CREATE type::record('membership', $id) SET \
                 user_id = $user_id, \
                 workspace_id = $workspace_id, \
                 role = $role",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("workspace_id", input.workspace_id.to_string()))
            .bind(("role", role_to_string(input.role).to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()));

        let mut result = match result {
            Ok(r) => r,
            Err(e) => {
                return Err(map_unique_violation(
                    e,
                    "idx_membership_user_workspace",
                    QuadroError::AlreadyMember,
                ));
            }
        };

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            id: id_str,
        })?;
        row.into_membership(id).map_err(Into::into)
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> QuadroResult<Option<Membership>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM membership \
                 WHERE user_id = $user_id AND workspace_id = $workspace_id \
                 LIMIT 1",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("workspace_id", workspace_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|r| r.try_into_membership().map_err(QuadroError::from))
            .transpose()
    }

    async fn memberships_for_user(&self, user_id: Uuid) -> QuadroResult<Vec<Membership>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM membership \
                 WHERE user_id = $user_id ORDER BY joined_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|r| r.try_into_membership().map_err(QuadroError::from))
            .collect()
    }

    async fn workspace_members(&self, workspace_id: Uuid) -> QuadroResult<Vec<WorkspaceMember>> {
        let mut result = self
            .db()
            .query(
                "SELECT *, meta::id(id) AS record_id FROM membership \
                     WHERE workspace_id = $workspace_id ORDER BY joined_at ASC;
                 LET $uids = (SELECT VALUE user_id FROM membership \
                     WHERE workspace_id = $workspace_id);
                 SELECT *, meta::id(id) AS record_id FROM user \
                     WHERE meta::id(id) IN $uids",
            )
            .bind(("workspace_id", workspace_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let memberships: Vec<MembershipRowWithId> = result.take(0).map_err(DbError::from)?;
        let users: Vec<MemberUserRow> = result.take(2).map_err(DbError::from)?;

        let mut members = Vec::with_capacity(memberships.len());
        for row in memberships {
            let membership = row.try_into_membership()?;
            let Some(user_row) = users.iter().find(|u| {
                parse_uuid(&u.record_id, "user")
                    .map(|id| id == membership.user_id)
                    .unwrap_or(false)
            }) else {
                // Dangling membership; skip rather than fail the list.
                continue;
            };
            members.push(WorkspaceMember {
                user: User {
                    id: membership.user_id,
                    email: user_row.email.clone(),
                    name: user_row.name.clone(),
                    password_hash: user_row.password_hash.clone(),
                    avatar_url: user_row.avatar_url.clone(),
                    created_at: user_row.created_at,
                    updated_at: user_row.updated_at,
                },
                role: membership.role,
                joined_at: membership.joined_at,
            });
        }
        Ok(members)
    }
}
