//! SurrealDB implementation of [`WorkspaceRepository`].

use chrono::{DateTime, Utc};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::workspace::{CreateWorkspace, UpdateWorkspace, Workspace};
use quadro_core::repository::WorkspaceRepository;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{SurrealStore, map_unique_violation};

#[derive(Debug, SurrealValue)]
struct WorkspaceRow {
    name: String,
    slug: String,
    logo_url: Option<String>,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkspaceRow {
    fn into_workspace(self, id: Uuid) -> Workspace {
        Workspace {
            id,
            name: self.name,
            slug: self.slug,
            logo_url: self.logo_url,
            settings: self.settings,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl<C: Connection> WorkspaceRepository for SurrealStore<C> {
    async fn create_workspace(
        &self,
        input: CreateWorkspace,
        admin_user_id: Uuid,
    ) -> QuadroResult<Workspace> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let membership_id = Uuid::new_v4().to_string();

        // Workspace and creator's ADMIN membership in one transaction.
        let result = self
            .db()
            .query(
                "BEGIN TRANSACTION;
                 CREATE type::record('workspace', $id) SET \
                     name = $name, \
                     slug = $slug, \
                     logo_url = $logo_url;
                 CREATE type::record('membership', $membership_id) SET \
                     user_id = $user_id, \
                     workspace_id = $id, \
                     role = 'ADMIN';
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("membership_id", membership_id))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("logo_url", input.logo_url))
            .bind(("user_id", admin_user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()));

        let mut result = match result {
            Ok(r) => r,
            Err(e) => {
                return Err(map_unique_violation(
                    e,
                    "idx_workspace_slug",
                    QuadroError::SlugExists,
                ));
            }
        };

        // Statement 0 is BEGIN TRANSACTION; the workspace CREATE is 1.
        let rows: Vec<WorkspaceRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workspace".into(),
            id: id_str,
        })?;
        Ok(row.into_workspace(id))
    }

    async fn workspace_by_id(&self, id: Uuid) -> QuadroResult<Workspace> {
        let id_str = id.to_string();
        let mut result = self
            .db()
            .query("SELECT * FROM type::record('workspace', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<WorkspaceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workspace".into(),
            id: id_str,
        })?;
        Ok(row.into_workspace(id))
    }

    async fn update_workspace(&self, id: Uuid, input: UpdateWorkspace) -> QuadroResult<Workspace> {
        let id_str = id.to_string();

        let mut sets = vec!["updated_at = time::now()".to_string()];
        if input.name.is_some() {
            sets.push("name = $name".into());
        }
        if input.logo_url.is_some() {
            sets.push("logo_url = $logo_url".into());
        }
        if input.settings.is_some() {
            sets.push("settings = $settings".into());
        }

        let sql = format!(
            "UPDATE type::record('workspace', $id) SET {}",
            sets.join(", ")
        );

        let mut query = self.db().query(sql).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            query = query.bind(("name", name));
        }
        if let Some(logo_url) = input.logo_url {
            query = query.bind(("logo_url", logo_url));
        }
        if let Some(settings) = input.settings {
            query = query.bind(("settings", settings));
        }

        let mut result = query
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<WorkspaceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workspace".into(),
            id: id_str,
        })?;
        Ok(row.into_workspace(id))
    }

    async fn delete_workspace(&self, id: Uuid) -> QuadroResult<()> {
        // Cascade through the full hierarchy in one transaction.
        self.db()
            .query(
                "BEGIN TRANSACTION;
                 LET $boards = (SELECT VALUE meta::id(id) FROM board \
                     WHERE workspace_id = $id);
                 LET $items = (SELECT VALUE meta::id(id) FROM item \
                     WHERE board_id IN $boards);
                 DELETE column_value WHERE item_id IN $items;
                 DELETE item_update WHERE item_id IN $items;
                 DELETE activity WHERE item_id IN $items;
                 DELETE item WHERE board_id IN $boards;
                 DELETE column WHERE board_id IN $boards;
                 DELETE board_group WHERE board_id IN $boards;
                 DELETE board_view WHERE board_id IN $boards;
                 DELETE automation WHERE board_id IN $boards;
                 DELETE board WHERE workspace_id = $id;
                 DELETE membership WHERE workspace_id = $id;
                 DELETE type::record('workspace', $id);
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }
}
