//! User profile operations, the notification inbox, and
//! cross-workspace search.

use quadro_core::access::{AccessLevel, Identity, ResourceRef, authorize};
use quadro_core::error::QuadroResult;
use quadro_core::models::notification::Notification;
use quadro_core::models::user::{UpdateUser, User};
use quadro_core::repository::{SearchResults, Store};
use uuid::Uuid;

use crate::api::Api;
use crate::input::{SearchRequest, UpdateProfileRequest};

impl<S: Store + Clone> Api<S> {
    /// Look up a user by id. Any authenticated caller may resolve
    /// another user's public profile.
    pub async fn user(&self, identity: Option<&Identity>, user_id: Uuid) -> QuadroResult<User> {
        self.identity_required(identity)?;
        self.store().user_by_id(user_id).await
    }

    /// The users of a workspace, without their membership metadata.
    pub async fn users(
        &self,
        identity: Option<&Identity>,
        workspace_id: Uuid,
    ) -> QuadroResult<Vec<User>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Workspace(workspace_id),
            AccessLevel::Read,
        )
        .await?;
        let members = self.store().workspace_members(workspace_id).await?;
        Ok(members.into_iter().map(|m| m.user).collect())
    }

    pub async fn update_profile(
        &self,
        identity: Option<&Identity>,
        request: UpdateProfileRequest,
    ) -> QuadroResult<User> {
        request.validate()?;
        let identity = self.identity_required(identity)?;
        self.store()
            .update_user(
                identity.id,
                UpdateUser {
                    name: request.name,
                    avatar_url: request.avatar_url,
                },
            )
            .await
    }

    /// The caller's notification inbox, newest first.
    pub async fn notifications(
        &self,
        identity: Option<&Identity>,
    ) -> QuadroResult<Vec<Notification>> {
        let identity = self.identity_required(identity)?;
        self.store().notifications_for_user(identity.id).await
    }

    /// Mark one of the caller's notifications as read. Someone else's
    /// notification reads as `NOT_FOUND`.
    pub async fn mark_notification_read(
        &self,
        identity: Option<&Identity>,
        notification_id: Uuid,
    ) -> QuadroResult<Notification> {
        let identity = self.identity_required(identity)?;
        self.store()
            .mark_notification_read(notification_id, identity.id)
            .await
    }

    /// Search boards, items, and users across every workspace the
    /// caller belongs to. Results never cross a workspace boundary the
    /// caller is outside of.
    pub async fn search(
        &self,
        identity: Option<&Identity>,
        request: SearchRequest,
    ) -> QuadroResult<SearchResults> {
        request.validate()?;
        let identity = self.identity_required(identity)?;
        let workspace_ids = match request.workspace_id {
            // Narrowing to one workspace still requires membership of it.
            Some(workspace_id) => {
                authorize(
                    self.store(),
                    Some(identity),
                    ResourceRef::Workspace(workspace_id),
                    AccessLevel::Read,
                )
                .await?;
                vec![workspace_id]
            }
            None => self.accessible_workspaces(identity.id).await?,
        };
        if workspace_ids.is_empty() {
            return Ok(SearchResults {
                boards: Vec::new(),
                items: Vec::new(),
                users: Vec::new(),
            });
        }

        let boards = self
            .store()
            .search_boards(&workspace_ids, &request.query, request.limit)
            .await?;
        let items = self
            .store()
            .search_items(&workspace_ids, &request.query, request.limit)
            .await?;

        // Users are searched per workspace and deduplicated; someone
        // in two shared workspaces appears once.
        let mut users: Vec<User> = Vec::new();
        for workspace_id in &workspace_ids {
            let found = self
                .store()
                .search_users(*workspace_id, &request.query, request.limit)
                .await?;
            for user in found {
                if users.len() as u64 >= request.limit {
                    break;
                }
                if !users.iter().any(|u| u.id == user.id) {
                    users.push(user);
                }
            }
        }

        Ok(SearchResults {
            boards,
            items,
            users,
        })
    }
}
