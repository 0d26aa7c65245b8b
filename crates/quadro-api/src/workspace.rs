//! Workspace operations: create, read, update, delete, and member
//! management.

use quadro_core::access::{AccessLevel, Identity, ResourceRef, authorize};
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::membership::{CreateMembership, Membership, Role, WorkspaceMember};
use quadro_core::models::workspace::{CreateWorkspace, UpdateWorkspace, Workspace};
use quadro_core::repository::Store;
use uuid::Uuid;

use crate::api::Api;
use crate::input::{CreateWorkspaceRequest, InviteMemberRequest, UpdateWorkspaceRequest};

impl<S: Store + Clone> Api<S> {
    /// Create a workspace; the creator becomes its ADMIN.
    ///
    /// The only mutation authorized by identity alone, since there is
    /// no enclosing workspace yet.
    pub async fn create_workspace(
        &self,
        identity: Option<&Identity>,
        request: CreateWorkspaceRequest,
    ) -> QuadroResult<Workspace> {
        request.validate()?;
        let identity = self.identity_required(identity)?;
        self.store()
            .create_workspace(
                CreateWorkspace {
                    name: request.name,
                    slug: request.slug,
                    logo_url: request.logo_url,
                },
                identity.id,
            )
            .await
    }

    /// Every workspace the caller is a member of.
    pub async fn my_workspaces(&self, identity: Option<&Identity>) -> QuadroResult<Vec<Workspace>> {
        let identity = self.identity_required(identity)?;
        let memberships = self.store().memberships_for_user(identity.id).await?;
        let mut workspaces = Vec::with_capacity(memberships.len());
        for membership in memberships {
            workspaces.push(self.store().workspace_by_id(membership.workspace_id).await?);
        }
        Ok(workspaces)
    }

    pub async fn workspace(
        &self,
        identity: Option<&Identity>,
        workspace_id: Uuid,
    ) -> QuadroResult<Workspace> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Workspace(workspace_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().workspace_by_id(workspace_id).await
    }

    /// ADMIN only.
    pub async fn update_workspace(
        &self,
        identity: Option<&Identity>,
        request: UpdateWorkspaceRequest,
    ) -> QuadroResult<Workspace> {
        request.validate()?;
        authorize(
            self.store(),
            identity,
            ResourceRef::Workspace(request.workspace_id),
            AccessLevel::Admin,
        )
        .await?;
        self.store()
            .update_workspace(
                request.workspace_id,
                UpdateWorkspace {
                    name: request.name,
                    logo_url: request.logo_url,
                    settings: request.settings,
                },
            )
            .await
    }

    /// ADMIN only. Cascades to every board, item, and membership.
    pub async fn delete_workspace(
        &self,
        identity: Option<&Identity>,
        workspace_id: Uuid,
    ) -> QuadroResult<()> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Workspace(workspace_id),
            AccessLevel::Admin,
        )
        .await?;
        self.store().delete_workspace(workspace_id).await
    }

    /// Add an existing user to a workspace by email.
    ///
    /// Requires ADMIN or MEMBER; viewers and guests cannot invite.
    pub async fn invite_member(
        &self,
        identity: Option<&Identity>,
        request: InviteMemberRequest,
    ) -> QuadroResult<Membership> {
        request.validate()?;
        let membership = authorize(
            self.store(),
            identity,
            ResourceRef::Workspace(request.workspace_id),
            AccessLevel::Read,
        )
        .await?;
        if !matches!(membership.role, Role::Admin | Role::Member) {
            return Err(QuadroError::forbidden("inviting requires ADMIN or MEMBER"));
        }

        let invitee = self
            .store()
            .user_by_email(&request.email)
            .await?
            .ok_or(QuadroError::UserNotFound)?;

        self.store()
            .create_membership(CreateMembership {
                user_id: invitee.id,
                workspace_id: request.workspace_id,
                role: request.role,
            })
            .await
    }

    pub async fn workspace_members(
        &self,
        identity: Option<&Identity>,
        workspace_id: Uuid,
    ) -> QuadroResult<Vec<WorkspaceMember>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Workspace(workspace_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().workspace_members(workspace_id).await
    }
}
