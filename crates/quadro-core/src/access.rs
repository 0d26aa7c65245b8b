//! The access-control resolver.
//!
//! Every read and write in Quadro is authorized here, nowhere else:
//! callers name the target resource and the level they need, and the
//! resolver walks the resource up to its owning workspace, looks up
//! the caller's membership, and applies the role/level matrix.
//!
//! The walk short-circuits with `NotFound` when the resource or any
//! ancestor is missing, so a missing board is `NOT_FOUND` while a
//! present-but-inaccessible board is `FORBIDDEN` — the two are never
//! conflated.

use uuid::Uuid;

use crate::error::{QuadroError, QuadroResult};
use crate::models::membership::Membership;
use crate::repository::{BoardRepository, ItemRepository, MembershipRepository, WorkspaceRepository};

/// Operation class required by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Read,
    Write,
    Admin,
}

/// A verified caller identity, derived from an access token.
/// Never persisted; only consumed.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// A reference to the resource an operation targets.
#[derive(Debug, Clone, Copy)]
pub enum ResourceRef {
    Workspace(Uuid),
    Board(Uuid),
    Item(Uuid),
}

/// Fail fast with `Unauthenticated` when no identity is present.
///
/// Workspace creation and listing are the only operations that use
/// this alone, without a resource walk.
pub fn require_identity(identity: Option<&Identity>) -> QuadroResult<&Identity> {
    identity.ok_or(QuadroError::Unauthenticated)
}

/// Authorize `identity` for `level` on `resource`.
///
/// Returns the caller's membership so call sites that need more than
/// the generic matrix (e.g. invite requires ADMIN or MEMBER) can
/// inspect the role without a second lookup.
pub async fn authorize<S>(
    store: &S,
    identity: Option<&Identity>,
    resource: ResourceRef,
    level: AccessLevel,
) -> QuadroResult<Membership>
where
    S: MembershipRepository + WorkspaceRepository + BoardRepository + ItemRepository,
{
    let identity = require_identity(identity)?;
    let workspace_id = owning_workspace(store, resource).await?;

    let membership = store
        .find_membership(identity.id, workspace_id)
        .await?
        .ok_or_else(|| QuadroError::forbidden("not a member of this workspace"))?;

    if membership.role.allows(level) {
        Ok(membership)
    } else {
        Err(QuadroError::forbidden("insufficient role"))
    }
}

/// Walk a resource reference up to its owning workspace id.
async fn owning_workspace<S>(store: &S, resource: ResourceRef) -> QuadroResult<Uuid>
where
    S: WorkspaceRepository + BoardRepository + ItemRepository,
{
    match resource {
        ResourceRef::Workspace(id) => {
            let workspace = store.workspace_by_id(id).await?;
            Ok(workspace.id)
        }
        ResourceRef::Board(id) => {
            let board = store.board_by_id(id).await?;
            Ok(board.workspace_id)
        }
        ResourceRef::Item(id) => {
            let item = store.item_by_id(id).await?;
            let board = store.board_by_id(item.board_id).await?;
            Ok(board.workspace_id)
        }
    }
}
