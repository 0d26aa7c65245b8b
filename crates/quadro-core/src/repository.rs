//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Beyond per-entity CRUD these
//! traits expose the composite queries the core needs: membership
//! lookup by (user, workspace), positional inserts that compute
//! max-sibling-position + 1 inside the insert transaction, and
//! create-with-nested-children in one transaction.

use uuid::Uuid;

use crate::error::QuadroResult;
use crate::models::{
    activity::{Activity, CreateActivity},
    automation::Automation,
    board::{Board, CreateBoard, UpdateBoard},
    column::{Column, CreateColumn},
    column_value::ColumnValue,
    group::{CreateGroup, Group},
    item::{CreateItem, Item, UpdateItem},
    membership::{CreateMembership, Membership, WorkspaceMember},
    notification::{CreateNotification, Notification},
    session::{CreateSession, Session},
    update::{CreateUpdate, Update},
    user::{CreateUser, UpdateUser, User},
    view::View,
    workspace::{CreateWorkspace, UpdateWorkspace, Workspace},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub has_more: bool,
}

/// Combined result of a workspace-scoped search.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub boards: Vec<Board>,
    pub items: Vec<Item>,
    pub users: Vec<User>,
}

pub trait UserRepository: Send + Sync {
    /// Fails with `UserExists` on a duplicate email (case as stored).
    fn create_user(&self, input: CreateUser) -> impl Future<Output = QuadroResult<User>> + Send;
    fn user_by_id(&self, id: Uuid) -> impl Future<Output = QuadroResult<User>> + Send;
    fn user_by_email(&self, email: &str) -> impl Future<Output = QuadroResult<Option<User>>> + Send;
    fn update_user(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = QuadroResult<User>> + Send;
    /// Name/email substring match among members of a workspace.
    fn search_users(
        &self,
        workspace_id: Uuid,
        query: &str,
        limit: u64,
    ) -> impl Future<Output = QuadroResult<Vec<User>>> + Send;
}

pub trait SessionRepository: Send + Sync {
    fn create_session(
        &self,
        input: CreateSession,
    ) -> impl Future<Output = QuadroResult<Session>> + Send;
    fn session_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = QuadroResult<Option<Session>>> + Send;
    fn delete_session(&self, id: Uuid) -> impl Future<Output = QuadroResult<()>> + Send;
    /// Logout-all: invalidates every outstanding refresh token.
    fn delete_user_sessions(&self, user_id: Uuid)
    -> impl Future<Output = QuadroResult<()>> + Send;
}

pub trait MembershipRepository: Send + Sync {
    /// Fails with `AlreadyMember` if (user, workspace) already exists.
    fn create_membership(
        &self,
        input: CreateMembership,
    ) -> impl Future<Output = QuadroResult<Membership>> + Send;
    /// The single authorization lookup: membership by (user, workspace).
    fn find_membership(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Option<Membership>>> + Send;
    fn memberships_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Membership>>> + Send;
    fn workspace_members(
        &self,
        workspace_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<WorkspaceMember>>> + Send;
}

pub trait WorkspaceRepository: Send + Sync {
    /// Creates the workspace and the creator's ADMIN membership in one
    /// transaction. Fails with `SlugExists` on a duplicate slug.
    fn create_workspace(
        &self,
        input: CreateWorkspace,
        admin_user_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Workspace>> + Send;
    fn workspace_by_id(&self, id: Uuid) -> impl Future<Output = QuadroResult<Workspace>> + Send;
    fn update_workspace(
        &self,
        id: Uuid,
        input: UpdateWorkspace,
    ) -> impl Future<Output = QuadroResult<Workspace>> + Send;
    /// Cascades to memberships, boards, and everything under them.
    fn delete_workspace(&self, id: Uuid) -> impl Future<Output = QuadroResult<()>> + Send;
}

pub trait BoardRepository: Send + Sync {
    /// Creates the board plus its default columns, group, and view in
    /// one transaction.
    fn create_board(&self, input: CreateBoard)
    -> impl Future<Output = QuadroResult<Board>> + Send;
    fn board_by_id(&self, id: Uuid) -> impl Future<Output = QuadroResult<Board>> + Send;
    fn boards_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Board>>> + Send;
    fn update_board(
        &self,
        id: Uuid,
        input: UpdateBoard,
    ) -> impl Future<Output = QuadroResult<Board>> + Send;
    /// Name/description substring match across the given workspaces.
    fn search_boards(
        &self,
        workspace_ids: &[Uuid],
        query: &str,
        limit: u64,
    ) -> impl Future<Output = QuadroResult<Vec<Board>>> + Send;
}

pub trait ColumnRepository: Send + Sync {
    fn create_column(
        &self,
        board_id: Uuid,
        input: CreateColumn,
    ) -> impl Future<Output = QuadroResult<Column>> + Send;
    fn columns_by_board(
        &self,
        board_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Column>>> + Send;
}

pub trait GroupRepository: Send + Sync {
    fn create_group(
        &self,
        board_id: Uuid,
        input: CreateGroup,
    ) -> impl Future<Output = QuadroResult<Group>> + Send;
    fn groups_by_board(
        &self,
        board_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Group>>> + Send;
}

pub trait ItemRepository: Send + Sync {
    /// Inserts the item (and any nested column values) in one
    /// transaction; when no explicit position is given the position is
    /// computed inside that same transaction.
    fn create_item(&self, input: CreateItem) -> impl Future<Output = QuadroResult<Item>> + Send;
    fn item_by_id(&self, id: Uuid) -> impl Future<Output = QuadroResult<Item>> + Send;
    fn update_item(
        &self,
        id: Uuid,
        input: UpdateItem,
    ) -> impl Future<Output = QuadroResult<Item>> + Send;
    fn delete_item(&self, id: Uuid) -> impl Future<Output = QuadroResult<()>> + Send;
    fn items_page(
        &self,
        board_id: Uuid,
        group_id: Option<Uuid>,
        page: Pagination,
    ) -> impl Future<Output = QuadroResult<Page<Item>>> + Send;
    fn subitems(
        &self,
        parent_item_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Item>>> + Send;
    /// Name substring match across the given workspaces.
    fn search_items(
        &self,
        workspace_ids: &[Uuid],
        query: &str,
        limit: u64,
    ) -> impl Future<Output = QuadroResult<Vec<Item>>> + Send;
}

pub trait ColumnValueRepository: Send + Sync {
    /// Insert-or-update keyed on (item, column); last write wins.
    fn upsert_column_value(
        &self,
        item_id: Uuid,
        column_id: Uuid,
        value: serde_json::Value,
        actor_id: Uuid,
    ) -> impl Future<Output = QuadroResult<ColumnValue>> + Send;
    fn column_values_by_item(
        &self,
        item_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<ColumnValue>>> + Send;
}

pub trait UpdateRepository: Send + Sync {
    /// Writes the comment and its mention rows in one transaction.
    fn create_update(
        &self,
        input: CreateUpdate,
    ) -> impl Future<Output = QuadroResult<Update>> + Send;
    /// Newest first.
    fn updates_by_item(
        &self,
        item_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Update>>> + Send;
    /// The users mentioned in a comment.
    fn update_mentions(
        &self,
        update_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<User>>> + Send;
}

pub trait NotificationRepository: Send + Sync {
    fn create_notification(
        &self,
        input: CreateNotification,
    ) -> impl Future<Output = QuadroResult<Notification>> + Send;
    /// Newest first.
    fn notifications_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Notification>>> + Send;
    /// Marks the notification read only if it belongs to the user;
    /// anyone else's notification reads as `NotFound`.
    fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Notification>> + Send;
}

pub trait ActivityRepository: Send + Sync {
    /// Append-only; entries are never mutated or deleted.
    fn append_activity(
        &self,
        input: CreateActivity,
    ) -> impl Future<Output = QuadroResult<Activity>> + Send;
    /// Newest first.
    fn activities_by_item(
        &self,
        item_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Activity>>> + Send;
}

pub trait ViewRepository: Send + Sync {
    fn views_by_board(&self, board_id: Uuid)
    -> impl Future<Output = QuadroResult<Vec<View>>> + Send;
}

pub trait AutomationRepository: Send + Sync {
    fn automations_by_board(
        &self,
        board_id: Uuid,
    ) -> impl Future<Output = QuadroResult<Vec<Automation>>> + Send;
}

/// The full data-access surface the API composes over.
pub trait Store:
    UserRepository
    + SessionRepository
    + MembershipRepository
    + WorkspaceRepository
    + BoardRepository
    + ColumnRepository
    + GroupRepository
    + ItemRepository
    + ColumnValueRepository
    + UpdateRepository
    + NotificationRepository
    + ActivityRepository
    + ViewRepository
    + AutomationRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + SessionRepository
        + MembershipRepository
        + WorkspaceRepository
        + BoardRepository
        + ColumnRepository
        + GroupRepository
        + ItemRepository
        + ColumnValueRepository
        + UpdateRepository
        + NotificationRepository
        + ActivityRepository
        + ViewRepository
        + AutomationRepository
{
}
