//! Board operations, plus the board-scoped structure reads (columns,
//! groups, views, automations).

use quadro_core::access::{AccessLevel, Identity, ResourceRef, authorize};
use quadro_core::error::QuadroResult;
use quadro_core::models::automation::Automation;
use quadro_core::models::board::{Board, BoardPermissions, CreateBoard, UpdateBoard};
use quadro_core::models::column::{Column, CreateColumn};
use quadro_core::models::group::{CreateGroup, Group};
use quadro_core::models::view::View;
use quadro_core::repository::Store;
use uuid::Uuid;

use crate::api::Api;
use crate::events::ChangeEvent;
use crate::input::{
    CreateBoardRequest, CreateColumnRequest, CreateGroupRequest, UpdateBoardRequest,
};

impl<S: Store + Clone> Api<S> {
    /// Create a board with its default columns, group, and view.
    pub async fn create_board(
        &self,
        identity: Option<&Identity>,
        request: CreateBoardRequest,
    ) -> QuadroResult<Board> {
        request.validate()?;
        let identity = self.identity_required(identity)?;
        authorize(
            self.store(),
            Some(identity),
            ResourceRef::Workspace(request.workspace_id),
            AccessLevel::Write,
        )
        .await?;
        self.store()
            .create_board(CreateBoard {
                workspace_id: request.workspace_id,
                name: request.name,
                description: request.description,
                kind: request.kind,
                created_by: identity.id,
            })
            .await
    }

    pub async fn board(&self, identity: Option<&Identity>, board_id: Uuid) -> QuadroResult<Board> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(board_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().board_by_id(board_id).await
    }

    pub async fn boards(
        &self,
        identity: Option<&Identity>,
        workspace_id: Uuid,
    ) -> QuadroResult<Vec<Board>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Workspace(workspace_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().boards_by_workspace(workspace_id).await
    }

    /// The caller's capabilities on a board, derived from their
    /// workspace role.
    pub async fn board_permissions(
        &self,
        identity: Option<&Identity>,
        board_id: Uuid,
    ) -> QuadroResult<BoardPermissions> {
        let membership = authorize(
            self.store(),
            identity,
            ResourceRef::Board(board_id),
            AccessLevel::Read,
        )
        .await?;
        Ok(BoardPermissions::for_role(membership.role))
    }

    pub async fn update_board(
        &self,
        identity: Option<&Identity>,
        request: UpdateBoardRequest,
    ) -> QuadroResult<Board> {
        request.validate()?;
        let identity = self.identity_required(identity)?;
        authorize(
            self.store(),
            Some(identity),
            ResourceRef::Board(request.board_id),
            AccessLevel::Write,
        )
        .await?;

        let board = self
            .store()
            .update_board(
                request.board_id,
                UpdateBoard {
                    name: request.name,
                    description: request.description,
                    settings: request.settings,
                },
            )
            .await?;

        self.events().publish(
            identity.id,
            ChangeEvent::BoardUpdated {
                board_id: board.id,
                workspace_id: board.workspace_id,
            },
        );
        Ok(board)
    }

    pub async fn create_column(
        &self,
        identity: Option<&Identity>,
        request: CreateColumnRequest,
    ) -> QuadroResult<Column> {
        request.validate()?;
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(request.board_id),
            AccessLevel::Write,
        )
        .await?;
        self.store()
            .create_column(
                request.board_id,
                CreateColumn {
                    title: request.title,
                    kind: request.kind,
                    position: request.position,
                    width: request.width,
                    settings: request.settings,
                },
            )
            .await
    }

    pub async fn columns(
        &self,
        identity: Option<&Identity>,
        board_id: Uuid,
    ) -> QuadroResult<Vec<Column>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(board_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().columns_by_board(board_id).await
    }

    pub async fn create_group(
        &self,
        identity: Option<&Identity>,
        request: CreateGroupRequest,
    ) -> QuadroResult<Group> {
        request.validate()?;
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(request.board_id),
            AccessLevel::Write,
        )
        .await?;
        self.store()
            .create_group(
                request.board_id,
                CreateGroup {
                    title: request.title,
                    color: request.color,
                    position: request.position,
                },
            )
            .await
    }

    pub async fn groups(
        &self,
        identity: Option<&Identity>,
        board_id: Uuid,
    ) -> QuadroResult<Vec<Group>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(board_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().groups_by_board(board_id).await
    }

    pub async fn views(
        &self,
        identity: Option<&Identity>,
        board_id: Uuid,
    ) -> QuadroResult<Vec<View>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(board_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().views_by_board(board_id).await
    }

    pub async fn automations(
        &self,
        identity: Option<&Identity>,
        board_id: Uuid,
    ) -> QuadroResult<Vec<Automation>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(board_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().automations_by_board(board_id).await
    }
}
