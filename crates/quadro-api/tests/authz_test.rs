//! Authorization scenarios: the role matrix end to end, and the
//! NOT_FOUND versus FORBIDDEN distinction.

mod common;

use common::{api, register};
use quadro_api::input::{
    CreateBoardRequest, CreateItemRequest, CreateWorkspaceRequest, InviteMemberRequest,
    UpdateWorkspaceRequest,
};
use quadro_core::error::QuadroError;
use quadro_core::models::board::BoardKind;
use quadro_core::models::membership::Role;
use uuid::Uuid;

fn workspace_request(slug: &str) -> CreateWorkspaceRequest {
    CreateWorkspaceRequest {
        name: "Acme".into(),
        slug: slug.into(),
        logo_url: None,
    }
}

#[tokio::test]
async fn anonymous_callers_are_unauthenticated() {
    let api = api().await;
    let err = api
        .create_workspace(None, workspace_request("acme"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::Unauthenticated));
}

#[tokio::test]
async fn bad_access_tokens_read_as_anonymous() {
    let api = api().await;

    // Garbage is UNAUTHENTICATED, not INVALID_TOKEN; that code belongs
    // to the refresh flow.
    let err = api.authenticate("not-a-jwt").unwrap_err();
    assert!(matches!(err, QuadroError::Unauthenticated));

    // A refresh token is signed with the other secret, so it fails
    // access verification the same way.
    let session = api
        .register(quadro_api::input::RegisterRequest {
            email: "token@example.com".into(),
            name: "Token".into(),
            password: "hunter2hunter2".into(),
        })
        .await
        .unwrap();
    let err = api.authenticate(&session.refresh_token).unwrap_err();
    assert!(matches!(err, QuadroError::Unauthenticated));
}

#[tokio::test]
async fn non_members_cannot_see_a_workspace_exists() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let outsider = register(&api, "outsider@example.com", "Outsider").await;

    let ws = api
        .create_workspace(Some(&owner), workspace_request("acme"))
        .await
        .unwrap();

    // Present but inaccessible: FORBIDDEN, not NOT_FOUND.
    let err = api.workspace(Some(&outsider), ws.id).await.unwrap_err();
    assert!(matches!(err, QuadroError::Forbidden { .. }));

    // Missing entirely: NOT_FOUND, even for a member of something else.
    let err = api
        .workspace(Some(&owner), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::NotFound { .. }));
}

#[tokio::test]
async fn workspace_admin_ops_require_admin_role() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let member = register(&api, "member@example.com", "Member").await;

    let ws = api
        .create_workspace(Some(&owner), workspace_request("acme"))
        .await
        .unwrap();
    api.invite_member(
        Some(&owner),
        InviteMemberRequest {
            workspace_id: ws.id,
            email: "member@example.com".into(),
            role: Role::Member,
        },
    )
    .await
    .unwrap();

    let update = UpdateWorkspaceRequest {
        workspace_id: ws.id,
        name: Some("Renamed".into()),
        logo_url: None,
        settings: None,
    };
    let err = api
        .update_workspace(Some(&member), update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::Forbidden { .. }));

    let err = api.delete_workspace(Some(&member), ws.id).await.unwrap_err();
    assert!(matches!(err, QuadroError::Forbidden { .. }));

    // The admin can do both.
    let renamed = api.update_workspace(Some(&owner), update).await.unwrap();
    assert_eq!(renamed.name, "Renamed");
    api.delete_workspace(Some(&owner), ws.id).await.unwrap();
}

#[tokio::test]
async fn viewers_read_but_never_write() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let viewer = register(&api, "viewer@example.com", "Viewer").await;

    let ws = api
        .create_workspace(Some(&owner), workspace_request("acme"))
        .await
        .unwrap();
    api.invite_member(
        Some(&owner),
        InviteMemberRequest {
            workspace_id: ws.id,
            email: "viewer@example.com".into(),
            role: Role::Viewer,
        },
    )
    .await
    .unwrap();
    let board = api
        .create_board(
            Some(&owner),
            CreateBoardRequest {
                workspace_id: ws.id,
                name: "Roadmap".into(),
                description: None,
                kind: BoardKind::Main,
            },
        )
        .await
        .unwrap();
    let group = api.groups(Some(&owner), board.id).await.unwrap()[0].clone();

    // Reads succeed.
    assert_eq!(api.boards(Some(&viewer), ws.id).await.unwrap().len(), 1);
    let permissions = api.board_permissions(Some(&viewer), board.id).await.unwrap();
    assert!(!permissions.can_edit);

    // Writes are forbidden.
    let err = api
        .create_item(
            Some(&viewer),
            CreateItemRequest {
                board_id: board.id,
                group_id: group.id,
                name: "Nope".into(),
                position: None,
                parent_item_id: None,
                column_values: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::Forbidden { .. }));
}

#[tokio::test]
async fn viewers_cannot_invite_but_members_can() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let member = register(&api, "member@example.com", "Member").await;
    let viewer = register(&api, "viewer@example.com", "Viewer").await;
    register(&api, "late@example.com", "Late").await;

    let ws = api
        .create_workspace(Some(&owner), workspace_request("acme"))
        .await
        .unwrap();
    for (email, role) in [
        ("member@example.com", Role::Member),
        ("viewer@example.com", Role::Viewer),
    ] {
        api.invite_member(
            Some(&owner),
            InviteMemberRequest {
                workspace_id: ws.id,
                email: email.into(),
                role,
            },
        )
        .await
        .unwrap();
    }

    let invite = |email: &str| InviteMemberRequest {
        workspace_id: ws.id,
        email: email.into(),
        role: Role::Viewer,
    };

    let err = api
        .invite_member(Some(&viewer), invite("late@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::Forbidden { .. }));

    api.invite_member(Some(&member), invite("late@example.com"))
        .await
        .unwrap();
}

#[tokio::test]
async fn inviting_unknown_or_existing_members_fails_typed() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let ws = api
        .create_workspace(Some(&owner), workspace_request("acme"))
        .await
        .unwrap();

    let err = api
        .invite_member(
            Some(&owner),
            InviteMemberRequest {
                workspace_id: ws.id,
                email: "ghost@example.com".into(),
                role: Role::Member,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::UserNotFound));

    // The creator is already an ADMIN member.
    let err = api
        .invite_member(
            Some(&owner),
            InviteMemberRequest {
                workspace_id: ws.id,
                email: "owner@example.com".into(),
                role: Role::Member,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::AlreadyMember));
}

#[tokio::test]
async fn search_stays_inside_accessible_workspaces() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let other = register(&api, "other@example.com", "Other").await;

    let ws = api
        .create_workspace(Some(&owner), workspace_request("acme"))
        .await
        .unwrap();
    api.create_board(
        Some(&owner),
        CreateBoardRequest {
            workspace_id: ws.id,
            name: "Secret Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
        },
    )
    .await
    .unwrap();

    let results = api
        .search(
            Some(&other),
            quadro_api::input::SearchRequest {
                query: "roadmap".into(),
                workspace_id: None,
                limit: 20,
            },
        )
        .await
        .unwrap();
    assert!(results.boards.is_empty());
    assert!(results.items.is_empty());

    let results = api
        .search(
            Some(&owner),
            quadro_api::input::SearchRequest {
                query: "roadmap".into(),
                workspace_id: None,
                limit: 20,
            },
        )
        .await
        .unwrap();
    assert_eq!(results.boards.len(), 1);

    // Scoping to a workspace the caller is outside of is refused, not
    // silently emptied.
    let err = api
        .search(
            Some(&other),
            quadro_api::input::SearchRequest {
                query: "roadmap".into(),
                workspace_id: Some(ws.id),
                limit: 20,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::Forbidden { .. }));
}
