//! Subscription scoping: streams yield only events for their board or
//! item, and subscribing requires read access.

mod common;

use common::{api, register};
use quadro_api::ChangeEvent;
use quadro_api::input::{
    CreateBoardRequest, CreateItemRequest, CreateWorkspaceRequest, SetColumnValueRequest,
    UpdateBoardRequest,
};
use quadro_core::error::QuadroError;
use quadro_core::models::board::BoardKind;
use serde_json::json;
use tokio_stream::StreamExt;
use uuid::Uuid;

async fn board(
    api: &quadro_api::Api<quadro_db::SurrealStore<surrealdb::engine::local::Db>>,
    owner: &quadro_core::access::Identity,
    workspace_id: Uuid,
    name: &str,
) -> (Uuid, Uuid) {
    let board = api
        .create_board(
            Some(owner),
            CreateBoardRequest {
                workspace_id,
                name: name.into(),
                description: None,
                kind: BoardKind::Main,
            },
        )
        .await
        .unwrap();
    let group_id = api.groups(Some(owner), board.id).await.unwrap()[0].id;
    (board.id, group_id)
}

#[tokio::test]
async fn board_subscription_only_sees_its_board() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let ws = api
        .create_workspace(
            Some(&owner),
            CreateWorkspaceRequest {
                name: "Acme".into(),
                slug: "acme".into(),
                logo_url: None,
            },
        )
        .await
        .unwrap();
    let (board_a, group_a) = board(&api, &owner, ws.id, "Board A").await;
    let (board_b, group_b) = board(&api, &owner, ws.id, "Board B").await;

    let stream = api.subscribe_board(Some(&owner), board_a).await.unwrap();
    let mut stream = Box::pin(stream);

    // An event on board B, then one on board A.
    api.create_item(
        Some(&owner),
        CreateItemRequest {
            board_id: board_b,
            group_id: group_b,
            name: "Other".into(),
            position: None,
            parent_item_id: None,
            column_values: vec![],
        },
    )
    .await
    .unwrap();
    let item = api
        .create_item(
            Some(&owner),
            CreateItemRequest {
                board_id: board_a,
                group_id: group_a,
                name: "Mine".into(),
                position: None,
                parent_item_id: None,
                column_values: vec![],
            },
        )
        .await
        .unwrap();

    let envelope = stream.next().await.unwrap();
    assert_eq!(envelope.payload.board_id(), board_a);
    assert_eq!(envelope.payload.item_id(), Some(item.id));
    assert_eq!(envelope.actor_id, owner.id);
}

#[tokio::test]
async fn item_subscription_skips_board_level_events() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let ws = api
        .create_workspace(
            Some(&owner),
            CreateWorkspaceRequest {
                name: "Acme".into(),
                slug: "acme".into(),
                logo_url: None,
            },
        )
        .await
        .unwrap();
    let (board_id, group_id) = board(&api, &owner, ws.id, "Board").await;
    let item = api
        .create_item(
            Some(&owner),
            CreateItemRequest {
                board_id,
                group_id,
                name: "Task".into(),
                position: None,
                parent_item_id: None,
                column_values: vec![],
            },
        )
        .await
        .unwrap();
    let column_id = api.columns(Some(&owner), board_id).await.unwrap()[0].id;

    let stream = api.subscribe_item(Some(&owner), item.id).await.unwrap();
    let mut stream = Box::pin(stream);

    // Board-level event first; the item stream must skip it.
    api.update_board(
        Some(&owner),
        UpdateBoardRequest {
            board_id,
            name: Some("Board v2".into()),
            description: None,
            settings: None,
        },
    )
    .await
    .unwrap();
    api.set_column_value(
        Some(&owner),
        SetColumnValueRequest {
            item_id: item.id,
            column_id,
            value: json!("done"),
        },
    )
    .await
    .unwrap();

    let envelope = stream.next().await.unwrap();
    assert!(matches!(
        envelope.payload,
        ChangeEvent::ColumnValueUpdated { .. }
    ));
    assert_eq!(envelope.payload.item_id(), Some(item.id));
}

#[tokio::test]
async fn subscribing_requires_read_access() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let outsider = register(&api, "outsider@example.com", "Outsider").await;
    let ws = api
        .create_workspace(
            Some(&owner),
            CreateWorkspaceRequest {
                name: "Acme".into(),
                slug: "acme".into(),
                logo_url: None,
            },
        )
        .await
        .unwrap();
    let (board_id, _) = board(&api, &owner, ws.id, "Board").await;

    let err = api
        .subscribe_board(Some(&outsider), board_id)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, QuadroError::Forbidden { .. }));

    let err = api.subscribe_board(None, board_id).await.err().unwrap();
    assert!(matches!(err, QuadroError::Unauthenticated));
}

#[tokio::test]
async fn deleting_an_item_is_announced() {
    let api = api().await;
    let owner = register(&api, "owner@example.com", "Owner").await;
    let ws = api
        .create_workspace(
            Some(&owner),
            CreateWorkspaceRequest {
                name: "Acme".into(),
                slug: "acme".into(),
                logo_url: None,
            },
        )
        .await
        .unwrap();
    let (board_id, group_id) = board(&api, &owner, ws.id, "Board").await;
    let item = api
        .create_item(
            Some(&owner),
            CreateItemRequest {
                board_id,
                group_id,
                name: "Task".into(),
                position: None,
                parent_item_id: None,
                column_values: vec![],
            },
        )
        .await
        .unwrap();

    let stream = api.subscribe_board(Some(&owner), board_id).await.unwrap();
    let mut stream = Box::pin(stream);

    api.delete_item(Some(&owner), item.id).await.unwrap();

    let envelope = stream.next().await.unwrap();
    assert!(matches!(envelope.payload, ChangeEvent::ItemDeleted { .. }));
    assert_eq!(envelope.payload.item_id(), Some(item.id));
}
