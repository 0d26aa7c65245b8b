//! Integration tests for the SurrealDB store using the in-memory
//! engine.

use quadro_core::error::QuadroError;
use quadro_core::models::board::{BoardKind, CreateBoard, UpdateBoard};
use quadro_core::models::item::{CreateItem, ItemColumnValue, UpdateItem};
use quadro_core::models::membership::{CreateMembership, Role};
use quadro_core::models::notification::{CreateNotification, NotificationKind};
use quadro_core::models::update::CreateUpdate;
use quadro_core::models::user::CreateUser;
use quadro_core::models::workspace::{CreateWorkspace, UpdateWorkspace};
use quadro_core::repository::{
    BoardRepository, ColumnRepository, ColumnValueRepository, GroupRepository, ItemRepository,
    MembershipRepository, NotificationRepository, Pagination, UpdateRepository, UserRepository,
    ViewRepository, WorkspaceRepository,
};
use quadro_db::SurrealStore;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn store() -> SurrealStore<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quadro_db::run_migrations(&db).await.unwrap();
    SurrealStore::new(db)
}

async fn seed_user(store: &SurrealStore<Db>, email: &str) -> Uuid {
    store
        .create_user(CreateUser {
            email: email.into(),
            name: "Test User".into(),
            password_hash: "$argon2id$stub".into(),
        })
        .await
        .unwrap()
        .id
}

async fn seed_workspace(store: &SurrealStore<Db>, slug: &str, admin: Uuid) -> Uuid {
    store
        .create_workspace(
            CreateWorkspace {
                name: "Acme".into(),
                slug: slug.into(),
                logo_url: None,
            },
            admin,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn duplicate_email_is_a_typed_conflict() {
    let store = store().await;
    seed_user(&store, "dup@example.com").await;

    let err = store
        .create_user(CreateUser {
            email: "dup@example.com".into(),
            name: "Other".into(),
            password_hash: "$argon2id$stub".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::UserExists));
}

#[tokio::test]
async fn workspace_creation_grants_admin_membership() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;

    let membership = store
        .find_membership(user_id, ws_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(membership.role, Role::Admin);
}

#[tokio::test]
async fn duplicate_slug_is_a_typed_conflict() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    seed_workspace(&store, "acme", user_id).await;

    let err = store
        .create_workspace(
            CreateWorkspace {
                name: "Acme Again".into(),
                slug: "acme".into(),
                logo_url: None,
            },
            user_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::SlugExists));
}

#[tokio::test]
async fn duplicate_membership_is_a_typed_conflict() {
    let store = store().await;
    let admin = seed_user(&store, "admin@example.com").await;
    let other = seed_user(&store, "other@example.com").await;
    let ws_id = seed_workspace(&store, "acme", admin).await;

    store
        .create_membership(CreateMembership {
            user_id: other,
            workspace_id: ws_id,
            role: Role::Viewer,
        })
        .await
        .unwrap();

    let err = store
        .create_membership(CreateMembership {
            user_id: other,
            workspace_id: ws_id,
            role: Role::Member,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::AlreadyMember));
}

#[tokio::test]
async fn board_creation_seeds_defaults() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;

    let board = store
        .create_board(CreateBoard {
            workspace_id: ws_id,
            name: "Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
            created_by: user_id,
        })
        .await
        .unwrap();

    let columns = store.columns_by_board(board.id).await.unwrap();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[0].title, "Name");
    assert_eq!(columns[0].position, 0);

    let groups = store.groups_by_board(board.id).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].title, "New Group");

    let views = store.views_by_board(board.id).await.unwrap();
    assert_eq!(views.len(), 1);
    assert!(views[0].is_default);
}

#[tokio::test]
async fn board_update_changes_only_provided_fields() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;
    let board = store
        .create_board(CreateBoard {
            workspace_id: ws_id,
            name: "Roadmap".into(),
            description: Some("Q3 planning".into()),
            kind: BoardKind::Main,
            created_by: user_id,
        })
        .await
        .unwrap();

    let updated = store
        .update_board(
            board.id,
            UpdateBoard {
                name: Some("Roadmap 2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Roadmap 2");
    assert_eq!(updated.description.as_deref(), Some("Q3 planning"));
}

#[tokio::test]
async fn item_lifecycle_with_column_values() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;
    let board = store
        .create_board(CreateBoard {
            workspace_id: ws_id,
            name: "Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
            created_by: user_id,
        })
        .await
        .unwrap();
    let group = &store.groups_by_board(board.id).await.unwrap()[0];
    let status_column = store
        .columns_by_board(board.id)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.title == "Status")
        .unwrap();

    let item = store
        .create_item(CreateItem {
            board_id: board.id,
            group_id: group.id,
            name: "Ship it".into(),
            position: None,
            parent_item_id: None,
            created_by: user_id,
            column_values: vec![ItemColumnValue {
                column_id: status_column.id,
                value: json!({ "label": "1" }),
            }],
        })
        .await
        .unwrap();
    assert_eq!(item.position, 0);

    let values = store.column_values_by_item(item.id).await.unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].column_id, status_column.id);

    let renamed = store
        .update_item(
            item.id,
            UpdateItem {
                name: Some("Shipped".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Shipped");
    assert_eq!(renamed.position, 0);

    store.delete_item(item.id).await.unwrap();
    let err = store.item_by_id(item.id).await.unwrap_err();
    assert!(matches!(err, QuadroError::NotFound { .. }));
    assert!(store.column_values_by_item(item.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn column_value_upsert_is_last_write_wins() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;
    let board = store
        .create_board(CreateBoard {
            workspace_id: ws_id,
            name: "Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
            created_by: user_id,
        })
        .await
        .unwrap();
    let group = &store.groups_by_board(board.id).await.unwrap()[0];
    let column = &store.columns_by_board(board.id).await.unwrap()[0];
    let item = store
        .create_item(CreateItem {
            board_id: board.id,
            group_id: group.id,
            name: "Task".into(),
            position: None,
            parent_item_id: None,
            created_by: user_id,
            column_values: vec![],
        })
        .await
        .unwrap();

    let first = store
        .upsert_column_value(item.id, column.id, json!("draft"), user_id)
        .await
        .unwrap();
    let second = store
        .upsert_column_value(item.id, column.id, json!("final"), user_id)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.value, json!("final"));
    assert_eq!(store.column_values_by_item(item.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn items_page_reports_total_and_has_more() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;
    let board = store
        .create_board(CreateBoard {
            workspace_id: ws_id,
            name: "Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
            created_by: user_id,
        })
        .await
        .unwrap();
    let group = &store.groups_by_board(board.id).await.unwrap()[0];

    for i in 0..5 {
        store
            .create_item(CreateItem {
                board_id: board.id,
                group_id: group.id,
                name: format!("Task {i}"),
                position: None,
                parent_item_id: None,
                created_by: user_id,
                column_values: vec![],
            })
            .await
            .unwrap();
    }

    let page = store
        .items_page(
            board.id,
            None,
            Pagination {
                offset: 0,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_count, 5);
    assert!(page.has_more);

    let rest = store
        .items_page(
            board.id,
            None,
            Pagination {
                offset: 3,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 2);
    assert!(!rest.has_more);
}

#[tokio::test]
async fn updates_list_newest_first() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;
    let board = store
        .create_board(CreateBoard {
            workspace_id: ws_id,
            name: "Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
            created_by: user_id,
        })
        .await
        .unwrap();
    let group = &store.groups_by_board(board.id).await.unwrap()[0];
    let item = store
        .create_item(CreateItem {
            board_id: board.id,
            group_id: group.id,
            name: "Task".into(),
            position: None,
            parent_item_id: None,
            created_by: user_id,
            column_values: vec![],
        })
        .await
        .unwrap();

    for body in ["first", "second"] {
        store
            .create_update(CreateUpdate {
                item_id: item.id,
                user_id,
                body: body.into(),
                mention_user_ids: vec![],
            })
            .await
            .unwrap();
    }

    let updates = store.updates_by_item(item.id).await.unwrap();
    assert_eq!(updates.len(), 2);
    assert!(updates[0].created_at >= updates[1].created_at);
}

#[tokio::test]
async fn mentions_are_stored_with_the_comment() {
    let store = store().await;
    let author = seed_user(&store, "author@example.com").await;
    let mentioned = seed_user(&store, "mentioned@example.com").await;
    let ws_id = seed_workspace(&store, "acme", author).await;
    let board = store
        .create_board(CreateBoard {
            workspace_id: ws_id,
            name: "Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
            created_by: author,
        })
        .await
        .unwrap();
    let group = &store.groups_by_board(board.id).await.unwrap()[0];
    let item = store
        .create_item(CreateItem {
            board_id: board.id,
            group_id: group.id,
            name: "Task".into(),
            position: None,
            parent_item_id: None,
            created_by: author,
            column_values: vec![],
        })
        .await
        .unwrap();

    let update = store
        .create_update(CreateUpdate {
            item_id: item.id,
            user_id: author,
            body: "over to you".into(),
            mention_user_ids: vec![mentioned],
        })
        .await
        .unwrap();

    let users = store.update_mentions(update.id).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, mentioned);

    // Mention rows cascade with the item.
    store.delete_item(item.id).await.unwrap();
    assert!(store.update_mentions(update.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn notification_reads_are_owner_scoped() {
    let store = store().await;
    let recipient = seed_user(&store, "recipient@example.com").await;
    let other = seed_user(&store, "other@example.com").await;

    let notification = store
        .create_notification(CreateNotification {
            user_id: recipient,
            kind: NotificationKind::Mention,
            title: "author@example.com mentioned you".into(),
            body: "You were mentioned in an update on \"Task\"".into(),
            data: json!({}),
        })
        .await
        .unwrap();
    assert!(!notification.is_read);
    assert!(notification.read_at.is_none());

    let err = store
        .mark_notification_read(notification.id, other)
        .await
        .unwrap_err();
    assert!(matches!(err, QuadroError::NotFound { .. }));

    let read = store
        .mark_notification_read(notification.id, recipient)
        .await
        .unwrap();
    assert!(read.is_read);
    assert!(read.read_at.is_some());

    let inbox = store.notifications_for_user(recipient).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].is_read);
}

#[tokio::test]
async fn workspace_delete_cascades() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;
    let board = store
        .create_board(CreateBoard {
            workspace_id: ws_id,
            name: "Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
            created_by: user_id,
        })
        .await
        .unwrap();
    let group = &store.groups_by_board(board.id).await.unwrap()[0];
    let item = store
        .create_item(CreateItem {
            board_id: board.id,
            group_id: group.id,
            name: "Task".into(),
            position: None,
            parent_item_id: None,
            created_by: user_id,
            column_values: vec![],
        })
        .await
        .unwrap();

    store.delete_workspace(ws_id).await.unwrap();

    assert!(matches!(
        store.workspace_by_id(ws_id).await.unwrap_err(),
        QuadroError::NotFound { .. }
    ));
    assert!(matches!(
        store.board_by_id(board.id).await.unwrap_err(),
        QuadroError::NotFound { .. }
    ));
    assert!(matches!(
        store.item_by_id(item.id).await.unwrap_err(),
        QuadroError::NotFound { .. }
    ));
    assert!(store.find_membership(user_id, ws_id).await.unwrap().is_none());
}

#[tokio::test]
async fn workspace_update_preserves_slug() {
    let store = store().await;
    let user_id = seed_user(&store, "admin@example.com").await;
    let ws_id = seed_workspace(&store, "acme", user_id).await;

    let updated = store
        .update_workspace(
            ws_id,
            UpdateWorkspace {
                name: Some("Acme Inc".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Acme Inc");
    assert_eq!(updated.slug, "acme");
}
