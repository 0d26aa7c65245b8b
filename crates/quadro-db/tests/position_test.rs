//! Position assignment tests: sequential and concurrent item creation
//! must yield dense, distinct positions per group.

use quadro_core::models::board::{BoardKind, CreateBoard};
use quadro_core::models::item::CreateItem;
use quadro_core::models::user::CreateUser;
use quadro_core::models::workspace::CreateWorkspace;
use quadro_core::repository::{
    BoardRepository, GroupRepository, ItemRepository, UserRepository, WorkspaceRepository,
};
use quadro_db::SurrealStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn board_with_group(store: &SurrealStore<Db>) -> (Uuid, Uuid, Uuid) {
    let user = store
        .create_user(CreateUser {
            email: "admin@example.com".into(),
            name: "Admin".into(),
            password_hash: "$argon2id$stub".into(),
        })
        .await
        .unwrap();
    let ws = store
        .create_workspace(
            CreateWorkspace {
                name: "Acme".into(),
                slug: "acme".into(),
                logo_url: None,
            },
            user.id,
        )
        .await
        .unwrap();
    let board = store
        .create_board(CreateBoard {
            workspace_id: ws.id,
            name: "Roadmap".into(),
            description: None,
            kind: BoardKind::Main,
            created_by: user.id,
        })
        .await
        .unwrap();
    let group = &store.groups_by_board(board.id).await.unwrap()[0];
    (user.id, board.id, group.id)
}

fn new_item(board_id: Uuid, group_id: Uuid, user_id: Uuid, name: &str) -> CreateItem {
    CreateItem {
        board_id,
        group_id,
        name: name.into(),
        position: None,
        parent_item_id: None,
        created_by: user_id,
        column_values: vec![],
    }
}

#[tokio::test]
async fn sequential_creation_assigns_dense_positions() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quadro_db::run_migrations(&db).await.unwrap();
    let store = SurrealStore::new(db);
    let (user_id, board_id, group_id) = board_with_group(&store).await;

    for expected in 0..4 {
        let item = store
            .create_item(new_item(board_id, group_id, user_id, "Task"))
            .await
            .unwrap();
        assert_eq!(item.position, expected);
    }
}

#[tokio::test]
async fn explicit_position_is_respected() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quadro_db::run_migrations(&db).await.unwrap();
    let store = SurrealStore::new(db);
    let (user_id, board_id, group_id) = board_with_group(&store).await;

    let mut input = new_item(board_id, group_id, user_id, "Pinned");
    input.position = Some(42);
    let item = store.create_item(input).await.unwrap();
    assert_eq!(item.position, 42);

    // The next auto-positioned item lands after it.
    let next = store
        .create_item(new_item(board_id, group_id, user_id, "After"))
        .await
        .unwrap();
    assert_eq!(next.position, 43);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creation_never_duplicates_positions() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quadro_db::run_migrations(&db).await.unwrap();
    let store = SurrealStore::new(db);
    let (user_id, board_id, group_id) = board_with_group(&store).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create_item(new_item(board_id, group_id, user_id, &format!("Task {i}")))
                .await
        }));
    }

    let mut positions = Vec::new();
    for handle in handles {
        let item = handle.await.unwrap().unwrap();
        positions.push(item.position);
    }

    positions.sort_unstable();
    let expected: Vec<i64> = (0..8).collect();
    assert_eq!(positions, expected);
}
