//! Item domain model — a row/task within a group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub board_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub position: i64,
    pub parent_item_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A column value written together with a new item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemColumnValue {
    pub column_id: Uuid,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItem {
    pub board_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    /// When absent, the store assigns max sibling position + 1 inside
    /// the insert transaction (race-free under concurrent creation).
    pub position: Option<i64>,
    pub parent_item_id: Option<Uuid>,
    pub created_by: Uuid,
    /// Written in the same transaction as the item.
    pub column_values: Vec<ItemColumnValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub group_id: Option<Uuid>,
    pub position: Option<i64>,
}
