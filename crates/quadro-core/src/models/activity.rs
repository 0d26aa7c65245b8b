//! Activity domain model — the immutable audit trail.
//!
//! One entry is appended per state-changing operation. Entries are
//! never mutated or deleted through normal flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityKind {
    ItemCreated,
    ItemUpdated,
    ItemDeleted,
    ColumnValueUpdated,
    UpdatePosted,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::ItemCreated => "ITEM_CREATED",
            ActivityKind::ItemUpdated => "ITEM_UPDATED",
            ActivityKind::ItemDeleted => "ITEM_DELETED",
            ActivityKind::ColumnValueUpdated => "COLUMN_VALUE_UPDATED",
            ActivityKind::UpdatePosted => "UPDATE_POSTED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub item_id: Uuid,
    pub actor_id: Uuid,
    pub kind: ActivityKind,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivity {
    pub item_id: Uuid,
    pub actor_id: Uuid,
    pub kind: ActivityKind,
    pub data: serde_json::Value,
}
