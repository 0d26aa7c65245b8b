//! Column domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Status,
    Person,
    Date,
    Number,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub kind: ColumnKind,
    /// Display order among siblings on the same board.
    pub position: i64,
    pub width: Option<i64>,
    /// Kind-specific settings, e.g. status labels.
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateColumn {
    pub title: String,
    pub kind: ColumnKind,
    /// When absent, the store assigns max sibling position + 1 inside
    /// the insert transaction.
    pub position: Option<i64>,
    pub width: Option<i64>,
    pub settings: Option<serde_json::Value>,
}
