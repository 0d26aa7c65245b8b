//! Column value domain model — one cell of an item.
//!
//! Unique per (item, column); concurrent edits are last-write-wins at
//! the field level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnValue {
    pub id: Uuid,
    pub item_id: Uuid,
    pub column_id: Uuid,
    pub value: serde_json::Value,
    pub last_modified_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
