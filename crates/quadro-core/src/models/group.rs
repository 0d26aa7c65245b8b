//! Group domain model — a named section of items within a board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub color: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    pub title: String,
    pub color: Option<String>,
    pub position: Option<i64>,
}
