//! View domain model — a saved presentation of a board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ViewKind {
    Table,
    Kanban,
    Calendar,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub kind: ViewKind,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}
