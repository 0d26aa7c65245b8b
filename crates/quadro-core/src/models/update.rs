//! Update domain model — a comment posted on an item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUpdate {
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    /// Users called out in the comment; stored as mention rows
    /// alongside it.
    pub mention_user_ids: Vec<Uuid>,
}
