//! Board domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::membership::Role;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BoardKind {
    Main,
    Private,
    Shareable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: BoardKind,
    pub settings: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: BoardKind,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateBoard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
}

/// Per-board capabilities derived from the caller's workspace role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoardPermissions {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_share: bool,
    pub can_manage_automations: bool,
}

impl BoardPermissions {
    pub fn none() -> Self {
        Self {
            can_edit: false,
            can_delete: false,
            can_share: false,
            can_manage_automations: false,
        }
    }

    pub fn for_role(role: Role) -> Self {
        let is_admin = role == Role::Admin;
        let is_member = role == Role::Member;
        Self {
            can_edit: is_admin || is_member,
            can_delete: is_admin,
            can_share: is_admin || is_member,
            can_manage_automations: is_admin || is_member,
        }
    }
}
