//! Workspace membership — the sole source of authorization truth.
//!
//! A membership row existing for (user, workspace) grants read access
//! to everything under that workspace; the role gates write and admin
//! access on top. No resource carries its own ACL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::AccessLevel;
use crate::models::user::User;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
    Viewer,
    Guest,
}

impl Role {
    /// The role/level grant matrix.
    ///
    /// ADMIN → read/write/admin, MEMBER → read/write,
    /// VIEWER and GUEST → read only.
    pub fn allows(self, level: AccessLevel) -> bool {
        match (self, level) {
            (_, AccessLevel::Read) => true,
            (Role::Admin | Role::Member, AccessLevel::Write) => true,
            (Role::Admin, AccessLevel::Admin) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workspace_id: Uuid,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub user_id: Uuid,
    pub workspace_id: Uuid,
    pub role: Role,
}

/// A workspace member as listed to clients: the user plus their role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub user: User,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_level_matrix_is_exact() {
        use AccessLevel::*;
        let cases = [
            (Role::Admin, Read, true),
            (Role::Admin, Write, true),
            (Role::Admin, Admin, true),
            (Role::Member, Read, true),
            (Role::Member, Write, true),
            (Role::Member, Admin, false),
            (Role::Viewer, Read, true),
            (Role::Viewer, Write, false),
            (Role::Viewer, Admin, false),
            (Role::Guest, Read, true),
            (Role::Guest, Write, false),
            (Role::Guest, Admin, false),
        ];
        for (role, level, expected) in cases {
            assert_eq!(
                role.allows(level),
                expected,
                "{role:?} × {level:?} should be {expected}"
            );
        }
    }
}
