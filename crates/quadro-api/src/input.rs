//! Operation inputs and structural validation.
//!
//! Validation runs before authorization and reports every violated
//! field in one error, so a client fixing a form sees all problems at
//! once.

use quadro_core::error::{FieldViolation, QuadroError, QuadroResult};
use quadro_core::models::board::BoardKind;
use quadro_core::models::column::ColumnKind;
use quadro_core::models::item::ItemColumnValue;
use quadro_core::models::membership::Role;
use serde::Deserialize;
use uuid::Uuid;

const MAX_NAME_LEN: usize = 255;
const MIN_PASSWORD_LEN: usize = 8;

/// Accumulates field violations across one input.
#[derive(Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    fn require_name(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        } else if value.len() > MAX_NAME_LEN {
            self.push(field, format!("must be at most {MAX_NAME_LEN} characters"));
        }
    }

    fn finish(self) -> QuadroResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(QuadroError::Validation { violations: self.0 })
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        if !is_valid_email(&self.email) {
            v.push("email", "must be a valid email address");
        }
        v.require_name("name", &self.name);
        if self.password.len() < MIN_PASSWORD_LEN {
            v.push(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        if let Some(name) = &self.name {
            v.require_name("name", name);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
}

impl CreateWorkspaceRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        v.require_name("name", &self.name);
        if !is_valid_slug(&self.slug) {
            v.push(
                "slug",
                "must contain only lowercase letters, digits, and hyphens",
            );
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub workspace_id: Uuid,
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub settings: Option<serde_json::Value>,
}

impl UpdateWorkspaceRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        if let Some(name) = &self.name {
            v.require_name("name", name);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InviteMemberRequest {
    pub workspace_id: Uuid,
    /// The invitee is looked up by email; unknown emails fail with
    /// `USER_NOT_FOUND`.
    pub email: String,
    pub role: Role,
}

impl InviteMemberRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        if !is_valid_email(&self.email) {
            v.push("email", "must be a valid email address");
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoardRequest {
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kind: BoardKind,
}

impl CreateBoardRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        v.require_name("name", &self.name);
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBoardRequest {
    pub board_id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Option<serde_json::Value>,
}

impl UpdateBoardRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        if let Some(name) = &self.name {
            v.require_name("name", name);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateColumnRequest {
    pub board_id: Uuid,
    pub title: String,
    pub kind: ColumnKind,
    pub position: Option<i64>,
    pub width: Option<i64>,
    pub settings: Option<serde_json::Value>,
}

impl CreateColumnRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        v.require_name("title", &self.title);
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub board_id: Uuid,
    pub title: String,
    pub color: Option<String>,
    pub position: Option<i64>,
}

impl CreateGroupRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        v.require_name("title", &self.title);
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub board_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub position: Option<i64>,
    pub parent_item_id: Option<Uuid>,
    #[serde(default)]
    pub column_values: Vec<ItemColumnValue>,
}

impl CreateItemRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        v.require_name("name", &self.name);
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemRequest {
    pub item_id: Uuid,
    pub name: Option<String>,
    pub group_id: Option<Uuid>,
    pub position: Option<i64>,
}

impl UpdateItemRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        if let Some(name) = &self.name {
            v.require_name("name", name);
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetColumnValueRequest {
    pub item_id: Uuid,
    pub column_id: Uuid,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostUpdateRequest {
    pub item_id: Uuid,
    pub body: String,
    /// Users to call out; each gets a MENTION notification.
    #[serde(default)]
    pub mention_user_ids: Vec<Uuid>,
}

impl PostUpdateRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        if self.body.trim().is_empty() {
            v.push("body", "must not be empty");
        }
        v.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// When present, search only this workspace instead of every
    /// accessible one.
    pub workspace_id: Option<Uuid>,
    #[serde(default = "default_search_limit")]
    pub limit: u64,
}

fn default_search_limit() -> u64 {
    20
}

impl SearchRequest {
    pub fn validate(&self) -> QuadroResult<()> {
        let mut v = Violations::default();
        if self.query.trim().is_empty() {
            v.push("query", "must not be empty");
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_reports_every_violation_at_once() {
        let request = RegisterRequest {
            email: "not-an-email".into(),
            name: "".into(),
            password: "short".into(),
        };
        let err = request.validate().unwrap_err();
        let QuadroError::Validation { violations } = err else {
            panic!("expected a validation error");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["email", "name", "password"]);
    }

    #[test]
    fn slug_rules() {
        for slug in ["acme", "acme-2", "a-b-c", "42"] {
            assert!(is_valid_slug(slug), "{slug} should be valid");
        }
        for slug in ["", "Acme", "a b", "a_b", "café"] {
            assert!(!is_valid_slug(slug), "{slug} should be invalid");
        }
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("a@example.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("plain"));
    }

    #[test]
    fn name_length_is_bounded() {
        let request = CreateBoardRequest {
            workspace_id: Uuid::new_v4(),
            name: "x".repeat(256),
            description: None,
            kind: BoardKind::Main,
        };
        assert!(request.validate().is_err());
    }
}
