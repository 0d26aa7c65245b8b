//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. The `update` and `group` entity
//! names collide with SurrealQL keywords, so their tables are
//! `item_update`, `board_group`, and `board_view`.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD avatar_url ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Sessions (one row per outstanding refresh token)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_session_token_hash ON TABLE session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;

-- =======================================================================
-- Workspaces
-- =======================================================================
DEFINE TABLE workspace SCHEMAFULL;
DEFINE FIELD name ON TABLE workspace TYPE string;
DEFINE FIELD slug ON TABLE workspace TYPE string;
DEFINE FIELD logo_url ON TABLE workspace TYPE option<string>;
DEFINE FIELD settings ON TABLE workspace TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE workspace TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE workspace TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_workspace_slug ON TABLE workspace COLUMNS slug UNIQUE;

-- =======================================================================
-- Memberships — the sole source of authorization truth
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD workspace_id ON TABLE membership TYPE string;
DEFINE FIELD role ON TABLE membership TYPE string \
    ASSERT $value IN ['ADMIN', 'MEMBER', 'VIEWER', 'GUEST'];
DEFINE FIELD joined_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_user_workspace ON TABLE membership \
    COLUMNS user_id, workspace_id UNIQUE;
DEFINE INDEX idx_membership_workspace ON TABLE membership \
    COLUMNS workspace_id;

-- =======================================================================
-- Boards
-- =======================================================================
DEFINE TABLE board SCHEMAFULL;
DEFINE FIELD workspace_id ON TABLE board TYPE string;
DEFINE FIELD name ON TABLE board TYPE string;
DEFINE FIELD description ON TABLE board TYPE option<string>;
DEFINE FIELD kind ON TABLE board TYPE string \
    ASSERT $value IN ['MAIN', 'PRIVATE', 'SHAREABLE'];
DEFINE FIELD settings ON TABLE board TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_by ON TABLE board TYPE string;
DEFINE FIELD created_at ON TABLE board TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE board TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_board_workspace ON TABLE board COLUMNS workspace_id;

-- =======================================================================
-- Columns
-- =======================================================================
DEFINE TABLE column SCHEMAFULL;
DEFINE FIELD board_id ON TABLE column TYPE string;
DEFINE FIELD title ON TABLE column TYPE string;
DEFINE FIELD kind ON TABLE column TYPE string \
    ASSERT $value IN ['TEXT', 'STATUS', 'PERSON', 'DATE', 'NUMBER'];
DEFINE FIELD position ON TABLE column TYPE int;
DEFINE FIELD width ON TABLE column TYPE option<int>;
DEFINE FIELD settings ON TABLE column TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE column TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_column_board ON TABLE column COLUMNS board_id;

-- =======================================================================
-- Groups
-- =======================================================================
DEFINE TABLE board_group SCHEMAFULL;
DEFINE FIELD board_id ON TABLE board_group TYPE string;
DEFINE FIELD title ON TABLE board_group TYPE string;
DEFINE FIELD color ON TABLE board_group TYPE option<string>;
DEFINE FIELD position ON TABLE board_group TYPE int;
DEFINE FIELD created_at ON TABLE board_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_group_board ON TABLE board_group COLUMNS board_id;

-- =======================================================================
-- Items
-- =======================================================================
DEFINE TABLE item SCHEMAFULL;
DEFINE FIELD board_id ON TABLE item TYPE string;
DEFINE FIELD group_id ON TABLE item TYPE string;
DEFINE FIELD name ON TABLE item TYPE string;
DEFINE FIELD position ON TABLE item TYPE int;
DEFINE FIELD parent_item_id ON TABLE item TYPE option<string>;
DEFINE FIELD created_by ON TABLE item TYPE string;
DEFINE FIELD created_at ON TABLE item TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE item TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_item_board ON TABLE item COLUMNS board_id;
DEFINE INDEX idx_item_group ON TABLE item COLUMNS group_id;

-- =======================================================================
-- Column values (one cell per item × column)
-- =======================================================================
DEFINE TABLE column_value SCHEMAFULL;
DEFINE FIELD item_id ON TABLE column_value TYPE string;
DEFINE FIELD column_id ON TABLE column_value TYPE string;
DEFINE FIELD value ON TABLE column_value TYPE any;
DEFINE FIELD last_modified_by ON TABLE column_value TYPE string;
DEFINE FIELD created_at ON TABLE column_value TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE column_value TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_column_value_item_column ON TABLE column_value \
    COLUMNS item_id, column_id UNIQUE;
DEFINE INDEX idx_column_value_item ON TABLE column_value COLUMNS item_id;

-- =======================================================================
-- Updates (comments on items)
-- =======================================================================
DEFINE TABLE item_update SCHEMAFULL;
DEFINE FIELD item_id ON TABLE item_update TYPE string;
DEFINE FIELD user_id ON TABLE item_update TYPE string;
DEFINE FIELD body ON TABLE item_update TYPE string;
DEFINE FIELD created_at ON TABLE item_update TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_item_update_item ON TABLE item_update COLUMNS item_id;

-- =======================================================================
-- Mentions (one row per user called out in a comment)
-- =======================================================================
DEFINE TABLE mention SCHEMAFULL;
DEFINE FIELD update_id ON TABLE mention TYPE string;
DEFINE FIELD mentioned_user_id ON TABLE mention TYPE string;
DEFINE FIELD created_at ON TABLE mention TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_mention_update_user ON TABLE mention \
    COLUMNS update_id, mentioned_user_id UNIQUE;

-- =======================================================================
-- Notifications (per-user inbox, survives deletion of the source)
-- =======================================================================
DEFINE TABLE notification SCHEMAFULL;
DEFINE FIELD user_id ON TABLE notification TYPE string;
DEFINE FIELD kind ON TABLE notification TYPE string \
    ASSERT $value IN ['MENTION'];
DEFINE FIELD title ON TABLE notification TYPE string;
DEFINE FIELD body ON TABLE notification TYPE string;
DEFINE FIELD data ON TABLE notification TYPE any;
DEFINE FIELD is_read ON TABLE notification TYPE bool DEFAULT false;
DEFINE FIELD read_at ON TABLE notification TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE notification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_notification_user ON TABLE notification COLUMNS user_id;

-- =======================================================================
-- Activities (append-only audit trail)
-- =======================================================================
DEFINE TABLE activity SCHEMAFULL;
DEFINE FIELD item_id ON TABLE activity TYPE string;
DEFINE FIELD actor_id ON TABLE activity TYPE string;
DEFINE FIELD kind ON TABLE activity TYPE string \
    ASSERT $value IN ['ITEM_CREATED', 'ITEM_UPDATED', 'ITEM_DELETED', \
    'COLUMN_VALUE_UPDATED', 'UPDATE_POSTED'];
DEFINE FIELD data ON TABLE activity TYPE any;
DEFINE FIELD created_at ON TABLE activity TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_activity_item ON TABLE activity COLUMNS item_id;

-- =======================================================================
-- Views
-- =======================================================================
DEFINE TABLE board_view SCHEMAFULL;
DEFINE FIELD board_id ON TABLE board_view TYPE string;
DEFINE FIELD name ON TABLE board_view TYPE string;
DEFINE FIELD kind ON TABLE board_view TYPE string \
    ASSERT $value IN ['TABLE', 'KANBAN', 'CALENDAR'];
DEFINE FIELD is_default ON TABLE board_view TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE board_view TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_board_view_board ON TABLE board_view COLUMNS board_id;

-- =======================================================================
-- Automations
-- =======================================================================
DEFINE TABLE automation SCHEMAFULL;
DEFINE FIELD board_id ON TABLE automation TYPE string;
DEFINE FIELD name ON TABLE automation TYPE string;
DEFINE FIELD enabled ON TABLE automation TYPE bool DEFAULT true;
DEFINE FIELD config ON TABLE automation TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE automation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_automation_board ON TABLE automation COLUMNS board_id;
";

/// Expose the v1 schema DDL (useful for tooling and tests).
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

/// Run all pending migrations against the given database.
///
/// Creates the migration-tracking table if needed, then applies every
/// migration whose version is not yet recorded, in version order.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("migration table DDL: {e}")))?;

    let mut applied = db
        .query("SELECT version, name FROM _migration ORDER BY version ASC")
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;
    let applied: Vec<MigrationRecord> = applied.take(0)?;
    let latest = applied.iter().map(|m| m.version).max().unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > latest) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        db.query(migration.sql)
            .await?
            .check()
            .map_err(|e| DbError::Migration(format!("{}: {e}", migration.name)))?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name.to_string()))
            .await?
            .check()
            .map_err(|e| DbError::Migration(format!("recording {}: {e}", migration.name)))?;
    }

    Ok(())
}
