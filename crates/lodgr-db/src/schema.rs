//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. Tenant ids are the record
//! keys of `tenant`; property and reservation keys are UUID strings.
//! Monetary amounts are stored as `decimal`.

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
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "reservation_store",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — tenants, properties, reservations
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope; record key is the tenant id)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Properties (tenant scope)
-- =======================================================================
DEFINE TABLE property SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE property TYPE string;
DEFINE FIELD property_code ON TABLE property TYPE string;
DEFINE FIELD name ON TABLE property TYPE string;
DEFINE FIELD timezone ON TABLE property TYPE string DEFAULT 'UTC';
DEFINE FIELD created_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_property_tenant_code ON TABLE property \
    COLUMNS tenant_id, property_code UNIQUE;

-- =======================================================================
-- Reservations (tenant scope, append-only)
-- =======================================================================
DEFINE TABLE reservation SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD property_id ON TABLE reservation TYPE string;
DEFINE FIELD tenant_id ON TABLE reservation TYPE string;
DEFINE FIELD check_in_date ON TABLE reservation TYPE datetime;
DEFINE FIELD check_out_date ON TABLE reservation TYPE datetime;
DEFINE FIELD total_amount ON TABLE reservation TYPE decimal;
DEFINE FIELD currency ON TABLE reservation TYPE string DEFAULT 'USD';
DEFINE FIELD created_at ON TABLE reservation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_reservation_tenant ON TABLE reservation \
    COLUMNS tenant_id;
DEFINE INDEX idx_reservation_property ON TABLE reservation \
    COLUMNS property_id;
DEFINE INDEX idx_reservation_dates ON TABLE reservation \
    COLUMNS check_in_date, check_out_date;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied successfully");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for tests against in-memory SurrealDB instances that bypass
/// the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
