// src/db/schema.rs

//! Database schema definitions and migrations for the catalog database
//!
//! This module defines the SQLite schema for catalog tables and provides
//! a migration system to evolve the schema over time.

use crate::error::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the schema version tracking table
fn init_schema_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    init_schema_version(conn)?;

    let version = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Apply all pending migrations to bring the database up to date
pub fn migrate(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;
    debug!("Current schema version: {}", current_version);

    if current_version >= SCHEMA_VERSION {
        debug!("Schema is up to date");
        return Ok(());
    }

    for version in (current_version + 1)..=SCHEMA_VERSION {
        info!("Applying migration to version {}", version);
        apply_migration(conn, version)?;
        set_schema_version(conn, version)?;
    }

    info!(
        "Schema migration complete. Now at version {}",
        SCHEMA_VERSION
    );
    Ok(())
}

/// Apply a specific migration version
fn apply_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(Error::InitError(format!(
            "Unknown migration version: {}",
            version
        ))),
    }
}

/// Initial schema - Version 1
///
/// - packages: installed and available NEVRAs, indexed by name
/// - obsoletes: which package obsoletes which
fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        -- Packages known to the catalog
        CREATE TABLE packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            epoch TEXT NOT NULL DEFAULT '0',
            version TEXT NOT NULL,
            release TEXT NOT NULL,
            arch TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL CHECK(state IN ('installed', 'available')),
            UNIQUE(name, epoch, version, release, arch, state)
        );

        CREATE INDEX idx_packages_name ON packages(name);
        CREATE INDEX idx_packages_state ON packages(state);

        -- Obsoletes relation between packages
        CREATE TABLE obsoletes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            obsoleter_id INTEGER NOT NULL,
            obsoleted_id INTEGER NOT NULL,
            UNIQUE(obsoleter_id, obsoleted_id),
            FOREIGN KEY (obsoleter_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (obsoleted_id) REFERENCES packages(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_obsoletes_obsoleted ON obsoletes(obsoleted_id);
        ",
    )?;

    info!("Schema version 1 created successfully");
    Ok(())
}
