// src/db/models.rs

//! Data models for catalog database entities
//!
//! This module defines Rust structs that correspond to database tables
//! and provides methods for creating and reading records.

use crate::catalog::ObsoletesPair;
use crate::error::Result;
use crate::packages::nevra::PackageIdentifier;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Names per `IN (...)` query, well under SQLite's variable limit
const NAME_BATCH_SIZE: usize = 500;

const PACKAGE_COLUMNS: &str = "id, name, epoch, version, release, arch, state";

/// Whether a catalog package is installed or only available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Installed,
    Available,
}

impl PackageState {
    pub fn as_str(&self) -> &str {
        match self {
            PackageState::Installed => "installed",
            PackageState::Available => "available",
        }
    }
}

impl FromStr for PackageState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "installed" => Ok(PackageState::Installed),
            "available" => Ok(PackageState::Available),
            _ => Err(format!("Invalid package state: {}", s)),
        }
    }
}

/// A package row in the catalog
#[derive(Debug, Clone)]
pub struct CatalogPackage {
    pub id: Option<i64>,
    pub name: String,
    pub epoch: String,
    pub version: String,
    pub release: String,
    pub arch: String,
    pub state: PackageState,
}

impl CatalogPackage {
    /// Create a new catalog package from an identifier
    pub fn new(ident: &PackageIdentifier, state: PackageState) -> Self {
        Self {
            id: None,
            name: ident.name.clone(),
            epoch: ident.epoch.clone(),
            version: ident.version.clone(),
            release: ident.release.clone(),
            arch: ident.arch.clone(),
            state,
        }
    }

    /// The package as a NEVRA identifier
    pub fn identifier(&self) -> PackageIdentifier {
        PackageIdentifier::new(
            &self.name,
            &self.epoch,
            &self.version,
            &self.release,
            &self.arch,
        )
    }

    /// Insert this package, reusing the existing row for a duplicate
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT OR IGNORE INTO packages (name, epoch, version, release, arch, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &self.name,
                &self.epoch,
                &self.version,
                &self.release,
                &self.arch,
                self.state.as_str(),
            ],
        )?;

        let id = conn.query_row(
            "SELECT id FROM packages
             WHERE name = ?1 AND epoch = ?2 AND version = ?3 AND release = ?4
               AND arch = ?5 AND state = ?6",
            params![
                &self.name,
                &self.epoch,
                &self.version,
                &self.release,
                &self.arch,
                self.state.as_str(),
            ],
            |row| row.get(0),
        )?;

        self.id = Some(id);
        Ok(id)
    }

    /// List all packages in the given state
    pub fn list_by_state(conn: &Connection, state: PackageState) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM packages WHERE state = ?1 ORDER BY name, id",
            PACKAGE_COLUMNS
        ))?;

        let pkgs = stmt
            .query_map([state.as_str()], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(pkgs)
    }

    /// Find packages in the given state whose name is one of `names`
    pub fn find_by_names(
        conn: &Connection,
        names: &BTreeSet<String>,
        state: PackageState,
    ) -> Result<Vec<Self>> {
        let names: Vec<&String> = names.iter().collect();
        let mut pkgs = Vec::new();

        for batch in names.chunks(NAME_BATCH_SIZE) {
            let placeholders = vec!["?"; batch.len()].join(", ");
            let sql = format!(
                "SELECT {} FROM packages WHERE state = ? AND name IN ({}) ORDER BY name, id",
                PACKAGE_COLUMNS, placeholders
            );
            let mut stmt = conn.prepare(&sql)?;

            let args = std::iter::once(state.as_str()).chain(batch.iter().map(|n| n.as_str()));
            let rows = stmt
                .query_map(params_from_iter(args), Self::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            pkgs.extend(rows);
        }

        Ok(pkgs)
    }

    /// Find packages with the given name and (epoch, version, release)
    pub fn find_by_evr(conn: &Connection, ident: &PackageIdentifier) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM packages
             WHERE name = ?1 AND epoch = ?2 AND version = ?3 AND release = ?4
             ORDER BY state, id",
            PACKAGE_COLUMNS
        ))?;

        let pkgs = stmt
            .query_map(
                params![&ident.name, &ident.epoch, &ident.version, &ident.release],
                Self::from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(pkgs)
    }

    /// Convert a database row to a CatalogPackage
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let state_str: String = row.get(6)?;
        let state = state_str.parse::<PackageState>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            )
        })?;

        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            epoch: row.get(2)?,
            version: row.get(3)?,
            release: row.get(4)?,
            arch: row.get(5)?,
            state,
        })
    }
}

/// An obsoletes edge between two catalog packages
#[derive(Debug, Clone)]
pub struct ObsoleteEntry {
    pub id: Option<i64>,
    pub obsoleter_id: i64,
    pub obsoleted_id: i64,
}

impl ObsoleteEntry {
    pub fn new(obsoleter_id: i64, obsoleted_id: i64) -> Self {
        Self {
            id: None,
            obsoleter_id,
            obsoleted_id,
        }
    }

    /// Insert this edge (duplicates are ignored)
    pub fn insert(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO obsoletes (obsoleter_id, obsoleted_id) VALUES (?1, ?2)",
            [self.obsoleter_id, self.obsoleted_id],
        )?;
        let id = conn.query_row(
            "SELECT id FROM obsoletes WHERE obsoleter_id = ?1 AND obsoleted_id = ?2",
            [self.obsoleter_id, self.obsoleted_id],
            |row| row.get(0),
        )?;
        self.id = Some(id);
        Ok(())
    }

    /// Every edge, resolved to identifiers
    pub fn list_pairs(conn: &Connection) -> Result<Vec<ObsoletesPair>> {
        let mut stmt = conn.prepare(
            "SELECT n.name, n.epoch, n.version, n.release, n.arch,
                    o.name, o.epoch, o.version, o.release, o.arch
             FROM obsoletes ob
             JOIN packages n ON n.id = ob.obsoleter_id
             JOIN packages o ON o.id = ob.obsoleted_id
             ORDER BY ob.id",
        )?;

        let pairs = stmt
            .query_map([], |row| {
                let ident = |base: usize| -> rusqlite::Result<PackageIdentifier> {
                    Ok(PackageIdentifier::new(
                        &row.get::<_, String>(base)?,
                        &row.get::<_, String>(base + 1)?,
                        &row.get::<_, String>(base + 2)?,
                        &row.get::<_, String>(base + 3)?,
                        &row.get::<_, String>(base + 4)?,
                    ))
                };
                Ok(ObsoletesPair {
                    obsoleter: ident(0)?,
                    obsoleted: ident(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(pairs)
    }
}
