// src/catalog/sqlite.rs

//! Catalog adapter over the SQLite catalog database

use super::{Catalog, CatalogSnapshot, ObsoletesPair};
use crate::db::{
    self,
    models::{CatalogPackage, ObsoleteEntry, PackageState},
};
use crate::error::Result;
use crate::packages::nevra::PackageIdentifier;
use rusqlite::Connection;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Counts reported by [`SqliteCatalog::import`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub installed: usize,
    pub available: usize,
    pub obsoletes: usize,
}

/// Catalog backed by a catalog database connection
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open an existing catalog database
    pub fn open(db_path: &str) -> Result<Self> {
        Ok(Self::new(db::open(db_path)?))
    }

    /// Create (or migrate) and open a catalog database
    pub fn create(db_path: &str) -> Result<Self> {
        db::init(db_path)?;
        Self::open(db_path)
    }

    /// Load a snapshot into the catalog in one transaction
    ///
    /// Obsoletes edges create their endpoint packages when missing: the
    /// obsoleter as available, the obsoleted package as installed.
    pub fn import(&mut self, snapshot: &CatalogSnapshot) -> Result<ImportStats> {
        let stats = db::transaction(&mut self.conn, |tx| {
            let mut stats = ImportStats::default();

            for nevra in &snapshot.installed {
                let ident = PackageIdentifier::parse(nevra)?;
                CatalogPackage::new(&ident, PackageState::Installed).insert(tx)?;
                stats.installed += 1;
            }

            for nevra in &snapshot.available {
                let ident = PackageIdentifier::parse(nevra)?;
                CatalogPackage::new(&ident, PackageState::Available).insert(tx)?;
                stats.available += 1;
            }

            for (new, old) in &snapshot.obsoletes {
                let new = PackageIdentifier::parse(new)?;
                let old = PackageIdentifier::parse(old)?;
                let new_id = CatalogPackage::new(&new, PackageState::Available).insert(tx)?;
                let old_id = CatalogPackage::new(&old, PackageState::Installed).insert(tx)?;
                ObsoleteEntry::new(new_id, old_id).insert(tx)?;
                stats.obsoletes += 1;
            }

            Ok(stats)
        })?;

        info!(
            "Imported {} installed, {} available, {} obsoletes",
            stats.installed, stats.available, stats.obsoletes
        );
        Ok(stats)
    }

    fn identifiers(pkgs: Vec<CatalogPackage>) -> Vec<PackageIdentifier> {
        pkgs.iter().map(CatalogPackage::identifier).collect()
    }
}

impl Catalog for SqliteCatalog {
    fn installed(&self) -> Result<Vec<PackageIdentifier>> {
        Ok(Self::identifiers(CatalogPackage::list_by_state(
            &self.conn,
            PackageState::Installed,
        )?))
    }

    fn available(&self) -> Result<Vec<PackageIdentifier>> {
        Ok(Self::identifiers(CatalogPackage::list_by_state(
            &self.conn,
            PackageState::Available,
        )?))
    }

    fn search_names(&self, names: &BTreeSet<String>) -> Result<Vec<PackageIdentifier>> {
        debug!("Searching catalog for {} name(s)", names.len());
        Ok(Self::identifiers(CatalogPackage::find_by_names(
            &self.conn,
            names,
            PackageState::Available,
        )?))
    }

    fn obsoletes_pairs(&self) -> Result<Vec<ObsoletesPair>> {
        ObsoleteEntry::list_pairs(&self.conn)
    }

    fn resolve_full_identifier(&self, partial: &PackageIdentifier) -> Result<PackageIdentifier> {
        let found = CatalogPackage::find_by_evr(&self.conn, partial)?
            .into_iter()
            .find(|pkg| partial.arch.is_empty() || pkg.arch == partial.arch);

        Ok(found
            .map(|pkg| pkg.identifier())
            .unwrap_or_else(|| partial.clone()))
    }
}
