// src/catalog/mod.rs

//! Package catalog boundary
//!
//! The catalog (installed packages, available packages and the obsoletes
//! relation) is owned by the package manager. This module defines what
//! versionlock needs from it, plus two adapters:
//! - `MemoryCatalog`: plain vectors, for embedding and tests
//! - `SqliteCatalog`: the catalog database managed by `crate::db`

mod memory;
mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use crate::error::Result;
use crate::packages::nevra::PackageIdentifier;
use crate::packages::pattern::PatternSet;
use crate::packages::vercmp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One edge of the obsoletes relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObsoletesPair {
    /// The package doing the obsoleting (usually available)
    pub obsoleter: PackageIdentifier,
    /// The package being replaced (usually installed)
    pub obsoleted: PackageIdentifier,
}

/// Read access to a package catalog
pub trait Catalog {
    /// Every installed package
    fn installed(&self) -> Result<Vec<PackageIdentifier>>;

    /// Every package available from repositories
    fn available(&self) -> Result<Vec<PackageIdentifier>>;

    /// Available packages whose name is in `names`
    ///
    /// Implementations should use a name index rather than scanning
    /// the whole catalog.
    fn search_names(&self, names: &BTreeSet<String>) -> Result<Vec<PackageIdentifier>>;

    /// The obsoletes relation between available and installed packages
    fn obsoletes_pairs(&self) -> Result<Vec<ObsoletesPair>>;

    /// Complete a possibly partial identifier (for instance one taken from
    /// the obsoletes relation) to the catalog's package
    fn resolve_full_identifier(&self, partial: &PackageIdentifier) -> Result<PackageIdentifier> {
        Ok(partial.clone())
    }

    /// Newest available package for each of `names`
    fn find_newest_by_name(&self, names: &BTreeSet<String>) -> Result<Vec<PackageIdentifier>> {
        Ok(vercmp::newest_by_name(self.search_names(names)?))
    }

    /// Installed packages matching any of `patterns`
    fn installed_matching(&self, patterns: &PatternSet) -> Result<Vec<PackageIdentifier>> {
        Ok(self
            .installed()?
            .into_iter()
            .filter(|pkg| patterns.matches(pkg))
            .collect())
    }

    /// Available packages matching any of `patterns`
    fn available_matching(&self, patterns: &PatternSet) -> Result<Vec<PackageIdentifier>> {
        Ok(self
            .available()?
            .into_iter()
            .filter(|pkg| patterns.matches(pkg))
            .collect())
    }
}

/// Serialized catalog contents, as loaded by `SqliteCatalog::import`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Installed packages as NEVRA strings
    #[serde(default)]
    pub installed: Vec<String>,
    /// Available packages as NEVRA strings
    #[serde(default)]
    pub available: Vec<String>,
    /// `[obsoleter, obsoleted]` NEVRA string pairs
    #[serde(default)]
    pub obsoletes: Vec<(String, String)>,
}

impl CatalogSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::Error::ParseError(format!("Invalid catalog snapshot: {}", e)))
    }
}
