// src/resolver.rs

//! Detection of updates and obsoleters that a lock holds back
//!
//! Two passes over the catalog:
//! 1. Direct updates: the newest available package of each locked name,
//!    unless its version is one of the approved ones.
//! 2. Obsoletes (optional): packages obsoleting a locked name, unless the
//!    obsoleter is itself locked at that version.
//!
//! Obsoletes evidence replaces direct-update evidence for the same name.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::locklist::LockList;
use crate::packages::nevra::{PackageIdentifier, Template};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Why a locked name has pending changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateConflict {
    /// A newer, unapproved version is available
    Update(PackageIdentifier),
    /// Other packages obsolete the locked one
    Obsoleted(Vec<PackageIdentifier>),
}

impl UpdateConflict {
    /// Human readable lines, as printed by `versionlock status`
    pub fn status_lines(&self, locked_name: &str) -> Vec<String> {
        match self {
            UpdateConflict::Update(pkg) => vec![format!("{}.*", pkg.format(Template::Envr))],
            UpdateConflict::Obsoleted(pkgs) => {
                let unique: BTreeSet<String> = pkgs
                    .iter()
                    .map(|p| format!("{}.*", p.format(Template::Envr)))
                    .collect();
                unique
                    .into_iter()
                    .map(|envr| format!("{} (replacing {})", envr, locked_name))
                    .collect()
            }
        }
    }
}

/// Conflicts keyed by locked package name
pub type ConflictMap = BTreeMap<String, UpdateConflict>;

/// Find every locked name that an update or an obsoleter would move
pub fn compute_conflicts(
    locks: &LockList,
    catalog: &dyn Catalog,
    follow_obsoletes: bool,
) -> Result<ConflictMap> {
    let approved = locks.approved_versions();
    let mut conflicts = ConflictMap::new();

    if approved.is_empty() {
        return Ok(conflicts);
    }

    // One batched lookup for every locked name
    let names: BTreeSet<String> = approved.keys().cloned().collect();
    for pkg in catalog.find_newest_by_name(&names)? {
        let Some(versions) = approved.get(&pkg.name) else {
            continue;
        };
        if versions.contains(&pkg.evr()) {
            // Locked or excluded version, nothing pending
            continue;
        }
        debug!("Update held back: {}", pkg);
        conflicts.insert(pkg.name.clone(), UpdateConflict::Update(pkg));
    }

    if !follow_obsoletes {
        return Ok(conflicts);
    }

    for pair in catalog.obsoletes_pairs()? {
        let old_name = &pair.obsoleted.name;
        if !approved.contains_key(old_name) {
            continue;
        }
        if approved
            .get(&pair.obsoleter.name)
            .is_some_and(|versions| versions.contains(&pair.obsoleter.evr()))
        {
            continue;
        }

        let obsoleter = catalog.resolve_full_identifier(&pair.obsoleter)?;
        debug!("{} obsoletes locked {}", obsoleter, old_name);

        let entry = conflicts
            .entry(old_name.clone())
            .or_insert_with(|| UpdateConflict::Obsoleted(Vec::new()));
        if matches!(entry, UpdateConflict::Update(_)) {
            *entry = UpdateConflict::Obsoleted(Vec::new());
        }
        if let UpdateConflict::Obsoleted(list) = entry
            && !list.contains(&obsoleter)
        {
            list.push(obsoleter);
        }
    }

    Ok(conflicts)
}
