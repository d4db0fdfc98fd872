// src/exclusion.rs

//! Exclusion sets handed to the upgrade filtering pipeline
//!
//! The pipeline applies two filters:
//! - whitelist: packages whose name is in `allow_names` are excluded unless
//!   their `name-epoch:version-release` is in `allow_nevr`
//! - blacklist: packages whose `name-epoch:version-release` is in
//!   `deny_nevr` are excluded
//!
//! All keys are lower-case. The projection is rebuilt from scratch on every
//! call.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::locklist::LockList;
use crate::packages::nevra::PackageIdentifier;
use crate::resolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// The three sets consumed by the exclusion pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionProjection {
    /// Names with at least one lock, plus their obsoleters
    pub allow_names: BTreeSet<String>,
    /// Locked versions
    pub allow_nevr: BTreeSet<String>,
    /// Excluded versions
    pub deny_nevr: BTreeSet<String>,
}

impl ExclusionProjection {
    /// Whether the pipeline would drop `pkg`
    pub fn excludes(&self, pkg: &PackageIdentifier) -> bool {
        let key = pkg.nevr_key();
        if self.deny_nevr.contains(&key) {
            return true;
        }
        self.allow_names.contains(&pkg.name.to_lowercase()) && !self.allow_nevr.contains(&key)
    }

    /// Nothing to register with the pipeline
    pub fn is_empty(&self) -> bool {
        self.allow_names.is_empty() && self.deny_nevr.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::Error::ParseError(format!("Failed to serialize exclusions: {}", e)))
    }
}

/// Derive the exclusion sets from a lock list
pub fn project(
    locks: &LockList,
    catalog: &dyn Catalog,
    follow_obsoletes: bool,
) -> Result<ExclusionProjection> {
    let mut projection = ExclusionProjection::default();

    for entry in locks.entries() {
        let key = entry.package.nevr_key();
        if entry.negated {
            projection.deny_nevr.insert(key);
        } else {
            projection.allow_names.insert(entry.package.name.to_lowercase());
            projection.allow_nevr.insert(key);
        }
    }

    if follow_obsoletes && !projection.allow_names.is_empty() {
        // Single pass: only direct obsoleters of locked names are added
        let mut obsoleters = Vec::new();
        for pair in catalog.obsoletes_pairs()? {
            if projection
                .allow_names
                .contains(&pair.obsoleted.name.to_lowercase())
            {
                debug!(
                    "{} obsoletes locked {}, locking it too",
                    pair.obsoleter.name, pair.obsoleted.name
                );
                obsoleters.push(pair.obsoleter.name.to_lowercase());
            }
        }
        projection.allow_names.extend(obsoleters);
    }

    debug!(
        "Exclusion sets: {} name(s), {} locked, {} excluded",
        projection.allow_names.len(),
        projection.allow_nevr.len(),
        projection.deny_nevr.len()
    );
    Ok(projection)
}

/// Log line reporting how many updates the locks hold back
pub fn hint_message(total: usize) -> String {
    let (suffix, what) = if total == 1 { ("", "it") } else { ("s", "them") };
    format!(
        "Excluding {} update{} due to versionlock (use \"versionlock status\" to show {})",
        total, suffix, what
    )
}

/// Read the configured lock list and build its exclusion sets
pub fn prepare_exclusions(config: &Config, catalog: &dyn Catalog) -> Result<ExclusionProjection> {
    info!("Reading version lock configuration");
    let locks = config.store()?.load()?;
    let projection = project(&locks, catalog, config.follow_obsoletes)?;

    if config.show_hint {
        let total = resolver::compute_conflicts(&locks, catalog, config.follow_obsoletes)?.len();
        if total > 0 {
            info!("{}", hint_message(total));
        }
    }

    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;

    fn pkg(s: &str) -> PackageIdentifier {
        PackageIdentifier::parse(s).unwrap()
    }

    fn locks(lines: &[&str]) -> LockList {
        LockList::from_lines(lines).unwrap()
    }

    #[test]
    fn test_project_sets() {
        let catalog = MemoryCatalog::new();
        let projection = project(
            &locks(&["0:Foo-1.0-1.*", "foo-1.1-2.*", "!1:bar-2.0-1.*"]),
            &catalog,
            false,
        )
        .unwrap();

        assert_eq!(projection.allow_names, BTreeSet::from(["foo".to_string()]));
        assert_eq!(
            projection.allow_nevr,
            BTreeSet::from(["foo-0:1.0-1".to_string(), "foo-0:1.1-2".to_string()])
        );
        assert_eq!(projection.deny_nevr, BTreeSet::from(["bar-1:2.0-1".to_string()]));
    }

    #[test]
    fn test_negated_entries_never_add_names() {
        let catalog = MemoryCatalog::new();
        let projection = project(&locks(&["!0:bar-2.0-1.*"]), &catalog, true).unwrap();
        assert!(projection.allow_names.is_empty());
        assert!(!projection.excludes(&pkg("0:bar-1.0-1.x86_64")));
        assert!(projection.excludes(&pkg("0:bar-2.0-1.x86_64")));
    }

    #[test]
    fn test_excludes_whitelist() {
        let catalog = MemoryCatalog::new();
        let projection = project(&locks(&["0:foo-1.0-1.*"]), &catalog, false).unwrap();

        assert!(!projection.excludes(&pkg("0:foo-1.0-1.x86_64")));
        assert!(!projection.excludes(&pkg("0:FOO-1.0-1.i686")));
        assert!(projection.excludes(&pkg("0:foo-2.0-1.x86_64")));
        assert!(!projection.excludes(&pkg("0:other-2.0-1.x86_64")));
    }

    #[test]
    fn test_follow_obsoletes_adds_obsoleter_names() {
        let mut catalog = MemoryCatalog::new();
        catalog
            .add_obsoletes(pkg("0:Baz-2.0-1.noarch"), pkg("0:Bar-1.0-1.noarch"))
            .add_obsoletes(pkg("0:qux-2.0-1.noarch"), pkg("0:baz-2.0-1.noarch"));

        let projection = project(&locks(&["0:bar-1.0-1.*"]), &catalog, true).unwrap();
        // qux obsoletes baz, which is only reached transitively
        assert_eq!(
            projection.allow_names,
            BTreeSet::from(["bar".to_string(), "baz".to_string()])
        );
        assert!(projection.excludes(&pkg("0:baz-2.0-1.noarch")));

        let projection = project(&locks(&["0:bar-1.0-1.*"]), &catalog, false).unwrap();
        assert_eq!(projection.allow_names, BTreeSet::from(["bar".to_string()]));
    }

    #[test]
    fn test_hint_message() {
        assert_eq!(
            hint_message(1),
            "Excluding 1 update due to versionlock (use \"versionlock status\" to show it)"
        );
        assert_eq!(
            hint_message(3),
            "Excluding 3 updates due to versionlock (use \"versionlock status\" to show them)"
        );
    }

    #[test]
    fn test_projection_json() {
        let catalog = MemoryCatalog::new();
        let projection = project(&locks(&["0:foo-1.0-1.*"]), &catalog, false).unwrap();
        let json = projection.to_json().unwrap();
        let parsed: ExclusionProjection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, projection);
        assert!(json.contains("\"allow_names\""));
    }

    #[test]
    fn test_prepare_exclusions_reads_locklist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("versionlock.list");
        std::fs::write(&path, "0:foo-1.0-1.*\n").unwrap();

        let mut catalog = MemoryCatalog::new();
        catalog.add_available(pkg("0:foo-2.0-1.x86_64"));

        let config = Config {
            locklist: path.to_string_lossy().into_owned(),
            ..Config::default()
        };
        let projection = prepare_exclusions(&config, &catalog).unwrap();
        assert!(projection.excludes(&pkg("0:foo-2.0-1.x86_64")));
        assert!(!projection.is_empty());
    }
}
