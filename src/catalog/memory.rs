// src/catalog/memory.rs

//! In-memory catalog adapter

use super::{Catalog, CatalogSnapshot, ObsoletesPair};
use crate::error::Result;
use crate::packages::nevra::PackageIdentifier;
use std::collections::{BTreeSet, HashMap};

/// Catalog held in plain vectors with a name index over available packages
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    installed: Vec<PackageIdentifier>,
    available: Vec<PackageIdentifier>,
    by_name: HashMap<String, Vec<usize>>,
    obsoletes: Vec<ObsoletesPair>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a snapshot
    pub fn from_snapshot(snapshot: &CatalogSnapshot) -> Result<Self> {
        let mut catalog = Self::new();
        for nevra in &snapshot.installed {
            catalog.add_installed(PackageIdentifier::parse(nevra)?);
        }
        for nevra in &snapshot.available {
            catalog.add_available(PackageIdentifier::parse(nevra)?);
        }
        for (new, old) in &snapshot.obsoletes {
            catalog.add_obsoletes(PackageIdentifier::parse(new)?, PackageIdentifier::parse(old)?);
        }
        Ok(catalog)
    }

    pub fn add_installed(&mut self, pkg: PackageIdentifier) -> &mut Self {
        self.installed.push(pkg);
        self
    }

    pub fn add_available(&mut self, pkg: PackageIdentifier) -> &mut Self {
        self.by_name
            .entry(pkg.name.clone())
            .or_default()
            .push(self.available.len());
        self.available.push(pkg);
        self
    }

    pub fn add_obsoletes(
        &mut self,
        obsoleter: PackageIdentifier,
        obsoleted: PackageIdentifier,
    ) -> &mut Self {
        self.obsoletes.push(ObsoletesPair {
            obsoleter,
            obsoleted,
        });
        self
    }
}

impl Catalog for MemoryCatalog {
    fn installed(&self) -> Result<Vec<PackageIdentifier>> {
        Ok(self.installed.clone())
    }

    fn available(&self) -> Result<Vec<PackageIdentifier>> {
        Ok(self.available.clone())
    }

    fn search_names(&self, names: &BTreeSet<String>) -> Result<Vec<PackageIdentifier>> {
        Ok(names
            .iter()
            .filter_map(|name| self.by_name.get(name))
            .flatten()
            .map(|&idx| self.available[idx].clone())
            .collect())
    }

    fn obsoletes_pairs(&self) -> Result<Vec<ObsoletesPair>> {
        Ok(self.obsoletes.clone())
    }

    fn resolve_full_identifier(&self, partial: &PackageIdentifier) -> Result<PackageIdentifier> {
        let evr = partial.evr();
        let found = self
            .available
            .iter()
            .chain(self.installed.iter())
            .find(|pkg| {
                pkg.name == partial.name
                    && pkg.evr() == evr
                    && (partial.arch.is_empty() || pkg.arch == partial.arch)
            });
        Ok(found.cloned().unwrap_or_else(|| partial.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::pattern::PatternSet;

    fn pkg(s: &str) -> PackageIdentifier {
        PackageIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_search_names_uses_index() {
        let mut catalog = MemoryCatalog::new();
        catalog
            .add_available(pkg("0:foo-1.0-1.x86_64"))
            .add_available(pkg("0:bar-1.0-1.x86_64"))
            .add_available(pkg("0:foo-2.0-1.x86_64"));

        let names: BTreeSet<String> = ["foo".to_string(), "missing".to_string()].into();
        let found = catalog.search_names(&names).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.name == "foo"));
    }

    #[test]
    fn test_find_newest_by_name() {
        let mut catalog = MemoryCatalog::new();
        catalog
            .add_available(pkg("0:foo-1.0-1.x86_64"))
            .add_available(pkg("0:foo-1.10-1.x86_64"))
            .add_available(pkg("0:foo-1.9-1.x86_64"));

        let names: BTreeSet<String> = ["foo".to_string()].into();
        let newest = catalog.find_newest_by_name(&names).unwrap();
        assert_eq!(newest, vec![pkg("0:foo-1.10-1.x86_64")]);
    }

    #[test]
    fn test_matching_uses_all_name_forms() {
        let mut catalog = MemoryCatalog::new();
        catalog
            .add_installed(pkg("0:foo-1.0-1.x86_64"))
            .add_installed(pkg("0:foo-1.0-1.i686"))
            .add_installed(pkg("0:bar-1.0-1.x86_64"));

        let patterns = PatternSet::new(&["foo.x86_64"]).unwrap();
        let found = catalog.installed_matching(&patterns).unwrap();
        assert_eq!(found, vec![pkg("0:foo-1.0-1.x86_64")]);

        let patterns = PatternSet::new(&["*-1.0-1"]).unwrap();
        assert_eq!(catalog.installed_matching(&patterns).unwrap().len(), 3);
    }

    #[test]
    fn test_resolve_full_identifier() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_available(pkg("1:baz-2.0-1.noarch"));

        let partial = PackageIdentifier::new("baz", "1", "2.0", "1", "");
        assert_eq!(
            catalog.resolve_full_identifier(&partial).unwrap(),
            pkg("1:baz-2.0-1.noarch")
        );

        let unknown = PackageIdentifier::new("nope", "0", "1", "1", "");
        assert_eq!(catalog.resolve_full_identifier(&unknown).unwrap(), unknown);
    }

    #[test]
    fn test_from_snapshot() {
        let snapshot = CatalogSnapshot {
            installed: vec!["0:bar-1.0-1.noarch".to_string()],
            available: vec!["0:baz-2.0-1.noarch".to_string()],
            obsoletes: vec![(
                "0:baz-2.0-1.noarch".to_string(),
                "0:bar-1.0-1.noarch".to_string(),
            )],
        };
        let catalog = MemoryCatalog::from_snapshot(&snapshot).unwrap();
        assert_eq!(catalog.installed().unwrap().len(), 1);
        assert_eq!(catalog.obsoletes_pairs().unwrap()[0].obsoleted.name, "bar");
    }
}
