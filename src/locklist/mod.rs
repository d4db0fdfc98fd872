// src/locklist/mod.rs

//! Lock list parsing and persistence
//!
//! A lock list is a line-oriented text file:
//! - blank lines and `#` comments are ignored
//! - `epoch:name-version-release.arch` locks a package to that version
//! - a leading `!` turns the line into an exclude of that exact version
//!
//! The arch is conventionally `*`, locks never look at it.

mod store;

pub use store::{LockListLocation, LockListStore};

use crate::error::Result;
use crate::packages::nevra::{canonical_epoch, Evr, PackageIdentifier, Template};
use std::collections::{HashMap, HashSet};

/// Architecture written into new lock lines
pub const ANY_ARCH: &str = "*";

/// True for lines that carry an entry (not blank, not a comment)
pub fn is_entry_line(line: &str) -> bool {
    !(line.starts_with('#') || line.trim().is_empty())
}

/// Timestamp in `ctime(3)` layout for section header comments
pub fn ctime_now() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

/// One parsed lock list line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    /// The line as found in the file, for display
    pub line: String,
    pub package: PackageIdentifier,
    /// `!` entries exclude a version instead of locking to it
    pub negated: bool,
}

impl LockEntry {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end();
        let (negated, ident) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        Ok(Self {
            line: line.to_string(),
            package: PackageIdentifier::parse(ident)?,
            negated,
        })
    }

    /// Lock line for a package: `epoch:name-version-release.*`
    pub fn lock_line(pkg: &PackageIdentifier) -> String {
        pkg.with_arch(ANY_ARCH).format(Template::Lock)
    }

    /// Exclude line for a package: `!epoch:name-version-release.*`
    pub fn exclude_line(pkg: &PackageIdentifier) -> String {
        format!("!{}", Self::lock_line(pkg))
    }
}

/// The parsed entries of a lock list, in file order
#[derive(Debug, Clone, Default)]
pub struct LockList {
    entries: Vec<LockEntry>,
}

impl LockList {
    /// Parse entry lines; any malformed line fails the whole list
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let entries = lines
            .iter()
            .map(|l| l.as_ref())
            .filter(|l| is_entry_line(l))
            .map(LockEntry::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LockEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Approved versions per locked name
    ///
    /// Excludes count as well: an excluded version must never show up as
    /// an available update. A `!` left on the epoch text is an old way of
    /// marking excludes and is dropped here.
    pub fn approved_versions(&self) -> HashMap<String, HashSet<Evr>> {
        let mut locks: HashMap<String, HashSet<Evr>> = HashMap::new();

        for entry in &self.entries {
            let pkg = &entry.package;
            let epoch = pkg.epoch.strip_prefix('!').unwrap_or(&pkg.epoch);
            locks.entry(pkg.name.clone()).or_default().insert(Evr {
                epoch: canonical_epoch(epoch),
                version: pkg.version.clone(),
                release: pkg.release.clone(),
            });
        }

        locks
    }

    /// Whether `pkg` (arch ignored) already has an entry of the given kind
    pub fn contains(&self, pkg: &PackageIdentifier, negated: bool) -> bool {
        let evr = pkg.evr();
        self.entries
            .iter()
            .any(|e| e.negated == negated && e.package.name == pkg.name && e.package.evr() == evr)
    }
}
