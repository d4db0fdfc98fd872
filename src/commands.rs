// src/commands.rs

//! The versionlock commands
//!
//! Each command returns a [`CommandOutcome`]: the per-item lines it would
//! print and a one-line summary. Errors carry the non-zero status.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::locklist::{ctime_now, LockEntry, LockList, LockListStore};
use crate::packages::nevra::{PackageIdentifier, Template};
use crate::packages::pattern::PatternSet;
use crate::packages::vercmp;
use crate::resolver;
use std::collections::HashSet;
use tracing::{debug, info};

/// A versionlock command with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Lock matching installed (or else available) packages to their version
    Add(Vec<String>),
    /// Exclude the newest available version of matching packages
    Exclude(Vec<String>),
    /// Print every lock list entry
    List,
    /// Print updates and obsoleters held back by the locks
    Status,
    /// Remove matching entries
    Delete(Vec<String>),
    /// Remove every entry
    Clear,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Exclude(_) => "exclude",
            Command::List => "list",
            Command::Status => "status",
            Command::Delete(_) => "delete",
            Command::Clear => "clear",
        }
    }

    /// Whether the command writes to the lock list
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Add(_) | Command::Exclude(_) | Command::Delete(_) | Command::Clear
        )
    }
}

/// What a successful command reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// One line per affected item
    pub details: Vec<String>,
    pub summary: String,
}

impl CommandOutcome {
    fn new(details: Vec<String>, summary: impl Into<String>) -> Self {
        Self {
            details,
            summary: summary.into(),
        }
    }
}

/// Run a command against the configured lock list
pub fn run(command: &Command, config: &Config, catalog: &dyn Catalog) -> Result<CommandOutcome> {
    let store = config.store()?;
    debug!("versionlock {} on {}", command.name(), store.location());

    // Refuse remote writes before touching anything
    if command.is_mutating() {
        store.local_path()?;
    }

    match command {
        Command::Add(patterns) => cmd_add(&store, catalog, patterns),
        Command::Exclude(patterns) => cmd_exclude(&store, catalog, patterns),
        Command::List => cmd_list(&store),
        Command::Status => cmd_status(&store, catalog, config.follow_obsoletes),
        Command::Delete(patterns) => cmd_delete(&store, patterns),
        Command::Clear => cmd_clear(&store),
    }
}

/// Current entries of a lock list that is about to be appended to
///
/// A local file that does not exist yet is empty; appending creates it.
fn load_for_append(store: &LockListStore) -> Result<LockList> {
    if !store.local_path()?.exists() {
        debug!("{} does not exist yet", store.location());
        return Ok(LockList::default());
    }
    store.load()
}

/// Available packages matching `patterns`; no patterns selects them all
fn available(catalog: &dyn Catalog, patterns: &PatternSet) -> Result<Vec<PackageIdentifier>> {
    if patterns.is_empty() {
        catalog.available()
    } else {
        catalog.available_matching(patterns)
    }
}

/// Keep one package per (name, epoch, version, release)
fn new_entries<'a>(
    pkgs: &'a [PackageIdentifier],
    existing: &LockList,
    negated: bool,
) -> Vec<&'a PackageIdentifier> {
    let mut seen = HashSet::new();
    pkgs.iter()
        .filter(|pkg| !existing.contains(pkg, negated))
        .filter(|pkg| seen.insert((pkg.name.clone(), pkg.evr())))
        .collect()
}

fn cmd_add(
    store: &LockListStore,
    catalog: &dyn Catalog,
    patterns: &[String],
) -> Result<CommandOutcome> {
    let patterns = PatternSet::new(patterns)?;
    let mut pkgs = if patterns.is_empty() {
        catalog.installed()?
    } else {
        catalog.installed_matching(&patterns)?
    };
    if pkgs.is_empty() {
        debug!("No installed package matches, trying available packages");
        pkgs = available(catalog, &patterns)?;
    }

    let existing = load_for_append(store)?;
    let added = new_entries(&pkgs, &existing, false);

    let details: Vec<String> = added
        .iter()
        .map(|pkg| format!("Adding versionlock on: {}", pkg.format(Template::Envr)))
        .collect();
    let lines: Vec<String> = added.iter().map(|pkg| LockEntry::lock_line(pkg)).collect();
    store.append(&format!("Added locks on {}", ctime_now()), &lines)?;

    Ok(CommandOutcome::new(
        details,
        format!("versionlock added: {}", lines.len()),
    ))
}

fn cmd_exclude(
    store: &LockListStore,
    catalog: &dyn Catalog,
    patterns: &[String],
) -> Result<CommandOutcome> {
    let patterns = PatternSet::new(patterns)?;
    let pkgs = vercmp::newest_by_name(available(catalog, &patterns)?);

    let existing = load_for_append(store)?;
    let added = new_entries(&pkgs, &existing, true);

    let details: Vec<String> = added
        .iter()
        .map(|pkg| format!("Adding exclude on: {}", pkg.format(Template::Envr)))
        .collect();
    let lines: Vec<String> = added.iter().map(|pkg| LockEntry::exclude_line(pkg)).collect();
    store.append(&format!("Added excludes on {}", ctime_now()), &lines)?;

    Ok(CommandOutcome::new(
        details,
        format!("versionlock added: {}", lines.len()),
    ))
}

fn cmd_list(store: &LockListStore) -> Result<CommandOutcome> {
    Ok(CommandOutcome::new(store.read_all()?, "versionlock list done"))
}

fn cmd_status(
    store: &LockListStore,
    catalog: &dyn Catalog,
    follow_obsoletes: bool,
) -> Result<CommandOutcome> {
    let locks = store.load()?;
    let conflicts = resolver::compute_conflicts(&locks, catalog, follow_obsoletes)?;

    let details = conflicts
        .iter()
        .flat_map(|(name, conflict)| conflict.status_lines(name))
        .collect();

    Ok(CommandOutcome::new(details, "versionlock status done"))
}

fn cmd_delete(store: &LockListStore, patterns: &[String]) -> Result<CommandOutcome> {
    let patterns = PatternSet::new(patterns)?;
    let deleted = store.delete_matching(&patterns)?;

    let details = deleted
        .iter()
        .map(|line| format!("Deleting versionlock for: {}", line))
        .collect();

    Ok(CommandOutcome::new(
        details,
        format!("versionlock deleted: {}", deleted.len()),
    ))
}

fn cmd_clear(store: &LockListStore) -> Result<CommandOutcome> {
    store.clear()?;
    info!("All version locks removed");
    Ok(CommandOutcome::new(Vec::new(), "versionlock cleared"))
}
