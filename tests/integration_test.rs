// tests/integration_test.rs

//! Integration tests for versionlock
//!
//! These tests drive the commands end to end against a lock list on disk
//! and a catalog database.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use versionlock::catalog::{Catalog, CatalogSnapshot, SqliteCatalog};
use versionlock::commands::{self, Command};
use versionlock::config::Config;
use versionlock::exclusion;
use versionlock::packages::PackageIdentifier;
use versionlock::{db, Error};

struct Fixture {
    _dir: TempDir,
    locklist: PathBuf,
    catalog: SqliteCatalog,
}

impl Fixture {
    fn new(locklist: &str, snapshot: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("versionlock.list");
        fs::write(&path, locklist).unwrap();

        let db_path = dir.path().join("catalog.db");
        let mut catalog = SqliteCatalog::create(db_path.to_str().unwrap()).unwrap();
        catalog
            .import(&CatalogSnapshot::from_json(snapshot).unwrap())
            .unwrap();

        Self {
            _dir: dir,
            locklist: path,
            catalog,
        }
    }

    fn config(&self) -> Config {
        Config {
            locklist: self.locklist.to_string_lossy().into_owned(),
            ..Config::default()
        }
    }

    fn run(&self, command: Command) -> versionlock::Result<commands::CommandOutcome> {
        commands::run(&command, &self.config(), &self.catalog)
    }

    fn content(&self) -> String {
        fs::read_to_string(&self.locklist).unwrap()
    }
}

fn words(p: &[&str]) -> Vec<String> {
    p.iter().map(|s| s.to_string()).collect()
}

fn pkg(s: &str) -> PackageIdentifier {
    PackageIdentifier::parse(s).unwrap()
}

const SNAPSHOT: &str = r#"{
    "installed": ["0:foo-1.0-1.x86_64", "0:foo-1.0-1.i686", "0:bar-1.0-1.noarch"],
    "available": [
        "0:foo-1.0-1.x86_64",
        "0:foo-2.0-1.x86_64",
        "0:bar-1.0-1.noarch",
        "0:quux-3.0-1.noarch"
    ],
    "obsoletes": [["0:baz-2.0-1.noarch", "0:bar-1.0-1.noarch"]]
}"#;

#[test]
fn test_lock_then_status_then_unlock() {
    let fx = Fixture::new("", SNAPSHOT);

    let outcome = fx.run(Command::Add(words(&["foo", "bar"]))).unwrap();
    assert_eq!(outcome.summary, "versionlock added: 2");

    let list = fx.run(Command::List).unwrap();
    // Installed packages come back ordered by name
    assert_eq!(list.details, vec!["0:bar-1.0-1.*", "0:foo-1.0-1.*"]);

    // foo-2.0 is held back; bar is current
    let status = fx.run(Command::Status).unwrap();
    assert_eq!(status.details, vec!["0:foo-2.0-1.*"]);

    let deleted = fx.run(Command::Delete(words(&["foo*"]))).unwrap();
    assert_eq!(deleted.summary, "versionlock deleted: 1");
    assert!(fx.content().contains("0:bar-1.0-1.*\n"));
    assert!(!fx.content().contains("foo"));

    let status = fx.run(Command::Status).unwrap();
    assert!(status.details.is_empty());
}

#[test]
fn test_status_follows_obsoletes() {
    let fx = Fixture::new("0:bar-1.0-1.*\n", SNAPSHOT);

    let status = fx.run(Command::Status).unwrap();
    assert!(status.details.is_empty());

    let config = Config {
        follow_obsoletes: true,
        ..fx.config()
    };
    let status = commands::run(&Command::Status, &config, &fx.catalog).unwrap();
    assert_eq!(status.details, vec!["0:baz-2.0-1.* (replacing bar)"]);
}

#[test]
fn test_delete_keeps_other_lines_byte_identical() {
    let original = "# Added locks on Mon Jan  1 00:00:00 2024\n0:foo-1.0-1.*\n0:quux-1.0-1.*\n";
    let fx = Fixture::new(original, SNAPSHOT);

    let outcome = fx.run(Command::Delete(words(&["foo*"]))).unwrap();
    assert_eq!(outcome.details, vec!["Deleting versionlock for: 0:foo-1.0-1.*"]);
    assert_eq!(
        fx.content(),
        "# Added locks on Mon Jan  1 00:00:00 2024\n0:quux-1.0-1.*\n"
    );

    let again = fx.run(Command::Delete(words(&["foo*"])));
    assert!(matches!(again, Err(Error::NoMatch)));
    assert_eq!(
        fx.content(),
        "# Added locks on Mon Jan  1 00:00:00 2024\n0:quux-1.0-1.*\n"
    );
}

#[test]
fn test_exclude_then_projection() {
    let fx = Fixture::new("0:foo-1.0-1.*\n", SNAPSHOT);

    let outcome = fx.run(Command::Exclude(words(&["quux"]))).unwrap();
    assert_eq!(outcome.details, vec!["Adding exclude on: 0:quux-3.0-1"]);

    let projection = exclusion::prepare_exclusions(&fx.config(), &fx.catalog).unwrap();
    assert!(!projection.excludes(&pkg("0:foo-1.0-1.x86_64")));
    assert!(projection.excludes(&pkg("0:foo-2.0-1.x86_64")));
    assert!(projection.excludes(&pkg("0:quux-3.0-1.noarch")));
    assert!(!projection.excludes(&pkg("0:bar-1.0-1.noarch")));

    let json = projection.to_json().unwrap();
    assert!(json.contains("quux-0:3.0-1"));
}

#[test]
fn test_remote_locklist_is_read_only() {
    let fx = Fixture::new("", SNAPSHOT);
    let config = Config {
        locklist: "https://example.invalid/versionlock.list".to_string(),
        ..Config::default()
    };

    let result = commands::run(&Command::Add(words(&["foo"])), &config, &fx.catalog);
    assert!(matches!(result, Err(Error::RemoteNotWritable(_))));
    assert_eq!(fx.content(), "");
}

#[test]
fn test_catalog_database_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested/catalog.db");
    let db_path = db_path.to_str().unwrap();

    {
        let mut catalog = SqliteCatalog::create(db_path).unwrap();
        catalog
            .import(&CatalogSnapshot::from_json(SNAPSHOT).unwrap())
            .unwrap();
    }

    assert!(Path::new(db_path).exists());
    let catalog = SqliteCatalog::open(db_path).unwrap();
    assert_eq!(catalog.installed().unwrap().len(), 3);

    let conn = db::open(db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM obsoletes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_open_missing_catalog_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("missing.db");
    let result = SqliteCatalog::open(db_path.to_str().unwrap());
    assert!(matches!(result, Err(Error::DatabaseNotFound(_))));
}
