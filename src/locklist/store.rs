// src/locklist/store.rs

//! Reading and writing the lock list backing file
//!
//! Appends never rewrite the file. Deletion rewrites it through a temporary
//! file in the same directory that is renamed over the original, so readers
//! only ever see the old or the new contents.

use super::{is_entry_line, LockEntry, LockList};
use crate::error::{Error, Result};
use crate::packages::pattern::PatternSet;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Permission bits of a rewritten lock list
#[cfg(unix)]
const LOCKLIST_MODE: u32 = 0o644;

/// Where the lock list lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockListLocation {
    /// A file on this machine, writable
    Local(PathBuf),
    /// A URL fetched over the network, read-only
    Remote(String),
}

impl LockListLocation {
    /// Interpret a configured location
    ///
    /// `file:` URLs and plain paths are local; anything else with a URL
    /// scheme is remote.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if let Some(path) = location.strip_prefix("file://") {
            return Self::Local(PathBuf::from(path));
        }
        if let Some(path) = location.strip_prefix("file:") {
            return Self::Local(PathBuf::from(path));
        }
        if location.contains("://") {
            return Self::Remote(location.to_string());
        }
        Self::Local(PathBuf::from(location))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for LockListLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Access to the lock list at a given location
#[derive(Debug, Clone)]
pub struct LockListStore {
    location: LockListLocation,
}

impl LockListStore {
    pub fn new(location: LockListLocation) -> Self {
        Self { location }
    }

    /// Store for a configured location string
    pub fn open(location: &str) -> Self {
        Self::new(LockListLocation::parse(location))
    }

    pub fn location(&self) -> &LockListLocation {
        &self.location
    }

    /// Path of a local lock list, or `RemoteNotWritable`
    pub fn local_path(&self) -> Result<&Path> {
        match &self.location {
            LockListLocation::Local(path) => Ok(path),
            LockListLocation::Remote(url) => Err(Error::RemoteNotWritable(url.clone())),
        }
    }

    /// Fetch the whole resource as text
    fn fetch(&self) -> Result<String> {
        match &self.location {
            LockListLocation::Local(path) => {
                debug!("Reading lock list from {}", path.display());
                fs::read_to_string(path).map_err(|e| {
                    Error::SourceUnreachable(format!("{}: {}", path.display(), e))
                })
            }
            LockListLocation::Remote(url) => {
                debug!("Fetching lock list from {}", url);
                let response = reqwest::blocking::get(url)
                    .map_err(|e| Error::SourceUnreachable(format!("{}: {}", url, e)))?;

                if !response.status().is_success() {
                    return Err(Error::SourceUnreachable(format!(
                        "{}: HTTP {}",
                        url,
                        response.status()
                    )));
                }

                response
                    .text()
                    .map_err(|e| Error::SourceUnreachable(format!("{}: {}", url, e)))
            }
        }
    }

    /// All entry lines, verbatim apart from trailing whitespace
    pub fn read_all(&self) -> Result<Vec<String>> {
        let content = self.fetch()?;
        Ok(content
            .lines()
            .filter(|line| is_entry_line(line))
            .map(|line| line.trim_end().to_string())
            .collect())
    }

    /// Read and parse the lock list
    pub fn load(&self) -> Result<LockList> {
        LockList::from_lines(&self.read_all()?)
    }

    /// Append lines under a dated `# header` comment
    ///
    /// Does nothing when `lines` is empty.
    pub fn append<S: AsRef<str>>(&self, header: &str, lines: &[S]) -> Result<()> {
        let path = self.local_path()?;
        if lines.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file)?;
        writeln!(file, "# {}", header)?;
        for line in lines {
            writeln!(file, "{}", line.as_ref())?;
        }
        file.sync_all()?;

        info!("Appended {} line(s) to {}", lines.len(), path.display());
        Ok(())
    }

    /// Remove every entry matching one of `patterns`
    ///
    /// Returns the deleted lines. Comments, blank lines and surviving
    /// entries are written back unchanged. With no match the file is left
    /// alone and `NoMatch` is returned.
    pub fn delete_matching(&self, patterns: &PatternSet) -> Result<Vec<String>> {
        let path = self.local_path()?;
        let content = fs::read_to_string(path)
            .map_err(|e| Error::SourceUnreachable(format!("{}: {}", path.display(), e)))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Dropping the temp file on any early return removes it
        let mut temp = tempfile::Builder::new()
            .prefix(".versionlock")
            .suffix(".tmp")
            .tempfile_in(dir)?;

        let mut deleted = Vec::new();
        // Kept lines go back with their original line endings
        for raw in content.split_inclusive('\n') {
            let line = raw.trim_end_matches(['\r', '\n']);
            if is_entry_line(line) {
                let entry = LockEntry::parse(line)?;
                if patterns.matches(&entry.package) {
                    debug!("Deleting versionlock for: {}", entry.line);
                    deleted.push(entry.line);
                    continue;
                }
            }
            temp.write_all(raw.as_bytes())?;
        }

        if deleted.is_empty() {
            return Err(Error::NoMatch);
        }

        temp.as_file().sync_all()?;
        set_locklist_permissions(temp.path())?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        info!("Deleted {} lock(s) from {}", deleted.len(), path.display());
        Ok(deleted)
    }

    /// Truncate the lock list to nothing
    pub fn clear(&self) -> Result<()> {
        let path = self.local_path()?;
        File::create(path)?;
        info!("Cleared lock list {}", path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn set_locklist_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(LOCKLIST_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_locklist_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
