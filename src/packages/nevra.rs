// src/packages/nevra.rs

//! NEVRA identifiers: name, epoch, version, release, architecture
//!
//! Parsing follows the RPM filename convention used in lock lists:
//! `[epoch:]name-version-release[.arch]`, with `name-epoch:version-release.arch`
//! accepted as well. Formatting is driven by [`Template`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Epoch used when an identifier does not carry one
pub const DEFAULT_EPOCH: &str = "0";

/// A fully split package identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageIdentifier {
    pub name: String,
    pub epoch: String,
    pub version: String,
    pub release: String,
    /// Architecture, `*` for "any" or empty when the source omitted it
    #[serde(default)]
    pub arch: String,
}

/// The (epoch, version, release) part of an identifier
///
/// Locks ignore the architecture, so this is the unit of "approved version".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Evr {
    pub epoch: String,
    pub version: String,
    pub release: String,
}

/// Output layouts for [`PackageIdentifier::format`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// `epoch:name-version-release.arch` (lock list lines)
    Lock,
    /// `epoch:name-version-release`
    Envr,
    /// `name-epoch:version-release.arch`
    Nevra,
    /// `name-version-release`
    Nvr,
    /// `name-version-release.arch`
    Nvra,
}

/// Map an empty epoch to the default one
///
/// Negation markers are the caller's business; a `!` is passed through.
pub fn canonical_epoch(epoch: &str) -> String {
    if epoch.is_empty() {
        DEFAULT_EPOCH.to_string()
    } else {
        epoch.to_string()
    }
}

impl PackageIdentifier {
    /// Create an identifier from its parts, defaulting the epoch
    pub fn new(name: &str, epoch: &str, version: &str, release: &str, arch: &str) -> Self {
        Self {
            name: name.to_string(),
            epoch: canonical_epoch(epoch),
            version: version.to_string(),
            release: release.to_string(),
            arch: arch.to_string(),
        }
    }

    /// Parse an identifier string
    ///
    /// Examples:
    /// - "0:foo-1.0-1.*" → epoch=0, name=foo, version=1.0, release=1, arch=*
    /// - "foo-1.0-1.el9.x86_64" → epoch=0, release=1.el9, arch=x86_64
    /// - "foo-2:1.0-1.noarch" → epoch=2
    /// - "foo-1.0-1" → arch empty
    pub fn parse(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedIdentifier(s.to_string());

        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix(".rpm").unwrap_or(trimmed);

        // Split off the epoch. A dash before the colon means the
        // `name-epoch:version` layout, otherwise `epoch:name`.
        let (name_prefix, epoch, rest) = match trimmed.find(':') {
            Some(colon) => {
                let head = &trimmed[..colon];
                let tail = &trimmed[colon + 1..];
                match head.rfind('-') {
                    Some(dash) => (Some(&head[..dash]), &head[dash + 1..], tail),
                    None => (None, head, tail),
                }
            }
            None => (None, "", trimmed),
        };

        // Architecture only counts if its dot comes after the last dash
        let last_dash = rest.rfind('-').ok_or_else(malformed)?;
        let (nvr, arch) = match rest.rfind('.') {
            Some(dot) if dot > last_dash => (&rest[..dot], &rest[dot + 1..]),
            _ => (rest, ""),
        };

        let (name, version, release) = match name_prefix {
            Some(name) => {
                let (version, release) = nvr.rsplit_once('-').ok_or_else(malformed)?;
                (name, version, release)
            }
            None => {
                let (nv, release) = nvr.rsplit_once('-').ok_or_else(malformed)?;
                let (name, version) = nv.rsplit_once('-').ok_or_else(malformed)?;
                (name, version, release)
            }
        };

        if name.is_empty() || version.is_empty() || release.is_empty() {
            return Err(malformed());
        }

        Ok(Self::new(name, epoch, version, release, arch))
    }

    /// The architecture-independent version triple
    pub fn evr(&self) -> Evr {
        Evr {
            epoch: self.epoch.clone(),
            version: self.version.clone(),
            release: self.release.clone(),
        }
    }

    /// Copy of this identifier with a different architecture
    pub fn with_arch(&self, arch: &str) -> Self {
        Self {
            arch: arch.to_string(),
            ..self.clone()
        }
    }

    /// Lower-cased `name-epoch:version-release` key used by the excluder
    pub fn nevr_key(&self) -> String {
        format!(
            "{}-{}:{}-{}",
            self.name, self.epoch, self.version, self.release
        )
        .to_lowercase()
    }

    /// Render the identifier using the given layout
    pub fn format(&self, template: Template) -> String {
        let (n, e, v, r, a) = (
            &self.name,
            &self.epoch,
            &self.version,
            &self.release,
            &self.arch,
        );
        match template {
            Template::Lock => format!("{}:{}-{}-{}.{}", e, n, v, r, a),
            Template::Envr => format!("{}:{}-{}-{}", e, n, v, r),
            Template::Nevra => format!("{}-{}:{}-{}.{}", n, e, v, r, a),
            Template::Nvr => format!("{}-{}-{}", n, v, r),
            Template::Nvra => format!("{}-{}-{}.{}", n, v, r, a),
        }
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arch.is_empty() {
            write!(f, "{}", self.format(Template::Envr))
        } else {
            write!(f, "{}", self.format(Template::Lock))
        }
    }
}

impl fmt::Display for Evr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.epoch, self.version, self.release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lock_line() {
        let id = PackageIdentifier::parse("0:foo-1.0-1.*").unwrap();
        assert_eq!(id.name, "foo");
        assert_eq!(id.epoch, "0");
        assert_eq!(id.version, "1.0");
        assert_eq!(id.release, "1");
        assert_eq!(id.arch, "*");
    }

    #[test]
    fn test_parse_without_epoch_defaults_to_zero() {
        let id = PackageIdentifier::parse("kernel-5.14.0-70.el9.x86_64").unwrap();
        assert_eq!(id.name, "kernel");
        assert_eq!(id.epoch, "0");
        assert_eq!(id.version, "5.14.0");
        assert_eq!(id.release, "70.el9");
        assert_eq!(id.arch, "x86_64");
    }

    #[test]
    fn test_parse_dashed_name() {
        let id = PackageIdentifier::parse("2:python3-dnf-plugins-core-4.3.0-5.fc38.noarch").unwrap();
        assert_eq!(id.name, "python3-dnf-plugins-core");
        assert_eq!(id.epoch, "2");
        assert_eq!(id.version, "4.3.0");
        assert_eq!(id.release, "5.fc38");
        assert_eq!(id.arch, "noarch");
    }

    #[test]
    fn test_parse_name_epoch_layout() {
        let id = PackageIdentifier::parse("bind-utils-32:9.16.23-5.el9.x86_64").unwrap();
        assert_eq!(id.name, "bind-utils");
        assert_eq!(id.epoch, "32");
        assert_eq!(id.version, "9.16.23");
        assert_eq!(id.release, "5.el9");
        assert_eq!(id.arch, "x86_64");
    }

    #[test]
    fn test_parse_without_arch() {
        let id = PackageIdentifier::parse("foo-1.0-1").unwrap();
        assert_eq!(id.name, "foo");
        assert_eq!(id.version, "1.0");
        assert_eq!(id.release, "1");
        assert_eq!(id.arch, "");
    }

    #[test]
    fn test_parse_strips_rpm_suffix() {
        let id = PackageIdentifier::parse("foo-1.0-1.x86_64.rpm").unwrap();
        assert_eq!(id.arch, "x86_64");
        assert_eq!(id.release, "1");
    }

    #[test]
    fn test_parse_keeps_legacy_negated_epoch() {
        let id = PackageIdentifier::parse("!1:foo-1.0-1.*").unwrap();
        assert_eq!(id.epoch, "!1");
        assert_eq!(id.name, "foo");
    }

    #[test]
    fn test_parse_malformed() {
        for bad in ["foo", "foo-1.0", "", "0:-1.0-1.*", "foo--1"] {
            let result = PackageIdentifier::parse(bad);
            assert!(
                matches!(result, Err(Error::MalformedIdentifier(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_format_templates() {
        let id = PackageIdentifier::new("foo", "1", "2.0", "3.el9", "x86_64");
        assert_eq!(id.format(Template::Lock), "1:foo-2.0-3.el9.x86_64");
        assert_eq!(id.format(Template::Envr), "1:foo-2.0-3.el9");
        assert_eq!(id.format(Template::Nevra), "foo-1:2.0-3.el9.x86_64");
        assert_eq!(id.format(Template::Nvr), "foo-2.0-3.el9");
        assert_eq!(id.format(Template::Nvra), "foo-2.0-3.el9.x86_64");
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        for line in [
            "0:foo-1.0-1.*",
            "3:Foo-Bar-2.1-4.fc39.*",
            "0:glibc-2.34-60.el9.x86_64",
        ] {
            let id = PackageIdentifier::parse(line).unwrap();
            let again = PackageIdentifier::parse(&id.format(Template::Lock)).unwrap();
            assert_eq!(id, again);
            assert_eq!(id.format(Template::Lock), line);
        }
    }

    #[test]
    fn test_canonical_epoch() {
        assert_eq!(canonical_epoch(""), "0");
        assert_eq!(canonical_epoch("4"), "4");
        assert_eq!(canonical_epoch("!0"), "!0");
    }

    #[test]
    fn test_nevr_key_is_lowercase_and_archless() {
        let id = PackageIdentifier::new("Foo", "", "1.0A", "1", "x86_64");
        assert_eq!(id.nevr_key(), "foo-0:1.0a-1");
    }

    #[test]
    fn test_evr_ignores_arch() {
        let a = PackageIdentifier::parse("0:foo-1.0-1.x86_64").unwrap();
        let b = PackageIdentifier::parse("0:foo-1.0-1.i686").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.evr(), b.evr());
    }
}
