// src/packages/pattern.rs

//! Wildcard matching of package identifiers
//!
//! A package can be named on the command line in several ways (`foo`,
//! `foo.x86_64`, `foo-1.0-1`, `0:foo-1.0-1.x86_64`, ...). Matching tries
//! every one of those spellings against every pattern.

use crate::error::{Error, Result};
use crate::packages::nevra::PackageIdentifier;
use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// The seven textual forms a package identifier answers to
pub fn candidate_names(id: &PackageIdentifier) -> [String; 7] {
    let (n, e, v, r, a) = (&id.name, &id.epoch, &id.version, &id.release, &id.arch);
    [
        n.to_string(),
        format!("{}.{}", n, a),
        format!("{}-{}", n, v),
        format!("{}-{}-{}", n, v, r),
        format!("{}-{}-{}.{}", n, v, r, a),
        format!("{}:{}-{}-{}.{}", e, n, v, r, a),
        format!("{}-{}:{}-{}.{}", n, e, v, r, a),
    ]
}

/// A compiled set of shell-glob patterns
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile the given patterns
    ///
    /// A run of `*` is a single `*`, as in `fnmatch`. Text that is not
    /// valid glob syntax (an unclosed `[` for instance) is matched literally.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(&collapse_stars(p))
                    .or_else(|_| Pattern::new(&Pattern::escape(p)))
                    .map_err(|e| Error::InvalidPattern(format!("{}: {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if any candidate name of `id` matches any pattern
    pub fn matches(&self, id: &PackageIdentifier) -> bool {
        let candidates = candidate_names(id);
        candidates.iter().any(|name| {
            self.patterns
                .iter()
                .any(|pat| pat.matches_with(name, MATCH_OPTIONS))
        })
    }
}

/// Fold runs of `*` into one; the glob crate rejects `**` inside a name
fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

/// One-shot form of [`PatternSet::matches`]
pub fn matches<S: AsRef<str>>(id: &PackageIdentifier, patterns: &[S]) -> Result<bool> {
    Ok(PatternSet::new(patterns)?.matches(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo() -> PackageIdentifier {
        PackageIdentifier::new("foo", "0", "1.0", "1", "x86_64")
    }

    #[test]
    fn test_candidate_names() {
        let names = candidate_names(&foo());
        assert_eq!(
            names,
            [
                "foo",
                "foo.x86_64",
                "foo-1.0",
                "foo-1.0-1",
                "foo-1.0-1.x86_64",
                "0:foo-1.0-1.x86_64",
                "foo-0:1.0-1.x86_64",
            ]
        );
    }

    #[test]
    fn test_every_candidate_matches_itself() {
        let ids = [
            foo(),
            PackageIdentifier::new("python3-libs", "2", "3.11.4", "1.fc39", "*"),
            PackageIdentifier::new("perl-Time-HiRes", "4", "1.9767", "3.el9", "x86_64"),
        ];
        for id in &ids {
            for candidate in candidate_names(id) {
                assert!(
                    matches(id, &[candidate.as_str()]).unwrap(),
                    "{} should match {}",
                    candidate,
                    id
                );
            }
        }
    }

    #[test]
    fn test_arch_pattern_matches_lock_form() {
        assert!(matches(&foo(), &["foo.x86_64"]).unwrap());
        assert!(matches(&foo(), &["foo.*"]).unwrap());
        assert!(!matches(&foo(), &["foo.i686"]).unwrap());
    }

    #[test]
    fn test_glob_semantics() {
        assert!(matches(&foo(), &["f*"]).unwrap());
        assert!(matches(&foo(), &["fo?"]).unwrap());
        assert!(matches(&foo(), &["[ef]oo-1.0"]).unwrap());
        assert!(!matches(&foo(), &["bar*", "qux"]).unwrap());
    }

    #[test]
    fn test_double_star_is_single_star() {
        let foobar = PackageIdentifier::new("foobar", "0", "1.0", "1", "x86_64");
        assert!(matches(&foobar, &["foo**"]).unwrap());
        assert!(matches(&foobar, &["**bar-1.0-1"]).unwrap());
        assert!(!matches(&foo(), &["bar**"]).unwrap());
        assert_eq!(collapse_stars("a***b*"), "a*b*");
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matches(&foo(), &["FOO"]).unwrap());
        assert!(!matches(&foo(), &["Foo*"]).unwrap());
    }

    #[test]
    fn test_invalid_glob_is_literal() {
        let id = PackageIdentifier::new("a[b", "0", "1", "1", "noarch");
        assert!(matches(&id, &["a[b"]).unwrap());
        assert!(!matches(&foo(), &["a[b"]).unwrap());
    }

    #[test]
    fn test_empty_pattern_set_matches_nothing() {
        let set = PatternSet::new::<&str>(&[]).unwrap();
        assert!(set.is_empty());
        assert!(!set.matches(&foo()));
    }
}
