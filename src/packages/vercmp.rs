// src/packages/vercmp.rs

//! RPM version comparison
//!
//! Implements the `rpmvercmp` segment algorithm (including `~` pre-release
//! and `^` post-release markers) and the EVR ordering built on top of it.

use crate::packages::nevra::{Evr, PackageIdentifier};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Compare two version or release strings the way RPM does
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let mut one = a.as_bytes();
    let mut two = b.as_bytes();

    loop {
        one = skip_separators(one);
        two = skip_separators(two);

        // Tilde sorts before everything, even the end of the string
        if one.first() == Some(&b'~') || two.first() == Some(&b'~') {
            if one.first() != Some(&b'~') {
                return Ordering::Greater;
            }
            if two.first() != Some(&b'~') {
                return Ordering::Less;
            }
            one = &one[1..];
            two = &two[1..];
            continue;
        }

        // Caret sorts after the end of the string but before anything else
        if one.first() == Some(&b'^') || two.first() == Some(&b'^') {
            if one.is_empty() {
                return Ordering::Less;
            }
            if two.is_empty() {
                return Ordering::Greater;
            }
            if one[0] != b'^' {
                return Ordering::Greater;
            }
            if two[0] != b'^' {
                return Ordering::Less;
            }
            one = &one[1..];
            two = &two[1..];
            continue;
        }

        if one.is_empty() || two.is_empty() {
            break;
        }

        let numeric = one[0].is_ascii_digit();
        let (seg1, rest1) = split_segment(one, numeric);
        let (seg2, rest2) = split_segment(two, numeric);

        // Segments of different types: numbers are newer than letters
        if seg2.is_empty() {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ord = if numeric {
            let seg1 = trim_leading_zeros(seg1);
            let seg2 = trim_leading_zeros(seg2);
            seg1.len().cmp(&seg2.len()).then_with(|| seg1.cmp(seg2))
        } else {
            seg1.cmp(seg2)
        };
        if ord != Ordering::Equal {
            return ord;
        }

        one = rest1;
        two = rest2;
    }

    match (one.is_empty(), two.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

fn skip_separators(s: &[u8]) -> &[u8] {
    let start = s
        .iter()
        .position(|&c| c.is_ascii_alphanumeric() || c == b'~' || c == b'^')
        .unwrap_or(s.len());
    &s[start..]
}

fn split_segment(s: &[u8], numeric: bool) -> (&[u8], &[u8]) {
    let end = s
        .iter()
        .position(|c| {
            if numeric {
                !c.is_ascii_digit()
            } else {
                !c.is_ascii_alphabetic()
            }
        })
        .unwrap_or(s.len());
    s.split_at(end)
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
    &s[start..]
}

/// Compare epochs numerically, falling back to `rpmvercmp` for odd input
fn compare_epoch(a: &str, b: &str) -> Ordering {
    let a = if a.is_empty() { "0" } else { a };
    let b = if b.is_empty() { "0" } else { b };
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => rpmvercmp(a, b),
    }
}

/// Order two EVR triples
pub fn compare_evr(a: &Evr, b: &Evr) -> Ordering {
    compare_epoch(&a.epoch, &b.epoch)
        .then_with(|| rpmvercmp(&a.version, &b.version))
        .then_with(|| rpmvercmp(&a.release, &b.release))
}

/// Reduce a package list to the newest package per name
///
/// Architecture is not considered; on an EVR tie the first package seen
/// wins. The result is sorted by name.
pub fn newest_by_name<I>(packages: I) -> Vec<PackageIdentifier>
where
    I: IntoIterator<Item = PackageIdentifier>,
{
    let mut newest: BTreeMap<String, PackageIdentifier> = BTreeMap::new();

    for pkg in packages {
        match newest.get(&pkg.name) {
            Some(current) if compare_evr(&pkg.evr(), &current.evr()) != Ordering::Greater => {}
            _ => {
                newest.insert(pkg.name.clone(), pkg);
            }
        }
    }

    newest.into_values().collect()
}
