// src/packages/mod.rs

//! Package identifiers for versionlock
//!
//! This module provides the NEVRA codec, RPM version ordering and the
//! wildcard matcher used to select packages and lock entries.

pub mod nevra;
pub mod pattern;
pub mod vercmp;

pub use nevra::{Evr, PackageIdentifier, Template};
pub use pattern::PatternSet;
