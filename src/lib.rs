// src/lib.rs

//! Versionlock
//!
//! Pins RPM package versions so that updates and obsoleting packages are
//! held back until the lock is removed.
//!
//! # Architecture
//!
//! - Lock list: a plain, human-auditable line file (`e:n-v-r.a`, `!` for excludes)
//! - Resolver: finds direct updates and obsoleters that would break a lock
//! - Exclusion projection: flat name/NEVR sets handed to an external excluder
//! - Catalog: trait boundary to the package database (SQLite and in-memory adapters)

pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
mod error;
pub mod exclusion;
pub mod locklist;
pub mod packages;
pub mod resolver;

pub use error::{Error, Result};
