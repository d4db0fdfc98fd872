// src/error.rs

use thiserror::Error;

/// Core error types for versionlock
#[derive(Error, Debug)]
pub enum Error {
    /// The lock list could not be retrieved (filesystem or network)
    #[error("Unable to read version lock configuration: {0}")]
    SourceUnreachable(String),

    /// A mutating command was pointed at a non-local lock list
    #[error("versionlock URL isn't local: {0}")]
    RemoteNotWritable(String),

    /// A lock line or catalog identifier is not a valid NEVRA
    #[error("Malformed package identifier: {0}")]
    MalformedIdentifier(String),

    /// Delete found nothing to remove
    #[error("versionlock delete: no matches")]
    NoMatch,

    /// A wildcard pattern could not be compiled
    #[error("Invalid package pattern: {0}")]
    InvalidPattern(String),

    /// Configuration file or option error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database initialization error
    #[error("Failed to initialize database: {0}")]
    InitError(String),

    /// Database not found
    #[error("Database not found at path: {0}")]
    DatabaseNotFound(String),

    /// Catalog snapshot or other structured input could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type alias using versionlock's Error type
pub type Result<T> = std::result::Result<T, Error>;
