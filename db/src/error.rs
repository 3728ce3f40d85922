//! Error types for loading schemas, templates and configuration.

use std::path::PathBuf;

use etcd_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while reading files from disk.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration YAML failed to parse or serialize.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A schema document failed to parse.
    #[error("Failed to parse YAML in schema file: {}: {source}", path.display())]
    SchemaParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// A schema document parsed but is not a mapping of resources.
    #[error("Invalid schema file: {}: {source}", path.display())]
    InvalidSchemaFile { path: PathBuf, source: SchemaError },

    /// The configured schema directory does not exist.
    #[error("Schema directory doesn't exist: {}", .0.display())]
    MissingSchemaDirectory(PathBuf),

    /// No template file for the resource.
    #[error("Missing template file: {}", .0.display())]
    MissingTemplate(PathBuf),

    /// An explicitly requested config file does not exist.
    #[error("Config file doesn't exist: {}", .0.display())]
    MissingConfig(PathBuf),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
