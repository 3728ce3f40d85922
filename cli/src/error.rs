use etcd_schema_core::{RecordError, RenderError, SchemaError};
use etcd_schema_db::DatabaseError;
use etcd_schema_store::StoreError;
use thiserror::Error;

/// Errors that end an `etcd-cli` invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to render template: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid rendered template: {0}")]
    Record(#[from] RecordError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{resource} '{id}' not found")]
    RecordNotFound { resource: String, id: String },

    /// The operator answered something other than yes.
    #[error("Aborted by operator")]
    Declined,

    #[error("Invalid command line: {0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
