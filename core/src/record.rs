//! Parsing rendered templates into key writes.
//!
//! Every non-blank line of a rendered template has the form
//! `<directory>/<key>: <value>`. The line is split on its **last** colon
//! into path and value, and the path on its **last** slash into parent
//! directory and leaf key. Path pieces and the value are trimmed.

use thiserror::Error;

/// Malformed rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// No `:` separating path and value.
    #[error("line {line}: expected '<path>: <value>', got '{text}'")]
    MissingSeparator { line: usize, text: String },
    /// The path has no `/` or an empty leaf key.
    #[error("line {line}: invalid key path '{path}'")]
    InvalidPath { line: usize, path: String },
}

/// One key to set, with the directory that must exist first.
///
/// # Examples
///
/// ```
/// use etcd_schema_core::KeyWrite;
///
/// let write = KeyWrite::parse_line("/app/service/config/db:5432", 1).unwrap();
/// assert_eq!(write.directory, "/app/service/config");
/// assert_eq!(write.key, "db");
/// assert_eq!(write.value, "5432");
/// assert_eq!(write.path(), "/app/service/config/db");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyWrite {
    /// Parent directory. A top-level key has directory `/`.
    pub directory: String,
    /// Leaf key name.
    pub key: String,
    /// Trimmed value.
    pub value: String,
}

impl KeyWrite {
    /// Parses a single rendered line. `line` is only used in errors.
    pub fn parse_line(text: &str, line: usize) -> Result<Self, RecordError> {
        let (path, value) = text
            .rsplit_once(':')
            .ok_or_else(|| RecordError::MissingSeparator {
                line,
                text: text.to_string(),
            })?;

        let invalid_path = || RecordError::InvalidPath {
            line,
            path: path.trim().to_string(),
        };
        let (directory, key) = path.rsplit_once('/').ok_or_else(invalid_path)?;
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid_path());
        }

        let directory = directory.trim();
        Ok(Self {
            directory: if directory.is_empty() {
                "/".to_string()
            } else {
                directory.to_string()
            },
            key: key.to_string(),
            value: value.trim().to_string(),
        })
    }

    /// Full key path, `<directory>/<key>`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.directory.trim_end_matches('/'), self.key)
    }
}

/// Parses every non-blank line of `rendered`, preserving order.
///
/// # Errors
///
/// Fails on the first malformed line; no writes are returned in that case.
pub fn parse_rendered(rendered: &str) -> Result<Vec<KeyWrite>, RecordError> {
    rendered
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(idx, text)| KeyWrite::parse_line(text, idx + 1))
        .collect()
}
