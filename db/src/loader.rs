//! Schema directory loading.
//!
//! Every `*.yaml` / `*.yml` file in the schema directory is parsed as a
//! YAML document and merged into one [`SchemaSet`]. Files are merged in
//! file name order, so when two files define the same resource the one
//! that sorts last wins.
//!
//! ```no_run
//! use etcd_schema_db::SchemaDatabase;
//!
//! let db = SchemaDatabase::from_dir("/etc/etcd-cli/schemas").unwrap();
//! for name in db.schemas().resource_names() {
//!     println!("{name}");
//! }
//! ```
//!
//! Loading only checks that each document parses and is a mapping;
//! individual resources are validated when they are resolved.

use std::path::{Path, PathBuf};

use etcd_schema_core::SchemaSet;
use tracing::debug;

use crate::error::{DatabaseError, Result};

/// File extensions recognised as schema documents.
pub const SCHEMA_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Merged schemas plus where they came from.
#[derive(Debug)]
pub struct SchemaDatabase {
    schemas: SchemaSet,
    source: PathBuf,
    files: Vec<PathBuf>,
}

impl SchemaDatabase {
    /// Loads and merges every schema document in `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::MissingSchemaDirectory`] if `path` is not a
    /// directory, [`DatabaseError::IoError`] if it cannot be read,
    /// [`DatabaseError::SchemaParse`] for the first document that is not
    /// valid YAML, or [`DatabaseError::InvalidSchemaFile`] for the first
    /// document that is not a mapping of resources.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(DatabaseError::MissingSchemaDirectory(path.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            let is_schema = file_path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| SCHEMA_EXTENSIONS.contains(&ext));
            if is_schema && file_path.is_file() {
                files.push(file_path);
            }
        }
        files.sort();

        let mut schemas = SchemaSet::new();
        for file_path in &files {
            let content = std::fs::read_to_string(file_path)?;
            if content.trim().is_empty() {
                debug!("Skipping empty schema file {}", file_path.display());
                continue;
            }
            let document: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|source| DatabaseError::SchemaParse {
                    path: file_path.clone(),
                    source,
                })?;
            let count = schemas.merge_document(document).map_err(|source| {
                DatabaseError::InvalidSchemaFile {
                    path: file_path.clone(),
                    source,
                }
            })?;
            debug!("Loaded {count} resource(s) from {}", file_path.display());
        }

        Ok(Self {
            schemas,
            source: path.to_path_buf(),
            files,
        })
    }

    /// The merged schema set.
    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Consumes the database, returning the merged schema set.
    pub fn into_schemas(self) -> SchemaSet {
        self.schemas
    }

    /// Schema files that were merged, in merge order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// The directory the schemas were loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_from_dir_merges_all_documents() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "hosts.yaml", "host:\n  primary: hostname\n");
        write(
            dir.path(),
            "users.yml",
            "user:\n  primary: login\ngroup:\n  primary: gid\n",
        );
        write(dir.path(), "README.md", "not a schema");

        let db = SchemaDatabase::from_dir(dir.path()).unwrap();
        assert_eq!(db.schemas().len(), 3);
        assert_eq!(db.files().len(), 2);
        assert!(db.schemas().contains("group"));
        assert_eq!(db.source(), dir.path());
    }

    #[test]
    fn test_from_dir_last_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.yaml", "host:\n  primary: name\n");
        write(dir.path(), "b.yaml", "host:\n  primary: fqdn\n");

        let db = SchemaDatabase::from_dir(dir.path()).unwrap();
        assert_eq!(db.schemas().resolve("host").unwrap().primary, "fqdn");
    }

    #[test]
    fn test_from_dir_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.yaml", "host: [unclosed\n");

        let err = SchemaDatabase::from_dir(dir.path()).unwrap_err();
        match err {
            DatabaseError::SchemaParse { path, .. } => {
                assert_eq!(path, dir.path().join("bad.yaml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_dir_rejects_non_mapping_document() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "list.yaml", "- host\n- user\n");

        assert!(matches!(
            SchemaDatabase::from_dir(dir.path()),
            Err(DatabaseError::InvalidSchemaFile { .. })
        ));
    }

    #[test]
    fn test_from_dir_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            SchemaDatabase::from_dir(&missing),
            Err(DatabaseError::MissingSchemaDirectory(p)) if p == missing
        ));
    }

    #[test]
    fn test_empty_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "empty.yaml", "");
        write(dir.path(), "host.yaml", "host:\n  primary: name\n");

        let db = SchemaDatabase::from_dir(dir.path()).unwrap();
        assert_eq!(db.into_schemas().len(), 1);
    }
}
