//! Resource template lookup.
//!
//! Each resource has one template, `<templates>/<resource>.tmpl`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DatabaseError, Result};

/// Extension of template files.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// A directory of resource templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the template for `resource`, whether or not it exists.
    pub fn path_for(&self, resource: &str) -> PathBuf {
        self.dir.join(format!("{resource}.{TEMPLATE_EXTENSION}"))
    }

    /// Reads the template for `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::MissingTemplate`] if there is no template
    /// file, or [`DatabaseError::IoError`] if it cannot be read.
    pub fn load(&self, resource: &str) -> Result<String> {
        let path = self.path_for(resource);
        if !path.is_file() {
            return Err(DatabaseError::MissingTemplate(path));
        }
        info!("Loading template: {}", path.display());
        Ok(std::fs::read_to_string(&path)?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_existing_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("host.tmpl"), "/hosts/{{ hostname }}/ip: {{ ip }}\n")
            .unwrap();

        let store = TemplateStore::new(dir.path());
        assert_eq!(store.dir(), dir.path());
        assert!(store.load("host").unwrap().contains("{{ ip }}"));
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        let err = store.load("user").unwrap_err();
        assert!(matches!(err, DatabaseError::MissingTemplate(ref p) if *p == store.path_for("user")));
        assert!(err.to_string().starts_with("Missing template file:"));
    }
}
