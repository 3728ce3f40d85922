//! Configuration loading and discovery.
//!
//! The configuration is a small YAML document; every key is optional.
//!
//! # Example YAML
//!
//! ```yaml
//! node: etcd.example.com
//! port: 4001
//! schemas: /etc/etcd-cli/schemas
//! templates: /etc/etcd-cli/templates
//! ```
//!
//! [`Config::discover`] picks the file to load: an explicit path first,
//! then the user file, then the system file, falling back to defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{DatabaseError, Result};

/// File name of the per-user config, relative to the home directory.
pub const USER_CONFIG_FILE: &str = ".etcd-cli.yaml";

/// Absolute path of the system-wide config.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/etcd-cli/etcd-cli.yaml";

/// Runtime settings.
///
/// # Examples
///
/// ```
/// use etcd_schema_db::Config;
///
/// let config: Config = serde_yaml::from_str("node: 10.0.0.1").unwrap();
/// assert_eq!(config.port, 4001);
/// assert_eq!(config.endpoint(), "http://10.0.0.1:4001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store host name.
    pub node: String,
    /// Store client port.
    pub port: u16,
    /// Directory of schema documents.
    pub schemas: PathBuf,
    /// Directory of resource templates.
    pub templates: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node: "etcd".to_string(),
            port: 4001,
            schemas: PathBuf::from("schemas"),
            templates: PathBuf::from("templates"),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file. An empty file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Finds and loads the configuration.
    ///
    /// Returns the config and the file it came from, or `None` when no file
    /// was found and defaults are used.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::MissingConfig`] if `explicit` is given but
    /// is not a file, or any error from [`Config::load`].
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        Self::discover_in(explicit, &Self::search_paths())
    }

    /// Like [`Config::discover`], with an explicit list of fallback files.
    pub fn discover_in(
        explicit: Option<&Path>,
        candidates: &[PathBuf],
    ) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(DatabaseError::MissingConfig(path.to_path_buf()));
            }
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        for candidate in candidates {
            if candidate.is_file() {
                return Ok((Self::load(candidate)?, Some(candidate.clone())));
            }
            debug!("No config file at {}", candidate.display());
        }

        Ok((Self::default(), None))
    }

    /// The user config (when a home directory is known) then the system config.
    pub fn search_paths() -> Vec<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(USER_CONFIG_FILE))
            .into_iter()
            .chain(std::iter::once(PathBuf::from(SYSTEM_CONFIG_FILE)))
            .collect()
    }

    /// Base URL of the store's client API.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.node, self.port)
    }
}
