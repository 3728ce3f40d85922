//! The store interface.
//!
//! A [`Store`] is a hierarchical key-value store in the etcd v2 mould:
//! keys are `/`-separated paths, directories hold keys and other
//! directories, and intermediate directories are created implicitly when a
//! key is set.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StoreError};

/// A key or directory read from the store.
///
/// Field names follow the etcd v2 JSON representation so responses can be
/// deserialized directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Node {
    /// Absolute key path. Empty for the root directory.
    #[serde(default)]
    pub key: String,
    /// Value of a plain key; `None` for directories.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub dir: bool,
    /// Children of a directory, when read recursively.
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Node {
    pub fn leaf(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: Some(value.to_string()),
            dir: false,
            nodes: Vec::new(),
        }
    }

    pub fn directory(key: &str, nodes: Vec<Node>) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            dir: true,
            nodes,
        }
    }

    /// Last path segment of the key.
    pub fn name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or_default()
    }

    /// Every value below this node keyed by its path relative to this node.
    ///
    /// # Examples
    ///
    /// ```
    /// use etcd_schema_store::Node;
    ///
    /// let node = Node::directory("/hosts/web1", vec![
    ///     Node::leaf("/hosts/web1/ip", "10.0.0.5"),
    ///     Node::directory("/hosts/web1/nic", vec![Node::leaf("/hosts/web1/nic/mac", "aa:bb")]),
    /// ]);
    /// let flat = node.flatten();
    /// assert_eq!(flat["ip"], "10.0.0.5");
    /// assert_eq!(flat["nic/mac"], "aa:bb");
    /// ```
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let prefix = format!("{}/", self.key.trim_end_matches('/'));
        self.collect_values(&prefix, &mut out);
        out
    }

    fn collect_values(&self, prefix: &str, out: &mut BTreeMap<String, String>) {
        for child in &self.nodes {
            if child.dir {
                child.collect_values(prefix, out);
            } else if let Some(value) = &child.value {
                let relative = child.key.strip_prefix(prefix).unwrap_or(child.name());
                out.insert(relative.to_string(), value.clone());
            }
        }
    }
}

/// Operations the CLI needs from a key-value store.
pub trait Store {
    /// Creates a directory. Fails with [`StoreError::AlreadyExists`] if the
    /// directory is already there.
    fn create_directory(&mut self, path: &str) -> Result<()>;

    /// Sets a key, creating parent directories as needed.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Reads a key or, recursively, a directory.
    fn get(&self, key: &str) -> Result<Node>;

    /// Removes a key or, recursively, a directory.
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// Creates `path` unless it already exists.
pub fn ensure_directory<S: Store + ?Sized>(store: &mut S, path: &str) -> Result<()> {
    match store.create_directory(path) {
        Err(StoreError::AlreadyExists(_)) => {
            debug!("Directory already exists: {path}");
            Ok(())
        }
        other => other,
    }
}

/// Normalises a key to a single leading slash and no trailing slash.
///
/// The root is `/`.
pub fn normalize_key(key: &str) -> String {
    let trimmed = key.trim().trim_matches('/');
    format!("/{trimmed}")
}
