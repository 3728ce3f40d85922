//! In-memory store.
//!
//! Behaves like the etcd v2 keys API closely enough for the CLI: parent
//! directories are created implicitly, values and directories cannot
//! replace each other, and deletes are recursive. Every mutating call is
//! appended to a journal, including calls that fail.

use std::collections::BTreeMap;

use crate::error::{Result, StoreError};
use crate::gateway::{Node, Store, normalize_key};

/// A mutating call made against a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateDirectory(String),
    Set { key: String, value: String },
    Delete(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Directory,
    Value(String),
}

/// Ordered in-memory store with an operation journal.
///
/// # Examples
///
/// ```
/// use etcd_schema_store::{MemoryStore, Operation, Store};
///
/// let mut store = MemoryStore::new();
/// store.set("/hosts/web1/ip", "10.0.0.5").unwrap();
///
/// assert_eq!(store.value("/hosts/web1/ip"), Some("10.0.0.5"));
/// assert!(store.get("/hosts").unwrap().dir);
/// assert_eq!(store.operations().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Entry>,
    journal: Vec<Operation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mutating call so far, oldest first.
    pub fn operations(&self) -> &[Operation] {
        &self.journal
    }

    /// Drops the journal, keeping the data.
    pub fn clear_operations(&mut self) {
        self.journal.clear();
    }

    /// Value of a plain key, if present.
    pub fn value(&self, key: &str) -> Option<&str> {
        match self.entries.get(&normalize_key(key)) {
            Some(Entry::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn is_directory(&self, key: &str) -> bool {
        let key = normalize_key(key);
        key == "/" || self.entries.get(&key) == Some(&Entry::Directory)
    }

    /// Creates every missing ancestor of `key` as a directory.
    fn create_parents(&mut self, key: &str) -> Result<()> {
        let mut current = String::new();
        let segments: Vec<&str> = key.trim_start_matches('/').split('/').collect();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            current.push('/');
            current.push_str(segment);
            match self.entries.get(&current) {
                Some(Entry::Value(_)) => return Err(StoreError::NotADirectory(current)),
                Some(Entry::Directory) => {}
                None => {
                    self.entries.insert(current.clone(), Entry::Directory);
                }
            }
        }
        Ok(())
    }

    fn children(&self, dir: &str) -> Vec<Node> {
        let prefix = if dir == "/" {
            "/".to_string()
        } else {
            format!("{dir}/")
        };
        self.entries
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| !key[prefix.len()..].contains('/'))
            .map(|(key, entry)| self.node(key, entry))
            .collect()
    }

    fn node(&self, key: &str, entry: &Entry) -> Node {
        match entry {
            Entry::Value(value) => Node::leaf(key, value),
            Entry::Directory => Node::directory(key, self.children(key)),
        }
    }
}

impl Store for MemoryStore {
    fn create_directory(&mut self, path: &str) -> Result<()> {
        let path = normalize_key(path);
        self.journal.push(Operation::CreateDirectory(path.clone()));

        if path == "/" || self.entries.contains_key(&path) {
            return Err(StoreError::AlreadyExists(path));
        }
        self.create_parents(&path)?;
        self.entries.insert(path, Entry::Directory);
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = normalize_key(key);
        self.journal.push(Operation::Set {
            key: key.clone(),
            value: value.to_string(),
        });

        if key == "/" || self.entries.get(&key) == Some(&Entry::Directory) {
            return Err(StoreError::NotAFile(key));
        }
        self.create_parents(&key)?;
        self.entries.insert(key, Entry::Value(value.to_string()));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Node> {
        let key = normalize_key(key);
        if key == "/" {
            return Ok(Node::directory("", self.children("/")));
        }
        self.entries
            .get(&key)
            .map(|entry| self.node(&key, entry))
            .ok_or(StoreError::NotFound(key))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let key = normalize_key(key);
        self.journal.push(Operation::Delete(key.clone()));

        if !self.entries.contains_key(&key) {
            return Err(StoreError::NotFound(key));
        }
        let prefix = format!("{key}/");
        self.entries
            .retain(|existing, _| *existing != key && !existing.starts_with(&prefix));
        Ok(())
    }
}
