//! Merged view of every loaded schema document.
//!
//! Documents are merged key by key: a resource name that appears in more
//! than one document keeps the definition from the document merged last.
//! Definitions are kept raw and only validated when a resource is resolved,
//! so one malformed resource does not hide the others.

use std::collections::BTreeMap;

use serde_yaml::Value;
use tracing::debug;

use crate::validate::{Result, SchemaError, validate_resource};
use crate::ResourceSchema;

/// Raw resource definitions keyed by resource name.
///
/// # Examples
///
/// ```
/// use etcd_schema_core::SchemaSet;
///
/// let mut set = SchemaSet::new();
/// set.merge_document(serde_yaml::from_str("host: { primary: name }").unwrap()).unwrap();
/// set.merge_document(serde_yaml::from_str("host: { primary: fqdn }").unwrap()).unwrap();
///
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.resolve("host").unwrap().primary, "fqdn");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    resources: BTreeMap<String, Value>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges every top-level key of `document` into the set, last wins.
    ///
    /// Returns the number of resources the document contributed. A `null`
    /// document (an empty file) contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotAMapping`] when the document is not a
    /// mapping, or [`SchemaError::InvalidResourceName`] for a non-string key.
    /// The set is left unchanged on error.
    pub fn merge_document(&mut self, document: Value) -> Result<usize> {
        let mapping = match document {
            Value::Null => return Ok(0),
            Value::Mapping(mapping) => mapping,
            _ => return Err(SchemaError::NotAMapping),
        };

        let mut incoming = Vec::with_capacity(mapping.len());
        for (key, definition) in mapping {
            let Value::String(name) = key else {
                return Err(SchemaError::InvalidResourceName(format!("{key:?}")));
            };
            incoming.push((name, definition));
        }

        let count = incoming.len();
        for (name, definition) in incoming {
            if self.resources.insert(name.clone(), definition).is_some() {
                debug!("Schema: {name} redefined, keeping the latest definition");
            }
        }
        Ok(count)
    }

    /// Validates and returns one resource.
    pub fn resolve(&self, name: &str) -> Result<ResourceSchema> {
        let definition = self
            .resources
            .get(name)
            .ok_or_else(|| SchemaError::UnknownResource(name.to_string()))?;
        validate_resource(name, definition)
    }

    /// Resource names in sorted order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
