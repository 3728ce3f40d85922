//! Reading records.
//!
//! A record is the directory `<collection>/<id>`; its keys, flattened to
//! paths relative to the record directory, are the record's fields.

use std::collections::BTreeMap;

use crate::error::{Result, StoreError};
use crate::gateway::Store;

/// Field values of one record, keyed by relative key path.
pub type Record = BTreeMap<String, String>;

/// Reads the record stored under `record_path`.
///
/// Returns `Ok(None)` when nothing is stored there.
///
/// # Errors
///
/// Returns [`StoreError::NotADirectory`] if `record_path` holds a plain
/// value, or any transport error.
pub fn get_record<S: Store + ?Sized>(store: &S, record_path: &str) -> Result<Option<Record>> {
    match store.get(record_path) {
        Ok(node) if node.dir => Ok(Some(node.flatten())),
        Ok(_) => Err(StoreError::NotADirectory(record_path.to_string())),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Reads every record directly under `collection`, as `(id, record)` pairs
/// in key order.
///
/// Plain keys directly under the collection are not records and are
/// skipped. A missing collection has no records.
pub fn list_records<S: Store + ?Sized>(store: &S, collection: &str) -> Result<Vec<(String, Record)>> {
    let node = match store.get(collection) {
        Ok(node) => node,
        Err(StoreError::NotFound(_)) => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    if !node.dir {
        return Err(StoreError::NotADirectory(collection.to_string()));
    }

    let mut records: Vec<(String, Record)> = node
        .nodes
        .iter()
        .filter(|child| child.dir)
        .map(|child| (child.name().to_string(), child.flatten()))
        .collect();
    records.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(records)
}
