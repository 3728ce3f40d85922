//! Write sequences against a store.
//!
//! Writes are applied one at a time in order. There is no rollback: a
//! failure part way through leaves the earlier writes in place and returns
//! the error.

use etcd_schema_core::KeyWrite;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::gateway::{Store, ensure_directory};

/// Applies rendered writes in order: ensure the parent directory, then set
/// the key. Returns the number of keys set.
pub fn apply_writes<S: Store + ?Sized>(store: &mut S, writes: &[KeyWrite]) -> Result<usize> {
    for write in writes {
        let path = write.path();
        info!("Set: {path}: {}", write.value);
        ensure_directory(store, &write.directory)?;
        store.set(&path, &write.value)?;
    }
    Ok(writes.len())
}

/// Sets `<record_path>/<field>` for every given field.
pub fn set_fields<S: Store + ?Sized>(
    store: &mut S,
    record_path: &str,
    fields: &[(String, String)],
) -> Result<usize> {
    ensure_directory(store, record_path)?;
    for (field, value) in fields {
        let key = format!("{}/{field}", record_path.trim_end_matches('/'));
        info!("Set: {key}: {value}");
        store.set(&key, value)?;
    }
    Ok(fields.len())
}

/// Removes a record directory and everything under it.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if there is no record.
pub fn delete_record<S: Store + ?Sized>(store: &mut S, record_path: &str) -> Result<()> {
    info!("Delete: {record_path}");
    match store.delete(record_path) {
        Err(StoreError::NotFound(_)) => Err(StoreError::NotFound(record_path.to_string())),
        other => other,
    }
}
