//! Store gateway for etcd-cli.
//!
//! The CLI only needs four operations from its key-value store, captured by
//! the [`Store`] trait: create a directory, set a key, read a key or
//! directory recursively, and delete recursively. Two implementations are
//! provided:
//!
//! - [`EtcdClient`] - the etcd v2 keys API over HTTP.
//! - [`MemoryStore`] - an in-memory tree with an operation journal.
//!
//! On top of the trait sit the record helpers used by the CLI actions:
//! [`apply_writes`] for rendered templates, [`get_record`] /
//! [`list_records`] for reads, [`set_fields`] and [`delete_record`] for
//! updates.
//!
//! # Quick start
//!
//! ```
//! use etcd_schema_core::parse_rendered;
//! use etcd_schema_store::{MemoryStore, apply_writes, get_record};
//!
//! let mut store = MemoryStore::new();
//! let writes = parse_rendered("/hosts/web1/ip: 10.0.0.5\n/hosts/web1/zone: eu\n").unwrap();
//! apply_writes(&mut store, &writes).unwrap();
//!
//! let record = get_record(&store, "/hosts/web1").unwrap().unwrap();
//! assert_eq!(record["zone"], "eu");
//! ```

mod error;
mod etcd;
mod gateway;
mod memory;
mod query;
mod write;

pub use error::{Result, StoreError};
pub use etcd::{DEFAULT_TIMEOUT_SECS, EtcdClient};
pub use gateway::{Node, Store, ensure_directory, normalize_key};
pub use memory::{MemoryStore, Operation};
pub use query::{Record, get_record, list_records};
pub use write::{apply_writes, delete_record, set_fields};
