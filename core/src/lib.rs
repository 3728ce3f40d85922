//! Resource schemas and key-path rendering for etcd-cli.
//!
//! This crate holds everything that does not touch the file system or the
//! store:
//!
//! - [`SchemaSet`] - merged raw resource definitions from every schema
//!   document, last definition wins.
//! - [`ResourceSchema`] / [`FieldSpec`] - a validated resource, produced on
//!   demand by [`SchemaSet::resolve`] or [`validate_resource`].
//! - [`render`] - `{{ name }}` placeholder substitution.
//! - [`parse_rendered`] / [`KeyWrite`] - splitting rendered
//!   `<dir>/<key>: <value>` lines into store writes.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use etcd_schema_core::*;
//!
//! let mut schemas = SchemaSet::new();
//! schemas
//!     .merge_document(serde_yaml::from_str("
//! host:
//!   primary: hostname
//!   ip: { type: string, short: i }
//! ").unwrap())
//!     .unwrap();
//!
//! let host = schemas.resolve("host").unwrap();
//! assert_eq!(host.field("ip").unwrap().short, Some('i'));
//!
//! let mut values = BTreeMap::new();
//! values.insert("hostname".to_string(), "web1".to_string());
//! values.insert("ip".to_string(), "10.0.0.5".to_string());
//! let text = render("/hosts/{{ hostname }}/ip: {{ ip }}", &values).unwrap();
//!
//! let writes = parse_rendered(&text).unwrap();
//! assert_eq!(writes[0].directory, "/hosts/web1");
//! assert_eq!(writes[0].value, "10.0.0.5");
//! ```

mod merge;
mod record;
mod template;
mod types;
mod validate;

pub use merge::SchemaSet;
pub use record::{KeyWrite, RecordError, parse_rendered};
pub use template::{RenderError, Values, render};
pub use types::*;
pub use validate::{
    GLOBAL_OPTIONS, GLOBAL_SHORTS, RESERVED_KEYS, SchemaError, validate_resource,
};
