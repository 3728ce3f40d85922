//! File-backed inputs for etcd-cli: schema documents, resource templates
//! and the configuration file.
//!
//! # Quick start
//!
//! ```no_run
//! use etcd_schema_db::{Config, SchemaDatabase, TemplateStore};
//!
//! let (config, _source) = Config::discover(None).unwrap();
//! let db = SchemaDatabase::from_dir(&config.schemas).unwrap();
//! let templates = TemplateStore::new(&config.templates);
//!
//! if db.schemas().contains("host") {
//!     let template = templates.load("host").unwrap();
//!     println!("{template}");
//! }
//! ```

mod config;
mod error;
mod loader;
mod templates;

pub use config::{Config, SYSTEM_CONFIG_FILE, USER_CONFIG_FILE};
pub use error::{DatabaseError, Result};
pub use loader::{SCHEMA_EXTENSIONS, SchemaDatabase};
pub use templates::{TEMPLATE_EXTENSION, TemplateStore};
