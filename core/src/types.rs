//! Resource schema type definitions.
//!
//! A schema document maps resource names to resource definitions. Once a
//! definition has been validated (see [`SchemaSet::resolve`](crate::SchemaSet::resolve))
//! it is represented by a [`ResourceSchema`], which is what the grammar
//! builder and the record renderer work from.

use std::fmt;
use std::str::FromStr;

/// Actions every resource is exposed under, in grammar order.
///
/// # Examples
///
/// ```
/// use etcd_schema_core::Action;
///
/// assert_eq!(Action::ALL.len(), 5);
/// assert_eq!("modify".parse::<Action>(), Ok(Action::Modify));
/// assert_eq!(Action::List.as_str(), "list");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Read one record.
    Get,
    /// Render the resource template and write every resulting key.
    Add,
    /// Overwrite the supplied fields of an existing record.
    Modify,
    /// Remove one record.
    Delete,
    /// Read every record of a resource.
    List,
}

impl Action {
    /// All actions in the order they appear in the command grammar.
    pub const ALL: [Action; 5] = [
        Action::Get,
        Action::Add,
        Action::Modify,
        Action::Delete,
        Action::List,
    ];

    /// Returns the subcommand name for this action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::Add => "add",
            Action::Modify => "modify",
            Action::Delete => "delete",
            Action::List => "list",
        }
    }

    /// One-line help text for the action subcommand.
    pub fn about(self) -> &'static str {
        match self {
            Action::Get => "Print a single record",
            Action::Add => "Render a resource template and write it to the store",
            Action::Modify => "Update selected fields of an existing record",
            Action::Delete => "Remove a record",
            Action::List => "Print every record of a resource",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown action: {s}"))
    }
}

/// Field types supported for argument generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Single string value.
    String,
    /// `true` / `false`.
    Boolean,
    /// Repeatable value, rendered comma-joined.
    Array,
}

impl FieldType {
    /// Parses a schema `type` attribute, returning `None` for unsupported types.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "string" => Some(FieldType::String),
            "boolean" => Some(FieldType::Boolean),
            "array" => Some(FieldType::Array),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
        }
    }
}

/// A validated, non-primary field of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, also the long option name (`--<name>`).
    pub name: String,
    pub field_type: FieldType,
    /// Help text.
    pub description: Option<String>,
    /// Single-character alias (`-<short>`).
    pub short: Option<char>,
    /// Default values rendered to strings; empty when no default is declared.
    pub default: Vec<String>,
    /// Allowed values from `enum`/`choices`. Not enforced by the grammar.
    pub choices: Vec<String>,
}

impl FieldSpec {
    /// Creates a field with no description, alias, default or choices.
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            description: None,
            short: None,
            default: Vec::new(),
            choices: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_default(mut self, value: &str) -> Self {
        self.default.push(value.to_string());
        self
    }
}

/// A validated resource definition.
///
/// # Examples
///
/// ```
/// use etcd_schema_core::{FieldSpec, FieldType, ResourceSchema};
///
/// let host = ResourceSchema::new("host", "hostname")
///     .with_path("/hosts")
///     .with_field(FieldSpec::new("ip", FieldType::String));
///
/// assert_eq!(host.column_names(), vec!["hostname", "ip"]);
/// assert!(host.is_required("hostname"));
/// assert!(!host.is_required("ip"));
/// assert_eq!(host.record_path("web1").as_deref(), Some("/hosts/web1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSchema {
    /// Resource name (the second-level subcommand).
    pub name: String,
    /// Name of the primary key field.
    pub primary: String,
    /// Help text for the primary key positional.
    pub primary_description: Option<String>,
    /// Fields that `add` must be given. Defaults to `[primary]`.
    pub required: Vec<String>,
    /// Key path of the resource collection, used by get/list/modify/delete.
    pub path: Option<String>,
    /// Non-primary fields in declaration order.
    pub fields: Vec<FieldSpec>,
}

impl ResourceSchema {
    /// Creates a resource with only a primary key.
    pub fn new(name: &str, primary: &str) -> Self {
        Self {
            name: name.to_string(),
            primary: primary.to_string(),
            primary_description: None,
            required: vec![primary.to_string()],
            path: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Finds a non-primary field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Primary key followed by every declared field.
    pub fn column_names(&self) -> Vec<&str> {
        std::iter::once(self.primary.as_str())
            .chain(self.fields.iter().map(|f| f.name.as_str()))
            .collect()
    }

    /// Key path of a single record, `<path>/<id>`.
    pub fn record_path(&self, id: &str) -> Option<String> {
        self.path
            .as_deref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trips_through_names() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
        assert!("rename".parse::<Action>().is_err());
    }

    #[test]
    fn test_field_type_parse_rejects_unsupported() {
        assert_eq!(FieldType::parse("array"), Some(FieldType::Array));
        assert_eq!(FieldType::parse("integer"), None);
        assert_eq!(FieldType::parse("String"), None);
    }

    #[test]
    fn test_record_path_trims_trailing_slash() {
        let schema = ResourceSchema::new("host", "hostname").with_path("/hosts/");
        assert_eq!(schema.record_path("a").as_deref(), Some("/hosts/a"));

        let no_path = ResourceSchema::new("host", "hostname");
        assert_eq!(no_path.record_path("a"), None);
    }
}
