//! Resource definition validation.
//!
//! Turns one raw resource definition (a YAML mapping) into a
//! [`ResourceSchema`], rejecting anything the grammar builder cannot
//! express: a missing `primary`, a field without a `type`, unsupported
//! types, malformed aliases and names that collide with global options.
//!
//! Validation is per resource. A broken definition only makes that
//! resource unusable.
//!
//! # Examples
//!
//! ```
//! use etcd_schema_core::{SchemaError, validate_resource};
//!
//! let doc: serde_yaml::Value = serde_yaml::from_str("
//! primary: hostname
//! ip:
//!   type: string
//! ").unwrap();
//! let host = validate_resource("host", &doc).unwrap();
//! assert_eq!(host.primary, "hostname");
//!
//! let doc: serde_yaml::Value = serde_yaml::from_str("ip: { type: string }").unwrap();
//! assert_eq!(
//!     validate_resource("host", &doc),
//!     Err(SchemaError::MissingPrimary("host".into()))
//! );
//! ```

use serde_yaml::Value;
use thiserror::Error;

use crate::{FieldSpec, FieldType, ResourceSchema};

/// Keys of a resource definition that are not fields.
pub const RESERVED_KEYS: [&str; 3] = ["primary", "required", "path"];

/// Long option names owned by the top-level command.
pub const GLOBAL_OPTIONS: [&str; 4] = ["config", "debug", "yes", "help"];

/// Short option names owned by the top-level command.
pub const GLOBAL_SHORTS: [char; 4] = ['c', 'd', 'y', 'h'];

/// Schema errors. Each one makes the affected resource unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A schema document's top level is not a mapping of resources.
    #[error("schema document is not a mapping of resources")]
    NotAMapping,
    /// A top-level key is not a string.
    #[error("resource names must be strings, found: {0}")]
    InvalidResourceName(String),
    /// No resource with this name was loaded.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    /// A resource definition is not a mapping.
    #[error("Schema: {0} must be a mapping of fields")]
    InvalidResource(String),
    /// `primary` is absent or not a string.
    #[error("Schema: {0} needs to declare a primary key")]
    MissingPrimary(String),
    /// A non-primary field has no `type`.
    #[error("Schema: {resource} entry: {field} needs to declare a type")]
    MissingType { resource: String, field: String },
    /// A field declares a type the CLI cannot generate arguments for.
    #[error("Schema: {resource} entry: {field} has an unsupported type: {field_type} for this CLI")]
    UnsupportedType {
        resource: String,
        field: String,
        field_type: String,
    },
    /// `short` is not exactly one character.
    #[error("Schema: {resource} entry: {field} short alias must be a single character: {short}")]
    InvalidShort {
        resource: String,
        field: String,
        short: String,
    },
    /// A field or alias collides with a global option.
    #[error("Schema: {resource} entry: {name} collides with a global option")]
    ReservedName { resource: String, name: String },
    /// Two fields share a short alias.
    #[error("Schema: {resource} short alias -{short} is declared twice")]
    DuplicateShort { resource: String, short: char },
    /// `required` is not a list of strings.
    #[error("Schema: {0} required must be a list of field names")]
    InvalidRequired(String),
    /// `required` names a field that is not declared.
    #[error("Schema: {resource} requires undeclared field: {field}")]
    UnknownRequiredField { resource: String, field: String },
    /// `default`, `enum` or `choices` holds a value that is not a scalar,
    /// or a default that does not fit the field type.
    #[error("Schema: {resource} entry: {field} has an invalid {attribute}")]
    InvalidValue {
        resource: String,
        field: String,
        attribute: String,
    },
    /// `path` is not an absolute key path.
    #[error("Schema: {resource} path must be an absolute key path: {path}")]
    InvalidPath { resource: String, path: String },
    /// The action needs `path` but the resource does not declare one.
    #[error("Schema: {0} does not declare a path; only add is available")]
    MissingPath(String),
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Validates one resource definition.
pub fn validate_resource(name: &str, definition: &Value) -> Result<ResourceSchema> {
    let Some(mapping) = definition.as_mapping() else {
        return Err(SchemaError::InvalidResource(name.to_string()));
    };

    let primary = mapping
        .get("primary")
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::MissingPrimary(name.to_string()))?
        .to_string();

    let primary_description = mapping
        .get(primary.as_str())
        .and_then(|entry| entry.get("description"))
        .and_then(Value::as_str)
        .map(String::from);

    let path = match mapping.get("path") {
        None => None,
        Some(raw) => {
            let path = raw.as_str().unwrap_or_default();
            if !path.starts_with('/') {
                return Err(SchemaError::InvalidPath {
                    resource: name.to_string(),
                    path: scalar_text(raw).unwrap_or_default(),
                });
            }
            Some(path.to_string())
        }
    };

    let mut fields = Vec::new();
    for (key, entry) in mapping {
        let Some(field) = key.as_str() else {
            return Err(SchemaError::InvalidResource(name.to_string()));
        };
        if RESERVED_KEYS.contains(&field) || field == primary {
            continue;
        }
        fields.push(validate_field(name, field, entry)?);
    }

    check_global_collisions(name, &primary, &fields)?;

    let required = match mapping.get("required") {
        None => vec![primary.clone()],
        Some(raw) => parse_required(name, raw)?,
    };
    for field in &required {
        if *field != primary && !fields.iter().any(|f| f.name == *field) {
            return Err(SchemaError::UnknownRequiredField {
                resource: name.to_string(),
                field: field.clone(),
            });
        }
    }

    Ok(ResourceSchema {
        name: name.to_string(),
        primary,
        primary_description,
        required,
        path,
        fields,
    })
}

fn validate_field(resource: &str, field: &str, entry: &Value) -> Result<FieldSpec> {
    let missing_type = || SchemaError::MissingType {
        resource: resource.to_string(),
        field: field.to_string(),
    };
    let entry = entry.as_mapping().ok_or_else(missing_type)?;
    let raw_type = entry.get("type").ok_or_else(missing_type)?;

    let field_type = raw_type
        .as_str()
        .and_then(FieldType::parse)
        .ok_or_else(|| SchemaError::UnsupportedType {
            resource: resource.to_string(),
            field: field.to_string(),
            field_type: scalar_text(raw_type).unwrap_or_else(|| "<non-scalar>".to_string()),
        })?;

    let mut spec = FieldSpec::new(field, field_type);
    spec.description = entry
        .get("description")
        .and_then(Value::as_str)
        .map(String::from);

    if let Some(raw) = entry.get("short") {
        let text = scalar_text(raw).unwrap_or_default();
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != '-' => spec.short = Some(c),
            _ => {
                return Err(SchemaError::InvalidShort {
                    resource: resource.to_string(),
                    field: field.to_string(),
                    short: text,
                });
            }
        }
    }

    if let Some(raw) = entry.get("default") {
        spec.default = scalar_list(raw).ok_or_else(|| invalid_value(resource, field, "default"))?;
        if !default_fits(field_type, &spec.default) {
            return Err(invalid_value(resource, field, "default"));
        }
    }

    for attribute in ["enum", "choices"] {
        if let Some(raw) = entry.get(attribute) {
            let values =
                scalar_list(raw).ok_or_else(|| invalid_value(resource, field, attribute))?;
            spec.choices.extend(values);
        }
    }

    Ok(spec)
}

fn check_global_collisions(resource: &str, primary: &str, fields: &[FieldSpec]) -> Result<()> {
    let reserved = |name: &str| SchemaError::ReservedName {
        resource: resource.to_string(),
        name: name.to_string(),
    };

    if GLOBAL_OPTIONS.contains(&primary) {
        return Err(reserved(primary));
    }

    let mut shorts: Vec<char> = Vec::new();
    for field in fields {
        if GLOBAL_OPTIONS.contains(&field.name.as_str()) {
            return Err(reserved(&field.name));
        }
        if let Some(short) = field.short {
            if GLOBAL_SHORTS.contains(&short) {
                return Err(reserved(&format!("-{short}")));
            }
            if shorts.contains(&short) {
                return Err(SchemaError::DuplicateShort {
                    resource: resource.to_string(),
                    short,
                });
            }
            shorts.push(short);
        }
    }
    Ok(())
}

fn parse_required(resource: &str, raw: &Value) -> Result<Vec<String>> {
    let invalid = || SchemaError::InvalidRequired(resource.to_string());
    raw.as_sequence()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(String::from).ok_or_else(invalid))
        .collect()
}

/// Only arrays take several defaults; a boolean default is `true` or `false`.
fn default_fits(field_type: FieldType, default: &[String]) -> bool {
    match field_type {
        FieldType::Array => true,
        FieldType::String => default.len() <= 1,
        FieldType::Boolean => match default {
            [] => true,
            [value] => value == "true" || value == "false",
            _ => false,
        },
    }
}

fn invalid_value(resource: &str, field: &str, attribute: &str) -> SchemaError {
    SchemaError::InvalidValue {
        resource: resource.to_string(),
        field: field.to_string(),
        attribute: attribute.to_string(),
    }
}

/// Renders a YAML scalar as the string a user would type for it.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// A scalar becomes a one-element list, a sequence of scalars stays a list,
/// `null` is an empty list.
fn scalar_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::Sequence(items) => items.iter().map(scalar_text).collect(),
        other => scalar_text(other).map(|text| vec![text]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_validate_resource_keeps_declaration_order() {
        let doc = parse(
            r#"
primary: hostname
hostname:
  type: string
  description: Host name
zone:
  type: string
  short: z
  default: eu-1
tags:
  type: array
  default: [web, db]
active:
  type: boolean
  default: true
"#,
        );
        let schema = validate_resource("host", &doc).unwrap();

        assert_eq!(schema.primary_description.as_deref(), Some("Host name"));
        assert_eq!(schema.column_names(), vec!["hostname", "zone", "tags", "active"]);
        assert_eq!(schema.required, vec!["hostname"]);

        let zone = schema.field("zone").unwrap();
        assert_eq!(zone.short, Some('z'));
        assert_eq!(zone.default, vec!["eu-1"]);
        assert_eq!(schema.field("tags").unwrap().default, vec!["web", "db"]);
        assert_eq!(schema.field("active").unwrap().default, vec!["true"]);
    }

    #[test]
    fn test_validate_resource_rejects_missing_primary() {
        let doc = parse("ip: { type: string }");
        assert_eq!(
            validate_resource("host", &doc),
            Err(SchemaError::MissingPrimary("host".into()))
        );
    }

    #[test]
    fn test_validate_resource_rejects_missing_type() {
        let doc = parse("primary: id\nip: { description: address }");
        assert_eq!(
            validate_resource("host", &doc),
            Err(SchemaError::MissingType {
                resource: "host".into(),
                field: "ip".into()
            })
        );
    }

    #[test]
    fn test_validate_resource_rejects_unsupported_type() {
        let doc = parse("primary: id\nport: { type: integer }");
        let err = validate_resource("host", &doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema: host entry: port has an unsupported type: integer for this CLI"
        );
    }

    #[test]
    fn test_primary_entry_needs_no_type() {
        let doc = parse("primary: id\nid: { description: Identifier }");
        let schema = validate_resource("host", &doc).unwrap();
        assert!(schema.fields.is_empty());
        assert_eq!(schema.primary_description.as_deref(), Some("Identifier"));
    }

    #[test]
    fn test_required_and_path_are_not_fields() {
        let doc = parse(
            "primary: id\npath: /hosts\nrequired: [id, ip]\nip: { type: string }",
        );
        let schema = validate_resource("host", &doc).unwrap();
        assert_eq!(schema.column_names(), vec!["id", "ip"]);
        assert_eq!(schema.required, vec!["id", "ip"]);
        assert_eq!(schema.path.as_deref(), Some("/hosts"));
    }

    #[test]
    fn test_required_must_name_declared_fields() {
        let doc = parse("primary: id\nrequired: [mask]\nip: { type: string }");
        assert!(matches!(
            validate_resource("host", &doc),
            Err(SchemaError::UnknownRequiredField { .. })
        ));
    }

    #[test]
    fn test_relative_path_is_rejected() {
        let doc = parse("primary: id\npath: hosts");
        assert!(matches!(
            validate_resource("host", &doc),
            Err(SchemaError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_short_alias_rules() {
        let long = parse("primary: id\nip: { type: string, short: ip }");
        assert!(matches!(
            validate_resource("host", &long),
            Err(SchemaError::InvalidShort { .. })
        ));

        let global = parse("primary: id\nip: { type: string, short: y }");
        assert!(matches!(
            validate_resource("host", &global),
            Err(SchemaError::ReservedName { .. })
        ));

        let twice = parse(
            "primary: id\nip: { type: string, short: i }\nimage: { type: string, short: i }",
        );
        assert_eq!(
            validate_resource("host", &twice),
            Err(SchemaError::DuplicateShort {
                resource: "host".into(),
                short: 'i'
            })
        );
    }

    #[test]
    fn test_field_named_like_global_option_is_rejected() {
        let doc = parse("primary: id\nconfig: { type: string }");
        assert!(matches!(
            validate_resource("host", &doc),
            Err(SchemaError::ReservedName { .. })
        ));
    }

    #[test]
    fn test_default_must_fit_field_type() {
        for default in ["1", "yes", "[true, false]"] {
            let doc = parse(&format!(
                "primary: id\nactive: {{ type: boolean, default: {default} }}"
            ));
            assert_eq!(
                validate_resource("host", &doc),
                Err(SchemaError::InvalidValue {
                    resource: "host".into(),
                    field: "active".into(),
                    attribute: "default".into(),
                }),
                "{default}"
            );
        }

        let listed = parse("primary: id\nzone: { type: string, default: [eu, us] }");
        assert!(matches!(
            validate_resource("host", &listed),
            Err(SchemaError::InvalidValue { .. })
        ));

        let fine = parse("primary: id\nactive: { type: boolean, default: false }");
        let schema = validate_resource("host", &fine).unwrap();
        assert_eq!(schema.field("active").unwrap().default, vec!["false"]);
    }

    #[test]
    fn test_choices_are_collected() {
        let doc = parse("primary: id\nenv: { type: string, enum: [dev, prod] }");
        let schema = validate_resource("host", &doc).unwrap();
        assert_eq!(schema.field("env").unwrap().choices, vec!["dev", "prod"]);
    }
}
