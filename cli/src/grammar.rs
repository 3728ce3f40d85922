//! Command grammar built from the loaded schemas.
//!
//! The grammar has two levels, `<action> <resource>`, with one leaf
//! subcommand per action and resource. Leaves are built through
//! [`Grammar::resolve_subcommand`], which validates only the resource it
//! builds. A resource whose definition is broken still gets a leaf under
//! every action, but that leaf accepts any arguments and invoking it
//! reports the schema error.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use etcd_schema_core::{Action, FieldSpec, FieldType, ResourceSchema, SchemaError, SchemaSet};
use tracing::debug;

use crate::error::{CliError, Result};
use crate::output::OutputFormat;

/// Arg ids for options that are not schema fields.
pub const CONFIG_ID: &str = "config";
pub const DEBUG_ID: &str = "debug";
pub const YES_ID: &str = "yes";
pub const FORMAT_ID: &str = "@format";
pub const FIELDS_ID: &str = "@fields";
const UNAVAILABLE_ID: &str = "@unavailable";

/// Builds the `etcd-cli` command tree from a [`SchemaSet`].
pub struct Grammar<'a> {
    schemas: &'a SchemaSet,
}

/// A parsed invocation of one leaf subcommand.
#[derive(Debug)]
pub struct Invocation<'m> {
    pub action: Action,
    pub schema: ResourceSchema,
    pub matches: &'m ArgMatches,
    pub assume_yes: bool,
}

impl<'a> Grammar<'a> {
    pub fn new(schemas: &'a SchemaSet) -> Self {
        Self { schemas }
    }

    /// The full command tree: global options plus every action × resource.
    pub fn command(&self) -> Command {
        let mut root = Command::new("etcd-cli")
            .about("Get, add, modify, delete and list schema-defined records in etcd")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .disable_help_subcommand(true)
            .args(global_args());

        for action in Action::ALL {
            let mut group = Command::new(action.as_str())
                .about(action.about())
                .subcommand_required(true)
                .arg_required_else_help(true)
                .disable_help_subcommand(true);

            for resource in self.schemas.resource_names() {
                let leaf = match self.resolve_subcommand(action, resource) {
                    Ok(leaf) => leaf,
                    Err(err) => {
                        debug!("{action} {resource} is unavailable: {err}");
                        unavailable_command(resource, &err)
                    }
                };
                group = group.subcommand(leaf);
            }
            root = root.subcommand(group);
        }
        root
    }

    /// Validates `resource` and builds its leaf subcommand for `action`.
    pub fn resolve_subcommand(
        &self,
        action: Action,
        resource: &str,
    ) -> std::result::Result<Command, SchemaError> {
        let schema = self.schemas.resolve(resource)?;
        Ok(leaf_command(action, &schema))
    }

    /// Maps parsed matches back to the action and the validated resource.
    ///
    /// # Errors
    ///
    /// Returns the resource's [`SchemaError`] when an unavailable leaf was
    /// invoked.
    pub fn invocation<'m>(&self, matches: &'m ArgMatches) -> Result<Invocation<'m>> {
        let (action_name, action_matches) = matches
            .subcommand()
            .ok_or_else(|| CliError::Usage("missing action".to_string()))?;
        let action = action_name.parse::<Action>().map_err(CliError::Usage)?;
        let (resource, leaf_matches) = action_matches
            .subcommand()
            .ok_or_else(|| CliError::Usage(format!("missing resource for {action}")))?;

        let schema = self.schemas.resolve(resource)?;
        Ok(Invocation {
            action,
            schema,
            matches: leaf_matches,
            assume_yes: leaf_matches.get_flag(YES_ID),
        })
    }
}

/// `-c/--config`, `-d/--debug` and `-y/--yes`, accepted at every level.
pub(crate) fn global_args() -> [Arg; 3] {
    [
        Arg::new(CONFIG_ID)
            .short('c')
            .long("config")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .global(true)
            .help("Configuration file"),
        Arg::new(DEBUG_ID)
            .short('d')
            .long("debug")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Print debug info"),
        Arg::new(YES_ID)
            .short('y')
            .long("yes")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Answer yes to all queries"),
    ]
}

/// Builds the leaf subcommand of an already validated resource.
pub fn leaf_command(action: Action, schema: &ResourceSchema) -> Command {
    let command = Command::new(schema.name.clone());
    match action {
        Action::List => command
            .about(format!("List every {}", schema.name))
            .args(format_args()),
        Action::Get => command
            .about(format!("Print one {}", schema.name))
            .arg(primary_arg(schema))
            .args(format_args()),
        Action::Delete => command
            .about(format!("Delete one {}", schema.name))
            .arg(primary_arg(schema)),
        Action::Add | Action::Modify => command
            .about(format!("{} a {}", capitalize(action.as_str()), schema.name))
            .arg(primary_arg(schema))
            .args(schema.fields.iter().map(|field| field_arg(action, schema, field))),
    }
}

fn primary_arg(schema: &ResourceSchema) -> Arg {
    let arg = Arg::new(schema.primary.clone())
        .value_name(schema.primary.to_uppercase())
        .required(true);
    match &schema.primary_description {
        Some(description) => arg.help(description.clone()),
        None => arg,
    }
}

/// One `--<field>` option.
///
/// `add` enforces `required` and applies defaults; `modify` does neither so
/// that only the options actually given are written.
fn field_arg(action: Action, schema: &ResourceSchema, field: &FieldSpec) -> Arg {
    let mut arg = Arg::new(field.name.clone()).long(field.name.clone());
    if let Some(short) = field.short {
        arg = arg.short(short);
    }
    if let Some(description) = &field.description {
        arg = arg.help(description.clone());
    }

    arg = match field.field_type {
        FieldType::String => arg.action(ArgAction::Set).value_name("VALUE"),
        FieldType::Boolean => arg
            .action(ArgAction::Set)
            .value_name("BOOL")
            .value_parser(value_parser!(bool)),
        FieldType::Array => arg
            .action(ArgAction::Append)
            .value_name("VALUE")
            .value_delimiter(','),
    };

    if action == Action::Add {
        if schema.is_required(&field.name) {
            arg = arg.required(true);
        } else if !field.default.is_empty() {
            arg = arg.default_values(field.default.clone());
        }
    }
    arg
}

fn format_args() -> [Arg; 2] {
    [
        Arg::new(FORMAT_ID)
            .long("format")
            .value_name("FORMAT")
            .value_parser(value_parser!(OutputFormat))
            .default_value("text")
            .help("Print format"),
        Arg::new(FIELDS_ID)
            .long("fields")
            .value_name("FIELDS")
            .help("Fields to print, ignored by JSON or YAML"),
    ]
}

fn unavailable_command(resource: &str, err: &SchemaError) -> Command {
    Command::new(resource.to_string())
        .about(format!("(unavailable) {err}"))
        .arg(
            Arg::new(UNAVAILABLE_ID)
                .action(ArgAction::Append)
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .hide(true),
        )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reads the value of one field as a template string.
///
/// Booleans render as `true`/`false`; arrays are joined with `,`.
pub fn field_value(matches: &ArgMatches, field: &FieldSpec) -> Option<String> {
    match field.field_type {
        FieldType::String => matches.get_one::<String>(&field.name).cloned(),
        FieldType::Boolean => matches.get_one::<bool>(&field.name).map(bool::to_string),
        FieldType::Array => matches
            .get_many::<String>(&field.name)
            .map(|values| values.cloned().collect::<Vec<_>>().join(",")),
    }
}

/// Value of the primary key positional.
pub fn primary_value<'m>(matches: &'m ArgMatches, schema: &ResourceSchema) -> Result<&'m str> {
    matches
        .get_one::<String>(&schema.primary)
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("missing {}", schema.primary)))
}
