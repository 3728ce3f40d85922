//! Execution of the five actions against a store.

use std::io::{BufRead, Write};

use clap::ArgMatches;
use etcd_schema_core::{Action, ResourceSchema, SchemaError, Values, parse_rendered, render};
use etcd_schema_db::TemplateStore;
use etcd_schema_store::{Record, Store, apply_writes, delete_record, get_record, list_records, set_fields};
use tracing::{info, warn};

use crate::error::{CliError, Result};
use crate::grammar::{FIELDS_ID, FORMAT_ID, field_value, primary_value};
use crate::output::{OutputFormat, Shape, parse_csv_list, write_records};
use crate::prompt;

/// Everything an action needs besides its parsed arguments.
pub struct Session<'a, S: Store + ?Sized> {
    pub store: &'a mut S,
    pub templates: &'a TemplateStore,
    /// Skip the confirmation prompt.
    pub assume_yes: bool,
    pub input: &'a mut dyn BufRead,
    pub output: &'a mut dyn Write,
}

impl<S: Store + ?Sized> Session<'_, S> {
    pub fn execute(&mut self, action: Action, schema: &ResourceSchema, matches: &ArgMatches) -> Result<()> {
        match action {
            Action::Add => self.add(schema, matches),
            Action::Get => self.get(schema, matches),
            Action::List => self.list(schema, matches),
            Action::Modify => self.modify(schema, matches),
            Action::Delete => self.delete(schema, matches),
        }
    }

    /// Renders the resource template and writes every resulting key.
    ///
    /// The template is loaded, rendered and parsed before the operator is
    /// asked, so a broken template never reaches the store.
    fn add(&mut self, schema: &ResourceSchema, matches: &ArgMatches) -> Result<()> {
        let id = primary_value(matches, schema)?;
        let template = self.templates.load(&schema.name)?;
        let values = template_values(schema, matches)?;
        let rendered = render(&template, &values)?;
        let writes = parse_rendered(&rendered)?;

        self.confirm("Adding", &rendered)?;
        let count = apply_writes(self.store, &writes)?;
        info!("Added {} {id}: {count} key(s)", schema.name);
        Ok(())
    }

    fn get(&mut self, schema: &ResourceSchema, matches: &ArgMatches) -> Result<()> {
        let id = primary_value(matches, schema)?;
        let path = collection_path(schema, id)?;
        let record = get_record(&*self.store, &path)?.ok_or_else(|| not_found(schema, id))?;

        let records = vec![with_primary(schema, id, record)];
        self.print(schema, matches, Shape::Single, &records)
    }

    fn list(&mut self, schema: &ResourceSchema, matches: &ArgMatches) -> Result<()> {
        let collection = schema
            .path
            .as_deref()
            .ok_or_else(|| SchemaError::MissingPath(schema.name.clone()))?;

        let records: Vec<Record> = list_records(&*self.store, collection)?
            .into_iter()
            .map(|(id, record)| with_primary(schema, &id, record))
            .collect();
        info!("Found {} {} record(s) under {collection}", records.len(), schema.name);
        self.print(schema, matches, Shape::Collection, &records)
    }

    /// Overwrites only the fields given on the command line.
    fn modify(&mut self, schema: &ResourceSchema, matches: &ArgMatches) -> Result<()> {
        let id = primary_value(matches, schema)?;
        let path = collection_path(schema, id)?;
        if get_record(&*self.store, &path)?.is_none() {
            return Err(not_found(schema, id));
        }

        let updates: Vec<(String, String)> = schema
            .fields
            .iter()
            .filter_map(|field| field_value(matches, field).map(|value| (field.name.clone(), value)))
            .collect();
        if updates.is_empty() {
            warn!("Nothing to modify for {} {id}", schema.name);
            return Ok(());
        }

        let preview: Vec<String> = updates
            .iter()
            .map(|(field, value)| format!("{path}/{field}: {value}"))
            .collect();
        self.confirm("Modifying", &preview.join("\n"))?;
        set_fields(self.store, &path, &updates)?;
        Ok(())
    }

    fn delete(&mut self, schema: &ResourceSchema, matches: &ArgMatches) -> Result<()> {
        let id = primary_value(matches, schema)?;
        let path = collection_path(schema, id)?;
        if get_record(&*self.store, &path)?.is_none() {
            return Err(not_found(schema, id));
        }

        self.confirm("Deleting", &path)?;
        delete_record(self.store, &path)?;
        Ok(())
    }

    fn confirm(&mut self, heading: &str, body: &str) -> Result<()> {
        if self.assume_yes {
            return Ok(());
        }
        if prompt::confirm(&mut *self.input, &mut *self.output, heading, body)? {
            Ok(())
        } else {
            Err(CliError::Declined)
        }
    }

    fn print(
        &mut self,
        schema: &ResourceSchema,
        matches: &ArgMatches,
        shape: Shape,
        records: &[Record],
    ) -> Result<()> {
        let format = matches
            .get_one::<OutputFormat>(FORMAT_ID)
            .copied()
            .unwrap_or_default();
        let requested = parse_csv_list(matches.get_one::<String>(FIELDS_ID).map(String::as_str));
        write_records(&mut *self.output, format, shape, schema, records, &requested)
    }
}

/// Template values: the primary key plus every declared field, with fields
/// that have no value bound to the empty string.
fn template_values(schema: &ResourceSchema, matches: &ArgMatches) -> Result<Values> {
    let mut values = Values::new();
    values.insert(schema.primary.clone(), primary_value(matches, schema)?.to_string());
    for field in &schema.fields {
        values.insert(field.name.clone(), field_value(matches, field).unwrap_or_default());
    }
    Ok(values)
}

fn collection_path(schema: &ResourceSchema, id: &str) -> Result<String> {
    schema
        .record_path(id)
        .ok_or_else(|| SchemaError::MissingPath(schema.name.clone()).into())
}

fn with_primary(schema: &ResourceSchema, id: &str, mut record: Record) -> Record {
    record.insert(schema.primary.clone(), id.to_string());
    record
}

fn not_found(schema: &ResourceSchema, id: &str) -> CliError {
    CliError::RecordNotFound {
        resource: schema.name.clone(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use etcd_schema_core::SchemaSet;
    use etcd_schema_store::{MemoryStore, Operation};

    const SCHEMAS: &str = r#"
host:
  primary: hostname
  path: /hosts
  hostname:
    description: Host name
  ip:
    type: string
    short: i
  zone:
    type: string
    default: eu
  tags:
    type: array
motd:
  primary: name
  text:
    type: string
"#;

    const HOST_TEMPLATE: &str = "\
/hosts/{{ hostname }}/ip: {{ ip }}
/hosts/{{ hostname }}/zone: {{ zone }}

/dns/{{ ip }}/ptr: {{ hostname }}
";

    struct Fixture {
        schemas: SchemaSet,
        templates: TemplateStore,
        store: MemoryStore,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("host.tmpl"), HOST_TEMPLATE).unwrap();
            std::fs::write(dir.path().join("motd.tmpl"), "/motd/{{ name }}: {{ text }}\n").unwrap();

            let mut schemas = SchemaSet::new();
            schemas
                .merge_document(serde_yaml::from_str(SCHEMAS).unwrap())
                .unwrap();
            Self {
                schemas,
                templates: TemplateStore::new(dir.path()),
                store: MemoryStore::new(),
                _dir: dir,
            }
        }

        /// Runs one command line, answering the prompt with `answer`.
        fn run(&mut self, args: &[&str], answer: &str) -> (Result<()>, String) {
            let grammar = Grammar::new(&self.schemas);
            let matches = grammar
                .command()
                .try_get_matches_from(std::iter::once("etcd-cli").chain(args.iter().copied()))
                .unwrap();
            let invocation = grammar.invocation(&matches).unwrap();

            let mut input = answer.as_bytes();
            let mut output = Vec::new();
            let mut session = Session {
                store: &mut self.store,
                templates: &self.templates,
                assume_yes: invocation.assume_yes,
                input: &mut input,
                output: &mut output,
            };
            let result = session.execute(invocation.action, &invocation.schema, invocation.matches);
            (result, String::from_utf8(output).unwrap())
        }

        fn writes(&self) -> Vec<&Operation> {
            self.store
                .operations()
                .iter()
                .filter(|op| matches!(op, Operation::Set { .. } | Operation::Delete(_)))
                .collect()
        }
    }

    #[test]
    fn test_add_writes_each_line_in_order() {
        let mut fx = Fixture::new();
        let (result, shown) = fx.run(&["add", "host", "web1", "-i", "10.0.0.5"], "y\n");
        result.unwrap();

        assert!(shown.starts_with("Adding:\n/hosts/web1/ip: 10.0.0.5\n"));
        assert_eq!(
            fx.store.operations(),
            &[
                Operation::CreateDirectory("/hosts/web1".into()),
                Operation::Set { key: "/hosts/web1/ip".into(), value: "10.0.0.5".into() },
                Operation::CreateDirectory("/hosts/web1".into()),
                Operation::Set { key: "/hosts/web1/zone".into(), value: "eu".into() },
                Operation::CreateDirectory("/dns/10.0.0.5".into()),
                Operation::Set { key: "/dns/10.0.0.5/ptr".into(), value: "web1".into() },
            ]
        );
    }

    #[test]
    fn test_declined_add_writes_nothing() {
        for answer in ["n\n", "", "\n", "nope\n"] {
            let mut fx = Fixture::new();
            let (result, shown) = fx.run(&["add", "host", "web1", "-i", "10.0.0.5"], answer);
            assert!(matches!(result, Err(CliError::Declined)), "{answer:?}");
            assert!(shown.contains(prompt::PROMPT));
            assert!(fx.store.operations().is_empty());
        }
    }

    #[test]
    fn test_add_twice_is_idempotent() {
        let mut fx = Fixture::new();
        fx.run(&["-y", "add", "host", "web1", "-i", "10.0.0.5"], "").0.unwrap();
        fx.run(&["add", "host", "web1", "-i", "10.0.0.5", "--yes"], "").0.unwrap();
        assert_eq!(fx.store.value("/hosts/web1/zone"), Some("eu"));
    }

    #[test]
    fn test_add_without_template_fails_before_prompt() {
        let mut fx = Fixture::new();
        std::fs::remove_file(fx.templates.path_for("host")).unwrap();

        let (result, shown) = fx.run(&["add", "host", "web1", "-i", "1.1.1.1"], "y\n");
        assert!(matches!(result, Err(CliError::Database(_))));
        assert!(shown.is_empty());
        assert!(fx.store.operations().is_empty());
    }

    #[test]
    fn test_add_without_path_still_works() {
        let mut fx = Fixture::new();
        fx.run(&["-y", "add", "motd", "today", "--text", "hello"], "").0.unwrap();
        assert_eq!(fx.store.value("/motd/today"), Some("hello"));

        let (result, _) = fx.run(&["get", "motd", "today"], "");
        assert!(matches!(result, Err(CliError::Schema(SchemaError::MissingPath(_)))));
    }

    #[test]
    fn test_get_prints_record_with_primary() {
        let mut fx = Fixture::new();
        fx.run(&["-y", "add", "host", "web1", "-i", "10.0.0.5"], "").0.unwrap();

        let (result, shown) = fx.run(&["get", "host", "web1"], "");
        result.unwrap();
        assert_eq!(shown, "hostname: web1\nip: 10.0.0.5\nzone: eu\ntags: \n");

        let (result, _) = fx.run(&["get", "host", "web9"], "");
        assert!(matches!(result, Err(CliError::RecordNotFound { id, .. }) if id == "web9"));
    }

    #[test]
    fn test_list_applies_fields_except_for_json() {
        let mut fx = Fixture::new();
        fx.run(&["-y", "add", "host", "web1", "-i", "10.0.0.5"], "").0.unwrap();
        fx.run(&["-y", "add", "host", "web2", "-i", "10.0.0.6"], "").0.unwrap();

        let (result, shown) = fx.run(&["list", "host", "--fields", "ip"], "");
        result.unwrap();
        assert_eq!(shown, "ip: 10.0.0.5\n\nip: 10.0.0.6\n");

        let (result, shown) = fx.run(&["list", "host", "--format", "json", "--fields", "ip"], "");
        result.unwrap();
        let parsed: Vec<Record> = serde_json::from_str(&shown).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["hostname"], "web2");
        assert_eq!(parsed[1]["zone"], "eu");
    }

    #[test]
    fn test_list_of_empty_collection() {
        let mut fx = Fixture::new();
        let (result, shown) = fx.run(&["list", "host"], "");
        result.unwrap();
        assert!(shown.is_empty());
    }

    #[test]
    fn test_modify_writes_only_given_fields() {
        let mut fx = Fixture::new();
        fx.run(&["-y", "add", "host", "web1", "-i", "10.0.0.5"], "").0.unwrap();
        fx.store.clear_operations();

        let (result, shown) = fx.run(&["modify", "host", "web1", "--tags", "a,b"], "y\n");
        result.unwrap();
        assert!(shown.starts_with("Modifying:\n/hosts/web1/tags: a,b\n"));
        assert_eq!(
            fx.writes(),
            vec![&Operation::Set { key: "/hosts/web1/tags".into(), value: "a,b".into() }]
        );
        assert_eq!(fx.store.value("/hosts/web1/zone"), Some("eu"));
    }

    #[test]
    fn test_modify_and_delete_need_an_existing_record() {
        let mut fx = Fixture::new();
        let (result, _) = fx.run(&["-y", "modify", "host", "web1", "--zone", "us"], "");
        assert!(matches!(result, Err(CliError::RecordNotFound { .. })));
        let (result, _) = fx.run(&["-y", "delete", "host", "web1"], "");
        assert!(matches!(result, Err(CliError::RecordNotFound { .. })));
        assert!(fx.writes().is_empty());
    }

    #[test]
    fn test_delete_asks_first() {
        let mut fx = Fixture::new();
        fx.run(&["-y", "add", "host", "web1", "-i", "10.0.0.5"], "").0.unwrap();

        let (result, _) = fx.run(&["delete", "host", "web1"], "n\n");
        assert!(matches!(result, Err(CliError::Declined)));
        assert_eq!(fx.store.value("/hosts/web1/ip"), Some("10.0.0.5"));

        let (result, _) = fx.run(&["delete", "host", "web1"], "Y\n");
        result.unwrap();
        assert!(fx.store.get("/hosts/web1").is_err());
        assert_eq!(fx.store.value("/dns/10.0.0.5/ptr"), Some("web1"));
    }
}
