use std::collections::BTreeMap;
use std::path::Path;

use etcd_schema_core::{SchemaError, parse_rendered, render};
use etcd_schema_db::{Config, DatabaseError, SchemaDatabase, TemplateStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const HOST_SCHEMA: &str = r#"
host:
  primary: hostname
  path: /hosts
  hostname:
    description: Fully qualified host name
  ip:
    type: string
    short: i
    description: Primary address
  tags:
    type: array
"#;

const BROKEN_SCHEMA: &str = r#"
service:
  port:
    type: string
"#;

const HOST_TEMPLATE: &str = "\
/hosts/{{ hostname }}/ip: {{ ip }}
/hosts/{{ hostname }}/tags: {{ tags }}
/dns/{{ ip }}/ptr: {{ hostname }}
";

fn setup(root: &Path) -> Config {
    let schemas = root.join("schemas");
    let templates = root.join("templates");
    std::fs::create_dir_all(&schemas).unwrap();
    std::fs::create_dir_all(&templates).unwrap();
    std::fs::write(schemas.join("host.yaml"), HOST_SCHEMA).unwrap();
    std::fs::write(schemas.join("service.yaml"), BROKEN_SCHEMA).unwrap();
    std::fs::write(templates.join("host.tmpl"), HOST_TEMPLATE).unwrap();

    let config_path = root.join("etcd-cli.yaml");
    std::fs::write(
        &config_path,
        format!(
            "node: 127.0.0.1\nport: 2379\nschemas: {}\ntemplates: {}\n",
            schemas.display(),
            templates.display()
        ),
    )
    .unwrap();

    let (config, source) = Config::discover(Some(&config_path)).unwrap();
    assert_eq!(source.as_deref(), Some(config_path.as_path()));
    config
}

// ---------------------------------------------------------------------------
// Config → schemas → template
// ---------------------------------------------------------------------------

#[test]
fn test_config_drives_schema_and_template_locations() {
    let root = tempfile::tempdir().unwrap();
    let config = setup(root.path());
    assert_eq!(config.endpoint(), "http://127.0.0.1:2379");

    let db = SchemaDatabase::from_dir(&config.schemas).unwrap();
    let names: Vec<&str> = db.schemas().resource_names().collect();
    assert_eq!(names, vec!["host", "service"]);

    let templates = TemplateStore::new(&config.templates);
    assert!(templates.load("host").is_ok());
    assert!(matches!(
        templates.load("service"),
        Err(DatabaseError::MissingTemplate(_))
    ));
}

#[test]
fn test_broken_resource_loads_but_fails_to_resolve() {
    let root = tempfile::tempdir().unwrap();
    let config = setup(root.path());
    let db = SchemaDatabase::from_dir(&config.schemas).unwrap();

    assert!(db.schemas().resolve("host").is_ok());
    assert_eq!(
        db.schemas().resolve("service"),
        Err(SchemaError::MissingPrimary("service".into()))
    );
}

#[test]
fn test_render_loaded_template_into_writes() {
    let root = tempfile::tempdir().unwrap();
    let config = setup(root.path());
    let db = SchemaDatabase::from_dir(&config.schemas).unwrap();
    let host = db.schemas().resolve("host").unwrap();
    let template = TemplateStore::new(&config.templates).load("host").unwrap();

    let mut values = BTreeMap::new();
    values.insert(host.primary.clone(), "web1".to_string());
    values.insert("ip".to_string(), "10.0.0.5".to_string());
    values.insert("tags".to_string(), "web,edge".to_string());

    let writes = parse_rendered(&render(&template, &values).unwrap()).unwrap();
    let lines: Vec<(String, String)> = writes
        .iter()
        .map(|w| (w.path(), w.value.clone()))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("/hosts/web1/ip".to_string(), "10.0.0.5".to_string()),
            ("/hosts/web1/tags".to_string(), "web,edge".to_string()),
            ("/dns/10.0.0.5/ptr".to_string(), "web1".to_string()),
        ]
    );
}

#[test]
fn test_unparseable_schema_file_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let config = setup(root.path());
    std::fs::write(config.schemas.join("zz-bad.yaml"), "user: {primary: login\n").unwrap();

    let err = SchemaDatabase::from_dir(&config.schemas).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse YAML in schema file"));
}
