mod actions;
mod bootstrap;
mod error;
mod grammar;
mod output;
mod prompt;

use std::ffi::OsString;
use std::io::{self, IsTerminal};

use clap::ArgMatches;
use etcd_schema_db::{Config, SchemaDatabase, TemplateStore};
use etcd_schema_store::EtcdClient;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::actions::Session;
use crate::bootstrap::Bootstrap;
use crate::error::{CliError, Result};
use crate::grammar::Grammar;

fn main() {
    let argv: Vec<OsString> = std::env::args_os().collect();
    let bootstrap = Bootstrap::scan(&argv);
    init_logging(bootstrap.debug);

    match run(argv, &bootstrap) {
        Ok(()) => {}
        Err(CliError::Declined) => std::process::exit(1),
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `-d/--debug`.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn run(argv: Vec<OsString>, bootstrap: &Bootstrap) -> Result<()> {
    let (mut config, mut database) = load(bootstrap)?;
    let mut matches = parse(&database, &argv);

    let parsed = Bootstrap::from_matches(&matches);
    if parsed.config != bootstrap.config {
        debug!("--config given after the action, reloading");
        (config, database) = load(&parsed)?;
        matches = parse(&database, &argv);
    }

    let grammar = Grammar::new(database.schemas());
    let invocation = grammar.invocation(&matches)?;

    let mut store = EtcdClient::new(config.endpoint())?;
    let templates = TemplateStore::new(&config.templates);
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();

    let mut session = Session {
        store: &mut store,
        templates: &templates,
        assume_yes: invocation.assume_yes,
        input: &mut input,
        output: &mut output,
    };
    session.execute(invocation.action, &invocation.schema, invocation.matches)
}

fn load(bootstrap: &Bootstrap) -> Result<(Config, SchemaDatabase)> {
    let (config, source) = Config::discover(bootstrap.config.as_deref())?;
    match source {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    let database = SchemaDatabase::from_dir(&config.schemas)?;
    info!(
        "Loaded {} resource(s) from {} schema file(s)",
        database.schemas().len(),
        database.files().len()
    );
    Ok((config, database))
}

/// Parses `argv` against the grammar of `database`, exiting on usage errors.
fn parse(database: &SchemaDatabase, argv: &[OsString]) -> ArgMatches {
    Grammar::new(database.schemas())
        .command()
        .try_get_matches_from(argv)
        .unwrap_or_else(|err| err.exit())
}
