//! Options needed before the grammar exists.
//!
//! The config file and log level must be known before the schemas can be
//! loaded, and the schemas are needed to build the real grammar. The
//! pre-pass parses the global options that come before the action with a
//! clap command that knows nothing else; the action and everything after it
//! are left for the real grammar.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgMatches, Command};
use tracing::debug;

use crate::grammar::{CONFIG_ID, DEBUG_ID, global_args};

/// Settings read from the command line ahead of the schemas.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    pub config: Option<PathBuf>,
    pub debug: bool,
}

impl Bootstrap {
    /// Parses the global options of `argv` (including the program name).
    ///
    /// Unknown options stop the pass without an error; whatever was read
    /// up to that point is kept.
    pub fn scan(argv: &[OsString]) -> Self {
        match pre_pass().try_get_matches_from(argv) {
            Ok(matches) => Self::read(&matches),
            Err(err) => {
                debug!("Bootstrap pass stopped: {:?}", err.kind());
                Self::default()
            }
        }
    }

    /// Reads the global options from matches of the full grammar.
    ///
    /// Globals are propagated to the deepest subcommand, so options given
    /// after the action are seen too.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let mut deepest = matches;
        while let Some((_, sub)) = deepest.subcommand() {
            deepest = sub;
        }
        Self::read(deepest)
    }

    fn read(matches: &ArgMatches) -> Self {
        Self {
            config: matches.get_one::<PathBuf>(CONFIG_ID).cloned(),
            debug: matches
                .get_one::<bool>(DEBUG_ID)
                .copied()
                .unwrap_or_default(),
        }
    }
}

/// The global options alone. The action becomes an external subcommand,
/// which ends the pass.
fn pre_pass() -> Command {
    Command::new("etcd-cli")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .allow_external_subcommands(true)
        .ignore_errors(true)
        .args(global_args())
}
