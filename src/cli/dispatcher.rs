#![forbid(unsafe_code)]

//! Subcommand dispatcher
//!
//! Collects named [`Command`]s, builds a clap definition from them and routes
//! argv to the matching command. Each command receives its trailing
//! positional arguments plus an [`Invocation`] naming the program and the
//! subcommand that was used.

use super::command::{Command, Invocation};
use clap::Arg;
use std::ffi::OsString;
use std::path::Path;
use thiserror::Error;

/// Exit codes for dispatch
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

/// Id of the positional argument that collects a command's arguments
const ARGS: &str = "args";

/// Errors that can occur while routing argv to a command
#[derive(Debug, Error)]
pub enum DispatchError {
    /// clap rejected the command line, or help/version was requested
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// No subcommand was given
    #[error("no command given")]
    MissingCommand,

    /// clap matched a name no registered command answers to
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

struct Entry {
    name: &'static str,
    about: &'static str,
    command: Box<dyn Command>,
}

/// Routes a command line to one of several registered commands
pub struct Dispatcher {
    name: &'static str,
    about: &'static str,
    entries: Vec<Entry>,
}

impl Dispatcher {
    /// Creates a dispatcher with no commands
    pub fn new(name: &'static str, about: &'static str) -> Self {
        Dispatcher {
            name,
            about,
            entries: Vec::new(),
        }
    }

    /// Registers a command under `name`
    ///
    /// Commands are listed in `--help` output in registration order.
    pub fn register(
        &mut self,
        name: &'static str,
        about: &'static str,
        command: impl Command + 'static,
    ) {
        self.entries.push(Entry {
            name,
            about,
            command: Box::new(command),
        });
    }

    /// Names of the registered commands, in registration order
    pub fn command_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// Run the command selected by `argv`
    ///
    /// `argv[0]` is the program path. Returns the process exit code:
    /// - 0: the command ran, or help/version was printed
    /// - 2: clap usage error
    /// - 1: any other dispatch failure
    pub fn run<I, T>(&self, argv: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match self.run_inner(argv) {
            Ok(()) => EXIT_SUCCESS,
            Err(DispatchError::Usage(e)) => {
                if let Err(write_err) = e.print() {
                    tracing::debug!(error = %write_err, "failed to print usage");
                }
                e.exit_code()
            }
            Err(e) => {
                eprintln!("{}: {}", self.name, e);
                EXIT_ERROR
            }
        }
    }

    fn run_inner<I, T>(&self, argv: I) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
        let program = argv
            .first()
            .and_then(program_name)
            .unwrap_or_else(|| self.name.to_string());

        let matches = self.build_cli().try_get_matches_from(argv)?;
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or(DispatchError::MissingCommand)?;

        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;

        let args: Vec<String> = sub_matches
            .get_many::<String>(ARGS)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        tracing::debug!(command = name, ?args, "dispatching command");
        entry.command.run(&Invocation::new(program, name), &args);
        Ok(())
    }

    fn build_cli(&self) -> clap::Command {
        let mut cli = clap::Command::new(self.name)
            .about(self.about)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .disable_help_subcommand(true);

        for entry in &self.entries {
            // Unknown dash-prefixed words are passed through so names like
            // "-legacy" can be requested.
            let sub = clap::Command::new(entry.name).about(entry.about).arg(
                Arg::new(ARGS)
                    .value_name("ARGS")
                    .num_args(1..)
                    .allow_hyphen_values(true),
            );
            cli = cli.subcommand(entry.command.flags(sub));
        }
        cli
    }
}

fn program_name(arg0: &OsString) -> Option<String> {
    Path::new(arg0)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
