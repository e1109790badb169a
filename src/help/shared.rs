#![forbid(unsafe_code)]

//! Process-wide default help command
//!
//! Programs that do not want to pass a [`HelpCommand`] around can register
//! sections with [`section`] at startup and mount [`SharedHelpCommand`] in
//! their dispatcher. The instance is created on first use and lives until the
//! process exits.

use super::command::HelpCommand;
use crate::cli::{Command, Invocation};
use crate::config::HelpConfig;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static COMMAND: OnceLock<Mutex<HelpCommand>> = OnceLock::new();

// Sections are only ever appended, so state behind a poisoned lock is still
// consistent and is used as-is.
fn shared() -> MutexGuard<'static, HelpCommand> {
    COMMAND
        .get_or_init(|| Mutex::new(HelpCommand::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Registers a section on the shared help command
pub fn section(
    name: impl Into<String>,
    description: impl Into<String>,
    content: impl Into<String>,
) {
    shared().section(name, description, content);
}

/// Applies configuration to the shared help command
pub fn configure(config: &HelpConfig) {
    shared().configure(config);
}

/// Runs `f` with the shared help command locked
pub fn with_shared<R>(f: impl FnOnce(&HelpCommand) -> R) -> R {
    f(&shared())
}

/// [`Command`] handle that forwards to the shared help command
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedHelpCommand;

impl Command for SharedHelpCommand {
    fn flags(&self, cmd: clap::Command) -> clap::Command {
        shared().flags(cmd)
    }

    fn run(&self, invocation: &Invocation, args: &[String]) {
        shared().run(invocation, args);
    }
}
