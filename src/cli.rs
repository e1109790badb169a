//! Subcommand capability and dispatch

pub mod command;
pub mod dispatcher;

// Re-export types for convenient access
pub use command::{Command, Invocation};
pub use dispatcher::{DispatchError, Dispatcher};
