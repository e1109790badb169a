#![forbid(unsafe_code)]

//! The capability a subcommand exposes to a [`Dispatcher`](super::Dispatcher)

/// Names a host used to reach a subcommand
///
/// The dispatcher fills this in from the argv it parsed, so commands never
/// read process arguments themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub subcommand: String,
}

impl Invocation {
    pub fn new(program: impl Into<String>, subcommand: impl Into<String>) -> Self {
        Invocation {
            program: program.into(),
            subcommand: subcommand.into(),
        }
    }
}

/// A pluggable subcommand
pub trait Command {
    /// Declare the command's options on its clap definition
    ///
    /// Commands without options return `cmd` unchanged.
    fn flags(&self, cmd: clap::Command) -> clap::Command;

    /// Execute the command with its positional arguments
    fn run(&self, invocation: &Invocation, args: &[String]);
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn flags(&self, cmd: clap::Command) -> clap::Command {
        (**self).flags(cmd)
    }

    fn run(&self, invocation: &Invocation, args: &[String]) {
        (**self).run(invocation, args)
    }
}
