#![forbid(unsafe_code)]

//! termhelp: Markdown help sections for command-line tools
//!
//! Register named sections written in Markdown, then mount a [`HelpCommand`]
//! as a subcommand. Without arguments it lists the sections; with arguments it
//! renders each requested section to the terminal with ANSI styling.
//!
//! ```no_run
//! use termhelp::cli::Dispatcher;
//! use termhelp::HelpCommand;
//!
//! let mut help = HelpCommand::new();
//! help.section(
//!     "file",
//!     "help relative to file management",
//!     "# File\n\nThis document describes the file format.\n",
//! );
//!
//! let mut dispatcher = Dispatcher::new("sbr", "sbr tool");
//! dispatcher.register("help", "Show help sections", help);
//! std::process::exit(dispatcher.run(std::env::args_os()));
//! ```

pub mod cli;
pub mod config;
pub mod help;
pub mod registry;
pub mod render;

pub use help::{HelpCommand, SharedHelpCommand, section};
pub use registry::{Section, SectionRegistry};
