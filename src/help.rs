//! Help sections for command-line tools

mod command;
pub mod shared;

pub use command::{HelpCommand, NAME_WIDTH};
pub use shared::{SharedHelpCommand, section};
