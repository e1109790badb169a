//! Configuration file parsing and validation

pub mod termhelp_toml;

pub use termhelp_toml::{ColorOption, ConfigError, HelpConfig, OutputConfig, CONFIG_FILE_NAME};
