#![forbid(unsafe_code)]

use std::path::PathBuf;
use termhelp::cli::Dispatcher;
use termhelp::config::HelpConfig;
use termhelp::{SharedHelpCommand, help};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match HelpConfig::discover(&cwd) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("termhelp: {}", e);
            std::process::exit(1);
        }
    };

    register_sections();
    help::shared::configure(&config);

    let mut dispatcher = Dispatcher::new(
        "termhelp",
        "Markdown help sections rendered in the terminal",
    );
    dispatcher.register("help", "Show help sections", SharedHelpCommand);

    std::process::exit(dispatcher.run(std::env::args_os()));
}

fn register_sections() {
    termhelp::section(
        "sections",
        "writing and showing help sections",
        include_str!("../docs/sections.md"),
    );
    termhelp::section(
        "markdown",
        "Markdown supported in section content",
        include_str!("../docs/markdown.md"),
    );
    termhelp::section(
        "config",
        "termhelp.toml settings",
        include_str!("../docs/config.md"),
    );
}
