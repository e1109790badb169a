#![forbid(unsafe_code)]

//! The `help` subcommand
//!
//! With no arguments the command lists every registered section:
//!
//! ```text
//! Usage: sbr help  <section>
//!
//! where <section> is one of:
//!   1.file             help relative to file management
//! ```
//!
//! With arguments it renders each named section in turn. Usage text and
//! rendered sections go to stderr; "No help found" lines go to stdout.

use crate::cli::{Command, Invocation};
use crate::config::HelpConfig;
use crate::registry::{Section, SectionRegistry};
use crate::render::{self, RendererFactory};
use std::io::{self, Write};
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Width the section name is padded to in the summary listing
pub const NAME_WIDTH: usize = 15;

/// A help subcommand backed by an ordered list of sections
#[derive(Debug, Clone)]
pub struct HelpCommand {
    sections: SectionRegistry,
    color: ColorChoice,
    numbered: bool,
    renderer: RendererFactory,
}

impl Default for HelpCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpCommand {
    /// Creates a help command with no sections
    pub fn new() -> Self {
        HelpCommand {
            sections: SectionRegistry::new(),
            color: ColorChoice::Auto,
            numbered: true,
            renderer: render::ansi_renderer,
        }
    }

    /// Replaces the renderer used for section content
    pub fn with_renderer(mut self, renderer: RendererFactory) -> Self {
        self.renderer = renderer;
        self
    }

    /// Applies output settings from configuration
    pub fn configure(&mut self, config: &HelpConfig) {
        self.color = config.output.color.color_choice();
        self.numbered = config.output.numbered;
    }

    /// Registers a section
    ///
    /// `name` identifies the section on the command line, `description` is
    /// shown in the summary and `content` is the Markdown body.
    pub fn section(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.sections.push(Section::new(name, description, content));
    }

    /// The registered sections
    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    /// Write the section listing to `err`
    pub fn print_summary<W>(&self, program: &str, subcommand: &str, err: &mut W) -> io::Result<()>
    where
        W: WriteColor + ?Sized,
    {
        writeln!(err, "Usage: {} {}  <section>", program, subcommand)?;
        writeln!(err)?;
        writeln!(err, "where <section> is one of:")?;

        for (index, section) in self.sections.iter().enumerate() {
            write!(err, "  ")?;
            if self.numbered {
                write!(err, "{}.", index + 1)?;
            }
            err.set_color(ColorSpec::new().set_bold(true))?;
            write!(err, "{:<width$}", section.name(), width = NAME_WIDTH)?;
            err.reset()?;
            writeln!(err, "  {}", section.description())?;
        }
        writeln!(err)
    }

    /// Run against explicit output streams
    ///
    /// Write failures are logged and otherwise ignored; each requested name is
    /// handled independently of the others.
    pub fn run_with<O, E>(&self, invocation: &Invocation, args: &[String], out: &mut O, err: &mut E)
    where
        O: WriteColor + ?Sized,
        E: WriteColor + ?Sized,
    {
        if args.is_empty() {
            if let Err(e) = self.print_summary(&invocation.program, &invocation.subcommand, err) {
                tracing::debug!(error = %e, "failed to write help summary");
            }
            return;
        }

        for name in args {
            let written = match self.sections.find(name) {
                Some(section) => render::print_section(section, self.renderer, err),
                None => {
                    tracing::debug!(name = name.as_str(), "no help section registered");
                    writeln!(out, "No help found for {:?}", name)
                }
            };
            if let Err(e) = written {
                tracing::debug!(name = name.as_str(), error = %e, "failed to write help output");
            }
        }
    }
}

impl Command for HelpCommand {
    fn flags(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    fn run(&self, invocation: &Invocation, args: &[String]) {
        let mut out = StandardStream::stdout(self.color);
        let mut err = StandardStream::stderr(self.color);
        self.run_with(invocation, args, &mut out, &mut err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorOption;
    use crate::render::{RenderError, Renderer};
    use termcolor::Buffer;

    const FILE_CONTENT: &str = "# File\n\nThis document describes the file format.\n";

    struct Captured {
        out: String,
        err: String,
    }

    fn run(help: &HelpCommand, args: &[&str]) -> Captured {
        let mut out = Buffer::no_color();
        let mut err = Buffer::no_color();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        help.run_with(&Invocation::new("sbr", "help"), &args, &mut out, &mut err);
        Captured {
            out: String::from_utf8(out.into_inner()).unwrap(),
            err: String::from_utf8(err.into_inner()).unwrap(),
        }
    }

    fn file_help() -> HelpCommand {
        let mut help = HelpCommand::new();
        help.section("file", "help relative to file management", FILE_CONTENT);
        help
    }

    #[test]
    fn test_summary_format() {
        let captured = run(&file_help(), &[]);
        assert_eq!(
            captured.err,
            "Usage: sbr help  <section>\n\
             \n\
             where <section> is one of:\n  \
             1.file             help relative to file management\n\
             \n"
        );
        assert!(captured.out.is_empty());
    }

    #[test]
    fn test_summary_lists_sections_in_registration_order() {
        let mut help = HelpCommand::new();
        help.section("zeta", "the last", "z");
        help.section("alpha", "the first", "a");
        help.section("mu", "the middle", "m");

        let captured = run(&help, &[]);
        let entries: Vec<&str> = captured
            .err
            .lines()
            .filter(|line| line.starts_with("  "))
            .collect();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].starts_with("  1.zeta"));
        assert!(entries[0].ends_with("the last"));
        assert!(entries[1].starts_with("  2.alpha"));
        assert!(entries[2].starts_with("  3.mu"));
    }

    #[test]
    fn test_summary_without_sections_still_prints_header() {
        let captured = run(&HelpCommand::new(), &[]);
        assert_eq!(
            captured.err,
            "Usage: sbr help  <section>\n\nwhere <section> is one of:\n\n"
        );
    }

    #[test]
    fn test_summary_unnumbered() {
        let mut help = file_help();
        help.configure(&HelpConfig::parse("[output]\nnumbered = false\n").unwrap());

        let captured = run(&help, &[]);
        assert!(captured
            .err
            .contains("\n  file             help relative to file management\n"));
    }

    #[test]
    fn test_summary_long_name_is_not_truncated() {
        let mut help = HelpCommand::new();
        help.section("a-very-long-section-name", "desc", "");

        let captured = run(&help, &[]);
        assert!(captured.err.contains("  1.a-very-long-section-name  desc\n"));
    }

    #[test]
    fn test_print_summary_uses_given_names() {
        let help = file_help();
        let mut err = Buffer::no_color();
        help.print_summary("tool", "manual", &mut err).unwrap();

        let output = String::from_utf8(err.into_inner()).unwrap();
        assert!(output.starts_with("Usage: tool manual  <section>\n"));
    }

    #[test]
    fn test_summary_highlights_names_with_color() {
        let help = file_help();
        let mut err = Buffer::ansi();
        help.print_summary("sbr", "help", &mut err).unwrap();

        let output = String::from_utf8(err.into_inner()).unwrap();
        assert!(output.contains("\x1b[1m"));
        assert!(output.contains("help relative to file management"));
    }

    #[test]
    fn test_detail_renders_section() {
        let captured = run(&file_help(), &["file"]);
        assert_eq!(
            captured.err,
            "File\n\nThis document describes the file format.\n\n"
        );
        assert!(captured.out.is_empty());
    }

    #[test]
    fn test_missing_section_reported_on_stdout() {
        let captured = run(&HelpCommand::new(), &["nonexistent"]);
        assert_eq!(captured.out, "No help found for \"nonexistent\"\n");
        assert!(captured.err.is_empty());
    }

    #[test]
    fn test_missing_section_name_is_escaped() {
        let captured = run(&HelpCommand::new(), &["tab\there"]);
        assert_eq!(captured.out, "No help found for \"tab\\there\"\n");
    }

    #[test]
    fn test_missing_section_does_not_change_registry() {
        let help = file_help();
        run(&help, &["nonexistent"]);
        assert_eq!(help.sections().len(), 1);
    }

    #[test]
    fn test_found_and_missing_processed_in_order() {
        let mut help = file_help();
        help.section("dir", "directories", "# Dir\n");

        let captured = run(&help, &["file", "nonexistent", "dir"]);
        assert_eq!(captured.out, "No help found for \"nonexistent\"\n");
        let file_at = captured.err.find("File").unwrap();
        let dir_at = captured.err.find("Dir").unwrap();
        assert!(file_at < dir_at);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let mut help = HelpCommand::new();
        help.section("file", "first", "first body");
        help.section("file", "second", "second body");

        let captured = run(&help, &["file"]);
        assert!(captured.err.contains("first body"));
        assert!(!captured.err.contains("second body"));
    }

    #[test]
    fn test_same_section_requested_twice_renders_twice() {
        let captured = run(&file_help(), &["file", "file"]);
        assert_eq!(captured.err.matches("This document").count(), 2);
    }

    struct BrokenRenderer;

    impl Renderer for BrokenRenderer {
        fn render(
            &mut self,
            _markup: &str,
            _out: &mut dyn WriteColor,
        ) -> Result<(), RenderError> {
            Err(RenderError::Io(io::Error::other("renderer exploded")))
        }
    }

    fn broken_renderer() -> Box<dyn Renderer> {
        Box::new(BrokenRenderer)
    }

    #[test]
    fn test_render_failure_does_not_stop_remaining_names() {
        let help = file_help().with_renderer(broken_renderer);

        let captured = run(&help, &["file", "nonexistent"]);
        assert_eq!(captured.err, "buffer error: renderer exploded\n");
        assert_eq!(captured.out, "No help found for \"nonexistent\"\n");
    }

    #[test]
    fn test_flags_is_identity() {
        let cmd = clap::Command::new("help").about("show help");
        let returned = file_help().flags(cmd.clone());

        assert_eq!(returned.get_name(), cmd.get_name());
        assert_eq!(
            returned.get_arguments().count(),
            cmd.get_arguments().count()
        );
    }

    #[test]
    fn test_configure_sets_color_choice() {
        let mut help = HelpCommand::new();
        let mut config = HelpConfig::default();
        config.output.color = ColorOption::Never;
        help.configure(&config);

        assert_eq!(help.color, ColorChoice::Never);
        assert!(help.numbered);
    }
}
