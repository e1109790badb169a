#![forbid(unsafe_code)]

//! Section rendering
//!
//! Help sections are written in Markdown and shown in the terminal with ANSI
//! escape codes. Parsing is done by `pulldown-cmark`; this module turns the
//! event stream into styled text and prints whole sections.

mod ansi;
mod extensions;

pub use ansi::AnsiRenderer;
pub use extensions::Extensions;

use crate::registry::Section;
use std::io::{self, Write};
use termcolor::{Buffer, WriteColor};
use thiserror::Error;

/// Errors that can occur while rendering a section
#[derive(Debug, Error)]
pub enum RenderError {
    /// The rendered output could not be collected
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Renders Markdown into a color-capable sink
pub trait Renderer {
    fn render(&mut self, markup: &str, out: &mut dyn WriteColor) -> Result<(), RenderError>;
}

/// Constructor for the renderer used by [`print_section`]
///
/// A new renderer is built for every section so no state carries over from
/// one section to the next.
pub type RendererFactory = fn() -> Box<dyn Renderer>;

/// Builds an [`AnsiRenderer`] with the common extension set
pub fn ansi_renderer() -> Box<dyn Renderer> {
    Box::new(AnsiRenderer::new(Extensions::COMMON))
}

/// Render a section and write it to `err`
///
/// The section is rendered into an in-memory buffer first. If rendering fails,
/// a `buffer error: ...` line is written instead and the partial output is
/// dropped. Only failures writing to `err` itself are returned.
pub fn print_section<W>(section: &Section, factory: RendererFactory, err: &mut W) -> io::Result<()>
where
    W: WriteColor + ?Sized,
{
    let mut renderer = factory();
    let mut buffer = if err.supports_color() {
        Buffer::ansi()
    } else {
        Buffer::no_color()
    };

    if let Err(e) = renderer.render(section.content(), &mut buffer) {
        tracing::warn!(section = section.name(), error = %e, "failed to render help section");
        writeln!(err, "buffer error: {}", e)?;
        return Ok(());
    }

    err.write_all(buffer.as_slice())?;
    writeln!(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&mut self, markup: &str, out: &mut dyn WriteColor) -> Result<(), RenderError> {
            out.write_all(markup.as_bytes())?;
            Err(RenderError::Io(io::Error::other("pipeline closed")))
        }
    }

    fn failing_renderer() -> Box<dyn Renderer> {
        Box::new(FailingRenderer)
    }

    fn printed(section: &Section, factory: RendererFactory, err: Buffer) -> String {
        let mut err = err;
        print_section(section, factory, &mut err).unwrap();
        String::from_utf8(err.into_inner()).unwrap()
    }

    #[test]
    fn test_print_section_appends_trailing_newline() {
        let section = Section::new("file", "files", "# File\n\nBody text.\n");
        let output = printed(&section, ansi_renderer, Buffer::no_color());
        assert_eq!(output, "File\n\nBody text.\n\n");
    }

    #[test]
    fn test_print_section_uses_color_when_sink_supports_it() {
        let section = Section::new("file", "files", "**bold**");
        let output = printed(&section, ansi_renderer, Buffer::ansi());
        assert!(output.contains("\x1b["));
        assert!(output.contains("bold"));
        assert!(!output.contains("**"));
    }

    #[test]
    fn test_print_section_plain_when_sink_has_no_color() {
        let section = Section::new("file", "files", "**bold**");
        let output = printed(&section, ansi_renderer, Buffer::no_color());
        assert_eq!(output, "bold\n\n");
    }

    #[test]
    fn test_render_failure_reports_buffer_error_only() {
        let section = Section::new("file", "files", "partial content");
        let output = printed(&section, failing_renderer, Buffer::no_color());
        assert_eq!(output, "buffer error: pipeline closed\n");
        assert!(!output.contains("partial content"));
    }

    #[test]
    fn test_empty_content_prints_single_newline() {
        let section = Section::new("empty", "", "");
        let output = printed(&section, ansi_renderer, Buffer::no_color());
        assert_eq!(output, "\n");
    }

    #[test]
    fn test_render_error_display() {
        let err = RenderError::from(io::Error::other("disk full"));
        assert_eq!(err.to_string(), "disk full");
    }
}
