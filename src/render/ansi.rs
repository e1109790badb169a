#![forbid(unsafe_code)]

//! ANSI terminal renderer for Markdown
//!
//! Walks the `pulldown-cmark` event stream and writes styled text through a
//! [`termcolor::WriteColor`] sink. Whether escape codes are emitted is decided
//! by the sink, so the same renderer produces plain text for a no-color buffer.

use super::extensions::Extensions;
use super::{RenderError, Renderer};
use pulldown_cmark::{Alignment, Event, HeadingLevel, Parser, Tag, TagEnd};
use regex::Regex;
use std::io;
use std::ops::Range;
use std::sync::LazyLock;
use termcolor::{Color, ColorSpec, WriteColor};

const RULE_WIDTH: usize = 40;
const QUOTE_GUTTER: &str = "│ ";
const CODE_INDENT: &str = "    ";
const LIST_INDENT: usize = 3;
const COLUMN_GAP: &str = "  ";

// Trailing punctuation is left out of the match so "see https://x.org." links
// the URL without the full stop.
static BARE_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"\b(?:https?|ftp)://[^\s<>]*[^\s<>.,;:!?)\]'"]"#).ok()
});

/// Renders Markdown to ANSI-styled terminal text
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiRenderer {
    extensions: Extensions,
}

impl AnsiRenderer {
    pub fn new(extensions: Extensions) -> Self {
        AnsiRenderer { extensions }
    }
}

impl Renderer for AnsiRenderer {
    fn render(&mut self, markup: &str, out: &mut dyn WriteColor) -> Result<(), RenderError> {
        let parser = Parser::new_ext(markup, self.extensions.parser_options());
        let mut writer = AnsiWriter::new(out, markup, self.extensions.autolink);

        // Adjacent text events are joined so bare URLs are matched whole.
        let mut text = String::new();
        for (event, range) in parser.into_offset_iter() {
            if let Event::Text(fragment) = &event {
                text.push_str(fragment);
                continue;
            }
            if !text.is_empty() {
                writer.text(&std::mem::take(&mut text))?;
            }
            writer.event(event, range)?;
        }
        if !text.is_empty() {
            writer.text(&text)?;
        }
        writer.finish()?;
        Ok(())
    }
}

/// One level of list nesting
struct ListLevel {
    /// Next number for ordered lists
    next: Option<u64>,
    /// Columns taken by the current item's marker
    width: usize,
}

struct PendingLink {
    dest: String,
    text: String,
}

struct TableState {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<String>>,
    header_rows: usize,
    cell: String,
}

impl TableState {
    fn new(alignments: Vec<Alignment>) -> Self {
        TableState {
            alignments,
            rows: Vec::new(),
            header_rows: 0,
            cell: String::new(),
        }
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        (0..columns)
            .map(|col| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn alignment(&self, col: usize) -> Alignment {
        self.alignments.get(col).copied().unwrap_or(Alignment::None)
    }
}

/// Per-render state; one is created for every call to `render`
struct AnsiWriter<'w> {
    out: &'w mut dyn WriteColor,
    markup: &'w str,
    autolink: bool,
    strong: usize,
    emphasis: usize,
    /// Closing delimiter for each open emphasis span; `Some` when the span
    /// sits inside a word and is printed literally
    inline_spans: Vec<Option<String>>,
    strikethrough: usize,
    heading: Option<HeadingLevel>,
    code_block: bool,
    quote_depth: usize,
    lists: Vec<ListLevel>,
    link: Option<PendingLink>,
    table: Option<TableState>,
    line_start: bool,
    pending_gap: bool,
    item_open: bool,
}

impl<'w> AnsiWriter<'w> {
    fn new(out: &'w mut dyn WriteColor, markup: &'w str, autolink: bool) -> Self {
        AnsiWriter {
            out,
            markup,
            autolink,
            strong: 0,
            emphasis: 0,
            inline_spans: Vec::new(),
            strikethrough: 0,
            heading: None,
            code_block: false,
            quote_depth: 0,
            lists: Vec::new(),
            link: None,
            table: None,
            line_start: true,
            pending_gap: false,
            item_open: false,
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) -> io::Result<()> {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.code_span(&code),
            Event::Html(html) | Event::InlineHtml(html) => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.push_str(&html);
                    return Ok(());
                }
                self.write_styled(&html, &dimmed())
            }
            Event::SoftBreak | Event::HardBreak => self.line_break(),
            Event::Rule => self.rule(),
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.write_styled(marker, &ColorSpec::new())
            }
            _ => Ok(()),
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) -> io::Result<()> {
        match tag {
            Tag::Paragraph | Tag::HtmlBlock => self.begin_block(),
            Tag::Heading { level, .. } => {
                self.begin_block()?;
                self.heading = Some(level);
                Ok(())
            }
            Tag::BlockQuote { .. } => {
                self.begin_block()?;
                self.quote_depth += 1;
                Ok(())
            }
            Tag::CodeBlock(_) => {
                self.begin_block()?;
                self.code_block = true;
                Ok(())
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.begin_block()?;
                } else {
                    self.item_open = false;
                    self.ensure_line()?;
                }
                self.lists.push(ListLevel {
                    next: start,
                    width: LIST_INDENT,
                });
                Ok(())
            }
            Tag::Item => self.begin_item(),
            Tag::Emphasis => self.begin_inline_span(range, 1),
            Tag::Strong => self.begin_inline_span(range, 2),
            Tag::Strikethrough => {
                self.strikethrough += 1;
                Ok(())
            }
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.link = Some(PendingLink {
                    dest: dest_url.to_string(),
                    text: String::new(),
                });
                Ok(())
            }
            Tag::Table(alignments) => {
                self.begin_block()?;
                self.table = Some(TableState::new(alignments));
                Ok(())
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.rows.push(Vec::new());
                }
                Ok(())
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell.clear();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn end(&mut self, tag: TagEnd) -> io::Result<()> {
        match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => self.end_block(),
            TagEnd::Heading { .. } => {
                self.heading = None;
                self.end_block()
            }
            TagEnd::BlockQuote { .. } => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.end_block()
            }
            TagEnd::CodeBlock => {
                self.code_block = false;
                self.end_block()
            }
            TagEnd::List { .. } => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.end_block()
                } else {
                    self.ensure_line()
                }
            }
            TagEnd::Item => {
                self.item_open = false;
                self.ensure_line()
            }
            TagEnd::Emphasis => self.end_inline_span(1),
            TagEnd::Strong => self.end_inline_span(2),
            TagEnd::Strikethrough => {
                self.strikethrough = self.strikethrough.saturating_sub(1);
                Ok(())
            }
            TagEnd::Link | TagEnd::Image => self.end_link(),
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = std::mem::take(&mut table.cell);
                    if let Some(row) = table.rows.last_mut() {
                        row.push(cell.trim().to_string());
                    }
                }
                Ok(())
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.header_rows = table.rows.len();
                }
                Ok(())
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.write_table(&table)?;
                }
                self.end_block()
            }
            _ => Ok(()),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        self.ensure_line()?;
        self.out.flush()
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        if let Some(link) = self.link.as_mut() {
            link.text.push_str(text);
        }
        if let Some(table) = self.table.as_mut() {
            table.cell.push_str(text);
            return Ok(());
        }
        if self.code_block {
            return self.write_styled(text, &code_style());
        }
        if self.link.is_some() {
            let spec = self.current_spec();
            return self.write_styled(text, &spec);
        }

        let spec = self.current_spec();
        let url_pattern = if self.autolink {
            (*BARE_URL).as_ref()
        } else {
            None
        };
        let Some(url_pattern) = url_pattern else {
            return self.write_styled(text, &spec);
        };

        let mut url_spec = spec.clone();
        url_spec.set_underline(true).set_fg(Some(Color::Blue));

        let mut last = 0;
        for found in url_pattern.find_iter(text) {
            self.write_styled(&text[last..found.start()], &spec)?;
            self.write_styled(found.as_str(), &url_spec)?;
            last = found.end();
        }
        self.write_styled(&text[last..], &spec)
    }

    fn code_span(&mut self, code: &str) -> io::Result<()> {
        if let Some(link) = self.link.as_mut() {
            link.text.push_str(code);
        }
        if let Some(table) = self.table.as_mut() {
            table.cell.push_str(code);
            return Ok(());
        }
        let mut spec = self.current_spec();
        spec.set_fg(Some(Color::Yellow));
        self.write_styled(code, &spec)
    }

    fn line_break(&mut self) -> io::Result<()> {
        if let Some(table) = self.table.as_mut() {
            table.cell.push(' ');
            return Ok(());
        }
        self.newline()
    }

    fn rule(&mut self) -> io::Result<()> {
        self.begin_block()?;
        self.write_styled(&"─".repeat(RULE_WIDTH), &dimmed())?;
        self.end_block()
    }

    fn end_link(&mut self) -> io::Result<()> {
        let Some(link) = self.link.take() else {
            return Ok(());
        };
        let shown = link.dest.strip_prefix("mailto:").unwrap_or(&link.dest);
        if link.dest.is_empty() || shown == link.text {
            return Ok(());
        }
        let dest = format!(" <{}>", link.dest);
        if let Some(table) = self.table.as_mut() {
            table.cell.push_str(&dest);
            return Ok(());
        }
        self.write_styled(&dest, &dimmed())
    }

    /// Opens `*em*` or `**strong**` styling, unless the span sits inside a
    /// word, in which case its delimiters are printed as plain text
    fn begin_inline_span(&mut self, range: Range<usize>, delimiter_len: usize) -> io::Result<()> {
        let markup = self.markup;
        let literal = inside_word(markup, &range)
            .then(|| delimiters(markup, &range, delimiter_len))
            .flatten();
        match literal {
            Some((open, close)) => {
                self.inline_spans.push(Some(close.to_string()));
                self.text(open)
            }
            None => {
                self.inline_spans.push(None);
                if delimiter_len == 1 {
                    self.emphasis += 1;
                } else {
                    self.strong += 1;
                }
                Ok(())
            }
        }
    }

    fn end_inline_span(&mut self, delimiter_len: usize) -> io::Result<()> {
        match self.inline_spans.pop().flatten() {
            Some(close) => self.text(&close),
            None => {
                if delimiter_len == 1 {
                    self.emphasis = self.emphasis.saturating_sub(1);
                } else {
                    self.strong = self.strong.saturating_sub(1);
                }
                Ok(())
            }
        }
    }

    fn begin_item(&mut self) -> io::Result<()> {
        self.pending_gap = false;
        self.ensure_line()?;

        let outer = self.list_indent(self.lists.len().saturating_sub(1));
        let Some(level) = self.lists.last_mut() else {
            return Ok(());
        };
        let marker = match level.next.as_mut() {
            Some(number) => {
                let marker = format!("{}.", number);
                *number += 1;
                marker
            }
            None => "•".to_string(),
        };
        let width = LIST_INDENT.max(marker.chars().count() + 1);
        level.width = width;

        self.write_gutter(outer)?;
        self.paint(&format!("{:<width$}", marker, width = width), &bold())?;
        self.item_open = true;
        Ok(())
    }

    /// Columns taken by the markers of the outermost `depth` list levels
    fn list_indent(&self, depth: usize) -> usize {
        self.lists.iter().take(depth).map(|level| level.width).sum()
    }

    /// Separates a new block from the previous one by a blank line
    fn begin_block(&mut self) -> io::Result<()> {
        if self.item_open {
            self.item_open = false;
            return Ok(());
        }
        self.ensure_line()?;
        if self.pending_gap {
            self.pending_gap = false;
            if self.quote_depth > 0 {
                let gutter = QUOTE_GUTTER.trim_end().repeat(self.quote_depth);
                self.paint(&gutter, &dimmed())?;
            }
            self.newline()?;
        }
        Ok(())
    }

    fn end_block(&mut self) -> io::Result<()> {
        self.ensure_line()?;
        self.pending_gap = true;
        Ok(())
    }

    fn write_table(&mut self, table: &TableState) -> io::Result<()> {
        let widths = table.widths();
        let last_col = widths.len().saturating_sub(1);

        for (index, row) in table.rows.iter().enumerate() {
            let is_header = index < table.header_rows;
            self.ensure_line()?;
            self.write_prefix()?;

            for (col, width) in widths.iter().enumerate() {
                if col > 0 {
                    self.paint(COLUMN_GAP, &ColorSpec::new())?;
                }
                let cell = row.get(col).map(String::as_str).unwrap_or("");
                let padded = pad(cell, *width, table.alignment(col), col == last_col);
                let spec = if is_header { bold() } else { ColorSpec::new() };
                self.paint(&padded, &spec)?;
            }
            self.newline()?;

            if is_header && index + 1 == table.header_rows {
                self.write_prefix()?;
                let rule = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join(COLUMN_GAP);
                self.paint(&rule, &dimmed())?;
                self.newline()?;
            }
        }
        Ok(())
    }

    fn current_spec(&self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        if let Some(level) = self.heading {
            spec.set_bold(true);
            match level {
                HeadingLevel::H1 => {
                    spec.set_underline(true).set_fg(Some(Color::Cyan));
                }
                HeadingLevel::H2 => {
                    spec.set_fg(Some(Color::Cyan));
                }
                _ => {}
            }
        }
        if self.strong > 0 {
            spec.set_bold(true);
        }
        if self.emphasis > 0 {
            spec.set_italic(true);
        }
        if self.strikethrough > 0 {
            spec.set_dimmed(true);
        }
        if self.link.is_some() {
            spec.set_underline(true).set_fg(Some(Color::Blue));
        }
        spec
    }

    /// Writes text that may span several lines, prefixing each new line
    fn write_styled(&mut self, text: &str, spec: &ColorSpec) -> io::Result<()> {
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                self.newline()?;
            }
            if line.is_empty() {
                continue;
            }
            if self.line_start {
                self.write_prefix()?;
            }
            self.paint(line, spec)?;
        }
        Ok(())
    }

    /// Quote gutter, list indentation and code indentation for a fresh line
    fn write_prefix(&mut self) -> io::Result<()> {
        let mut indent = self.list_indent(self.lists.len());
        if self.code_block {
            indent += CODE_INDENT.len();
        }
        self.write_gutter(indent)
    }

    fn write_gutter(&mut self, indent: usize) -> io::Result<()> {
        if self.quote_depth > 0 {
            self.paint(&QUOTE_GUTTER.repeat(self.quote_depth), &dimmed())?;
        }
        if indent > 0 {
            self.paint(&" ".repeat(indent), &ColorSpec::new())?;
        }
        Ok(())
    }

    fn paint(&mut self, text: &str, spec: &ColorSpec) -> io::Result<()> {
        if *spec == ColorSpec::new() {
            self.out.write_all(text.as_bytes())?;
        } else {
            self.out.set_color(spec)?;
            self.out.write_all(text.as_bytes())?;
            self.out.reset()?;
        }
        self.line_start = false;
        Ok(())
    }

    fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.line_start = true;
        Ok(())
    }

    fn ensure_line(&mut self) -> io::Result<()> {
        if self.line_start {
            Ok(())
        } else {
            self.newline()
        }
    }
}

/// Whether the span at `range` touches a letter or digit on either side
fn inside_word(markup: &str, range: &Range<usize>) -> bool {
    let before = markup.get(..range.start).and_then(|s| s.chars().next_back());
    let after = markup.get(range.end..).and_then(|s| s.chars().next());
    before.is_some_and(char::is_alphanumeric) || after.is_some_and(char::is_alphanumeric)
}

/// The opening and closing delimiter text of an emphasis span
fn delimiters<'m>(
    markup: &'m str,
    range: &Range<usize>,
    len: usize,
) -> Option<(&'m str, &'m str)> {
    if range.end < range.start + 2 * len {
        return None;
    }
    let open = markup.get(range.start..range.start + len)?;
    let close = markup.get(range.end - len..range.end)?;
    Some((open, close))
}

fn pad(cell: &str, width: usize, alignment: Alignment, last: bool) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    match alignment {
        Alignment::Right => format!("{}{}", " ".repeat(fill), cell),
        Alignment::Center => {
            let left = fill / 2;
            let right = if last { 0 } else { fill - left };
            format!("{}{}{}", " ".repeat(left), cell, " ".repeat(right))
        }
        Alignment::Left | Alignment::None => {
            if last {
                cell.to_string()
            } else {
                format!("{}{}", cell, " ".repeat(fill))
            }
        }
    }
}

fn bold() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_bold(true);
    spec
}

fn dimmed() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_dimmed(true);
    spec
}

fn code_style() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Yellow));
    spec
}
