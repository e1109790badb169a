#![forbid(unsafe_code)]

//! Markdown dialect switches used for help sections

use pulldown_cmark::Options;

/// The Markdown extensions applied to section content
///
/// Fenced code blocks, a mandatory space after `#` in headers and the ban on
/// intra-word `_` emphasis are part of CommonMark itself, so the parser always
/// applies them. Intra-word `*` emphasis, which CommonMark allows, is printed
/// literally by the renderer. The fields below cover the extensions that need
/// switching on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extensions {
    /// Pipe tables
    pub tables: bool,
    /// `~~struck~~` text
    pub strikethrough: bool,
    /// `# Title {#anchor}` header attributes, stripped from the output
    pub header_ids: bool,
    /// Style bare `http(s)://` URLs as links
    pub autolink: bool,
}

impl Extensions {
    /// The fixed set every help section is rendered with
    pub const COMMON: Extensions = Extensions {
        tables: true,
        strikethrough: true,
        header_ids: true,
        autolink: true,
    };

    /// Parser options matching the enabled extensions
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.header_ids {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        options
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Extensions::COMMON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_enables_all_parser_options() {
        let options = Extensions::COMMON.parser_options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_STRIKETHROUGH));
        assert!(options.contains(Options::ENABLE_HEADING_ATTRIBUTES));
        assert!(!options.contains(Options::ENABLE_FOOTNOTES));
    }

    #[test]
    fn test_disabled_extensions_map_to_empty_options() {
        let none = Extensions {
            tables: false,
            strikethrough: false,
            header_ids: false,
            autolink: false,
        };
        assert_eq!(none.parser_options(), Options::empty());
    }

    #[test]
    fn test_default_is_common() {
        assert_eq!(Extensions::default(), Extensions::COMMON);
    }
}
