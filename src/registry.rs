#![forbid(unsafe_code)]

//! Ordered storage for help sections

/// A named, described block of Markdown shown on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    description: String,
    content: String,
}

impl Section {
    /// Creates a new section
    ///
    /// No validation is performed: empty names, descriptions and content are
    /// all accepted.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Section {
            name: name.into(),
            description: description.into(),
            content: content.into(),
        }
    }

    /// The identifier used to request this section
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line summary shown in the section listing
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Markdown body
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Insertion-ordered collection of sections
///
/// Names are not required to be unique. Lookups resolve to the first section
/// registered under a name, and sections are never removed.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        SectionRegistry {
            sections: Vec::with_capacity(10),
        }
    }

    /// Appends a section at the end of the registry
    pub fn push(&mut self, section: Section) {
        tracing::trace!(name = section.name(), "help section registered");
        self.sections.push(section);
    }

    /// Returns the first section whose name equals `name`
    pub fn find(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Iterates over the sections in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<'a> IntoIterator for &'a SectionRegistry {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
