//! Hyperlink records shared by the PPTX and PDF extractors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Slide or page a hyperlink was found on (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "number", rename_all = "lowercase")]
pub enum Location {
    Slide(u32),
    Page(u32),
}

impl Location {
    /// The 1-based index.
    pub fn number(&self) -> u32 {
        match self {
            Location::Slide(n) | Location::Page(n) => *n,
        }
    }

    /// Heading label, `Slide` or `Page`.
    pub fn label(&self) -> &'static str {
        match self {
            Location::Slide(_) => "Slide",
            Location::Page(_) => "Page",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.number())
    }
}

/// A hyperlink with its display text and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperlinkRecord {
    /// Display text; never empty
    pub text: String,

    /// Normalized target
    pub url: String,

    /// Where the link appears
    pub location: Location,

    /// Whether `text` is a generated label rather than document text
    #[serde(default)]
    pub synthesized: bool,
}

impl HyperlinkRecord {
    /// Create a record with document text.
    pub fn new(text: impl Into<String>, url: impl Into<String>, location: Location) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            location,
            synthesized: false,
        }
    }

    /// Create a record whose text is a generated label.
    pub fn synthesized(text: impl Into<String>, url: impl Into<String>, location: Location) -> Self {
        Self {
            synthesized: true,
            ..Self::new(text, url, location)
        }
    }

    /// Whether the text is a placeholder label, either flagged or recognizable by prefix.
    pub fn has_placeholder_text(&self) -> bool {
        self.synthesized || is_placeholder_text(&self.text)
    }
}

const PLACEHOLDER_PREFIXES: &[&str] = &["Link on page", "URL on page", "Go to page"];

/// Recognize generated link labels in text coming from outside this crate.
pub fn is_placeholder_text(text: &str) -> bool {
    let text = text.trim();
    PLACEHOLDER_PREFIXES.iter().any(|p| text.starts_with(p))
        || (text.contains(" on Slide ")
            && (text.starts_with("Link on Slide")
                || text.starts_with("Table on Slide")
                || text.starts_with("Group ")))
}
