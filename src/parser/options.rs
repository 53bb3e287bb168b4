//! Parsing options and configuration.

use crate::render::PageSelection;

/// Options for parsing PPTX and PDF documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Page or slide selection (which ones to parse)
    pub pages: PageSelection,

    /// Resolve placeholder geometry from slide layouts and masters
    pub inherit_layout_geometry: bool,

    /// Parse chart parts referenced from graphic frames
    pub parse_charts: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail on the first malformed shape or page.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Enable or disable layout geometry inheritance.
    pub fn with_layout_geometry(mut self, inherit: bool) -> Self {
        self.inherit_layout_geometry = inherit;
        self
    }

    /// Enable or disable chart parsing.
    pub fn with_charts(mut self, parse: bool) -> Self {
        self.parse_charts = parse;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            pages: PageSelection::All,
            inherit_layout_geometry: true,
            parse_charts: true,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    Strict,
    /// Skip invalid content, record a diagnostic, and continue
    #[default]
    Lenient,
}
