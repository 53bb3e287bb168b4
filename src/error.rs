//! Error types for undeck library.

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for undeck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document processing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is neither PDF nor PPTX.
    #[error("Unknown file format: expected a PDF or PPTX document")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error reading the OOXML zip container.
    #[error("Archive error: {0}")]
    Zip(String),

    /// Error parsing XML inside a package part.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// A required package part is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and requires a password.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page or slide number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page or slide selection.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Shape content could not be extracted.
    #[error("Shape extraction error: {0}")]
    ShapeExtract(String),

    /// Error during rendering (Markdown, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// The markdown enhancer failed or returned nothing.
    #[error("Enhancement failed: {0}")]
    Enhancement(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => Error::MissingPart(err.to_string()),
            _ => Error::Zip(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

/// Where a non-fatal problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum DiagnosticLocation {
    /// The whole document.
    Document,
    /// A slide (1-based).
    Slide(u32),
    /// A PDF page (1-based).
    Page(u32),
}

impl fmt::Display for DiagnosticLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLocation::Document => write!(f, "document"),
            DiagnosticLocation::Slide(n) => write!(f, "slide {}", n),
            DiagnosticLocation::Page(n) => write!(f, "page {}", n),
        }
    }
}

/// A recovered, non-fatal extraction problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub location: DiagnosticLocation,
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(location: DiagnosticLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// A value produced by an extraction step together with the problems it skipped over.
#[derive(Debug, Clone)]
pub struct Extracted<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Extracted<T> {
    /// Wrap a value with no diagnostics.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// Wrap a value with the given diagnostics.
    pub fn with_diagnostics(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    /// Whether extraction completed without skipping anything.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Map the value, keeping diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extracted<U> {
        Extracted {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Split into value and diagnostics.
    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }
}

impl<T: Default> Default for Extracted<T> {
    fn default() -> Self {
        Self::clean(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::MissingPart("ppt/presentation.xml".to_string());
        assert_eq!(
            err.to_string(),
            "Missing package part: ppt/presentation.xml"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::MissingPart(_)));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(DiagnosticLocation::Slide(3), "skipped shape 7");
        assert_eq!(diag.to_string(), "slide 3: skipped shape 7");
    }

    #[test]
    fn test_extracted_map_keeps_diagnostics() {
        let extracted = Extracted::with_diagnostics(
            vec![1, 2, 3],
            vec![Diagnostic::new(DiagnosticLocation::Page(1), "bad annotation")],
        );
        let mapped = extracted.map(|v| v.len());
        assert_eq!(mapped.value, 3);
        assert!(!mapped.is_clean());
    }
}
