//! Document format detection and validation.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{Error, Result};

/// Detected document format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFormat {
    /// PDF with its header version (e.g., "1.7", "2.0")
    Pdf { version: String },
    /// PowerPoint Open XML package
    Pptx,
}

impl DocumentFormat {
    /// File extension conventionally used for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf { .. } => "pdf",
            DocumentFormat::Pptx => "pptx",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf { version } => write!(f, "PDF {}", version),
            DocumentFormat::Pptx => write!(f, "PowerPoint (PPTX)"),
        }
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Part that identifies a ZIP archive as a presentation.
const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Detect the format of a file.
///
/// # Example
/// ```no_run
/// use undeck::detect::{detect_format_from_path, DocumentFormat};
///
/// match detect_format_from_path("deck.pptx").unwrap() {
///     DocumentFormat::Pptx => println!("presentation"),
///     DocumentFormat::Pdf { version } => println!("PDF {}", version),
/// }
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocumentFormat> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut header = [0u8; 16];
    let read = reader.read(&mut header)?;
    let header = &header[..read];

    if header.starts_with(ZIP_MAGIC) {
        reader.rewind()?;
        return detect_package(reader);
    }
    detect_pdf_header(header)
}

/// Detect the format of in-memory data.
///
/// PDFs are recognized from the header alone; a presentation needs the whole
/// archive so that its parts can be listed.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocumentFormat> {
    if data.starts_with(ZIP_MAGIC) {
        return detect_package(Cursor::new(data));
    }
    detect_pdf_header(data)
}

fn detect_pdf_header(data: &[u8]) -> Result<DocumentFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(DocumentFormat::Pdf { version })
}

fn detect_package<R: Read + Seek>(reader: R) -> Result<DocumentFormat> {
    let archive = ZipArchive::new(reader).map_err(|_| Error::UnknownFormat)?;
    if archive.file_names().any(|name| name == PRESENTATION_PART) {
        Ok(DocumentFormat::Pptx)
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check if a version string looks like `1.7`.
fn is_valid_version(version: &str) -> bool {
    let chars: Vec<char> = version.chars().collect();
    chars.len() == 3 && chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

/// Check if a file is a PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(DocumentFormat::Pdf { .. }))
}

/// Check if a file is a PowerPoint package.
pub fn is_pptx<P: AsRef<Path>>(path: P) -> bool {
    matches!(detect_format_from_path(path), Ok(DocumentFormat::Pptx))
}
