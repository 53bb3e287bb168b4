//! OOXML package access (zip container, relationships, core properties).

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::Metadata;

/// Relationship type suffixes we dispatch on.
pub const REL_SLIDE: &str = "/slide";
pub const REL_SLIDE_LAYOUT: &str = "/slideLayout";
pub const REL_SLIDE_MASTER: &str = "/slideMaster";
pub const REL_HYPERLINK: &str = "/hyperlink";
pub const REL_IMAGE: &str = "/image";
pub const REL_CHART: &str = "/chart";

/// A package relationship (`Relationship` element of a `.rels` part).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with the given suffix (e.g. [`REL_SLIDE`]).
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// Relationships of one part, keyed by `Id`.
pub type Relationships = HashMap<String, Relationship>;

/// An opened OOXML package with its XML parts loaded.
#[derive(Debug, Clone)]
pub struct OoxmlContainer {
    parts: HashMap<String, String>,
    binary_parts: Vec<String>,
}

impl OoxmlContainer {
    /// Open a package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Open a package from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = HashMap::new();
        let mut binary_parts = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().trim_start_matches('/').to_string();
            if name.ends_with(".xml") || name.ends_with(".rels") {
                let mut content = String::new();
                entry.read_to_string(&mut content).map_err(|e| {
                    Error::XmlParse(format!("{}: {}", name, e))
                })?;
                parts.insert(name, content);
            } else {
                binary_parts.push(name);
            }
        }

        Ok(Self {
            parts,
            binary_parts,
        })
    }

    /// Read an XML part by its package path.
    pub fn read_xml(&self, part: &str) -> Result<&str> {
        self.parts
            .get(part.trim_start_matches('/'))
            .map(String::as_str)
            .ok_or_else(|| Error::MissingPart(part.to_string()))
    }

    /// Check whether a part exists.
    pub fn exists(&self, part: &str) -> bool {
        let part = part.trim_start_matches('/');
        self.parts.contains_key(part) || self.binary_parts.iter().any(|p| p == part)
    }

    /// List all part names.
    pub fn list_parts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .parts
            .keys()
            .map(String::as_str)
            .chain(self.binary_parts.iter().map(String::as_str))
            .collect();
        names.sort_unstable();
        names
    }

    /// Parse the relationships of a part. A missing `.rels` part yields an empty map.
    pub fn relationships(&self, part: &str) -> Result<Relationships> {
        let rels_path = rels_path_for(part);
        match self.read_xml(&rels_path) {
            Ok(xml) => parse_relationships(xml, part),
            Err(Error::MissingPart(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Parse `docProps/core.xml` and `docProps/app.xml` into metadata.
    pub fn parse_core_metadata(&self) -> Result<Metadata> {
        let mut metadata = Metadata::default();

        if let Ok(xml) = self.read_xml("docProps/core.xml") {
            let fields = leaf_text_elements(xml)?;
            let get = |name: &str| fields.get(name).cloned().filter(|v| !v.trim().is_empty());
            metadata.title = get("title");
            metadata.author = get("creator");
            metadata.subject = get("subject");
            metadata.keywords = get("keywords");
            metadata.category = get("category");
            metadata.comments = get("description");
            metadata.last_modified_by = get("lastModifiedBy");
            metadata.revision = get("revision");
            metadata.created = get("created").and_then(|d| parse_w3c_date(&d));
            metadata.modified = get("modified").and_then(|d| parse_w3c_date(&d));
        }

        if let Ok(xml) = self.read_xml("docProps/app.xml") {
            let fields = leaf_text_elements(xml)?;
            metadata.creator = fields.get("Application").cloned();
            metadata.company = fields.get("Company").cloned().filter(|c| !c.is_empty());
        }

        Ok(metadata)
    }
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
pub fn rels_path_for(part: &str) -> String {
    match part.rfind('/') {
        Some(last_slash) => {
            let dir = &part[..last_slash];
            let file = &part[last_slash + 1..];
            format!("{}/_rels/{}.rels", dir, file)
        }
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns the relationship.
///
/// Absolute targets (`/ppt/media/a.png`) are taken from the package root,
/// relative ones are resolved against the source part's directory.
pub fn resolve_part(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rfind('/') {
        Some(idx) => source_part[..idx].split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn parse_relationships(xml: &str, source_part: &str) -> Result<Relationships> {
    let mut rels = Relationships::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e)
                if e.name().local_name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut target = String::new();
                let mut rel_type = String::new();
                let mut external = false;

                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value()?.to_string();
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = value,
                        b"Target" => target = value,
                        b"Type" => rel_type = value,
                        b"TargetMode" => external = value == "External",
                        _ => {}
                    }
                }

                if !id.is_empty() {
                    let target = if external {
                        target
                    } else {
                        resolve_part(source_part, &target)
                    };
                    rels.insert(
                        id.clone(),
                        Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        },
                    );
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Collect `local-name -> text` for elements that contain only text.
fn leaf_text_elements(xml: &str) -> Result<HashMap<String, String>> {
    let mut fields = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                current = Some(String::from_utf8_lossy(e.name().local_name().as_ref()).to_string());
            }
            Event::Text(ref e) => {
                if let Some(name) = current.take() {
                    fields.insert(name, e.unescape()?.trim().to_string());
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(fields)
}

/// Parse a W3CDTF date (`2024-01-15T10:30:45Z`).
fn parse_w3c_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
