//! PPTX document parser.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Diagnostic, DiagnosticLocation, Extracted, Result};
use crate::model::{Metadata, Placeholder, PlaceholderType, Presentation, Rect, Shape, Slide, SlideSize};

use super::container::{OoxmlContainer, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER};
use super::options::{ErrorMode, ParseOptions};
use super::slide::{attr_value, parse_shape_tree, SlideContext};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Placeholder positions declared by a layout or master.
type PlaceholderTemplates = Vec<(Placeholder, Rect)>;

/// PPTX document parser.
pub struct PptxParser {
    container: OoxmlContainer,
    options: ParseOptions,
    file_name: Option<String>,
}

/// Slide order and size from `ppt/presentation.xml`.
struct DeckOutline {
    slides: Vec<String>,
    size: SlideSize,
}

impl PptxParser {
    /// Open a PPTX file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PPTX file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        let container = OoxmlContainer::open(path)?;
        Ok(Self {
            container,
            options,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
        })
    }

    /// Parse a PPTX from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PPTX from bytes with custom options.
    pub fn from_bytes_with_options(data: Vec<u8>, options: ParseOptions) -> Result<Self> {
        Ok(Self {
            container: OoxmlContainer::from_bytes(data)?,
            options,
            file_name: None,
        })
    }

    /// The underlying package.
    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }

    /// Number of slides listed in the presentation.
    pub fn slide_count(&self) -> Result<u32> {
        Ok(self.read_outline()?.slides.len() as u32)
    }

    /// Parse the presentation into the shape-tree model.
    ///
    /// In lenient mode a slide that cannot be read is kept as an empty slide and
    /// reported as a diagnostic, so slide numbers stay dense.
    pub fn parse(&self) -> Result<Extracted<Presentation>> {
        let outline = self.read_outline()?;
        let slide_numbers: HashMap<String, u32> = outline
            .slides
            .iter()
            .enumerate()
            .map(|(i, part)| (part.clone(), i as u32 + 1))
            .collect();

        let mut presentation = Presentation::new();
        presentation.slide_size = outline.size;
        presentation.metadata = self.parse_metadata(outline.slides.len() as u32);

        let mut diagnostics = Vec::new();
        let mut templates: HashMap<String, PlaceholderTemplates> = HashMap::new();

        for (index, part) in outline.slides.iter().enumerate() {
            let number = index as u32 + 1;
            if !self.options.pages.includes(number) {
                continue;
            }

            match self.parse_slide(number, part, &slide_numbers, &mut templates) {
                Ok(extracted) => {
                    let (slide, slide_diagnostics) = extracted.into_parts();
                    diagnostics.extend(slide_diagnostics);
                    presentation.add_slide(slide);
                }
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to parse slide {} ({}): {}", number, part, e);
                    diagnostics.push(Diagnostic::new(
                        DiagnosticLocation::Slide(number),
                        format!("slide could not be read: {}", e),
                    ));
                    presentation.add_slide(Slide::new(number));
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!(
            "Parsed {} slides with {} diagnostics",
            presentation.slide_count(),
            diagnostics.len()
        );
        Ok(Extracted::with_diagnostics(presentation, diagnostics))
    }

    fn read_outline(&self) -> Result<DeckOutline> {
        let xml = self.container.read_xml(PRESENTATION_PART)?;
        let rels = self.container.relationships(PRESENTATION_PART)?;

        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut slides = Vec::new();
        let mut size = SlideSize::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => match e.local_name().as_ref() {
                    b"sldId" => {
                        let mut rel_id = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            if attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some() {
                                rel_id = Some(attr.unescape_value()?.into_owned());
                            }
                        }
                        match rel_id.as_ref().and_then(|id| rels.get(id)) {
                            Some(rel) => slides.push(rel.target.clone()),
                            None => log::warn!("Slide reference {:?} has no relationship", rel_id),
                        }
                    }
                    b"sldSz" => {
                        let cx = attr_value(e, b"cx")?.and_then(|v| v.parse().ok());
                        let cy = attr_value(e, b"cy")?.and_then(|v| v.parse().ok());
                        if let (Some(width), Some(height)) = (cx, cy) {
                            size = SlideSize { width, height };
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(DeckOutline { slides, size })
    }

    fn parse_metadata(&self, slide_count: u32) -> Metadata {
        let mut metadata = match self.container.parse_core_metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Failed to read document properties: {}", e);
                Metadata::default()
            }
        };
        metadata.page_count = slide_count;
        metadata.file_name = self.file_name.clone();
        metadata
    }

    fn parse_slide(
        &self,
        number: u32,
        part: &str,
        slide_numbers: &HashMap<String, u32>,
        templates: &mut HashMap<String, PlaceholderTemplates>,
    ) -> Result<Extracted<Slide>> {
        let xml = self.container.read_xml(part)?;
        let rels = self.container.relationships(part)?;
        let ctx = SlideContext {
            slide_number: number,
            container: &self.container,
            rels: &rels,
            slide_numbers,
            options: &self.options,
        };

        let (mut shapes, diagnostics) = parse_shape_tree(xml, &ctx)?.into_parts();

        if self.options.inherit_layout_geometry && shapes.iter().any(needs_geometry) {
            let layout_part = rels
                .values()
                .find(|r| r.is_type(REL_SLIDE_LAYOUT))
                .map(|r| r.target.clone());
            if let Some(layout_part) = layout_part {
                let layout = self.templates_for(&layout_part, number, slide_numbers, templates);
                let master = self
                    .master_of(&layout_part)
                    .map(|m| self.templates_for(&m, number, slide_numbers, templates))
                    .unwrap_or_default();
                inherit_geometry(&mut shapes, &layout, &master);
            }
        }

        let mut slide = Slide::new(number);
        slide.shapes = shapes;
        Ok(Extracted::with_diagnostics(slide, diagnostics))
    }

    fn master_of(&self, layout_part: &str) -> Option<String> {
        self.container
            .relationships(layout_part)
            .ok()?
            .values()
            .find(|r| r.is_type(REL_SLIDE_MASTER))
            .map(|r| r.target.clone())
    }

    fn templates_for(
        &self,
        part: &str,
        slide_number: u32,
        slide_numbers: &HashMap<String, u32>,
        cache: &mut HashMap<String, PlaceholderTemplates>,
    ) -> PlaceholderTemplates {
        if let Some(cached) = cache.get(part) {
            return cached.clone();
        }

        let templates = match self.read_templates(part, slide_number, slide_numbers) {
            Ok(templates) => templates,
            Err(e) => {
                log::debug!("No placeholder geometry from {}: {}", part, e);
                Vec::new()
            }
        };
        cache.insert(part.to_string(), templates.clone());
        templates
    }

    fn read_templates(
        &self,
        part: &str,
        slide_number: u32,
        slide_numbers: &HashMap<String, u32>,
    ) -> Result<PlaceholderTemplates> {
        let xml = self.container.read_xml(part)?;
        let rels = self.container.relationships(part)?;
        let options = ParseOptions::default().with_charts(false);
        let ctx = SlideContext {
            slide_number,
            container: &self.container,
            rels: &rels,
            slide_numbers,
            options: &options,
        };

        let shapes = parse_shape_tree(xml, &ctx)?.value;
        Ok(shapes
            .into_iter()
            .filter_map(|s| Some((s.placeholder?, s.bounds?)))
            .collect())
    }
}

fn needs_geometry(shape: &Shape) -> bool {
    shape.placeholder.is_some() && shape.bounds.is_none()
}

/// Fill in missing placeholder bounds, layout first (by `idx`, then type), then master (by type).
fn inherit_geometry(shapes: &mut [Shape], layout: &[(Placeholder, Rect)], master: &[(Placeholder, Rect)]) {
    for shape in shapes.iter_mut().filter(|s| needs_geometry(s)) {
        let Some(placeholder) = shape.placeholder.as_ref() else {
            continue;
        };
        shape.bounds = find_template(placeholder, layout, true)
            .or_else(|| find_template(placeholder, master, false));
    }
}

fn find_template(placeholder: &Placeholder, templates: &[(Placeholder, Rect)], by_idx: bool) -> Option<Rect> {
    if by_idx {
        if let Some(idx) = placeholder.idx {
            if let Some((_, rect)) = templates.iter().find(|(t, _)| t.idx == Some(idx)) {
                return Some(*rect);
            }
        }
    }
    templates
        .iter()
        .find(|(t, _)| same_family(&t.kind, &placeholder.kind))
        .map(|(_, rect)| *rect)
}

fn same_family(a: &PlaceholderType, b: &PlaceholderType) -> bool {
    a == b
        || (a.is_title() && b.is_title())
        || (a.has_master_bullets() && b.has_master_bullets())
}
