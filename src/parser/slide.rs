//! Slide shape-tree parsing.
//!
//! A slide is read in two passes. The first pass locates every direct child of
//! `p:spTree` by byte range without validating its content; the second parses
//! each child strictly on its own. A malformed shape (bad entity, mismatched
//! tags) therefore fails alone and can be skipped while its siblings survive.

use std::collections::HashMap;
use std::ops::Range;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Diagnostic, DiagnosticLocation, Error, Extracted, Result};
use crate::links::normalize_url;
use crate::model::{
    BulletStyle, Chart, ImageRef, Paragraph, Placeholder, PlaceholderType, Rect, Shape, ShapeKind,
    Table, TableCell, TableRow, TextBody, TextRun,
};

use super::chart::parse_chart_part;
use super::container::{OoxmlContainer, Relationships, REL_SLIDE};
use super::options::{ErrorMode, ParseOptions};

/// Direct children of `p:spTree` / `p:grpSp` that are shapes.
const SHAPE_ELEMENTS: &[&str] = &["sp", "pic", "graphicFrame", "grpSp", "cxnSp"];

/// Group nesting limit.
pub(crate) const MAX_GROUP_DEPTH: usize = 32;

/// Everything a slide's shapes may refer to.
pub(crate) struct SlideContext<'a> {
    pub slide_number: u32,
    pub container: &'a OoxmlContainer,
    pub rels: &'a Relationships,
    pub slide_numbers: &'a HashMap<String, u32>,
    pub options: &'a ParseOptions,
}

impl SlideContext<'_> {
    fn links(&self) -> LinkResolver<'_> {
        LinkResolver {
            rels: self.rels,
            slide_numbers: self.slide_numbers,
        }
    }
}

/// Resolves `r:id` references of click actions and embeds.
pub(crate) struct LinkResolver<'a> {
    pub rels: &'a Relationships,
    pub slide_numbers: &'a HashMap<String, u32>,
}

impl LinkResolver<'_> {
    /// Resolve an `a:hlinkClick` to a link target.
    ///
    /// External targets are normalized; jumps to another slide of the deck become
    /// `#slide=N`. Actions without a target (next slide, end show) resolve to nothing.
    pub fn resolve_click(&self, e: &BytesStart) -> Result<Option<String>> {
        let Some(rel_id) = attr_value(e, b"id")?.filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        let Some(rel) = self.rels.get(&rel_id) else {
            return Ok(None);
        };

        if rel.external {
            let url = normalize_url(&rel.target);
            return Ok(Some(url).filter(|u| !u.is_empty()));
        }
        if rel.is_type(REL_SLIDE) {
            return Ok(self
                .slide_numbers
                .get(&rel.target)
                .map(|n| format!("#slide={}", n)));
        }
        Ok(None)
    }

    /// Resolve an embed/link reference to a package part.
    pub fn resolve_part(&self, rel_id: &str) -> Option<String> {
        self.rels
            .get(rel_id)
            .filter(|r| !r.external)
            .map(|r| r.target.clone())
    }
}

/// A child element located by byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub name: String,
    pub range: Range<usize>,
}

/// Locate the direct children of the first `container` element without validating them.
pub(crate) fn split_children(xml: &str, container: &[u8]) -> Result<Vec<Fragment>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    reader.check_end_names(false);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut container_depth: Option<usize> = None;
    let mut open: Option<(String, usize)> = None;
    let mut fragments = Vec::new();

    loop {
        let start = reader.buffer_position();
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                depth += 1;
                match container_depth {
                    None if e.local_name().as_ref() == container => container_depth = Some(depth),
                    Some(cd) if depth == cd + 1 => open = Some((local_name(e), start)),
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                if container_depth == Some(depth) {
                    fragments.push(Fragment {
                        name: local_name(e),
                        range: start..reader.buffer_position(),
                    });
                }
            }
            Event::End(_) => {
                match container_depth {
                    Some(cd) if depth == cd + 1 => {
                        if let Some((name, s)) = open.take() {
                            fragments.push(Fragment {
                                name,
                                range: s..reader.buffer_position(),
                            });
                        }
                    }
                    Some(cd) if depth == cd => break,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(fragments)
}

/// Parse the shape tree of a slide (or layout) part.
pub(crate) fn parse_shape_tree(xml: &str, ctx: &SlideContext<'_>) -> Result<Extracted<Vec<Shape>>> {
    let fragments = split_children(xml, b"spTree")?;
    let mut diagnostics = Vec::new();
    let shapes = parse_fragments(xml, &fragments, ctx, 0, &mut diagnostics)?;
    Ok(Extracted::with_diagnostics(shapes, diagnostics))
}

fn parse_fragments(
    xml: &str,
    fragments: &[Fragment],
    ctx: &SlideContext<'_>,
    depth: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<Shape>> {
    let mut shapes = Vec::new();

    for (index, fragment) in fragments.iter().enumerate() {
        if !SHAPE_ELEMENTS.contains(&fragment.name.as_str()) {
            continue;
        }

        let result = xml
            .get(fragment.range.clone())
            .ok_or_else(|| Error::XmlParse(format!("invalid range for {}", fragment.name)))
            .and_then(|source| parse_fragment(&fragment.name, source, ctx, depth, diagnostics));

        match result {
            Ok(Some(shape)) => shapes.push(shape),
            Ok(None) => {}
            Err(e) => {
                if ctx.options.error_mode == ErrorMode::Strict {
                    return Err(e);
                }
                log::warn!(
                    "Skipping malformed {} (child {}) on slide {}: {}",
                    fragment.name,
                    index + 1,
                    ctx.slide_number,
                    e
                );
                diagnostics.push(Diagnostic::new(
                    DiagnosticLocation::Slide(ctx.slide_number),
                    format!("skipped malformed {} (child {}): {}", fragment.name, index + 1, e),
                ));
            }
        }
    }

    Ok(shapes)
}

fn parse_fragment(
    name: &str,
    xml: &str,
    ctx: &SlideContext<'_>,
    depth: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<Shape>> {
    if name == "grpSp" {
        return parse_group(xml, ctx, depth, diagnostics).map(Some);
    }

    let mut scanner = ShapeScanner::new(ctx);
    scanner.scan(xml)?;
    scanner.finish(name, ctx).map(Some)
}

fn parse_group(
    xml: &str,
    ctx: &SlideContext<'_>,
    depth: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Shape> {
    if depth >= MAX_GROUP_DEPTH {
        return Err(Error::XmlParse(format!(
            "group nesting exceeds {} levels",
            MAX_GROUP_DEPTH
        )));
    }

    let fragments = split_children(xml, b"grpSp")?;

    let mut header = ShapeScanner::new(ctx);
    for fragment in fragments
        .iter()
        .filter(|f| f.name == "nvGrpSpPr" || f.name == "grpSpPr")
    {
        if let Some(source) = xml.get(fragment.range.clone()) {
            header.scan(source)?;
        }
    }

    let children = parse_fragments(xml, &fragments, ctx, depth + 1, diagnostics)?;
    let mut shape = header.into_shape(ShapeKind::Group(children));
    if shape.name.is_empty() {
        shape.name = "Group".to_string();
    }
    Ok(shape)
}

/// Collects the properties of one non-group shape from its events.
struct ShapeScanner<'a> {
    links: LinkResolver<'a>,
    id: Option<u32>,
    name: String,
    descr: Option<String>,
    title: Option<String>,
    hyperlink: Option<String>,
    placeholder: Option<Placeholder>,
    offset: Option<(i64, i64)>,
    extent: Option<(i64, i64)>,
    in_cnvpr: bool,
    in_xfrm: bool,
    xfrm_done: bool,
    text: Option<TextBodyBuilder>,
    body: Option<TextBody>,
    image_part: Option<String>,
    graphic_uri: Option<String>,
    table: Option<TableBuilder>,
    parsed_table: Option<Table>,
    chart_part: Option<String>,
}

impl<'a> ShapeScanner<'a> {
    fn new(ctx: &'a SlideContext<'a>) -> Self {
        Self {
            links: ctx.links(),
            id: None,
            name: String::new(),
            descr: None,
            title: None,
            hyperlink: None,
            placeholder: None,
            offset: None,
            extent: None,
            in_cnvpr: false,
            in_xfrm: false,
            xfrm_done: false,
            text: None,
            body: None,
            image_part: None,
            graphic_uri: None,
            table: None,
            parsed_table: None,
            chart_part: None,
        }
    }

    fn scan(&mut self, xml: &str) -> Result<()> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => self.open(e, false)?,
                Event::Empty(ref e) => self.open(e, true)?,
                Event::End(ref e) => self.close(e.local_name().as_ref()),
                Event::Text(ref t) => self.text(t)?,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    fn open(&mut self, e: &BytesStart, empty: bool) -> Result<()> {
        if let Some(table) = self.table.as_mut() {
            return table.open(e, &self.links, empty);
        }
        if let Some(text) = self.text.as_mut() {
            return text.open(e, &self.links, empty);
        }

        match e.local_name().as_ref() {
            b"cNvPr" => {
                self.id = attr_value(e, b"id")?.and_then(|v| v.parse().ok());
                self.name = attr_value(e, b"name")?.unwrap_or_default();
                self.descr = attr_value(e, b"descr")?;
                self.title = attr_value(e, b"title")?;
                self.in_cnvpr = !empty;
            }
            b"hlinkClick" if self.in_cnvpr => {
                self.hyperlink = self.links.resolve_click(e)?;
            }
            b"ph" => {
                self.placeholder = Some(Placeholder {
                    kind: PlaceholderType::from_attr(attr_value(e, b"type")?.as_deref()),
                    idx: attr_value(e, b"idx")?.and_then(|v| v.parse().ok()),
                });
            }
            b"xfrm" if !self.xfrm_done => {
                self.in_xfrm = !empty;
            }
            b"off" if self.in_xfrm => {
                self.offset = Some((int_attr(e, b"x")?, int_attr(e, b"y")?));
            }
            b"ext" if self.in_xfrm => {
                self.extent = Some((int_attr(e, b"cx")?, int_attr(e, b"cy")?));
            }
            b"txBody" if !empty => {
                self.text = Some(TextBodyBuilder::default());
            }
            b"blip" => {
                if let Some(rel_id) = attr_value(e, b"embed")? {
                    self.image_part = self.links.resolve_part(&rel_id);
                }
            }
            b"graphicData" => {
                self.graphic_uri = attr_value(e, b"uri")?;
            }
            b"tbl" if !empty => {
                self.table = Some(TableBuilder::default());
            }
            b"chart" => {
                if let Some(rel_id) = attr_value(e, b"id")? {
                    self.chart_part = self.links.resolve_part(&rel_id);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        if let Some(table) = self.table.as_mut() {
            if name == b"tbl" {
                self.parsed_table = self.table.take().map(TableBuilder::finish);
            } else {
                table.close(name);
            }
            return;
        }
        if let Some(text) = self.text.as_mut() {
            if name == b"txBody" {
                self.body = self.text.take().map(TextBodyBuilder::finish);
            } else {
                text.close(name);
            }
            return;
        }

        match name {
            b"cNvPr" => self.in_cnvpr = false,
            b"xfrm" if self.in_xfrm => {
                self.in_xfrm = false;
                self.xfrm_done = true;
            }
            _ => {}
        }
    }

    fn text(&mut self, t: &BytesText) -> Result<()> {
        if let Some(table) = self.table.as_mut() {
            return table.text(t);
        }
        if let Some(text) = self.text.as_mut() {
            return text.text(t);
        }
        Ok(())
    }

    fn finish(mut self, element: &str, ctx: &SlideContext<'_>) -> Result<Shape> {
        let kind = match element {
            "sp" => {
                let body = self.body.take();
                match (&self.placeholder, body) {
                    (Some(_), body) => ShapeKind::Placeholder(body.unwrap_or_default()),
                    (None, Some(body)) if !body.is_empty() => ShapeKind::TextBox(body),
                    _ => ShapeKind::Decoration,
                }
            }
            "pic" => ShapeKind::Picture(ImageRef {
                part: self.image_part.take(),
            }),
            "graphicFrame" => {
                if let Some(table) = self.parsed_table.take() {
                    ShapeKind::Table(table)
                } else if let Some(part) = self.chart_part.take() {
                    if ctx.options.parse_charts {
                        ShapeKind::Chart(parse_chart_part(ctx.container, &part, ctx.slide_numbers)?)
                    } else {
                        ShapeKind::Chart(Chart::default())
                    }
                } else {
                    if let Some(uri) = &self.graphic_uri {
                        log::debug!("Unsupported graphic frame content: {}", uri);
                    }
                    ShapeKind::Decoration
                }
            }
            _ => ShapeKind::Decoration,
        };

        Ok(self.into_shape(kind))
    }

    fn into_shape(self, kind: ShapeKind) -> Shape {
        let bounds = match (self.offset, self.extent) {
            (Some((x, y)), Some((cx, cy))) => Some(Rect::new(x, y, cx, cy)),
            _ => None,
        };
        let alt_text = self
            .descr
            .or(self.title)
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        Shape {
            id: self.id,
            name: self.name,
            bounds,
            placeholder: self.placeholder,
            hyperlink: self.hyperlink,
            alt_text,
            kind,
        }
    }
}

/// Builds paragraphs from DrawingML text (`a:p` / `a:r` / `a:t`).
#[derive(Debug, Default)]
pub(crate) struct TextBodyBuilder {
    paragraphs: Vec<Paragraph>,
    paragraph: Option<Paragraph>,
    run: Option<TextRun>,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
}

impl TextBodyBuilder {
    pub fn open(&mut self, e: &BytesStart, links: &LinkResolver<'_>, empty: bool) -> Result<()> {
        let name = e.local_name();
        match name.as_ref() {
            b"p" => {
                self.paragraph = Some(Paragraph::new());
                if empty {
                    self.close(b"p");
                }
            }
            b"pPr" if self.run.is_none() => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.properties.level = attr_value(e, b"lvl")?.and_then(|v| v.parse().ok());
                    self.in_ppr = !empty;
                }
            }
            b"buNone" if self.in_ppr => self.set_bullet(BulletStyle::None, true),
            b"buChar" if self.in_ppr => {
                let glyph = attr_value(e, b"char")?.unwrap_or_else(|| "\u{2022}".to_string());
                self.set_bullet(BulletStyle::Char(glyph), true);
            }
            b"buAutoNum" if self.in_ppr => {
                let scheme = attr_value(e, b"type")?.unwrap_or_else(|| "arabicPeriod".to_string());
                self.set_bullet(BulletStyle::AutoNumber(scheme), true);
            }
            b"buFont" if self.in_ppr => {
                self.set_bullet(BulletStyle::Char("\u{2022}".to_string()), false);
            }
            b"r" | b"fld" if self.paragraph.is_some() => {
                self.run = Some(TextRun::default());
                if empty {
                    self.close(name.as_ref());
                }
            }
            b"br" if self.run.is_none() => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.add_run(TextRun::line_break());
                }
            }
            b"rPr" => {
                if let Some(run) = self.run.as_mut() {
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = attr.unescape_value()?;
                        match attr.key.local_name().as_ref() {
                            b"b" => run.style.bold = flag(&value),
                            b"i" => run.style.italic = flag(&value),
                            b"u" => run.style.underline = value != "none",
                            b"strike" => {
                                run.style.strikethrough = value != "noStrike" && flag(&value)
                            }
                            _ => {}
                        }
                    }
                    self.in_rpr = !empty;
                }
            }
            b"hlinkClick" if self.in_rpr => {
                let target = links.resolve_click(e)?;
                if let Some(run) = self.run.as_mut() {
                    run.hyperlink = target;
                }
            }
            b"t" if self.run.is_some() => self.in_text = !empty,
            _ => {}
        }
        Ok(())
    }

    pub fn close(&mut self, name: &[u8]) {
        match name {
            b"p" => {
                if let Some(mut paragraph) = self.paragraph.take() {
                    if let Some(run) = self.run.take() {
                        paragraph.add_run(run);
                    }
                    self.paragraphs.push(paragraph);
                }
            }
            b"r" | b"fld" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    if !run.text.is_empty() {
                        paragraph.add_run(run);
                    }
                }
                self.in_rpr = false;
                self.in_text = false;
            }
            b"pPr" => self.in_ppr = false,
            b"rPr" => self.in_rpr = false,
            b"t" => self.in_text = false,
            _ => {}
        }
    }

    pub fn text(&mut self, t: &BytesText) -> Result<()> {
        if !self.in_text {
            return Ok(());
        }
        let text = t.unescape()?;
        if let Some(run) = self.run.as_mut() {
            run.text.extend(text.nfc());
        }
        Ok(())
    }

    pub fn finish(mut self) -> TextBody {
        self.close(b"p");
        TextBody::new(self.paragraphs)
    }

    fn set_bullet(&mut self, bullet: BulletStyle, overrides: bool) {
        if let Some(paragraph) = self.paragraph.as_mut() {
            if overrides || paragraph.properties.bullet == BulletStyle::Inherit {
                paragraph.properties.bullet = bullet;
            }
        }
    }
}

/// Builds a table from `a:tbl` content.
#[derive(Debug, Default)]
struct TableBuilder {
    table: Table,
    row: Option<TableRow>,
    cell: Option<TableCell>,
    cell_text: Option<TextBodyBuilder>,
}

impl TableBuilder {
    fn open(&mut self, e: &BytesStart, links: &LinkResolver<'_>, empty: bool) -> Result<()> {
        if let Some(text) = self.cell_text.as_mut() {
            return text.open(e, links, empty);
        }

        match e.local_name().as_ref() {
            b"tblPr" => {
                self.table.first_row_header = attr_value(e, b"firstRow")?.is_some_and(|v| flag(&v));
            }
            b"tr" => {
                self.row = Some(TableRow::default());
                if empty {
                    self.close(b"tr");
                }
            }
            b"tc" => {
                let mut cell = TableCell::default();
                cell.colspan = attr_value(e, b"gridSpan")?
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);
                cell.rowspan = attr_value(e, b"rowSpan")?
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);
                cell.merged = attr_value(e, b"hMerge")?.is_some_and(|v| flag(&v))
                    || attr_value(e, b"vMerge")?.is_some_and(|v| flag(&v));
                self.cell = Some(cell);
                if empty {
                    self.close(b"tc");
                }
            }
            b"txBody" if self.cell.is_some() && !empty => {
                self.cell_text = Some(TextBodyBuilder::default());
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        if let Some(text) = self.cell_text.as_mut() {
            if name == b"txBody" {
                let body = self.cell_text.take().map(TextBodyBuilder::finish);
                if let (Some(cell), Some(body)) = (self.cell.as_mut(), body) {
                    cell.paragraphs = body.paragraphs;
                }
            } else {
                text.close(name);
            }
            return;
        }

        match name {
            b"tc" => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.cells.push(cell);
                }
            }
            b"tr" => {
                if let Some(row) = self.row.take() {
                    self.table.add_row(row);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, t: &BytesText) -> Result<()> {
        match self.cell_text.as_mut() {
            Some(text) => text.text(t),
            None => Ok(()),
        }
    }

    fn finish(self) -> Table {
        self.table
    }
}

/// Read an attribute by local name.
pub(crate) fn attr_value(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn int_attr(e: &BytesStart, key: &[u8]) -> Result<i64> {
    Ok(attr_value(e, key)?
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0))
}

pub(crate) fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// OOXML boolean attribute.
fn flag(value: &str) -> bool {
    value != "0" && value != "false"
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::SemanticRole;

    pub(crate) fn slide_xml(shapes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            shapes
        )
    }

    fn parse(xml: &str, rels: &Relationships) -> Result<Extracted<Vec<Shape>>> {
        let container = OoxmlContainer::from_bytes(empty_zip()).unwrap();
        let slide_numbers = HashMap::new();
        let options = ParseOptions::default();
        let ctx = SlideContext {
            slide_number: 1,
            container: &container,
            rels,
            slide_numbers: &slide_numbers,
            options: &options,
        };
        parse_shape_tree(xml, &ctx)
    }

    fn empty_zip() -> Vec<u8> {
        use std::io::Cursor;
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn link_rels() -> Relationships {
        let mut rels = Relationships::new();
        rels.insert(
            "rId2".to_string(),
            super::super::container::Relationship {
                id: "rId2".to_string(),
                rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink".to_string(),
                target: "https://example.com".to_string(),
                external: true,
            },
        );
        rels
    }

    const TITLE: &str = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="100" y="200"/><a:ext cx="3000" cy="400"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" b="1"/><a:t>Title &amp; More</a:t></a:r></a:p></p:txBody></p:sp>"#;

    #[test]
    fn test_split_children() {
        let xml = slide_xml(TITLE);
        let fragments = split_children(&xml, b"spTree").unwrap();
        let names: Vec<&str> = fragments.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["nvGrpSpPr", "grpSpPr", "sp"]);
        assert!(xml[fragments[2].range.clone()].starts_with("<p:sp>"));
        assert!(xml[fragments[2].range.clone()].ends_with("</p:sp>"));
    }

    #[test]
    fn test_parse_title_placeholder() {
        let xml = slide_xml(TITLE);
        let shapes = parse(&xml, &Relationships::new()).unwrap();
        assert!(shapes.is_clean());
        assert_eq!(shapes.value.len(), 1);

        let shape = &shapes.value[0];
        assert_eq!(shape.id, Some(2));
        assert_eq!(shape.name, "Title 1");
        assert_eq!(shape.bounds, Some(Rect::new(100, 200, 3000, 400)));
        assert_eq!(
            shape.placeholder_type().and_then(|p| p.role()),
            Some(SemanticRole::Title)
        );
        let body = shape.text_body().unwrap();
        assert_eq!(body.plain_text(), "Title & More");
        assert!(body.paragraphs[0].runs[0].style.bold);
    }

    #[test]
    fn test_run_hyperlink_and_bullets() {
        let sp = r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="TextBox 2"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:pPr lvl="1"><a:buFont typeface="Arial"/><a:buChar char="-"/></a:pPr><a:r><a:rPr lang="en-US"><a:hlinkClick r:id="rId2"/></a:rPr><a:t>Docs</a:t></a:r><a:br><a:rPr lang="en-US"/></a:br><a:r><a:rPr lang="en-US"/><a:t>next</a:t></a:r></a:p><a:p><a:pPr><a:buNone/></a:pPr><a:r><a:t>plain</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let xml = slide_xml(sp);
        let shapes = parse(&xml, &link_rels()).unwrap().value;
        let body = shapes[0].text_body().unwrap();

        let first = &body.paragraphs[0];
        assert_eq!(first.properties.level, Some(1));
        assert_eq!(first.properties.bullet, BulletStyle::Char("-".to_string()));
        assert_eq!(first.runs[0].hyperlink.as_deref(), Some("https://example.com"));
        assert!(first.runs[1].line_break);
        assert_eq!(first.plain_text(), "Docs\nnext");

        assert_eq!(body.paragraphs[1].properties.bullet, BulletStyle::None);
    }

    #[test]
    fn test_shape_level_click_and_alt_text() {
        let pic = r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3" descr="Company logo"><a:hlinkClick r:id="rId2"/></p:cNvPr><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="10" cy="10"/></a:xfrm><a:extLst><a:ext uri="{X}"/></a:extLst></p:spPr></p:pic>"#;
        let xml = slide_xml(pic);
        let shapes = parse(&xml, &link_rels()).unwrap().value;
        let shape = &shapes[0];
        assert_eq!(shape.hyperlink.as_deref(), Some("https://example.com"));
        assert_eq!(shape.alt_text.as_deref(), Some("Company logo"));
        assert_eq!(shape.bounds, Some(Rect::new(0, 0, 10, 10)));
        assert!(matches!(shape.kind, ShapeKind::Picture(_)));
    }

    #[test]
    fn test_smartart_frame_is_decoration() {
        let frame = r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="6" name="Diagram 5"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/diagram"><dgm:relIds xmlns:dgm="http://schemas.openxmlformats.org/drawingml/2006/diagram" r:dm="rId3" r:lo="rId4" r:qs="rId5" r:cs="rId6"/></a:graphicData></a:graphic></p:graphicFrame>"#;
        let xml = slide_xml(frame);
        let extracted = parse(&xml, &Relationships::new()).unwrap();
        assert!(extracted.is_clean());
        assert_eq!(extracted.value.len(), 1);
        assert!(matches!(extracted.value[0].kind, ShapeKind::Decoration));
    }

    #[test]
    fn test_table_frame() {
        let frame = r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="5" name="Table 4"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1"/><a:tblGrid><a:gridCol w="1"/></a:tblGrid><a:tr h="1"><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>Name</a:t></a:r></a:p></a:txBody></a:tc><a:tc gridSpan="2"><a:txBody><a:bodyPr/><a:p><a:r><a:t>Value</a:t></a:r></a:p></a:txBody></a:tc><a:tc hMerge="1"><a:txBody><a:bodyPr/><a:p/></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#;
        let xml = slide_xml(frame);
        let shapes = parse(&xml, &Relationships::new()).unwrap().value;
        let ShapeKind::Table(table) = &shapes[0].kind else {
            panic!("expected table, got {:?}", shapes[0].kind);
        };
        assert!(table.first_row_header);
        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.rows[0].cells[1].colspan, 2);
        assert!(table.rows[0].cells[2].merged);
        assert_eq!(table.plain_text(), "Name\tValue\t");
    }

    #[test]
    fn test_group_children() {
        let group = format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="10" name="Group 9"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="5" y="6"/><a:ext cx="7" cy="8"/><a:chOff x="0" y="0"/><a:chExt cx="7" cy="8"/></a:xfrm></p:grpSpPr>{}<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="12" name="Connector"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr><p:spPr/></p:cxnSp></p:grpSp>"#,
            TITLE
        );
        let xml = slide_xml(&group);
        let shapes = parse(&xml, &Relationships::new()).unwrap().value;
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].bounds, Some(Rect::new(5, 6, 7, 8)));
        let ShapeKind::Group(children) = &shapes[0].kind else {
            panic!("expected group");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[1].kind, ShapeKind::Decoration));
    }

    #[test]
    fn test_malformed_shape_is_skipped() {
        let broken = r#"<p:sp><p:nvSpPr><p:cNvPr id="7" name="Broken"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>Bad &bogus; entity</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let xml = slide_xml(&format!("{}{}", broken, TITLE));
        let shapes = parse(&xml, &Relationships::new()).unwrap();
        assert_eq!(shapes.value.len(), 1);
        assert_eq!(shapes.value[0].name, "Title 1");
        assert_eq!(shapes.diagnostics.len(), 1);
        assert_eq!(shapes.diagnostics[0].location, DiagnosticLocation::Slide(1));
    }

    #[test]
    fn test_malformed_shape_fails_in_strict_mode() {
        let broken = r#"<p:sp><p:nvSpPr><p:cNvPr id="7" name="Broken"/></p:nvSpPr><p:txBody><a:p><a:r><a:t>&bogus;</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let xml = slide_xml(broken);
        let container = OoxmlContainer::from_bytes(empty_zip()).unwrap();
        let rels = Relationships::new();
        let slide_numbers = HashMap::new();
        let options = ParseOptions::default().strict();
        let ctx = SlideContext {
            slide_number: 1,
            container: &container,
            rels: &rels,
            slide_numbers: &slide_numbers,
            options: &options,
        };
        assert!(parse_shape_tree(&xml, &ctx).is_err());
    }
}
