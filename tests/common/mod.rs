//! In-memory PPTX and PDF fixtures for the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// One slide: its shape XML and the external hyperlinks its shapes reference.
#[derive(Default)]
pub struct SlideFixture {
    shapes: Vec<String>,
    links: Vec<(String, String)>,
}

impl SlideFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, xml: impl Into<String>) -> Self {
        self.shapes.push(xml.into());
        self
    }

    /// Declare an external hyperlink relationship.
    pub fn link(mut self, rel_id: &str, url: &str) -> Self {
        self.links.push((rel_id.to_string(), url.to_string()));
        self
    }

    fn xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            NS,
            self.shapes.concat()
        )
    }

    fn rels(&self) -> String {
        let entries: String = self
            .links
            .iter()
            .map(|(id, url)| {
                format!(
                    r#"<Relationship Id="{}" Type="{}" Target="{}" TargetMode="External"/>"#,
                    id, REL_HYPERLINK, url
                )
            })
            .collect();
        rels_xml(&entries)
    }
}

/// Builds a minimal presentation package.
#[derive(Default)]
pub struct PptxBuilder {
    slides: Vec<SlideFixture>,
    title: Option<String>,
}

impl PptxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slide(mut self, slide: SlideFixture) -> Self {
        self.slides.push(slide);
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut put = |name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        put(
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        );

        let ids: String = (1..=self.slides.len())
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i))
            .collect();
        put(
            "ppt/presentation.xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#,
                NS, ids
            ),
        );

        let slide_rels: String = (1..=self.slides.len())
            .map(|i| {
                format!(
                    r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
                    i, REL_SLIDE, i
                )
            })
            .collect();
        put("ppt/_rels/presentation.xml.rels", &rels_xml(&slide_rels));

        for (i, slide) in self.slides.iter().enumerate() {
            put(&format!("ppt/slides/slide{}.xml", i + 1), &slide.xml());
            put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
                &slide.rels(),
            );
        }

        if let Some(title) = &self.title {
            put(
                "docProps/core.xml",
                &format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title><dc:creator>Tester</dc:creator></cp:coreProperties>"#,
                    title
                ),
            );
        }

        zip.finish().unwrap().into_inner()
    }

    /// Write the package into `dir` and return its path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

fn rels_xml(entries: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        entries
    )
}

fn xfrm(x: i64, y: i64, cx: i64, cy: i64) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        x, y, cx, cy
    )
}

/// A title placeholder at vertical offset `y`.
pub fn title_shape(id: u32, text: &str, y: i64) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Title {}"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id,
        id,
        xfrm(457200, y, 8229600, 1143000),
        text
    )
}

/// A text box at `(x, y)` holding the given `<a:p>` paragraphs.
pub fn text_box(id: u32, name: &str, x: i64, y: i64, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
        id,
        name,
        xfrm(x, y, 4000000, 800000),
        paragraphs
    )
}

/// A text box whose whole shape is a click target.
pub fn linked_box(id: u32, rel_id: &str, x: i64, y: i64, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Button {}"><a:hlinkClick r:id="{}"/></p:cNvPr><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{}</p:spPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
        id,
        id,
        rel_id,
        xfrm(x, y, 2000000, 600000),
        paragraphs
    )
}

/// A paragraph of plain text.
pub fn para(text: &str) -> String {
    format!(r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p>"#, text)
}

/// A run linked through relationship `rel_id`.
pub fn linked_run(text: &str, rel_id: &str, bold: bool) -> String {
    format!(
        r#"<a:r><a:rPr lang="en-US"{}><a:hlinkClick r:id="{}"/></a:rPr><a:t>{}</a:t></a:r>"#,
        if bold { r#" b="1""# } else { "" },
        rel_id,
        text
    )
}

/// A shape whose text cannot be decoded.
pub fn broken_shape(id: u32) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Broken"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>Bad &bogus; entity</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id
    )
}

/// A link annotation rectangle and target URI.
pub struct PdfLink {
    pub rect: [i64; 4],
    pub uri: String,
}

impl PdfLink {
    pub fn new(rect: [i64; 4], uri: &str) -> Self {
        Self {
            rect,
            uri: uri.to_string(),
        }
    }
}

/// A PDF whose pages each hold one line of Helvetica text at (72, 700) and optional links.
pub fn pdf_bytes(pages: &[(&str, Vec<PdfLink>)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for (text, links) in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let annots: Vec<Object> = links
            .iter()
            .map(|link| {
                doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => link.rect.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
                    "A" => dictionary! { "S" => "URI", "URI" => Object::string_literal(link.uri.as_str()) },
                })
                .into()
            })
            .collect();

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Annots" => annots,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write a PDF into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, pages: &[(&str, Vec<PdfLink>)]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, pdf_bytes(pages)).unwrap();
    path
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}
