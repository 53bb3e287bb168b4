//! Slide shape tree.
//!
//! Every direct child of a slide's `p:spTree` becomes a [`Shape`]. The kind of
//! content a shape carries is fixed at parse time as a [`ShapeKind`] variant, so
//! downstream stages dispatch by pattern matching rather than probing for
//! capabilities.

use serde::{Deserialize, Serialize};

use super::{Chart, Paragraph, Table};

/// Bounding box of a shape in EMU (`a:off` / `a:ext`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    /// Create a rectangle from offset and extent.
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    pub fn left(&self) -> i64 {
        self.x
    }

    pub fn top(&self) -> i64 {
        self.y
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.cy
    }

    pub fn right(&self) -> i64 {
        self.x + self.cx
    }

    /// Whether the box has no area.
    pub fn is_empty(&self) -> bool {
        self.cx <= 0 || self.cy <= 0
    }

    /// Length of the vertical overlap with another box (0 when disjoint).
    pub fn vertical_overlap(&self, other: &Rect) -> i64 {
        let top = self.top().max(other.top());
        let bottom = self.bottom().min(other.bottom());
        (bottom - top).max(0)
    }
}

/// Placeholder type (`p:ph type`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderType {
    Title,
    CenteredTitle,
    Subtitle,
    Body,
    Object,
    Table,
    Chart,
    Media,
    Picture,
    SlideNumber,
    Footer,
    Date,
    Other(String),
}

impl PlaceholderType {
    /// Parse the `type` attribute of `p:ph`. A missing type means `obj`.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.unwrap_or("obj") {
            "title" => PlaceholderType::Title,
            "ctrTitle" => PlaceholderType::CenteredTitle,
            "subTitle" => PlaceholderType::Subtitle,
            "body" => PlaceholderType::Body,
            "obj" => PlaceholderType::Object,
            "tbl" => PlaceholderType::Table,
            "chart" => PlaceholderType::Chart,
            "media" | "clipArt" => PlaceholderType::Media,
            "pic" => PlaceholderType::Picture,
            "sldNum" => PlaceholderType::SlideNumber,
            "ftr" => PlaceholderType::Footer,
            "dt" => PlaceholderType::Date,
            other => PlaceholderType::Other(other.to_string()),
        }
    }

    /// Whether this is a title placeholder.
    pub fn is_title(&self) -> bool {
        matches!(self, PlaceholderType::Title | PlaceholderType::CenteredTitle)
    }

    /// Whether paragraphs in this placeholder are bulleted by the master by default.
    pub fn has_master_bullets(&self) -> bool {
        matches!(self, PlaceholderType::Body | PlaceholderType::Object)
    }

    /// Semantic role implied by the placeholder type, if any.
    pub fn role(&self) -> Option<SemanticRole> {
        match self {
            PlaceholderType::SlideNumber | PlaceholderType::Footer | PlaceholderType::Date => {
                Some(SemanticRole::Other)
            }
            PlaceholderType::Title | PlaceholderType::CenteredTitle => Some(SemanticRole::Title),
            PlaceholderType::Subtitle => Some(SemanticRole::Subtitle),
            PlaceholderType::Body
            | PlaceholderType::Object
            | PlaceholderType::Table
            | PlaceholderType::Chart
            | PlaceholderType::Media
            | PlaceholderType::Picture => Some(SemanticRole::Content),
            PlaceholderType::Other(_) => None,
        }
    }
}

/// A placeholder reference (`p:nvPr/p:ph`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub kind: PlaceholderType,
    pub idx: Option<u32>,
}

/// Semantic role of a shape in reading order, ordered by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    Title,
    Subtitle,
    Content,
    Other,
}

impl SemanticRole {
    /// Sort priority (lower reads first).
    pub fn priority(&self) -> u8 {
        match self {
            SemanticRole::Title => 1,
            SemanticRole::Subtitle => 2,
            SemanticRole::Content => 3,
            SemanticRole::Other => 4,
        }
    }
}

/// Text body of a shape (`p:txBody`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub paragraphs: Vec<Paragraph>,
}

impl TextBody {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Paragraph texts joined by newlines, trimmed.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(|p| p.is_empty())
    }
}

/// Embedded picture reference (`a:blip r:embed`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Package part of the image, e.g. `ppt/media/image1.png`
    pub part: Option<String>,
}

impl ImageRef {
    /// File name of the embedded media, if known.
    pub fn file_name(&self) -> Option<&str> {
        self.part
            .as_deref()
            .and_then(|p| p.rsplit('/').next())
            .filter(|n| !n.is_empty())
    }
}

/// Content-bearing kind of a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Free text box or autoshape with text
    TextBox(TextBody),
    /// Placeholder with a text body
    Placeholder(TextBody),
    /// Table graphic frame
    Table(Table),
    /// Group of shapes in group-local coordinates
    Group(Vec<Shape>),
    /// Picture
    Picture(ImageRef),
    /// Chart graphic frame
    Chart(Chart),
    /// Lines, connectors and empty autoshapes
    Decoration,
}

/// A shape on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// `cNvPr id`
    pub id: Option<u32>,

    /// `cNvPr name`
    pub name: String,

    /// Bounding box, inherited from the layout for placeholders without `a:xfrm`
    pub bounds: Option<Rect>,

    /// Placeholder reference
    pub placeholder: Option<Placeholder>,

    /// Shape-level click hyperlink (`cNvPr/a:hlinkClick`)
    pub hyperlink: Option<String>,

    /// Alternative text (`cNvPr descr`, falling back to `title`)
    pub alt_text: Option<String>,

    pub kind: ShapeKind,
}

impl Shape {
    /// Create a shape of the given kind with no geometry or metadata.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: None,
            name: String::new(),
            bounds: None,
            placeholder: None,
            hyperlink: None,
            alt_text: None,
            kind,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_placeholder(mut self, kind: PlaceholderType) -> Self {
        self.placeholder = Some(Placeholder { kind, idx: None });
        self
    }

    pub fn with_hyperlink(mut self, url: impl Into<String>) -> Self {
        self.hyperlink = Some(url.into());
        self
    }

    pub fn with_alt_text(mut self, alt: impl Into<String>) -> Self {
        self.alt_text = Some(alt.into());
        self
    }

    /// Placeholder type, if this shape is a placeholder.
    pub fn placeholder_type(&self) -> Option<&PlaceholderType> {
        self.placeholder.as_ref().map(|p| &p.kind)
    }

    /// Whether this shape is a title placeholder.
    pub fn is_title_placeholder(&self) -> bool {
        self.placeholder_type().is_some_and(|p| p.is_title())
    }

    /// Text body, for text boxes and placeholders.
    pub fn text_body(&self) -> Option<&TextBody> {
        match &self.kind {
            ShapeKind::TextBox(body) | ShapeKind::Placeholder(body) => Some(body),
            _ => None,
        }
    }

    /// Visible text of the shape, including table cells and group children.
    pub fn plain_text(&self) -> String {
        match &self.kind {
            ShapeKind::TextBox(body) | ShapeKind::Placeholder(body) => body.plain_text(),
            ShapeKind::Table(table) => table.plain_text().trim().to_string(),
            ShapeKind::Group(children) => children
                .iter()
                .map(|c| c.plain_text())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            ShapeKind::Chart(chart) => chart.title_text().unwrap_or_default(),
            ShapeKind::Picture(_) | ShapeKind::Decoration => String::new(),
        }
    }

    /// Alt text worth showing to a reader, if any.
    pub fn meaningful_alt_text(&self) -> Option<&str> {
        self.alt_text
            .as_deref()
            .map(str::trim)
            .filter(|alt| is_meaningful_alt_text(alt))
    }

    /// Whether the shape or any descendant carries a placeholder or alt text.
    pub fn has_accessibility_metadata(&self) -> bool {
        if self.placeholder.is_some() || self.alt_text.as_deref().is_some_and(|a| !a.is_empty()) {
            return true;
        }
        match &self.kind {
            ShapeKind::Group(children) => children.iter().any(|c| c.has_accessibility_metadata()),
            _ => false,
        }
    }

    /// Short kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ShapeKind::TextBox(_) => "text box",
            ShapeKind::Placeholder(_) => "placeholder",
            ShapeKind::Table(_) => "table",
            ShapeKind::Group(_) => "group",
            ShapeKind::Picture(_) => "picture",
            ShapeKind::Chart(_) => "chart",
            ShapeKind::Decoration => "decoration",
        }
    }
}

/// Generic words tools and authors put in alt text that say nothing about the image.
const GENERIC_ALT_WORDS: &[&str] = &["image", "picture", "img", "graphic", "shape", "photo", "diagram"];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg", "webp"];

/// Reject empty, numeric, very short and auto-generated alt text (`image3.png`, `Picture 2`,
/// `slide1image1`).
pub fn is_meaningful_alt_text(alt: &str) -> bool {
    let alt = alt.trim();
    let len = alt.chars().count();
    if len < 3 {
        return false;
    }

    let lower = alt.to_lowercase();
    if lower.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if len == 3 && lower.chars().all(|c| c.is_ascii_lowercase()) {
        return false;
    }

    let stem = match lower.rsplit_once('.') {
        Some((stem, ext)) if IMAGE_EXTENSIONS.contains(&ext) => stem,
        _ => lower.as_str(),
    };
    let stem = stem.trim_end_matches(|c: char| c.is_ascii_digit() || c == ' ' || c == '_');
    let stem = match stem.strip_prefix("slide") {
        Some(rest) => rest.trim_start_matches(|c: char| c.is_ascii_digit()),
        None => stem,
    };

    !GENERIC_ALT_WORDS.contains(&stem)
}
