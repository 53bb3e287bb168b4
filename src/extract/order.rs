//! Reading-order reconstruction for slide shapes.

use regex::Regex;

use crate::model::{
    Presentation, ReadingStrategy, Rect, SemanticRole, Shape, ShapeKind, Slide, SlideSize,
};

/// Minimum title height: 0.2 inch in EMU.
const MIN_TITLE_HEIGHT: i64 = 254_000;

/// Shape-name fragments of footer furniture.
const OTHER_NAME_TERMS: &[&str] = &[
    "slide number",
    "slide_number",
    "page number",
    "page_number",
    "footer",
    "date time",
    "datetime",
];

const TITLE_NAME_TERMS: &[&str] = &["title", "heading", "header"];

const SUBTITLE_NAME_TERMS: &[&str] = &["subtitle", "sub-title", "sub_title"];

/// `7`, `7 / 12`, `Slide 7`, `Page 7`, `7 of 12`.
const SLIDE_NUMBER_TEXT: &str = r"(?i)^(?:\d+|\d+\s*/\s*\d+|slide\s+\d+|page\s+\d+|\d+\s+of\s+\d+)$";

/// Options for reading-order resolution.
#[derive(Debug, Clone)]
pub struct ReadingOrderOptions {
    /// Prefer placeholder/alt-text ordering when the deck carries that metadata
    pub use_accessibility_order: bool,

    /// Fraction of the shorter height two shapes must share to sit in one row
    pub row_overlap: f64,
}

impl ReadingOrderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accessibility_order(mut self, enabled: bool) -> Self {
        self.use_accessibility_order = enabled;
        self
    }

    pub fn with_row_overlap(mut self, overlap: f64) -> Self {
        self.row_overlap = overlap;
        self
    }
}

impl Default for ReadingOrderOptions {
    fn default() -> Self {
        Self {
            use_accessibility_order: true,
            row_overlap: 0.5,
        }
    }
}

/// A shape and its position in reading order.
#[derive(Debug, Clone, Copy)]
pub struct ReadingOrderEntry<'a> {
    pub shape: &'a Shape,

    /// Position of the shape in its parent's shape list
    pub index: usize,

    /// Position in reading order, `0..n`
    pub rank: u32,
}

/// Orders the shapes of a slide, or of one group level.
pub struct ReadingOrderResolver {
    options: ReadingOrderOptions,
    strategy: ReadingStrategy,
    slide_size: SlideSize,
    slide_number_text: Regex,
}

impl ReadingOrderResolver {
    /// Pick the document-level strategy for a presentation.
    pub fn for_presentation(presentation: &Presentation, options: &ReadingOrderOptions) -> Self {
        let strategy = if options.use_accessibility_order
            && presentation.exposes_accessibility_metadata()
        {
            ReadingStrategy::Accessibility
        } else if presentation.has_geometry() {
            ReadingStrategy::Spatial
        } else {
            ReadingStrategy::Enumeration
        };
        Self::with_strategy(strategy, presentation.slide_size, options.clone())
    }

    /// A resolver with a fixed strategy.
    pub fn with_strategy(
        strategy: ReadingStrategy,
        slide_size: SlideSize,
        options: ReadingOrderOptions,
    ) -> Self {
        Self {
            options,
            strategy,
            slide_size,
            slide_number_text: Regex::new(SLIDE_NUMBER_TEXT).unwrap(),
        }
    }

    /// Document-level strategy.
    pub fn strategy(&self) -> ReadingStrategy {
        self.strategy
    }

    pub fn options(&self) -> &ReadingOrderOptions {
        &self.options
    }

    /// Strategy actually usable for a list of sibling shapes.
    ///
    /// Spatial ordering falls back to enumeration when geometry is incomplete.
    pub fn strategy_for(&self, shapes: &[Shape]) -> ReadingStrategy {
        match self.strategy {
            ReadingStrategy::Spatial if !has_usable_geometry(shapes) => {
                ReadingStrategy::Enumeration
            }
            strategy => strategy,
        }
    }

    /// Order one slide, returning the strategy used.
    pub fn resolve_slide<'a>(&self, slide: &'a Slide) -> (ReadingStrategy, Vec<ReadingOrderEntry<'a>>) {
        let strategy = self.strategy_for(&slide.shapes);
        log::debug!(
            "Slide {}: {} shapes in {} order",
            slide.number,
            slide.shapes.len(),
            strategy
        );
        (strategy, self.order_with(strategy, &slide.shapes))
    }

    /// Order sibling shapes with the resolver's strategy.
    pub fn resolve_order<'a>(&self, shapes: &'a [Shape]) -> Vec<ReadingOrderEntry<'a>> {
        self.order_with(self.strategy_for(shapes), shapes)
    }

    fn order_with<'a>(
        &self,
        strategy: ReadingStrategy,
        shapes: &'a [Shape],
    ) -> Vec<ReadingOrderEntry<'a>> {
        let mut indices: Vec<usize> = (0..shapes.len()).collect();

        match strategy {
            ReadingStrategy::Accessibility => {
                let roles: Vec<SemanticRole> = shapes.iter().map(|s| self.role_of(s)).collect();
                indices.sort_by_key(|&i| roles[i].priority());
            }
            ReadingStrategy::Spatial => indices = self.spatial_order(shapes),
            ReadingStrategy::Enumeration => {}
        }

        indices
            .into_iter()
            .enumerate()
            .map(|(rank, index)| ReadingOrderEntry {
                shape: &shapes[index],
                index,
                rank: rank as u32,
            })
            .collect()
    }

    /// Bucket shapes into rows, then read each row left to right with titles first.
    fn spatial_order(&self, shapes: &[Shape]) -> Vec<usize> {
        let mut by_top: Vec<(usize, Rect)> = shapes
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.bounds.map(|b| (i, b)))
            .collect();
        by_top.sort_by_key(|&(i, b)| (b.top(), i));

        let mut rows: Vec<Vec<(usize, Rect)>> = Vec::new();
        for (index, bounds) in by_top {
            let joins_last = rows.last().is_some_and(|row| {
                let anchor = row[0].1;
                let shorter = anchor.cy.min(bounds.cy).max(0) as f64;
                shorter > 0.0
                    && anchor.vertical_overlap(&bounds) as f64 > self.options.row_overlap * shorter
            });
            match rows.last_mut() {
                Some(row) if joins_last => row.push((index, bounds)),
                _ => rows.push(vec![(index, bounds)]),
            }
        }

        rows.into_iter()
            .flat_map(|mut row| {
                row.sort_by_key(|&(i, b)| (!shapes[i].is_title_placeholder(), b.left(), i));
                row.into_iter().map(|(i, _)| i)
            })
            .collect()
    }

    /// Semantic role of a shape: placeholder type, then name, then content.
    pub fn role_of(&self, shape: &Shape) -> SemanticRole {
        if let Some(role) = shape.placeholder_type().and_then(|p| p.role()) {
            return role;
        }
        if let Some(role) = self.role_from_name(shape) {
            return role;
        }
        if let ShapeKind::Group(children) = &shape.kind {
            return children
                .iter()
                .map(|c| self.role_of(c))
                .min()
                .unwrap_or(SemanticRole::Other);
        }
        self.role_from_content(shape)
    }

    fn role_from_name(&self, shape: &Shape) -> Option<SemanticRole> {
        let name = shape.name.to_lowercase();
        if name.is_empty() {
            return None;
        }
        if OTHER_NAME_TERMS.iter().any(|t| name.contains(t)) {
            return Some(SemanticRole::Other);
        }
        let subtitle = SUBTITLE_NAME_TERMS.iter().any(|t| name.contains(t));
        if !subtitle
            && TITLE_NAME_TERMS.iter().any(|t| name.contains(t))
            && self.is_valid_title(shape)
        {
            return Some(SemanticRole::Title);
        }
        if subtitle {
            return Some(SemanticRole::Subtitle);
        }
        None
    }

    /// A title-named shape that is neither a number nor footer furniture.
    fn is_valid_title(&self, shape: &Shape) -> bool {
        let text = shape.plain_text();
        let text = text.trim();
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        if text.chars().count() <= 3 && text.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        if let Some(bounds) = shape.bounds {
            if self.slide_size.is_footer_zone(&bounds) || bounds.cy < MIN_TITLE_HEIGHT {
                return false;
            }
        }
        true
    }

    fn role_from_content(&self, shape: &Shape) -> SemanticRole {
        match &shape.kind {
            ShapeKind::TextBox(body) | ShapeKind::Placeholder(body) => {
                let text = body.plain_text();
                let text = text.trim();
                if text.is_empty() {
                    return SemanticRole::Other;
                }
                if self.slide_number_text.is_match(text) {
                    return SemanticRole::Other;
                }
                if shape
                    .bounds
                    .is_some_and(|b| self.slide_size.is_footer_zone(&b))
                {
                    return SemanticRole::Other;
                }
                SemanticRole::Content
            }
            ShapeKind::Table(_) | ShapeKind::Chart(_) | ShapeKind::Picture(_) => {
                SemanticRole::Content
            }
            ShapeKind::Group(_) | ShapeKind::Decoration => SemanticRole::Other,
        }
    }
}

/// Every shape has bounds and at least one is not zero-sized.
fn has_usable_geometry(shapes: &[Shape]) -> bool {
    let mut any_sized = false;
    for shape in shapes {
        match shape.bounds {
            None => return false,
            Some(b) if !b.is_empty() => any_sized = true,
            Some(_) => {}
        }
    }
    any_sized || shapes.is_empty()
}
