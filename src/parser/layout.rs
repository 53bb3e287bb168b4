//! Text geometry for PDF pages.
//!
//! Positions come from interpreting the page content stream: the graphics state
//! matrix (`q`/`Q`/`cm`) and the text and line matrices (`Tm`, `Td`, `TD`, `T*`,
//! `TL`). Glyph widths are not read from the font programs. Each glyph advances
//! by half the effective font size plus character and word spacing, which is
//! close enough to map link rectangles to the words under them.

use std::collections::HashMap;

use lopdf::{Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Estimated glyph advance as a fraction of the font size.
pub const GLYPH_WIDTH_RATIO: f32 = 0.5;

/// An axis-aligned box in PDF user space (y grows upwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a box from two corners in any order.
    pub fn new(xa: f32, ya: f32, xb: f32, yb: f32) -> Self {
        Self {
            x0: xa.min(xb),
            y0: ya.min(yb),
            x1: xa.max(xb),
            y1: ya.max(yb),
        }
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            x0: self.x0 - margin,
            y0: self.y0 - margin,
            x1: self.x1 + margin,
            y1: self.y1 + margin,
        }
    }

    /// Whether two boxes overlap (touching edges count).
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }
}

/// A whitespace-delimited word with its estimated box.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
    /// Baseline of the span the word came from
    pub baseline: f32,
}

/// Sort words top-to-bottom, then left-to-right.
pub fn sort_reading_order(words: &mut [&Word]) {
    words.sort_by(|a, b| {
        let row_a = -(a.baseline.round() as i64);
        let row_b = -(b.baseline.round() as i64);
        row_a
            .cmp(&row_b)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });
}

/// A text span with position and style information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Effective font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
}

impl TextSpan {
    /// Create a new text span; the width defaults to the glyph estimate.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let lower = font_name.to_lowercase();
        let is_bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let is_italic = lower.contains("italic") || lower.contains("oblique");
        let width = text.chars().count() as f32 * font_size * GLYPH_WIDTH_RATIO;

        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
            is_bold,
            is_italic,
        }
    }

    /// Override the width with a measured advance.
    pub fn with_width(mut self, width: f32) -> Self {
        if width > 0.0 {
            self.width = width;
        }
        self
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }

    /// Split the span into words, spreading its width evenly over its characters.
    pub fn words(&self) -> Vec<Word> {
        let chars: Vec<char> = self.text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        let advance = self.width / chars.len() as f32;

        let mut words = Vec::new();
        let mut start: Option<usize> = None;
        for i in 0..=chars.len() {
            let boundary = chars.get(i).map_or(true, |c| c.is_whitespace());
            match (start, boundary) {
                (None, false) => start = Some(i),
                (Some(s), true) => {
                    words.push(Word {
                        text: chars[s..i].iter().collect(),
                        bbox: BBox::new(
                            self.x + s as f32 * advance,
                            self.bottom(),
                            self.x + i as f32 * advance,
                            self.top(),
                        ),
                        baseline: self.y,
                    });
                    start = None;
                }
                _ => {}
            }
        }
        words
    }
}

/// A text line composed of multiple spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
    /// Whether this line appears to be a heading
    pub is_heading: bool,
    /// Detected heading level (1-6, or 0 for non-heading)
    pub heading_level: u8,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted_size: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.len() as f32)
            .sum();
        let font_size = match spans.first() {
            Some(_) if total_chars > 0 => weighted_size / total_chars as f32,
            Some(first) => first.font_size,
            None => 0.0,
        };
        let (x, y) = spans.first().map_or((0.0, 0.0), |s| (s.x, s.y));

        Self {
            spans,
            y,
            x,
            font_size,
            is_heading: false,
            heading_level: 0,
        }
    }

    /// Combined text of all spans.
    ///
    /// A space is inserted where the gap between spans exceeds 20% of a glyph,
    /// except between characters of scripts written without word spaces.
    pub fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - (prev.x + prev.width);

                let char_count = span.text.chars().count();
                let avg_char_width = if char_count > 0 && span.width > 0.0 {
                    span.width / char_count as f32
                } else {
                    span.font_size * GLYPH_WIDTH_RATIO
                };

                let spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                    && span.text.chars().next().is_some_and(is_spaceless_script_char);
                let has_space = prev.text.ends_with([' ', '\u{00A0}'])
                    || span.text.starts_with([' ', '\u{00A0}']);

                if gap > avg_char_width * 0.2 && !spaceless && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        let bold_chars: usize = self
            .spans
            .iter()
            .filter(|s| s.is_bold)
            .map(|s| s.text.len())
            .sum();
        let total_chars: usize = self.spans.iter().map(|s| s.text.len()).sum();
        total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5
    }
}

/// A text block (paragraph or heading).
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub block_type: BlockType,
    /// Heading level (1-6 for headings, 0 otherwise)
    pub heading_level: u8,
}

/// Block type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Paragraph,
    Heading,
}

impl TextBlock {
    /// Create a block, taking the heading level from its heading lines.
    pub fn new(lines: Vec<TextLine>) -> Self {
        let heading_level = lines
            .iter()
            .filter(|l| l.is_heading)
            .map(|l| l.heading_level)
            .min()
            .unwrap_or(0);
        let block_type = if heading_level > 0 {
            BlockType::Heading
        } else {
            BlockType::Paragraph
        };
        Self {
            lines,
            block_type,
            heading_level,
        }
    }

    /// Text of the block, lines joined by a space.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Font size statistics for heading detection.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common)
    pub body_size: f32,
    /// Font sizes larger than body, largest first
    pub heading_sizes: Vec<f32>,
    /// All observed font sizes (0.1pt buckets) with frequency
    pub size_histogram: HashMap<i32, usize>,
}

impl FontStatistics {
    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        let key = (size * 10.0) as i32;
        *self.size_histogram.entry(key).or_insert(0) += 1;
    }

    /// Calculate body size and heading sizes.
    pub fn analyze(&mut self) {
        let Some((&body_key, _)) = self.size_histogram.iter().max_by_key(|(k, count)| (**count, -**k)) else {
            self.body_size = 12.0;
            return;
        };
        self.body_size = body_key as f32 / 10.0;

        let mut larger: Vec<f32> = self
            .size_histogram
            .keys()
            .map(|k| *k as f32 / 10.0)
            .filter(|size| *size > self.body_size + 0.5)
            .collect();
        larger.sort_by(|a, b| b.total_cmp(a));
        self.heading_sizes = larger;
    }

    /// Heading level for a font size (1-6, or 0 for body text).
    pub fn heading_level(&self, font_size: f32) -> u8 {
        if font_size < self.body_size + 1.5 {
            return 0;
        }
        for (i, &heading_size) in self.heading_sizes.iter().enumerate() {
            if font_size >= heading_size - 0.5 {
                return (i + 1).min(6) as u8;
            }
        }
        5
    }
}

/// Layout analyzer for extracting positioned text from PDF pages.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
    font_stats: FontStatistics,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self {
            doc,
            font_stats: FontStatistics::default(),
        }
    }

    /// Font statistics collected so far.
    pub fn font_stats(&self) -> &FontStatistics {
        &self.font_stats
    }

    /// Feed span sizes into the document-wide font statistics.
    pub fn observe(&mut self, spans: &[TextSpan]) {
        for span in spans {
            self.font_stats.add_size(span.font_size);
        }
        self.font_stats.analyze();
    }

    /// Extract text spans from a page with position and font information.
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let fonts = self
            .doc
            .get_page_fonts(*page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let content = self.get_page_content(*page_id)?;
        self.interpret(&content, &fonts)
    }

    /// Extract words with estimated boxes.
    pub fn extract_page_words(&self, page_num: u32) -> Result<Vec<Word>> {
        Ok(self
            .extract_page_spans(page_num)?
            .iter()
            .flat_map(TextSpan::words)
            .collect())
    }

    /// Group spans into lines, top to bottom.
    pub fn lines_from_spans(&self, spans: Vec<TextSpan>) -> Vec<TextLine> {
        let mut spans = spans;
        spans.sort_by(|a, b| b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x)));

        let mut lines: Vec<TextLine> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in spans {
            let tolerance = span.font_size * 0.3;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            lines.push(TextLine::from_spans(current));
        }

        lines
    }

    /// Group spans into paragraph and heading blocks.
    pub fn blocks_from_spans(&self, spans: Vec<TextSpan>) -> Vec<TextBlock> {
        let mut lines = self.lines_from_spans(spans);
        for line in &mut lines {
            let level = self.font_stats.heading_level(line.font_size);
            if level > 0 {
                line.is_heading = true;
                line.heading_level = level;
            }
        }
        self.group_lines_into_blocks(lines)
    }

    fn group_lines_into_blocks(&self, lines: Vec<TextLine>) -> Vec<TextBlock> {
        let avg_spacing = average_line_spacing(&lines);
        let mut blocks = Vec::new();
        let mut current: Vec<TextLine> = Vec::new();

        for line in lines {
            if let Some(prev) = current.last() {
                if should_break_block(prev, &line, avg_spacing) {
                    blocks.push(TextBlock::new(std::mem::take(&mut current)));
                }
            }
            current.push(line);
        }
        if !current.is_empty() {
            blocks.push(TextBlock::new(current));
        }

        blocks
    }

    fn get_page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => {
                    Ok(s.decompressed_content().unwrap_or_else(|_| s.content.clone()))
                }
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in refs {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
        }
        content
    }

    fn interpret(
        &self,
        content: &[u8],
        fonts: &std::collections::BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    ) -> Result<Vec<TextSpan>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut state = TextState::default();
        let mut graphics_stack: Vec<Matrix> = Vec::new();
        let mut font_name = String::new();
        let mut encoding = None;
        let mut in_text_block = false;

        for op in content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => graphics_stack.push(state.ctm),
                "Q" => {
                    if let Some(ctm) = graphics_stack.pop() {
                        state.ctm = ctm;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.ctm = m.multiply(&state.ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    state.begin_text();
                }
                "ET" => in_text_block = false,
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        let font = fonts.get(name.as_slice());
                        font_name = font
                            .and_then(|f| f.get(b"BaseFont").ok())
                            .and_then(|o| o.as_name().ok())
                            .map(|n| String::from_utf8_lossy(n).into_owned())
                            .unwrap_or_else(|| String::from_utf8_lossy(name).into_owned());
                        encoding = font.and_then(|f| f.get_font_encoding(self.doc).ok());
                    }
                    state.font_size = operands.get(1).and_then(get_number).unwrap_or(12.0);
                }
                "TL" => state.leading = operands.first().and_then(get_number).unwrap_or(0.0),
                "Tc" => state.char_spacing = operands.first().and_then(get_number).unwrap_or(0.0),
                "Tw" => state.word_spacing = operands.first().and_then(get_number).unwrap_or(0.0),
                "Tz" => {
                    state.horizontal_scale =
                        operands.first().and_then(get_number).unwrap_or(100.0) / 100.0
                }
                "Td" | "TD" => {
                    let tx = operands.first().and_then(get_number).unwrap_or(0.0);
                    let ty = operands.get(1).and_then(get_number).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.set_matrix(m);
                    }
                }
                "T*" => state.next_line(),
                "Tj" | "'" | "\"" | "TJ" if in_text_block => {
                    if op.operator == "'" || op.operator == "\"" {
                        if op.operator == "\"" {
                            state.word_spacing = operands.first().and_then(get_number).unwrap_or(0.0);
                            state.char_spacing = operands.get(1).and_then(get_number).unwrap_or(0.0);
                        }
                        state.next_line();
                    }

                    let decode = |bytes: &[u8]| -> String {
                        let text = match encoding.as_ref() {
                            Some(enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
                            None => decode_text_simple(bytes),
                        };
                        text.nfc().collect()
                    };

                    let (x, y) = state.position();
                    let size = state.effective_font_size();
                    let (text, advance) = match op.operator.as_str() {
                        "TJ" => match operands.first() {
                            Some(Object::Array(items)) => state.show_array(items, &decode),
                            _ => (String::new(), 0.0),
                        },
                        "\"" => match operands.get(2) {
                            Some(Object::String(bytes, _)) => state.show(&decode(bytes)),
                            _ => (String::new(), 0.0),
                        },
                        _ => match operands.first() {
                            Some(Object::String(bytes, _)) => state.show(&decode(bytes)),
                            _ => (String::new(), 0.0),
                        },
                    };

                    let width = advance * state.horizontal_device_scale();
                    state.advance(advance);

                    if !text.trim().is_empty() {
                        spans.push(TextSpan::new(text, x, y, size, font_name.clone()).with_width(width));
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    curr.is_heading
        || prev.is_heading
        || (prev.y - curr.y).abs() > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

/// A PDF transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::translation(0.0, 0.0)
    }
}

impl Matrix {
    fn translation(e: f32, f: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e,
            f,
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Self {
            a: get_number(&operands[0])?,
            b: get_number(&operands[1])?,
            c: get_number(&operands[2])?,
            d: get_number(&operands[3])?,
            e: get_number(&operands[4])?,
            f: get_number(&operands[5])?,
        })
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn horizontal_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Text state of the content stream interpreter.
#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::default(),
            text_matrix: Matrix::default(),
            line_matrix: Matrix::default(),
            font_size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
        }
    }
}

impl TextState {
    fn begin_text(&mut self) {
        self.text_matrix = Matrix::default();
        self.line_matrix = Matrix::default();
    }

    fn set_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size
        };
        self.move_line(0.0, -leading);
    }

    fn rendering_matrix(&self) -> Matrix {
        self.text_matrix.multiply(&self.ctm)
    }

    fn position(&self) -> (f32, f32) {
        let m = self.rendering_matrix();
        (m.e, m.f)
    }

    fn effective_font_size(&self) -> f32 {
        let scale = self.rendering_matrix().vertical_scale();
        let scale = if scale > 0.0 { scale } else { 1.0 };
        self.font_size * scale
    }

    fn horizontal_device_scale(&self) -> f32 {
        self.rendering_matrix().horizontal_scale()
    }

    /// Text-space advance of a shown string.
    fn text_advance(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| {
                let mut w = self.font_size * GLYPH_WIDTH_RATIO + self.char_spacing;
                if c == ' ' {
                    w += self.word_spacing;
                }
                w * self.horizontal_scale
            })
            .sum()
    }

    fn show(&self, text: &str) -> (String, f32) {
        (text.to_string(), self.text_advance(text))
    }

    /// `TJ` array: strings and kerning adjustments in thousandths of text space.
    ///
    /// Adjustments wider than 0.2 em become a space.
    fn show_array(&self, items: &[Object], decode: &dyn Fn(&[u8]) -> String) -> (String, f32) {
        let mut combined = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let text = decode(bytes);
                    advance += self.text_advance(&text);
                    combined.push_str(&text);
                }
                other => {
                    if let Some(n) = get_number(other) {
                        advance -= n / 1000.0 * self.font_size * self.horizontal_scale;
                        let ends_spaced = combined.ends_with([' ', '\u{00A0}']);
                        let spaceless = combined.chars().last().is_some_and(is_spaceless_script_char);
                        if -n > 200.0 && !combined.is_empty() && !ends_spaced && !spaceless {
                            combined.push(' ');
                        }
                    }
                }
            }
        }

        (combined, advance)
    }

    fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts written without spaces between words (Chinese, Japanese).
///
/// Hangul is not included: Korean uses word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Decoding fallback when the font has no usable encoding.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
