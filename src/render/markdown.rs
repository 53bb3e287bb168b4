//! Markdown assembly for converted presentations and PDFs.

use std::fmt::Write;

use crate::links::{format_hyperlinks_section, group_runs_by_link, normalize_url};
use crate::model::{
    BlockPayload, CellContent, ChartContent, ContentBlock, ConvertedSlide, FormattedParagraph,
    HyperlinkRecord, ListKind, Metadata, Page, SemanticRole, StructuredDocument,
    StructuredPresentation, TextRun, TextStyle,
};

use super::{ExtractionStats, MetadataStyle, RenderOptions, RenderResult};

/// Values shown per chart series.
const CHART_PREVIEW_VALUES: usize = 5;

/// Promoted headings shorter than this become `##`, longer ones `###`.
const SHORT_HEADING_CHARS: usize = 30;

/// Convert an extracted presentation to Markdown.
pub fn to_markdown(presentation: &StructuredPresentation, options: &RenderOptions) -> String {
    MarkdownAssembler::new(options.clone())
        .render_presentation(presentation)
        .content
}

/// Convert an extracted presentation to Markdown with statistics.
pub fn to_markdown_with_stats(
    presentation: &StructuredPresentation,
    options: &RenderOptions,
) -> RenderResult {
    let options = options.clone().with_stats(true);
    MarkdownAssembler::new(options).render_presentation(presentation)
}

/// Convert an extracted PDF to Markdown.
pub fn pdf_to_markdown(document: &StructuredDocument, options: &RenderOptions) -> String {
    MarkdownAssembler::new(options.clone())
        .render_document(document)
        .content
}

/// Convert an extracted PDF to Markdown with statistics.
pub fn pdf_to_markdown_with_stats(
    document: &StructuredDocument,
    options: &RenderOptions,
) -> RenderResult {
    let options = options.clone().with_stats(true);
    MarkdownAssembler::new(options).render_document(document)
}

/// Assembles metadata, slide or page content and the hyperlink section.
pub struct MarkdownAssembler {
    options: RenderOptions,
    stats: ExtractionStats,
}

impl MarkdownAssembler {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render the selected slides of a presentation.
    pub fn render_presentation(mut self, presentation: &StructuredPresentation) -> RenderResult {
        let mut sections = Vec::new();
        if let Some(header) = self.metadata_header(&presentation.metadata, "Presentation", "Slide") {
            sections.push(header);
        }

        for slide in &presentation.slides {
            if self.options.page_selection.includes(slide.number) {
                sections.push(self.render_slide(slide));
            }
        }

        let links = self.selected_links(&presentation.hyperlinks);
        self.finish(sections, &links, "Presentation", &presentation.metadata)
    }

    /// Render the selected pages of a PDF.
    pub fn render_document(mut self, document: &StructuredDocument) -> RenderResult {
        let metadata = &document.document.metadata;
        let mut sections = Vec::new();
        if let Some(header) = self.metadata_header(metadata, "Document", "Page") {
            sections.push(header);
        }

        for page in &document.document.pages {
            if self.options.page_selection.includes(page.number) {
                sections.push(self.render_page(page));
            }
        }

        let links = self.selected_links(&document.hyperlinks);
        self.finish(sections, &links, "Document", metadata)
    }

    /// Markdown for one converted slide, starting with its marker.
    pub fn render_slide(&mut self, slide: &ConvertedSlide) -> String {
        if self.options.collect_stats {
            self.stats.add_slide();
        }

        let mut parts = Vec::new();
        if self.options.slide_markers {
            parts.push(format!("<!-- Slide {} -->", slide.number));
        }
        for block in &slide.blocks {
            let rendered = self.render_block(block);
            if !rendered.is_empty() {
                parts.push(rendered);
            }
        }
        parts.join("\n\n")
    }

    fn render_page(&mut self, page: &Page) -> String {
        if self.options.collect_stats {
            self.stats.add_slide();
        }

        let mut parts = Vec::new();
        if self.options.slide_markers {
            parts.push(format!("<!-- Page {} -->", page.number));
        }
        for block in &page.blocks {
            let text = block.text.trim();
            if text.is_empty() {
                continue;
            }
            if self.options.collect_stats {
                self.stats.add_block();
            }
            if block.is_heading() {
                let level = block.heading_level.min(6) as usize;
                parts.push(format!("{} {}", "#".repeat(level), text));
            } else {
                parts.push(text.to_string());
            }
        }
        parts.join("\n\n")
    }

    /// Markdown for one content block; empty when the block renders to nothing.
    pub fn render_block(&mut self, block: &ContentBlock) -> String {
        let link = block.hyperlink.as_deref();
        let rendered = match &block.payload {
            BlockPayload::Text { paragraphs } => self.render_text(paragraphs, block.role, link),
            BlockPayload::Table { rows } => {
                let table = self.render_table(rows);
                if self.options.collect_stats && !table.is_empty() {
                    self.stats.add_table();
                }
                table
            }
            BlockPayload::Image { alt_text, target } => {
                if self.options.collect_stats {
                    self.stats.add_image();
                }
                self.render_image(alt_text, target.as_deref(), link)
            }
            BlockPayload::Chart(chart) => render_chart(chart),
            BlockPayload::Group { children } => {
                let content = children
                    .iter()
                    .map(|child| self.render_block(child))
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                // Children count themselves
                return wrap_link(content, link);
            }
        };

        if self.options.collect_stats && !rendered.is_empty() {
            self.stats.add_block();
        }
        rendered
    }

    fn render_text(
        &self,
        paragraphs: &[FormattedParagraph],
        role: SemanticRole,
        link: Option<&str>,
    ) -> String {
        let heading = match role {
            SemanticRole::Title => Some("#"),
            SemanticRole::Subtitle => Some("##"),
            _ => None,
        };

        let mut out = String::new();
        let mut previous_list = false;
        for paragraph in paragraphs {
            let line = match heading {
                Some(prefix) => {
                    let text = self.inline(paragraph, true);
                    if text.is_empty() {
                        continue;
                    }
                    format!("{} {}", prefix, text)
                }
                None => self.paragraph_line(paragraph),
            };
            if line.is_empty() {
                continue;
            }

            let is_list = heading.is_none() && paragraph.list.is_list();
            if !out.is_empty() {
                out.push_str(if heading.is_some() || (previous_list && is_list) {
                    "\n"
                } else {
                    "\n\n"
                });
            }
            out.push_str(&line);
            previous_list = is_list;
        }

        if paragraphs.iter().any(|p| !p.links.is_empty()) {
            return out;
        }
        wrap_link(out, link)
    }

    /// One paragraph with its list or heading prefix.
    fn paragraph_line(&self, paragraph: &FormattedParagraph) -> String {
        let text = self.inline(paragraph, true);
        if text.is_empty() {
            return text;
        }

        match paragraph.list {
            ListKind::Bullet(level) => format!("{}- {}", "  ".repeat(level as usize), text),
            ListKind::Numbered(level) => format!("{}1. {}", "  ".repeat(level as usize), text),
            ListKind::None
                if self.options.promote_heading_candidates && paragraph.heading_candidate =>
            {
                let plain = paragraph.text();
                let prefix = if paragraph.all_caps || plain.trim().chars().count() < SHORT_HEADING_CHARS {
                    "##"
                } else {
                    "###"
                };
                format!("{} {}", prefix, text)
            }
            ListKind::None => text,
        }
    }

    /// Inline Markdown of a paragraph: emphasis and `[text](url)` link groups.
    fn inline(&self, paragraph: &FormattedParagraph, emphasis: bool) -> String {
        let runs = &paragraph.runs;
        let mut out = String::new();
        let mut next = 0;

        for (k, group) in group_runs_by_link(runs).iter().enumerate() {
            push_runs(&mut out, &runs[next..group.runs.start], emphasis);
            let span = paragraph.links.get(k);
            let url = span
                .map(|s| s.record.url.clone())
                .unwrap_or_else(|| normalize_url(&group.url));
            let fallback = span.map(|s| s.record.text.as_str()).unwrap_or("Link");
            out.push_str(&render_link(&runs[group.runs.clone()], &url, fallback, emphasis));
            next = group.runs.end;
        }
        push_runs(&mut out, &runs[next..], emphasis);

        out.trim().to_string()
    }

    fn render_table(&self, rows: &[Vec<CellContent>]) -> String {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return String::new();
        }

        let mut out = String::new();
        for (i, row) in rows.iter().enumerate() {
            out.push('|');
            for column in 0..width {
                let text = row
                    .get(column)
                    .map(|cell| self.cell_text(cell))
                    .unwrap_or_default();
                let _ = write!(out, " {} |", text);
            }
            out.push('\n');

            if i == 0 {
                out.push('|');
                for _ in 0..width {
                    out.push_str(" --- |");
                }
                out.push('\n');
            }
        }

        out.trim_end().to_string()
    }

    fn cell_text(&self, cell: &CellContent) -> String {
        cell.paragraphs
            .iter()
            .map(|p| self.inline(p, true))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .replace('\n', " ")
            .replace('|', "\\|")
    }

    fn render_image(&self, alt_text: &str, target: Option<&str>, link: Option<&str>) -> String {
        let source = match target {
            Some(name) => format!("{}{}", self.options.image_path_prefix, name),
            None => "image".to_string(),
        };
        let image = format!("![{}]({})", escape_link_text(alt_text), source);
        match link {
            Some(url) => format!("[{}]({})", image, url),
            None => image,
        }
    }

    fn metadata_header(&self, metadata: &Metadata, label: &str, count_label: &str) -> Option<String> {
        match self.options.metadata {
            MetadataStyle::None => None,
            MetadataStyle::Comment => Some(metadata.to_comment_block(label, count_label)),
            MetadataStyle::Frontmatter => Some(metadata.to_yaml_frontmatter().trim_end().to_string()),
        }
    }

    fn selected_links(&self, links: &[HyperlinkRecord]) -> Vec<HyperlinkRecord> {
        links
            .iter()
            .filter(|link| self.options.page_selection.includes(link.location.number()))
            .cloned()
            .collect()
    }

    fn finish(
        mut self,
        sections: Vec<String>,
        links: &[HyperlinkRecord],
        container: &str,
        metadata: &Metadata,
    ) -> RenderResult {
        let mut content = sections
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        if self.options.hyperlink_section {
            content.push_str(&format_hyperlinks_section(links, container));
        }
        let content = content.trim().to_string();

        if self.options.collect_stats {
            self.stats.add_links(links.len());
            self.stats.count_text(&content);
        }

        RenderResult::new(content, metadata.clone(), self.stats)
    }
}

/// `**`, `*` or `***` for a style; underline and strikethrough are not rendered.
fn emphasis_marker(style: &TextStyle) -> &'static str {
    match (style.bold, style.italic) {
        (true, true) => "***",
        (true, false) => "**",
        (false, true) => "*",
        (false, false) => "",
    }
}

/// Wrap text in emphasis markers, keeping surrounding whitespace outside them.
fn emphasize(text: &str, marker: &str) -> String {
    let core = text.trim();
    if marker.is_empty() || core.is_empty() {
        return text.to_string();
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];
    format!("{}{}{}{}{}", leading, marker, core, marker, trailing)
}

fn run_text(run: &TextRun) -> &str {
    if run.line_break {
        " "
    } else {
        &run.text
    }
}

fn push_runs(out: &mut String, runs: &[TextRun], emphasis: bool) {
    for run in runs {
        let marker = if emphasis && !run.line_break {
            emphasis_marker(&run.style)
        } else {
            ""
        };
        out.push_str(&emphasize(run_text(run), marker));
    }
}

/// A link group; emphasis shared by every run wraps the link instead of its text.
fn render_link(runs: &[TextRun], url: &str, fallback: &str, emphasis: bool) -> String {
    let text_runs: Vec<&TextRun> = runs.iter().filter(|r| !r.line_break).collect();
    let shared = TextStyle {
        bold: emphasis && !text_runs.is_empty() && text_runs.iter().all(|r| r.style.bold),
        italic: emphasis && !text_runs.is_empty() && text_runs.iter().all(|r| r.style.italic),
        ..Default::default()
    };
    let outer = emphasis_marker(&shared);

    let mut inner = String::new();
    if outer.is_empty() {
        push_runs(&mut inner, runs, emphasis);
    } else {
        runs.iter().for_each(|r| inner.push_str(run_text(r)));
    }

    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    let label = match inner.trim() {
        "" => fallback,
        text => text,
    };

    format!(
        "{}{}[{}]({}){}{}",
        leading,
        outer,
        escape_link_text(label),
        url,
        outer,
        trailing
    )
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

/// Link each line of a block to the shape-level target, keeping list and heading markers
/// outside the link text. Multi-block content and tables are left as is.
fn wrap_link(content: String, link: Option<&str>) -> String {
    match link {
        Some(url)
            if !content.is_empty()
                && !content.contains("\n\n")
                && !content.trim_start().starts_with('|') =>
        {
            content
                .lines()
                .map(|line| link_line(line, url))
                .collect::<Vec<_>>()
                .join("\n")
        }
        _ => content,
    }
}

fn link_line(line: &str, url: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    let (marker, text) = if let Some(text) = body.strip_prefix("- ") {
        ("- ", text)
    } else if let Some(text) = body.strip_prefix("1. ") {
        ("1. ", text)
    } else {
        match body.split_once(' ') {
            Some((hashes, text)) if !hashes.is_empty() && hashes.chars().all(|c| c == '#') => {
                (&body[..hashes.len() + 1], text)
            }
            _ => ("", body),
        }
    };

    if text.trim().is_empty() {
        return line.to_string();
    }
    format!("{}{}[{}]({})", indent, marker, text, url)
}

fn render_chart(chart: &ChartContent) -> String {
    let mut out = format!(
        "**Chart: {}**\n*Chart Type: {}*",
        chart.title.as_deref().unwrap_or("Untitled Chart"),
        chart.chart_type.as_deref().unwrap_or("unknown")
    );

    let named: Vec<&(Option<String>, Vec<String>)> =
        chart.series.iter().filter(|(name, _)| name.is_some()).collect();
    if !chart.categories.is_empty() && !named.is_empty() {
        out.push_str("\n\nData:");
        for (name, values) in named {
            let _ = write!(out, "\n- {}: {}", name.as_deref().unwrap_or_default(), preview(values));
        }
    }

    out
}

fn preview(values: &[String]) -> String {
    let mut shown = values
        .iter()
        .take(CHART_PREVIEW_VALUES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if values.len() > CHART_PREVIEW_VALUES {
        shown.push_str("...");
    }
    shown
}
