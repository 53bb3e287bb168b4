//! Paragraph analysis: list detection, prefix stripping and heading hints.

use regex::Regex;

use crate::links::{group_runs_by_link, normalize_url};
use crate::model::{
    BulletStyle, FormattedParagraph, HyperlinkRecord, LinkSpan, ListKind, Location, Paragraph,
    TextBody, TextRun,
};

/// Glyphs authors type by hand to start a bullet.
pub const BULLET_GLYPHS: &str = "•◦▪▫‣·○■□→►✓✗-*+※◆◇";

/// Deepest list level kept.
const MAX_LIST_LEVEL: u8 = 6;

/// `1.`, `2)`, `a.`, `B)`, `iv.`, `XII)` followed by whitespace.
const NUMBERED_PREFIX: &str = r"^(?:\d+|[a-zA-Z]|[ivxlcdm]+|[IVXLCDM]+)[.)]\s+";

/// Paragraph-level formatting decisions for a slide text body.
pub struct TextFormatter {
    numbered_prefix: Regex,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self {
            numbered_prefix: Regex::new(NUMBERED_PREFIX).unwrap(),
        }
    }

    /// Analyze every non-empty paragraph of a body.
    ///
    /// `inherit_bullets` is set for body and object placeholders, whose paragraphs
    /// take the master's bullets unless they say otherwise.
    pub fn analyze_body(
        &self,
        body: &TextBody,
        slide: u32,
        inherit_bullets: bool,
    ) -> Vec<FormattedParagraph> {
        body.paragraphs
            .iter()
            .filter_map(|p| self.analyze_paragraph(p, slide, inherit_bullets))
            .collect()
    }

    /// Decide the list kind, strip typed list prefixes and flag heading candidates.
    ///
    /// Returns `None` for paragraphs without visible text.
    pub fn analyze_paragraph(
        &self,
        paragraph: &Paragraph,
        slide: u32,
        inherit_bullets: bool,
    ) -> Option<FormattedParagraph> {
        let raw = paragraph.plain_text();
        if raw.trim().is_empty() {
            return None;
        }

        let level = paragraph.properties.level.unwrap_or(0).min(MAX_LIST_LEVEL);
        let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
        let trimmed = raw.trim_start();

        let (list, strip) = match &paragraph.properties.bullet {
            BulletStyle::None => (ListKind::None, 0),
            BulletStyle::Char(_) => (ListKind::Bullet(level), manual_bullet_len(trimmed)),
            BulletStyle::AutoNumber(_) => (ListKind::Numbered(level), 0),
            BulletStyle::Inherit if inherit_bullets => {
                (ListKind::Bullet(level), manual_bullet_len(trimmed))
            }
            BulletStyle::Inherit => {
                if let Some(glyph) = starts_with_bullet_glyph(trimmed) {
                    let manual_level = ((leading / 2) as u8).min(MAX_LIST_LEVEL);
                    (ListKind::Bullet(manual_level), glyph)
                } else if let Some(prefix) = self.numbered_prefix.find(trimmed) {
                    (ListKind::Numbered(level), prefix.as_str().chars().count())
                } else {
                    (ListKind::None, 0)
                }
            }
        };

        let runs = if strip > 0 {
            strip_leading_chars(&paragraph.runs, leading + strip)
        } else {
            paragraph.runs.clone()
        };
        let runs = merge_runs(runs);

        let text: String = runs
            .iter()
            .map(|r| if r.line_break { " " } else { r.text.as_str() })
            .collect();
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let links = link_spans(&runs, slide);

        Some(FormattedParagraph {
            heading_candidate: !list.is_list() && is_heading_candidate(text),
            all_caps: is_all_caps(text),
            list,
            runs,
            links,
        })
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Length in chars of a leading bullet glyph plus the whitespace after it.
fn starts_with_bullet_glyph(text: &str) -> Option<usize> {
    let first = text.chars().next()?;
    if !BULLET_GLYPHS.contains(first) {
        return None;
    }
    let spaces = text
        .chars()
        .skip(1)
        .take_while(|c| c.is_whitespace())
        .count();
    Some(1 + spaces)
}

fn manual_bullet_len(text: &str) -> usize {
    starts_with_bullet_glyph(text).unwrap_or(0)
}

/// Short, unpunctuated or shouting text that may be a heading.
pub fn is_heading_candidate(text: &str) -> bool {
    let text = text.trim();
    let len = text.chars().count();
    if text.is_empty() || len > 150 {
        return false;
    }
    if is_all_caps(text) && len > 2 {
        return true;
    }
    len < 80 && !text.ends_with(['.', '!', '?', ';', ':', ','])
}

/// At least one cased letter and no lowercase letters.
pub fn is_all_caps(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Drop `count` chars from the start of the runs' combined text.
fn strip_leading_chars(runs: &[TextRun], count: usize) -> Vec<TextRun> {
    let mut remaining = count;
    let mut out = Vec::with_capacity(runs.len());

    for run in runs {
        if remaining == 0 {
            out.push(run.clone());
            continue;
        }
        let len = if run.line_break {
            1
        } else {
            run.text.chars().count()
        };
        if len <= remaining {
            remaining -= len;
            continue;
        }
        let mut run = run.clone();
        run.text = run.text.chars().skip(remaining).collect();
        remaining = 0;
        out.push(run);
    }

    out
}

/// Merge adjacent runs with the same style and target.
fn merge_runs(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut merged: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last)
                if !last.line_break
                    && !run.line_break
                    && last.style == run.style
                    && last.hyperlink == run.hyperlink =>
            {
                last.text.push_str(&run.text);
            }
            _ => merged.push(run),
        }
    }
    merged
}

fn link_spans(runs: &[TextRun], slide: u32) -> Vec<LinkSpan> {
    group_runs_by_link(runs)
        .into_iter()
        .map(|group| {
            let url = normalize_url(&group.url);
            let text = group.text.trim();
            let record = if text.is_empty() {
                HyperlinkRecord::synthesized(
                    format!("Link on Slide {}", slide),
                    url,
                    Location::Slide(slide),
                )
            } else {
                HyperlinkRecord::new(text, url, Location::Slide(slide))
            };
            LinkSpan {
                start: group.chars.start,
                end: group.chars.end,
                record,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextStyle;

    fn analyze(p: &Paragraph) -> FormattedParagraph {
        TextFormatter::new().analyze_paragraph(p, 1, false).unwrap()
    }

    #[test]
    fn test_manual_bullet_is_stripped() {
        let p = Paragraph::with_text("    • Revenue grew");
        let f = analyze(&p);
        assert_eq!(f.list, ListKind::Bullet(2));
        assert_eq!(f.text(), "Revenue grew");
        assert!(!f.heading_candidate);
    }

    #[test]
    fn test_manual_bullet_across_runs() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::new("- "));
        p.add_run(TextRun::bold("Key"));
        p.add_run(TextRun::new(" point"));
        let f = analyze(&p);
        assert_eq!(f.list, ListKind::Bullet(0));
        assert_eq!(f.runs.len(), 2);
        assert!(f.runs[0].style.bold);
        assert_eq!(f.text(), "Key point");
    }

    #[test]
    fn test_numbered_prefixes() {
        for text in ["1. First", "2) First", "b. First", "iv) First", "XII. First"] {
            let f = analyze(&Paragraph::with_text(text));
            assert_eq!(f.list, ListKind::Numbered(0), "{}", text);
            assert_eq!(f.text(), "First");
        }
        assert_eq!(analyze(&Paragraph::with_text("2024 results")).list, ListKind::None);
    }

    #[test]
    fn test_explicit_bullets() {
        let p = Paragraph::with_text("Item")
            .with_bullet(BulletStyle::Char("•".to_string()))
            .with_level(1);
        assert_eq!(analyze(&p).list, ListKind::Bullet(1));

        let p = Paragraph::with_text("Step").with_bullet(BulletStyle::AutoNumber("arabicPeriod".to_string()));
        assert_eq!(analyze(&p).list, ListKind::Numbered(0));

        let p = Paragraph::with_text("• not a bullet").with_bullet(BulletStyle::None);
        let f = analyze(&p);
        assert_eq!(f.list, ListKind::None);
        assert_eq!(f.text(), "• not a bullet");
    }

    #[test]
    fn test_inherited_bullets() {
        let p = Paragraph::with_text("Body point").with_level(2);
        let f = TextFormatter::new().analyze_paragraph(&p, 1, true).unwrap();
        assert_eq!(f.list, ListKind::Bullet(2));
    }

    #[test]
    fn test_heading_candidates() {
        assert!(is_heading_candidate("Quarterly Results"));
        assert!(is_heading_candidate("WARNING: READ THIS FIRST."));
        assert!(!is_heading_candidate("This sentence ends with a period."));
        assert!(!is_heading_candidate(&"x".repeat(151)));
        assert!(!is_heading_candidate(&format!("{} words", "long ".repeat(20))));
        assert!(is_all_caps("Q3 REVENUE"));
        assert!(!is_all_caps("123"));
    }

    #[test]
    fn test_runs_are_merged() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::new("Hello "));
        p.add_run(TextRun::new("world"));
        p.add_run(TextRun::new("!").with_style(TextStyle {
            italic: true,
            ..Default::default()
        }));
        let f = analyze(&p);
        assert_eq!(f.runs.len(), 2);
        assert_eq!(f.runs[0].text, "Hello world");
    }

    #[test]
    fn test_link_spans() {
        let mut p = Paragraph::new();
        p.add_run(TextRun::new("Visit "));
        p.add_run(TextRun::bold("Hello").with_hyperlink("example.com"));
        let f = analyze(&p);
        assert_eq!(f.links.len(), 1);
        assert_eq!((f.links[0].start, f.links[0].end), (6, 11));
        assert_eq!(f.links[0].record.url, "https://example.com");
        assert_eq!(f.links[0].record.text, "Hello");
    }

    #[test]
    fn test_empty_paragraph() {
        assert!(TextFormatter::new()
            .analyze_paragraph(&Paragraph::with_text("  "), 1, false)
            .is_none());
        assert!(TextFormatter::new()
            .analyze_paragraph(&Paragraph::with_text("•  "), 1, false)
            .is_none());
    }
}
