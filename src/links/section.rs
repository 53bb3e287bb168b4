//! The `## Hyperlinks in ...` appendix.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use crate::model::{HyperlinkRecord, Location};

use super::normalize_url;

struct SectionEntry {
    text: String,
    url: String,
    placeholder: bool,
}

/// Render records as a Markdown appendix grouped by slide or page.
///
/// Records with an empty URL or text are skipped. Within one location a URL is listed
/// once (compared case-insensitively); a later record replaces the listed text when its
/// text is longer and contains the old text, or when the old text is a generated label
/// and the new one is not. Returns an empty string when no record carries real text.
pub fn format_hyperlinks_section(links: &[HyperlinkRecord], container: &str) -> String {
    let mut by_location: BTreeMap<Location, Vec<SectionEntry>> = BTreeMap::new();
    let mut index: HashMap<(Location, String), usize> = HashMap::new();

    for link in links {
        let text = link.text.trim();
        if link.url.trim().is_empty() || text.is_empty() {
            continue;
        }

        let url = normalize_url(&link.url);
        let placeholder = link.has_placeholder_text();
        let entries = by_location.entry(link.location).or_default();

        match index.get(&(link.location, url.to_lowercase())) {
            Some(&i) => {
                let existing = &mut entries[i];
                let longer = text.chars().count() > existing.text.chars().count()
                    && text.contains(existing.text.as_str());
                if longer || (existing.placeholder && !placeholder) {
                    existing.text = text.to_string();
                    existing.placeholder = placeholder;
                }
            }
            None => {
                index.insert((link.location, url.to_lowercase()), entries.len());
                entries.push(SectionEntry {
                    text: text.to_string(),
                    url,
                    placeholder,
                });
            }
        }
    }

    let has_real_link = by_location
        .values()
        .flatten()
        .any(|entry| !entry.placeholder);
    if !has_real_link {
        return String::new();
    }

    let mut markdown = format!("\n\n## Hyperlinks in {}\n", container);
    for (location, entries) in &by_location {
        if entries.is_empty() {
            continue;
        }
        let _ = write!(markdown, "\n### {}\n", location);
        for entry in entries {
            let _ = writeln!(markdown, "* [{}]({})", entry.text, entry.url);
        }
    }

    markdown
}
