//! JSON rendering of extracted documents.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize an extracted document (or any model value) to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BlockPayload, ContentBlock, ConvertedSlide, HyperlinkRecord, Location,
        StructuredPresentation,
    };

    fn sample() -> StructuredPresentation {
        let mut presentation = StructuredPresentation::default();
        presentation.metadata.title = Some("Test".to_string());
        presentation.slides.push(ConvertedSlide {
            number: 1,
            blocks: vec![ContentBlock::new(
                1,
                0,
                BlockPayload::Image {
                    alt_text: "Logo".to_string(),
                    target: None,
                },
            )],
            ..Default::default()
        });
        presentation
            .hyperlinks
            .push(HyperlinkRecord::new("Docs", "https://a.io", Location::Slide(1)));
        presentation
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\""));
        assert!(json.contains("\"type\": \"image\""));
        assert!(json.contains("https://a.io"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }
}
