//! Optional Markdown post-processing behind a trait.
//!
//! An enhancer is an opaque `markdown -> markdown` transform, typically a call to a
//! language model. It runs once per document after assembly; a failure never loses
//! the converted Markdown.

use crate::detect::DocumentFormat;
use crate::error::{Error, Result};

/// What an enhancer knows about the document it is transforming.
#[derive(Debug, Clone)]
pub struct EnhanceContext {
    /// Source file name, if converted from a file
    pub file_name: Option<String>,

    /// Source format
    pub format: DocumentFormat,

    /// Slides or pages in the source
    pub page_count: u32,
}

impl EnhanceContext {
    pub fn new(format: DocumentFormat, page_count: u32) -> Self {
        Self {
            file_name: None,
            format,
            page_count,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// A whole-document Markdown transform.
pub trait MarkdownEnhancer: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Transform the assembled Markdown.
    fn enhance(&self, markdown: &str, context: &EnhanceContext) -> Result<String>;
}

impl<F> MarkdownEnhancer for F
where
    F: Fn(&str, &EnhanceContext) -> Result<String> + Send + Sync,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn enhance(&self, markdown: &str, context: &EnhanceContext) -> Result<String> {
        self(markdown, context)
    }
}

/// Markdown after an enhancement attempt.
#[derive(Debug)]
pub struct Enhanced {
    /// Enhanced Markdown, or the original when enhancement failed
    pub markdown: String,

    /// Why the original was kept
    pub error: Option<Error>,
}

/// Run an enhancer once; on failure or empty output the original Markdown is kept.
pub fn enhance_markdown(
    enhancer: &dyn MarkdownEnhancer,
    markdown: String,
    context: &EnhanceContext,
) -> Enhanced {
    let error = match enhancer.enhance(&markdown, context) {
        Ok(enhanced) if !enhanced.trim().is_empty() => {
            return Enhanced {
                markdown: enhanced,
                error: None,
            }
        }
        Ok(_) => Error::Enhancement(format!("{} returned empty output", enhancer.name())),
        Err(Error::Enhancement(message)) => Error::Enhancement(message),
        Err(e) => Error::Enhancement(format!("{}: {}", enhancer.name(), e)),
    };

    log::warn!("Keeping unenhanced Markdown: {}", error);
    Enhanced {
        markdown,
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EnhanceContext {
        EnhanceContext::new(DocumentFormat::Pptx, 3).with_file_name("deck.pptx")
    }

    struct Failing;

    impl MarkdownEnhancer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn enhance(&self, _markdown: &str, _context: &EnhanceContext) -> Result<String> {
            Err(Error::Other("service unavailable".to_string()))
        }
    }

    #[test]
    fn test_enhancement_applied() {
        let upper = |md: &str, _: &EnhanceContext| -> Result<String> { Ok(md.to_uppercase()) };
        let result = enhance_markdown(&upper, "# title".to_string(), &context());
        assert_eq!(result.markdown, "# TITLE");
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failure_keeps_original() {
        let result = enhance_markdown(&Failing, "# title".to_string(), &context());
        assert_eq!(result.markdown, "# title");
        let error = result.error.unwrap().to_string();
        assert!(error.contains("failing"));
        assert!(error.contains("service unavailable"));
    }

    #[test]
    fn test_empty_output_keeps_original() {
        let blank = |_: &str, _: &EnhanceContext| -> Result<String> { Ok("  \n".to_string()) };
        let result = enhance_markdown(&blank, "# title".to_string(), &context());
        assert_eq!(result.markdown, "# title");
        assert!(matches!(result.error, Some(Error::Enhancement(_))));
    }

    #[test]
    fn test_context_builder() {
        let ctx = context();
        assert_eq!(ctx.file_name.as_deref(), Some("deck.pptx"));
        assert_eq!(ctx.page_count, 3);
        assert_eq!(ctx.format, DocumentFormat::Pptx);
    }
}
