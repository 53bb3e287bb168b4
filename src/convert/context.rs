//! Per-call conversion state.

use serde::Serialize;

use crate::detect::DocumentFormat;
use crate::enhance::{enhance_markdown, EnhanceContext};
use crate::error::{Diagnostic, Error, Extracted, Result};
use crate::parser::ErrorMode;
use crate::model::Metadata;
use crate::render::{to_json, JsonFormat, RenderResult};

use super::{ConvertOptions, ConvertResult, OutputFormat};

/// State of one conversion: its options and the diagnostics collected so far.
///
/// Created at the start of a call and dropped at its end; nothing is shared between
/// conversions.
pub struct ConversionContext<'a> {
    options: &'a ConvertOptions,
    format: DocumentFormat,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ConversionContext<'a> {
    pub fn new(options: &'a ConvertOptions, format: DocumentFormat) -> Self {
        Self {
            options,
            format,
            diagnostics: Vec::new(),
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        self.options
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the value of an extraction step and keep its diagnostics.
    pub fn absorb<T>(&mut self, extracted: Extracted<T>) -> T {
        let (value, diagnostics) = extracted.into_parts();
        self.diagnostics.extend(diagnostics);
        value
    }

    /// Keep diagnostics produced outside an extraction step.
    pub fn record(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// In strict mode, fail on the first problem collected so far.
    pub fn ensure_strict(&self) -> Result<()> {
        match self.diagnostics.first() {
            Some(first) if self.options.error_mode == ErrorMode::Strict => {
                Err(Error::ShapeExtract(first.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Turn a structured document into the requested output.
    ///
    /// `render` is only called for Markdown output.
    pub fn finish<T, F>(self, structured: &T, metadata: &Metadata, render: F) -> Result<ConvertResult>
    where
        T: Serialize,
        F: FnOnce(&T) -> RenderResult,
    {
        match self.options.output_format {
            OutputFormat::Json => {
                let content = to_json(structured, JsonFormat::Pretty)?;
                Ok(ConvertResult::new(content, metadata.clone())
                    .with_mime_type("application/json")
                    .with_diagnostics(self.diagnostics))
            }
            OutputFormat::Markdown => {
                let rendered = render(structured);
                let mut result = ConvertResult::new(rendered.content, metadata.clone())
                    .with_mime_type("text/markdown");
                if self.options.collect_stats || self.options.render.collect_stats {
                    result = result.with_stats(rendered.stats);
                }

                if let Some(enhancer) = &self.options.enhancer {
                    let mut context = EnhanceContext::new(self.format, metadata.page_count);
                    context.file_name = metadata.file_name.clone();
                    let enhanced = enhance_markdown(enhancer.as_ref(), result.content, &context);
                    result.content = enhanced.markdown;
                    result.enhancement_error = enhanced.error.map(|e| e.to_string());
                }

                Ok(result.with_diagnostics(self.diagnostics))
            }
        }
    }
}
