use log::debug;
use std::sync::Arc;

use crate::errors::AppError;
use crate::language_detection::LanguageDetector;
use crate::ocr::OcrEngine;
use crate::pdf::{PageRenderer, SourceDocument, SourcePage};
use crate::script_mapper::map_script;

// @module: Per-page text extraction (native text layer or OCR)

/// Upscale factor applied to both axes before OCR
pub const DEFAULT_RENDER_SCALE: f32 = 2.0;

/// How a page's text was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Read from the page's text layer
    Native,
    /// Recognised from a rendered image of the page
    Ocr,
}

/// Text of one page together with its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub source: TextSource,
    /// OCR script used, for OCR'd pages
    pub script: Option<&'static str>,
}

/// Extracts the text of a page, falling back to OCR for scanned pages
#[derive(Debug, Clone)]
pub struct PageExtractor {
    renderer: Arc<dyn PageRenderer>,
    ocr: Arc<dyn OcrEngine>,
    detector: LanguageDetector,
    render_scale: f32,
}

impl PageExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>, ocr: Arc<dyn OcrEngine>, detector: LanguageDetector) -> Self {
        Self {
            renderer,
            ocr,
            detector,
            render_scale: DEFAULT_RENDER_SCALE,
        }
    }

    pub fn with_render_scale(mut self, render_scale: f32) -> Self {
        self.render_scale = render_scale;
        self
    }

    /// Get the text of `page`
    ///
    /// A non-blank text layer is returned verbatim without touching OCR.
    /// Otherwise the page is rendered, the script is chosen from a language
    /// guess on the (blank) text layer, and the OCR result is returned as is.
    pub async fn extract(&self, document: &SourceDocument, page: &SourcePage) -> Result<ExtractedText, AppError> {
        if page.has_native_text() {
            debug!("Page {}: using native text layer", page.number);
            return Ok(ExtractedText {
                text: page.native_text().to_string(),
                source: TextSource::Native,
                script: None,
            });
        }

        let rendered = self.renderer.render(document, page, self.render_scale).await?;

        // Weak hint: the text layer is blank, so this is mostly the model's default guess
        let hint = self.detector.detect(&[page.native_text()]).await?;
        let script = map_script(hint.name());
        debug!("Page {}: OCR with script {} (hint: {})", page.number, script, hint);

        let text = self.ocr.recognize(rendered.path(), script).await?;

        Ok(ExtractedText {
            text,
            source: TextSource::Ocr,
            script: Some(script),
        })
    }
}
