/*!
 * Document pipeline: extract, detect, translate and reassemble.
 *
 * Pages are processed strictly in document order. Translation failures are
 * absorbed page by page; every other failure aborts the run before anything
 * is written to the destination.
 */

use anyhow::{Context, Result};
use bytes::Bytes;
use log::{debug, info};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::language_detection::{load_code_overrides, LanguageDetector, ModelHandle, ModelSource};
use crate::language_utils::{DetectedLanguage, Language, DEFAULT_TARGET};
use crate::ocr::TesseractEngine;
use crate::page_extractor::{PageExtractor, TextSource};
use crate::pdf::{PdftoppmRenderer, Reassembler, SourceDocument};
use crate::providers::libretranslate::LibreTranslate;
use crate::translation::{TranslationOutcome, Translator};

/// Stage of a run reported to progress observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Extraction,
    Translation,
    Reassembly,
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelinePhase::Extraction => "Extracting",
            PipelinePhase::Translation => "Translating",
            PipelinePhase::Reassembly => "Rebuilding",
        };
        write!(f, "{}", label)
    }
}

/// What happened during one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages in both the source and the output
    pub page_count: usize,
    /// Pages whose text came from OCR
    pub ocr_pages: usize,
    /// Pages translated by the backend
    pub translated_pages: usize,
    /// Pages passed through without a request
    pub unchanged_pages: usize,
    /// Pages kept in the original language after a backend failure
    pub fallback_pages: usize,
    /// Dominant language of the document
    pub detected_language: DetectedLanguage,
    /// Language the document was translated to
    pub target_language: Language,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} page(s), {} -> {}: {} translated, {} unchanged, {} fallback, {} OCR",
            self.page_count,
            self.detected_language,
            self.target_language,
            self.translated_pages,
            self.unchanged_pages,
            self.fallback_pages,
            self.ocr_pages
        )
    }
}

/// Sequences extraction, detection, translation and reassembly
#[derive(Debug, Clone)]
pub struct Pipeline {
    extractor: PageExtractor,
    detector: LanguageDetector,
    translator: Translator,
}

impl Pipeline {
    pub fn new(extractor: PageExtractor, detector: LanguageDetector, translator: Translator) -> Self {
        Self {
            extractor,
            detector,
            translator,
        }
    }

    /// Wire the production collaborators described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = Arc::new(ModelHandle::new(ModelSource {
            url: config.language_model.url.clone(),
            path: config.language_model.path.clone(),
            fasttext_binary: config.language_model.fasttext_binary.clone(),
        }));

        let mut detector = LanguageDetector::new(model);
        if let Some(path) = &config.language_model.language_codes_path {
            detector = detector.with_code_overrides(load_code_overrides(path)?);
        }

        let renderer = Arc::new(PdftoppmRenderer::new(config.ocr.renderer_binary.clone()));
        let ocr = Arc::new(TesseractEngine::new(
            config.ocr.tesseract_binary.clone(),
            config.ocr.tessdata_dir.clone(),
        ));
        let extractor =
            PageExtractor::new(renderer, ocr, detector.clone()).with_render_scale(config.ocr.render_scale);

        let backend = LibreTranslate::new(
            config.translation.endpoint.clone(),
            Duration::from_secs(config.translation.timeout_secs),
        )?
        .with_api_key(config.translation.api_key.clone());
        let translator = Translator::new(Arc::new(backend));

        Ok(Self::new(extractor, detector, translator))
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Translate the PDF at `source` into `destination`
    ///
    /// `target` of `None` means auto-detect, which translates to English.
    pub async fn process(&self, source: &Path, destination: &Path, target: Option<Language>) -> Result<RunSummary> {
        self.process_with_progress(source, destination, target, |_, _, _| {}).await
    }

    /// Same as [`Pipeline::process`], reporting `(phase, completed, total)` as pages finish
    pub async fn process_with_progress<F>(
        &self,
        source: &Path,
        destination: &Path,
        target: Option<Language>,
        observer: F,
    ) -> Result<RunSummary>
    where
        F: Fn(PipelinePhase, usize, usize),
    {
        let document = SourceDocument::open(source)
            .with_context(|| format!("Failed to open source PDF: {}", source.display()))?;
        self.process_document(&document, destination, target, observer).await
    }

    /// Translate an in-memory PDF into `destination`
    pub async fn process_bytes(
        &self,
        bytes: impl Into<Bytes>,
        destination: &Path,
        target: Option<Language>,
    ) -> Result<RunSummary> {
        let document = SourceDocument::from_bytes(bytes).context("Failed to open source PDF")?;
        self.process_document(&document, destination, target, |_, _, _| {}).await
    }

    /// Run every stage over an opened document
    pub async fn process_document<F>(
        &self,
        document: &SourceDocument,
        destination: &Path,
        target: Option<Language>,
        observer: F,
    ) -> Result<RunSummary>
    where
        F: Fn(PipelinePhase, usize, usize),
    {
        let pages = document.pages();
        let total = pages.len();
        info!("Processing {} page(s)", total);

        let mut page_texts = Vec::with_capacity(total);
        let mut ocr_pages = 0;
        observer(PipelinePhase::Extraction, 0, total);
        for (index, page) in pages.iter().enumerate() {
            let extracted = self
                .extractor
                .extract(document, page)
                .await
                .with_context(|| format!("Failed to extract text from page {}", page.number))?;
            if extracted.source == TextSource::Ocr {
                ocr_pages += 1;
            }
            page_texts.push(extracted.text);
            observer(PipelinePhase::Extraction, index + 1, total);
        }

        let detected = self
            .detector
            .detect(&page_texts)
            .await
            .context("Failed to detect document language")?;
        let target = target.unwrap_or(DEFAULT_TARGET);
        info!("Detected language: {}, translating to {}", detected, target);

        let mut translated = Vec::with_capacity(total);
        let (mut translated_pages, mut unchanged_pages, mut fallback_pages) = (0, 0, 0);
        observer(PipelinePhase::Translation, 0, total);
        for (index, text) in page_texts.iter().enumerate() {
            let outcome = self.translator.translate_outcome(text, &detected, target).await;
            match &outcome {
                TranslationOutcome::Translated(_) => translated_pages += 1,
                TranslationOutcome::Unchanged(_) => unchanged_pages += 1,
                TranslationOutcome::Fallback { .. } => fallback_pages += 1,
            }
            translated.push(outcome.into_text());
            observer(PipelinePhase::Translation, index + 1, total);
        }

        let mut reassembler = Reassembler::new();
        observer(PipelinePhase::Reassembly, 0, total);
        for (index, (page, text)) in pages.iter().zip(&translated).enumerate() {
            reassembler
                .rebuild(document, page, text)
                .with_context(|| format!("Failed to rebuild page {}", page.number))?;
            observer(PipelinePhase::Reassembly, index + 1, total);
        }
        debug!("Rebuilt {} of {} page(s)", reassembler.page_count(), total);

        reassembler
            .save(destination)
            .with_context(|| format!("Failed to write output PDF: {}", destination.display()))?;

        let summary = RunSummary {
            page_count: total,
            ocr_pages,
            translated_pages,
            unchanged_pages,
            fallback_pages,
            detected_language: detected,
            target_language: target,
        };
        info!("Done: {}", summary);
        Ok(summary)
    }
}
