/*!
 * Core translator implementation.
 *
 * The translator never fails: a backend error is turned into a
 * [`TranslationOutcome::Fallback`] carrying the original text.
 */

use log::{debug, warn};
use std::sync::Arc;

use crate::language_utils::{DetectedLanguage, Language};
use crate::providers::{TranslationBackend, TranslationRequest};

/// Result of translating one piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// No request was made (same language or blank text)
    Unchanged(String),
    /// The backend returned a translation
    Translated(String),
    /// The backend failed; `text` is the original input
    Fallback {
        text: String,
        reason: String,
    },
}

impl TranslationOutcome {
    /// Text to use for the page, whichever way it was obtained
    pub fn text(&self) -> &str {
        match self {
            Self::Unchanged(text) | Self::Translated(text) => text,
            Self::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Unchanged(text) | Self::Translated(text) => text,
            Self::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated(_))
    }
}

/// Translates page text through a remote backend
#[derive(Debug, Clone)]
pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
}

impl Translator {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn TranslationBackend> {
        &self.backend
    }

    /// Translate `text` from `source` to `target`, reporting how it went
    ///
    /// # Returns
    /// * `Unchanged` - `source` is `target` or `text` is blank; no request made
    /// * `Translated` - the backend's text, verbatim
    /// * `Fallback` - the backend failed; carries the original text
    pub async fn translate_outcome(
        &self,
        text: &str,
        source: &DetectedLanguage,
        target: Language,
    ) -> TranslationOutcome {
        if source.is(target) || text.trim().is_empty() {
            return TranslationOutcome::Unchanged(text.to_string());
        }

        let request = TranslationRequest {
            text: text.to_string(),
            source: source.translation_code().to_string(),
            target: target.translation_code().to_string(),
        };

        match self.backend.translate(&request).await {
            Ok(translated) => {
                debug!("{} translated {} chars", self.backend.name(), text.chars().count());
                TranslationOutcome::Translated(translated)
            }
            Err(e) => {
                warn!("Translation via {} failed, keeping original text: {}", self.backend.name(), e);
                TranslationOutcome::Fallback {
                    text: text.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Translate `text`, returning the original on any failure
    pub async fn translate(&self, text: &str, source: &DetectedLanguage, target: Language) -> String {
        self.translate_outcome(text, source, target).await.into_text()
    }
}
