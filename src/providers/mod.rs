/*!
 * Remote translation services.
 *
 * This module contains client implementations for translation backends:
 * - LibreTranslate: self-hostable machine translation server
 * - Mock: in-process backend for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Text to translate
    pub text: String,
    /// Source language code
    pub source: String,
    /// Target language code
    pub target: String,
}

/// Common trait for all translation backends
///
/// This trait defines the interface that all backend implementations must
/// follow, allowing them to be used interchangeably by the translator.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate a request
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(&self, request: &TranslationRequest) -> Result<String, ProviderError>;

    /// Test the connection to the backend
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the backend answers, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

pub mod libretranslate;
pub mod mock;
