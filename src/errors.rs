/*!
 * Error types for the indic-pdf-translator application.
 *
 * This module contains custom error types for the different stages of the
 * page pipeline, using the thiserror crate for ergonomic error definitions.
 *
 * Only `ProviderError` is ever recovered from: the translator turns it into a
 * fallback outcome. Every other error aborts the run it belongs to.
 */

use thiserror::Error;

/// Errors that can occur when talking to the remote translation service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while fetching, loading or querying the language model
#[derive(Error, Debug)]
pub enum DetectionError {
    /// The weight file could not be downloaded
    #[error("Failed to download language model from {url}: {message}")]
    Download {
        /// Remote location of the weights
        url: String,
        /// Underlying failure
        message: String,
    },

    /// The weight file exists but is not a usable model
    #[error("Invalid language model file {path}: {message}")]
    InvalidModel {
        /// Local path of the weights
        path: String,
        /// What was wrong with it
        message: String,
    },

    /// The classifier could not be run
    #[error("Language prediction failed: {0}")]
    Prediction(String),

    /// Local file system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while rasterising a page or recognising its text
#[derive(Error, Debug)]
pub enum OcrError {
    /// The page could not be rendered to an image
    #[error("Failed to render page {page}: {message}")]
    Render {
        /// 1-based page number
        page: u32,
        /// Underlying failure
        message: String,
    },

    /// The OCR engine could not be started
    #[error("Failed to run OCR engine '{binary}': {message}")]
    Engine {
        /// Engine executable
        binary: String,
        /// Underlying failure
        message: String,
    },

    /// Local file system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while reading or writing PDF documents
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The source document could not be opened or parsed
    #[error("Failed to open PDF: {0}")]
    Open(String),

    /// A page is structurally broken
    #[error("Invalid page {page}: {message}")]
    InvalidPage {
        /// 1-based page number
        page: u32,
        /// What was wrong with it
        message: String,
    },

    /// The output document could not be built or written
    #[error("Failed to write PDF: {0}")]
    Write(String),

    /// Local file system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for DocumentError {
    fn from(error: lopdf::Error) -> Self {
        Self::Open(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the translation service
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from language detection
    #[error("Language detection error: {0}")]
    Detection(#[from] DetectionError),

    /// Error from rendering or OCR
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Error from PDF handling
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
