use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{TranslationBackend, TranslationRequest};
use crate::errors::ProviderError;

/// LibreTranslate client
#[derive(Debug, Clone)]
pub struct LibreTranslate {
    /// Full URL of the `/translate` endpoint
    endpoint: String,
    /// Optional API key for protected instances
    api_key: Option<String>,
    /// Per-request timeout
    timeout: Duration,
    /// HTTP client for making requests
    client: Client,
}

/// Form body of a translate request
#[derive(Debug, Serialize)]
pub struct LibreTranslateRequest<'a> {
    /// Text to translate
    pub q: &'a str,
    /// Source language code
    pub source: &'a str,
    /// Target language code
    pub target: &'a str,
    /// Input format, always plain text
    pub format: &'a str,
    /// API key, omitted when not configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'a str>,
}

/// Successful translate response
#[derive(Debug, Serialize, Deserialize)]
pub struct LibreTranslateResponse {
    /// Translated text
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize)]
struct LibreTranslateErrorBody {
    error: String,
}

impl LibreTranslate {
    /// Create a client for `endpoint` with a fixed request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout,
            client,
        })
    }

    /// Send `api_key` with every request (ignored when empty)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.is_empty() { None } else { Some(api_key) };
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL of the `/languages` listing next to the translate endpoint
    fn languages_url(&self) -> Result<Url, ProviderError> {
        let base = Url::parse(&self.endpoint)
            .map_err(|e| ProviderError::RequestFailed(format!("invalid endpoint {}: {}", self.endpoint, e)))?;
        base.join("languages")
            .map_err(|e| ProviderError::RequestFailed(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }

    fn map_send_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_connect() || error.is_timeout() {
            ProviderError::ConnectionError(format!("{}: {}", self.endpoint, error))
        } else {
            ProviderError::RequestFailed(error.to_string())
        }
    }

    fn map_status_error(status: StatusCode, body: &str) -> ProviderError {
        let message = serde_json::from_str::<LibreTranslateErrorBody>(body)
            .map(|parsed| parsed.error)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslate {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, ProviderError> {
        let form = LibreTranslateRequest {
            q: &request.text,
            source: &request.source,
            target: &request.target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        debug!(
            "LibreTranslate request: {} -> {} ({} chars)",
            request.source,
            request.target,
            request.text.chars().count()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            error!("LibreTranslate error ({}): {}", status, body.trim());
            return Err(Self::map_status_error(status, &body));
        }

        let parsed: LibreTranslateResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::ParseError(e.to_string()))?;
        Ok(parsed.translated_text)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = self.languages_url()?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::map_status_error(status, &body))
        }
    }

    fn name(&self) -> &str {
        "LibreTranslate"
    }
}
