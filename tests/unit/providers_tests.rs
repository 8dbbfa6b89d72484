/*!
 * Tests for translation backend implementations
 */

use std::time::Duration;

use indic_pdf_translator::errors::ProviderError;
use indic_pdf_translator::providers::libretranslate::{LibreTranslate, LibreTranslateRequest};
use indic_pdf_translator::providers::mock::MockBackend;
use indic_pdf_translator::providers::{TranslationBackend, TranslationRequest};

fn request() -> TranslationRequest {
    TranslationRequest {
        text: "नमस्ते".to_string(),
        source: "hi".to_string(),
        target: "en".to_string(),
    }
}

#[test]
fn test_libretranslate_request_shouldSerialiseFormFields() {
    let form = LibreTranslateRequest {
        q: "text",
        source: "hi",
        target: "en",
        format: "text",
        api_key: None,
    };
    let json = serde_json::to_value(&form).unwrap();

    assert_eq!(json["q"], "text");
    assert_eq!(json["format"], "text");
    assert!(json.get("api_key").is_none());
}

#[test]
fn test_libretranslate_request_withApiKey_shouldIncludeKey() {
    let form = LibreTranslateRequest {
        q: "text",
        source: "hi",
        target: "en",
        format: "text",
        api_key: Some("secret"),
    };
    let json = serde_json::to_value(&form).unwrap();
    assert_eq!(json["api_key"], "secret");
}

#[tokio::test]
async fn test_libretranslate_withUnreachableServer_shouldReturnConnectionError() {
    let backend = LibreTranslate::new("http://127.0.0.1:9/translate", Duration::from_secs(5)).unwrap();

    let result = backend.translate(&request()).await;
    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));

    let result = backend.test_connection().await;
    assert!(matches!(result, Err(ProviderError::ConnectionError(_))));
}

#[test]
fn test_libretranslate_name_shouldIdentifyBackend() {
    let backend = LibreTranslate::new("http://libretranslate:5000/translate", Duration::from_secs(30)).unwrap();
    assert_eq!(backend.name(), "LibreTranslate");
    assert_eq!(backend.endpoint(), "http://libretranslate:5000/translate");
}

#[test]
fn test_libretranslate_new_shouldKeepConfiguredTimeout() -> Result<(), ProviderError> {
    let backend = LibreTranslate::new("http://libretranslate:5000/translate", Duration::from_secs(7))?;
    assert_eq!(backend.timeout(), Duration::from_secs(7));
    Ok(())
}

#[tokio::test]
async fn test_mock_unreachable_shouldFailTranslateAndConnection() {
    let backend = MockBackend::unreachable();
    assert!(matches!(backend.translate(&request()).await, Err(ProviderError::ConnectionError(_))));
    assert!(backend.test_connection().await.is_err());
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_mock_identity_shouldEchoText() {
    let backend = MockBackend::identity();
    assert_eq!(backend.translate(&request()).await.unwrap(), "नमस्ते");
    assert!(backend.test_connection().await.is_ok());
}
