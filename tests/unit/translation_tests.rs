/*!
 * Tests for the translator and its fallback behaviour
 */

use std::sync::Arc;
use std::time::Duration;

use indic_pdf_translator::language_utils::{DetectedLanguage, Language};
use indic_pdf_translator::providers::libretranslate::LibreTranslate;
use indic_pdf_translator::providers::mock::MockBackend;
use indic_pdf_translator::translation::{TranslationOutcome, Translator};

fn hindi() -> DetectedLanguage {
    DetectedLanguage::Known(Language::Hindi)
}

#[tokio::test]
async fn test_translate_withSameLanguage_shouldReturnInputWithoutRequest() {
    let backend = MockBackend::prefixing();
    let translator = Translator::new(Arc::new(backend.clone()));

    for lang in Language::ALL {
        for text in ["", "plain", "नमस्ते दुनिया", "  padded\n"] {
            let result = translator.translate(text, &DetectedLanguage::Known(lang), lang).await;
            assert_eq!(result, text);
        }
    }

    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withBlankText_shouldBeUnchanged() {
    let backend = MockBackend::prefixing();
    let translator = Translator::new(Arc::new(backend.clone()));

    let outcome = translator.translate_outcome(" \n\t ", &hindi(), Language::English).await;

    assert_eq!(outcome, TranslationOutcome::Unchanged(" \n\t ".to_string()));
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withWorkingBackend_shouldSendIsoCodes() {
    let backend = MockBackend::prefixing();
    let translator = Translator::new(Arc::new(backend.clone()));

    let outcome = translator.translate_outcome("नमस्ते", &hindi(), Language::English).await;

    assert!(outcome.is_translated());
    assert_eq!(outcome.text(), "[en] नमस्ते");
    let request = backend.last_request().expect("one request");
    assert_eq!(request.source, "hi");
    assert_eq!(request.target, "en");
    assert_eq!(request.text, "नमस्ते");
}

#[tokio::test]
async fn test_translate_withUnmappedSource_shouldPassCodeThrough() {
    let backend = MockBackend::identity();
    let translator = Translator::new(Arc::new(backend.clone()));

    translator
        .translate("kumusta", &DetectedLanguage::Unmapped("tl".to_string()), Language::English)
        .await;

    assert_eq!(backend.last_request().map(|r| r.source), Some("tl".to_string()));
}

#[tokio::test]
async fn test_translate_withFailingBackend_shouldReturnOriginalText() {
    let translator = Translator::new(Arc::new(MockBackend::failing()));

    let outcome = translator.translate_outcome("मूल पाठ", &hindi(), Language::English).await;

    assert!(outcome.is_fallback());
    assert_eq!(outcome.text(), "मूल पाठ");
    match outcome {
        TranslationOutcome::Fallback { reason, .. } => assert!(reason.contains("500")),
        other => panic!("expected fallback, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_withUnreachableServer_shouldReturnOriginalText() {
    let backend = LibreTranslate::new("http://127.0.0.1:9/translate", Duration::from_secs(5)).unwrap();
    let translator = Translator::new(Arc::new(backend));

    let result = translator.translate("मूल पाठ", &hindi(), Language::English).await;

    assert_eq!(result, "मूल पाठ");
}

#[tokio::test]
async fn test_translate_withIntermittentBackend_shouldMixOutcomes() {
    let translator = Translator::new(Arc::new(MockBackend::intermittent(2)));

    let first = translator.translate_outcome("one", &hindi(), Language::English).await;
    let second = translator.translate_outcome("two", &hindi(), Language::English).await;

    assert!(first.is_translated());
    assert!(second.is_fallback());
    assert_eq!(second.into_text(), "two");
}

#[test]
fn test_translate_withBlockOn_shouldWorkOutsideAsyncTests() {
    let translator = Translator::new(Arc::new(MockBackend::identity()));
    let result = tokio_test::block_on(translator.translate("same", &hindi(), Language::Tamil));
    assert_eq!(result, "same");
}
