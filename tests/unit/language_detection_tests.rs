/*!
 * Tests for language identification and the model handle
 */

use anyhow::Result;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use indic_pdf_translator::errors::DetectionError;
use indic_pdf_translator::language_detection::{
    ensure_weights, load_code_overrides, model_code_table, LanguageDetector, ModelHandle, ModelSource,
};
use indic_pdf_translator::language_utils::{DetectedLanguage, Language};

use crate::common::{self, detector_with, FixedModel};

fn fasttext_header() -> Vec<u8> {
    let mut bytes = 793_712_314i32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&12i32.to_le_bytes());
    bytes
}

#[tokio::test]
async fn test_detect_withMultipleSamples_shouldJoinAndFlattenNewlines() -> Result<()> {
    let model = Arc::new(FixedModel::new("hi"));
    let detector = detector_with(model.clone());

    let detected = detector.detect(&["पहला\nपन्ना", "दूसरा"]).await?;

    assert_eq!(detected, DetectedLanguage::Known(Language::Hindi));
    assert_eq!(model.inputs(), vec!["पहला पन्ना दूसरा".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_detect_withUnknownCode_shouldReturnRawCode() -> Result<()> {
    let detector = detector_with(Arc::new(FixedModel::new("tl")));
    let detected = detector.detect(&["kumusta"]).await?;
    assert_eq!(detected, DetectedLanguage::Unmapped("tl".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_detect_withNoLabel_shouldReturnEmptyUnmapped() -> Result<()> {
    let detector = detector_with(Arc::new(FixedModel::silent()));
    let detected = detector.detect(&[""]).await?;
    assert_eq!(detected, DetectedLanguage::Unmapped(String::new()));
    Ok(())
}

#[test]
fn test_map_code_withOverrides_shouldPreferOverrideTable() {
    let detector = detector_with(Arc::new(FixedModel::new("hi"))).with_code_overrides(HashMap::from([
        ("hi".to_string(), "Marathi".to_string()),
        ("bh".to_string(), "Bihari".to_string()),
    ]));

    assert_eq!(detector.map_code("hi"), DetectedLanguage::Known(Language::Marathi));
    assert_eq!(detector.map_code("bh"), DetectedLanguage::Unmapped("Bihari".to_string()));
    assert_eq!(detector.map_code("ta"), DetectedLanguage::Known(Language::Tamil));
}

#[test]
fn test_model_code_table_shouldMapKonkaniModelCode() {
    assert_eq!(model_code_table().get("gom"), Some(Language::Konkani));
    assert_eq!(model_code_table().get("xx"), None);
}

#[test]
fn test_load_code_overrides_withJsonObject_shouldParse() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "lang_codes.json", r#"{"hi": "Hindi", "bn": "Bengali"}"#)?;

    let table = load_code_overrides(&path)?;
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("bn").map(String::as_str), Some("Bengali"));
    Ok(())
}

#[test]
fn test_load_code_overrides_withInvalidJson_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "lang_codes.json", "[1, 2")?;
    assert!(load_code_overrides(&path).is_err());
    Ok(())
}

#[tokio::test]
async fn test_ensure_weights_withCachedFile_shouldNotDownload() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("lid.176.bin");
    std::fs::write(&path, fasttext_header())?;

    // Nothing listens on the discard port, so any download attempt would fail
    ensure_weights("http://127.0.0.1:9/lid.176.bin", &path).await?;
    assert_eq!(std::fs::read(&path)?, fasttext_header());
    Ok(())
}

#[tokio::test]
async fn test_ensure_weights_withUnreachableUrl_shouldFailWithoutLeavingFile() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("models").join("lid.176.bin");

    let result = ensure_weights("http://127.0.0.1:9/lid.176.bin", &path).await;

    assert!(matches!(result, Err(DetectionError::Download { .. })));
    assert!(!path.exists());
    Ok(())
}

#[tokio::test]
async fn test_model_handle_withCachedWeights_shouldLoadOnce() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("lid.176.bin");
    let mut file = std::fs::File::create(&path)?;
    file.write_all(&fasttext_header())?;
    drop(file);

    let handle = Arc::new(ModelHandle::new(ModelSource {
        url: "http://127.0.0.1:9/lid.176.bin".to_string(),
        path,
        fasttext_binary: "fasttext".to_string(),
    }));
    assert!(!handle.is_loaded());

    let (first, second) = tokio::join!(handle.get(), handle.get());
    let (first, second) = (first?, second?);

    assert!(handle.is_loaded());
    assert!(Arc::ptr_eq(&first, &second));
    Ok(())
}

#[tokio::test]
async fn test_model_handle_withInvalidWeights_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "lid.176.bin", "garbage")?;

    let handle = ModelHandle::new(ModelSource {
        url: "http://127.0.0.1:9/lid.176.bin".to_string(),
        path,
        fasttext_binary: "fasttext".to_string(),
    });
    let detector = LanguageDetector::new(Arc::new(handle));

    let result = detector.detect(&["text"]).await;
    assert!(matches!(result, Err(DetectionError::InvalidModel { .. })));
    Ok(())
}
