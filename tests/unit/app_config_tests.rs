/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;
use std::path::PathBuf;

use indic_pdf_translator::app_config::{Config, LogLevel};
use indic_pdf_translator::language_utils::Language;

use crate::common;

#[test]
fn test_default_config_shouldUseLibreTranslateDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, None);
    assert_eq!(config.translation.endpoint, "http://libretranslate:5000/translate");
    assert_eq!(config.translation.timeout_secs, 30);
    assert!(config.translation.api_key.is_empty());
    assert_eq!(config.ocr.tessdata_dir, PathBuf::from("tessdata_best"));
    assert_eq!(config.ocr.renderer_binary, "pdftoppm");
    assert_eq!(config.ocr.render_scale, 2.0);
    assert!(config.language_model.url.ends_with("/lid.176.bin"));
    assert!(config.language_model.path.ends_with("lid.176.bin"));
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_effective_target_withoutTarget_shouldBeEnglish() -> Result<()> {
    let config = Config::default();
    assert_eq!(config.target()?, None);
    assert_eq!(config.effective_target()?, Language::English);
    Ok(())
}

#[test]
fn test_target_withNameOrCode_shouldResolve() -> Result<()> {
    let mut config = Config::default();

    config.target_language = Some("Hindi".to_string());
    assert_eq!(config.target()?, Some(Language::Hindi));

    config.target_language = Some("ta".to_string());
    assert_eq!(config.effective_target()?, Language::Tamil);

    config.target_language = Some("Auto-detect".to_string());
    assert_eq!(config.effective_target()?, Language::English);
    Ok(())
}

#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = Config::default();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.ocr.render_scale = 0.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.ocr.render_scale = f32::NAN;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.target_language = Some("Klingon".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config, Config::default());
    assert_eq!(Config::load_or_create(&path)?, config);
    Ok(())
}

#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "target_language": "Bengali",
            "translation": { "endpoint": "http://localhost:5000/translate", "api_key": "k" },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.target_language.as_deref(), Some("Bengali"));
    assert_eq!(config.translation.endpoint, "http://localhost:5000/translate");
    assert_eq!(config.translation.timeout_secs, 30);
    assert_eq!(config.translation.api_key, "k");
    assert_eq!(config.ocr.tesseract_binary, "tesseract");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    Ok(())
}

#[test]
fn test_load_or_create_withBrokenJson_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}
