use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use url::Url;

use crate::language_utils::{resolve_language, Language, DEFAULT_TARGET};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Target language name or ISO code; absent means auto-detect (English)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,

    /// Remote translation service
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Page rendering and OCR
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Language identification model
    #[serde(default)]
    pub language_model: LanguageModelConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LibreTranslate connection settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Full URL of the translate endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API key, sent only when non-empty
    #[serde(default = "String::new")]
    pub api_key: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            api_key: String::new(),
        }
    }
}

/// Rasterisation and OCR settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OcrConfig {
    /// Directory holding the tesseract script models
    #[serde(default = "default_tessdata_dir")]
    pub tessdata_dir: PathBuf,

    /// Tesseract executable
    #[serde(default = "default_tesseract_binary")]
    pub tesseract_binary: String,

    /// pdftoppm executable
    #[serde(default = "default_renderer_binary")]
    pub renderer_binary: String,

    /// Upscale factor applied before OCR
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tessdata_dir: default_tessdata_dir(),
            tesseract_binary: default_tesseract_binary(),
            renderer_binary: default_renderer_binary(),
            render_scale: default_render_scale(),
        }
    }
}

/// Language identification model settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LanguageModelConfig {
    /// Where the weights are downloaded from
    #[serde(default = "default_model_url")]
    pub url: String,

    /// Local cache path of the weights
    #[serde(default = "default_model_path")]
    pub path: PathBuf,

    /// fastText executable
    #[serde(default = "default_fasttext_binary")]
    pub fasttext_binary: String,

    /// Optional JSON object of model code to language name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_codes_path: Option<PathBuf>,
}

impl Default for LanguageModelConfig {
    fn default() -> Self {
        Self {
            url: default_model_url(),
            path: default_model_path(),
            fasttext_binary: default_fasttext_binary(),
            language_codes_path: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_endpoint() -> String {
    "http://libretranslate:5000/translate".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_tessdata_dir() -> PathBuf {
    PathBuf::from("tessdata_best")
}

fn default_tesseract_binary() -> String {
    "tesseract".to_string()
}

fn default_renderer_binary() -> String {
    "pdftoppm".to_string()
}

fn default_render_scale() -> f32 {
    2.0
}

fn default_model_url() -> String {
    "https://dl.fbaipublicfiles.com/fasttext/supervised-models/lid.176.bin".to_string()
}

fn default_model_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(dir) => dir.join("indic-pdf-translator").join("lid.176.bin"),
        None => PathBuf::from("lid.176.bin"),
    }
}

fn default_fasttext_binary() -> String {
    "fasttext".to_string()
}

impl Config {
    /// Load the configuration at `path`, creating it with defaults if missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.translation.endpoint)
            .map_err(|e| anyhow!("Invalid translation endpoint '{}': {}", self.translation.endpoint, e))?;

        if self.translation.timeout_secs == 0 {
            return Err(anyhow!("Translation timeout must be greater than zero"));
        }

        if !(self.ocr.render_scale > 0.0) {
            return Err(anyhow!("Render scale must be positive, got {}", self.ocr.render_scale));
        }

        Url::parse(&self.language_model.url)
            .map_err(|e| anyhow!("Invalid language model URL '{}': {}", self.language_model.url, e))?;

        self.target()?;
        Ok(())
    }

    /// Configured target language; `None` means auto-detect
    pub fn target(&self) -> Result<Option<Language>> {
        match &self.target_language {
            Some(target) => resolve_language(target),
            None => Ok(None),
        }
    }

    /// Target language after resolving auto-detect to the default
    pub fn effective_target(&self) -> Result<Language> {
        Ok(self.target()?.unwrap_or(DEFAULT_TARGET))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: None,
            translation: TranslationConfig::default(),
            ocr: OcrConfig::default(),
            language_model: LanguageModelConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
