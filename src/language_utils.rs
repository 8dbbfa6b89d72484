use anyhow::{Result, anyhow};
use isolang::Language as IsoLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language utilities for the selectable language set
///
/// This module provides the fixed set of human-readable language names the
/// pipeline works with, the sentinel used for auto-detection, ISO code
/// resolution and the small immutable lookup table used by the script and
/// model-code mappings.
/// Sentinel shown in the language menu; never reaches the pipeline
pub const AUTO_DETECT: &str = "Auto-detect";

/// Language used when the caller leaves the target on auto-detect
pub const DEFAULT_TARGET: Language = Language::English;

/// One of the selectable languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Hindi,
    Bengali,
    Tamil,
    Telugu,
    Marathi,
    Gujarati,
    Kannada,
    Malayalam,
    Odia,
    Punjabi,
    Assamese,
    Urdu,
    Sanskrit,
    Nepali,
    Konkani,
    Bodo,
    Dogri,
    Maithili,
    Manipuri,
    Santhali,
    Sindhi,
    Kashmiri,
    English,
    Spanish,
    French,
    Arabic,
    Chinese,
    Russian,
}

impl Language {
    /// Every selectable language, in menu order
    pub const ALL: [Language; 28] = [
        Self::Hindi,
        Self::Bengali,
        Self::Tamil,
        Self::Telugu,
        Self::Marathi,
        Self::Gujarati,
        Self::Kannada,
        Self::Malayalam,
        Self::Odia,
        Self::Punjabi,
        Self::Assamese,
        Self::Urdu,
        Self::Sanskrit,
        Self::Nepali,
        Self::Konkani,
        Self::Bodo,
        Self::Dogri,
        Self::Maithili,
        Self::Manipuri,
        Self::Santhali,
        Self::Sindhi,
        Self::Kashmiri,
        Self::English,
        Self::Spanish,
        Self::French,
        Self::Arabic,
        Self::Chinese,
        Self::Russian,
    ];

    // @returns: Human-readable name, as shown in the menu
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hindi => "Hindi",
            Self::Bengali => "Bengali",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Marathi => "Marathi",
            Self::Gujarati => "Gujarati",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Odia => "Odia",
            Self::Punjabi => "Punjabi",
            Self::Assamese => "Assamese",
            Self::Urdu => "Urdu",
            Self::Sanskrit => "Sanskrit",
            Self::Nepali => "Nepali",
            Self::Konkani => "Konkani",
            Self::Bodo => "Bodo",
            Self::Dogri => "Dogri",
            Self::Maithili => "Maithili",
            Self::Manipuri => "Manipuri",
            Self::Santhali => "Santhali",
            Self::Sindhi => "Sindhi",
            Self::Kashmiri => "Kashmiri",
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::Arabic => "Arabic",
            Self::Chinese => "Chinese",
            Self::Russian => "Russian",
        }
    }

    // @returns: ISO 639 code sent to the translation service
    pub fn translation_code(&self) -> &'static str {
        match self {
            Self::Hindi => "hi",
            Self::Bengali => "bn",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Marathi => "mr",
            Self::Gujarati => "gu",
            Self::Kannada => "kn",
            Self::Malayalam => "ml",
            Self::Odia => "or",
            Self::Punjabi => "pa",
            Self::Assamese => "as",
            Self::Urdu => "ur",
            Self::Sanskrit => "sa",
            Self::Nepali => "ne",
            Self::Konkani => "kok",
            Self::Bodo => "brx",
            Self::Dogri => "doi",
            Self::Maithili => "mai",
            Self::Manipuri => "mni",
            Self::Santhali => "sat",
            Self::Sindhi => "sd",
            Self::Kashmiri => "ks",
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::Arabic => "ar",
            Self::Chinese => "zh",
            Self::Russian => "ru",
        }
    }

    /// Find a language by its menu name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.name().eq_ignore_ascii_case(name))
    }

    /// Find a language by ISO 639-1 or ISO 639-3 code
    pub fn from_code(code: &str) -> Option<Self> {
        let wanted = normalize_to_part3(code)?;
        Self::ALL
            .iter()
            .copied()
            .find(|lang| normalize_to_part3(lang.translation_code()).as_deref() == Some(wanted.as_str()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of language identification
///
/// `Unmapped` carries whatever the model produced when it is not one of the
/// selectable languages. It is passed through verbatim to the translation
/// service and falls back to the default OCR script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedLanguage {
    /// A selectable language
    Known(Language),
    /// Raw label with no entry in the code table
    Unmapped(String),
}

impl DetectedLanguage {
    /// Name used for script mapping and display
    pub fn name(&self) -> &str {
        match self {
            Self::Known(lang) => lang.name(),
            Self::Unmapped(raw) => raw,
        }
    }

    /// Code sent to the translation service (literal passthrough when unmapped)
    pub fn translation_code(&self) -> &str {
        match self {
            Self::Known(lang) => lang.translation_code(),
            Self::Unmapped(raw) => raw,
        }
    }

    /// Whether this is exactly the given selectable language
    pub fn is(&self, language: Language) -> bool {
        matches!(self, Self::Known(lang) if *lang == language)
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(lang) => write!(f, "{}", lang),
            Self::Unmapped(raw) if raw.is_empty() => f.write_str("<none>"),
            Self::Unmapped(raw) => write!(f, "{} (unmapped)", raw),
        }
    }
}

/// Resolve user input into a target language
///
/// Accepts a menu name, an ISO 639-1/639-3 code, or the auto-detect sentinel
/// (returned as `None`).
pub fn resolve_language(input: &str) -> Result<Option<Language>> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case(AUTO_DETECT) || trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }

    if let Some(lang) = Language::from_name(trimmed) {
        return Ok(Some(lang));
    }

    if let Some(lang) = Language::from_code(trimmed) {
        return Ok(Some(lang));
    }

    Err(anyhow!(
        "Unsupported language: '{}'. Run `pdftranslate languages` for the supported list",
        input
    ))
}

/// Menu entries, with the auto-detect sentinel first
pub fn menu_entries() -> Vec<&'static str> {
    std::iter::once(AUTO_DETECT)
        .chain(Language::ALL.iter().map(|lang| lang.name()))
        .collect()
}

/// Normalize an ISO 639-1 or 639-3 code to its ISO 639-3 form
pub fn normalize_to_part3(code: &str) -> Option<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => IsoLanguage::from_639_1(&normalized_code).map(|lang| lang.to_639_3().to_string()),
        3 => IsoLanguage::from_639_3(&normalized_code).map(|lang| lang.to_639_3().to_string()),
        _ => None,
    }
}

/// Immutable ordered mapping with an explicit default on lookup
#[derive(Debug, Clone, Copy)]
pub struct LookupTable<V: 'static> {
    entries: &'static [(&'static str, V)],
}

impl<V: Copy> LookupTable<V> {
    pub const fn new(entries: &'static [(&'static str, V)]) -> Self {
        Self { entries }
    }

    /// Exact-key lookup
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| *value)
    }

    /// Exact-key lookup falling back to `default`
    pub fn get_or(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, V)> + '_ {
        self.entries.iter().copied()
    }
}
