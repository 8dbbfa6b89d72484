/*!
 * Language identification for extracted page text.
 *
 * The classifier is a pretrained fastText language-ID model (`lid.176.bin`).
 * Its weights are fetched once from a well-known URL and cached on disk; the
 * loaded model lives behind a [`ModelHandle`] that guards the one-time
 * download/load so concurrent first use never fetches twice.
 */

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::errors::DetectionError;
use crate::language_utils::{DetectedLanguage, Language, LookupTable};

/// fastText binary model header magic number
const FASTTEXT_MAGIC: i32 = 793_712_314;

static LABEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__label__(\S+)").expect("label pattern is valid"));

// Codes emitted by lid.176 for the selectable languages. Bodo, Dogri,
// Manipuri, Santhali and Kashmiri have no label in that model.
static MODEL_CODES: LookupTable<Language> = LookupTable::new(&[
    ("hi", Language::Hindi),
    ("bn", Language::Bengali),
    ("ta", Language::Tamil),
    ("te", Language::Telugu),
    ("mr", Language::Marathi),
    ("gu", Language::Gujarati),
    ("kn", Language::Kannada),
    ("ml", Language::Malayalam),
    ("or", Language::Odia),
    ("pa", Language::Punjabi),
    ("as", Language::Assamese),
    ("ur", Language::Urdu),
    ("sa", Language::Sanskrit),
    ("ne", Language::Nepali),
    ("gom", Language::Konkani),
    ("mai", Language::Maithili),
    ("sd", Language::Sindhi),
    ("en", Language::English),
    ("es", Language::Spanish),
    ("fr", Language::French),
    ("ar", Language::Arabic),
    ("zh", Language::Chinese),
    ("ru", Language::Russian),
]);

/// Built-in model code to language table
pub fn model_code_table() -> LookupTable<Language> {
    MODEL_CODES
}

/// A loaded language-identification classifier
#[async_trait]
pub trait LanguageModel: Send + Sync + Debug {
    /// Predict the single most probable label for `text`
    ///
    /// # Returns
    /// * `Ok(Some(label))` - The raw label, including any model prefix
    /// * `Ok(None)` - The model produced no label for this input
    async fn predict(&self, text: &str) -> Result<Option<String>, DetectionError>;
}

/// fastText classifier driven through the `fasttext` command line tool
#[derive(Debug, Clone)]
pub struct FastTextModel {
    binary: String,
    weights: PathBuf,
}

impl FastTextModel {
    /// Load a model, checking that the weight file is a fastText binary model
    pub fn load(binary: impl Into<String>, weights: impl Into<PathBuf>) -> Result<Self, DetectionError> {
        let weights = weights.into();
        let mut header = [0u8; 8];
        let mut file = std::fs::File::open(&weights)?;
        file.read_exact(&mut header).map_err(|e| DetectionError::InvalidModel {
            path: weights.display().to_string(),
            message: format!("cannot read header: {}", e),
        })?;

        let magic = i32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if magic != FASTTEXT_MAGIC {
            return Err(DetectionError::InvalidModel {
                path: weights.display().to_string(),
                message: "not a fastText binary model".to_string(),
            });
        }
        let version = i32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        debug!("Loaded fastText model {:?} (format version {})", weights, version);

        Ok(Self {
            binary: binary.into(),
            weights,
        })
    }

    pub fn weights(&self) -> &Path {
        &self.weights
    }
}

#[async_trait]
impl LanguageModel for FastTextModel {
    async fn predict(&self, text: &str) -> Result<Option<String>, DetectionError> {
        let mut child = Command::new(&self.binary)
            .arg("predict")
            .arg(&self.weights)
            .arg("-")
            .arg("1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DetectionError::Prediction(format!("failed to start {}: {}", self.binary, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(DetectionError::Prediction(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.split_whitespace().next().map(str::to_string))
    }
}

/// Where the model weights come from and where they are cached
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Remote location of the weight file
    pub url: String,
    /// Local cache path
    pub path: PathBuf,
    /// fastText executable
    pub fasttext_binary: String,
}

/// Process-wide handle to the language model with guarded lazy initialisation
#[derive(Debug)]
pub struct ModelHandle {
    cell: OnceCell<Arc<dyn LanguageModel>>,
    source: Option<ModelSource>,
}

impl ModelHandle {
    /// Handle that downloads (if needed) and loads the model on first use
    pub fn new(source: ModelSource) -> Self {
        Self {
            cell: OnceCell::new(),
            source: Some(source),
        }
    }

    /// Handle around an already loaded model
    pub fn preloaded(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(model)),
            source: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Get the model, fetching and loading it exactly once
    pub async fn get(&self) -> Result<Arc<dyn LanguageModel>, DetectionError> {
        let model = self
            .cell
            .get_or_try_init(|| async {
                let source = self.source.as_ref().ok_or_else(|| {
                    DetectionError::Prediction("no model source configured".to_string())
                })?;
                ensure_weights(&source.url, &source.path).await?;
                let model = FastTextModel::load(source.fasttext_binary.clone(), source.path.clone())?;
                Ok::<Arc<dyn LanguageModel>, DetectionError>(Arc::new(model))
            })
            .await?;
        Ok(Arc::clone(model))
    }
}

/// Download the weight file to `path` unless it is already there
pub async fn ensure_weights(url: &str, path: &Path) -> Result<(), DetectionError> {
    if path.is_file() {
        return Ok(());
    }

    let download_error = |message: String| DetectionError::Download {
        url: url.to_string(),
        message,
    };

    info!("Downloading language model from {}", url);
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| download_error(e.to_string()))?;

    let bytes: bytes::Bytes = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| download_error(e.to_string()))?
        .bytes()
        .await
        .map_err(|e| download_error(e.to_string()))?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    // Write next to the destination so the final rename is atomic
    let mut staging = tempfile::NamedTempFile::new_in(&parent)?;
    staging.write_all(&bytes)?;
    staging.flush()?;
    staging.persist(path).map_err(|e| DetectionError::Io(e.error))?;

    info!("Saved language model ({} bytes) to {:?}", bytes.len(), path);
    Ok(())
}

/// Read a `{"code": "Language name"}` JSON table
pub fn load_code_overrides(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read language code table {:?}: {}", path, e))?;
    let table: HashMap<String, String> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse language code table {:?}: {}", path, e))?;
    Ok(table)
}

/// Detects the dominant language of a set of text samples
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    model: Arc<ModelHandle>,
    overrides: Arc<HashMap<String, String>>,
}

impl LanguageDetector {
    pub fn new(model: Arc<ModelHandle>) -> Self {
        Self {
            model,
            overrides: Arc::new(HashMap::new()),
        }
    }

    /// Use a code table that takes precedence over the built-in one
    pub fn with_code_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides = Arc::new(overrides);
        self
    }

    /// Detect the dominant language across `samples`
    ///
    /// Samples are joined with a single space and newlines are flattened
    /// before prediction. Codes missing from the tables come back as
    /// [`DetectedLanguage::Unmapped`].
    pub async fn detect<S: AsRef<str>>(&self, samples: &[S]) -> Result<DetectedLanguage, DetectionError> {
        let joined = samples
            .iter()
            .map(|sample| sample.as_ref())
            .collect::<Vec<_>>()
            .join(" ")
            .replace('\n', " ");

        let model = self.model.get().await?;
        let label = model.predict(&joined).await?;

        let detected = match label {
            Some(label) => self.map_code(strip_label(&label)),
            None => {
                debug!("Language model returned no label");
                DetectedLanguage::Unmapped(String::new())
            }
        };

        debug!("Detected language: {}", detected);
        Ok(detected)
    }

    /// Map a bare model code to a language
    pub fn map_code(&self, code: &str) -> DetectedLanguage {
        if let Some(name) = self.overrides.get(code) {
            return match Language::from_name(name) {
                Some(lang) => DetectedLanguage::Known(lang),
                None => DetectedLanguage::Unmapped(name.clone()),
            };
        }

        match MODEL_CODES.get(code) {
            Some(lang) => DetectedLanguage::Known(lang),
            None => DetectedLanguage::Unmapped(code.to_string()),
        }
    }
}

/// Remove the fastText `__label__` prefix
pub fn strip_label(label: &str) -> &str {
    LABEL_PATTERN
        .captures(label)
        .and_then(|captures| captures.get(1))
        .map_or(label, |code| code.as_str())
}
