/*!
 * Optical character recognition of rendered pages.
 *
 * Recognition runs against script models (e.g. `Devanagari`) stored in a
 * tessdata directory, not language models.
 */

use async_trait::async_trait;
use log::{debug, warn};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::errors::OcrError;

/// Recognises text in page images
#[async_trait]
pub trait OcrEngine: Send + Sync + Debug {
    /// Recognise the text in `image` using the model for `script`
    ///
    /// # Returns
    /// * `Ok(text)` - Recognised text; empty when nothing was recognised
    /// * `Err(OcrError)` - The engine could not be run at all
    async fn recognize(&self, image: &Path, script: &str) -> Result<String, OcrError>;
}

/// OCR engine backed by the `tesseract` command line tool
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: String,
    tessdata_dir: PathBuf,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<String>, tessdata_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            tessdata_dir: tessdata_dir.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &Path, script: &str) -> Result<String, OcrError> {
        debug!("Running {} on {:?} with script {}", self.binary, image, script);

        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(script)
            .arg("--tessdata-dir")
            .arg(&self.tessdata_dir)
            .output()
            .await
            .map_err(|e| OcrError::Engine {
                binary: self.binary.clone(),
                message: e.to_string(),
            })?;

        // A failed recognition still yields whatever was printed, often nothing
        if !output.status.success() {
            warn!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Availability of the external tools the pipeline shells out to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    pub renderer: bool,
    pub ocr: bool,
    pub language_model: bool,
}

impl ToolReport {
    pub fn all_available(&self) -> bool {
        self.renderer && self.ocr && self.language_model
    }
}

/// Check whether the renderer, OCR and fastText binaries can be started
pub async fn tools_available(renderer_binary: &str, tesseract_binary: &str, fasttext_binary: &str) -> ToolReport {
    ToolReport {
        renderer: probe(renderer_binary, "-v").await,
        ocr: probe(tesseract_binary, "--version").await,
        // fastText prints usage and exits non-zero without arguments
        language_model: probe(fasttext_binary, "").await,
    }
}

async fn probe(binary: &str, arg: &str) -> bool {
    let mut command = Command::new(binary);
    if !arg.is_empty() {
        command.arg(arg);
    }
    let available = command.output().await.is_ok();
    if !available {
        debug!("{} not found", binary);
    }
    available
}
