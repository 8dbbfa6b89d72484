/*!
 * Page rasterisation for OCR.
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::process::Command;

use super::document::{DocumentSource, SourceDocument, SourcePage};
use crate::errors::OcrError;

/// Resolution PDF user space is defined at
const POINTS_PER_INCH: f32 = 72.0;

/// A rendered page image, deleted together with its scratch directory
#[derive(Debug)]
pub struct RenderedPage {
    image: PathBuf,
    _scratch: Option<TempDir>,
}

impl RenderedPage {
    /// Image inside a scratch directory removed on drop
    pub fn in_scratch(image: PathBuf, scratch: TempDir) -> Self {
        Self {
            image,
            _scratch: Some(scratch),
        }
    }

    /// Image owned by someone else
    pub fn external(image: PathBuf) -> Self {
        Self { image, _scratch: None }
    }

    pub fn path(&self) -> &Path {
        &self.image
    }
}

/// Renders single pages to raster images
#[async_trait]
pub trait PageRenderer: Send + Sync + Debug {
    /// Render `page` at `scale` times its natural size
    async fn render(&self, document: &SourceDocument, page: &SourcePage, scale: f32) -> Result<RenderedPage, OcrError>;
}

/// Renderer backed by poppler's `pdftoppm`
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    binary: String,
}

impl PdftoppmRenderer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

#[async_trait]
impl PageRenderer for PdftoppmRenderer {
    async fn render(&self, document: &SourceDocument, page: &SourcePage, scale: f32) -> Result<RenderedPage, OcrError> {
        let scratch = tempfile::tempdir()?;

        let input = match document.source() {
            DocumentSource::File(path) => path.clone(),
            DocumentSource::Memory(bytes) => {
                let spilled = scratch.path().join("source.pdf");
                tokio::fs::write(&spilled, bytes).await?;
                spilled
            }
        };

        let dpi = (POINTS_PER_INCH * scale).round().max(1.0) as u32;
        let prefix = scratch.path().join("page");
        let page_number = page.number.to_string();

        debug!("Rendering page {} at {} dpi", page.number, dpi);
        let output = Command::new(&self.binary)
            .arg("-f")
            .arg(&page_number)
            .arg("-l")
            .arg(&page_number)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg("-singlefile")
            .arg(&input)
            .arg(&prefix)
            .output()
            .await
            .map_err(|e| OcrError::Render {
                page: page.number,
                message: format!("failed to start {}: {}", self.binary, e),
            })?;

        if !output.status.success() {
            return Err(OcrError::Render {
                page: page.number,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let image = prefix.with_extension("png");
        if !image.is_file() {
            return Err(OcrError::Render {
                page: page.number,
                message: format!("{} produced no image at {}", self.binary, image.display()),
            });
        }

        Ok(RenderedPage::in_scratch(image, scratch))
    }
}
