//! Print jobs and the artifacts they produce.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use canvas_core::DesignDocument;

use crate::embed::{embed_images, EmbeddedImages, ImageFetcher};
use crate::error::{PrintError, PrintResult};
use crate::svg::{check_output, pixel_size, render_svg};

/// Default production resolution.
pub const DEFAULT_DPI: u32 = 150;

/// Output settings shared by every job of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Resolution used when a job does not set its own.
    pub dpi: u32,
    /// Background fill painted under all elements, `None` for transparent.
    pub background: Option<String>,
    /// Inline remote images before generation.
    pub embed_images: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            background: Some("#ffffff".to_string()),
            embed_images: true,
        }
    }
}

/// One order line item to print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintJob {
    /// Order number.
    pub order_number: String,
    /// Zero-based line item index within the order.
    pub line_item_index: usize,
    /// Design to print.
    pub document: DesignDocument,
    /// Resolution override.
    #[serde(default)]
    pub dpi: Option<u32>,
}

impl PrintJob {
    /// Create a job at the configured resolution.
    #[must_use]
    pub fn new(order_number: impl Into<String>, line_item_index: usize, document: DesignDocument) -> Self {
        Self {
            order_number: order_number.into(),
            line_item_index,
            document,
            dpi: None,
        }
    }

    /// Set the resolution for this job.
    #[must_use]
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    /// Resolution for this job under `config`.
    #[must_use]
    pub fn effective_dpi(&self, config: &PrintConfig) -> u32 {
        self.dpi.unwrap_or(config.dpi)
    }

    /// Deterministic artifact name:
    /// `{order}_item{index}_{width}x{height}_{dpi}dpi`.
    ///
    /// The order number keeps ASCII alphanumerics and `-`; any other byte is
    /// percent-encoded, so distinct orders always get distinct names.
    #[must_use]
    pub fn artifact_name(&self, config: &PrintConfig) -> String {
        let canvas = self.document.canvas;
        format!(
            "{}_item{}_{}x{}_{}dpi",
            encode_component(&self.order_number),
            self.line_item_index,
            canvas.width,
            canvas.height,
            self.effective_dpi(config)
        )
    }

    /// Render with already-resolved images.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has nothing visible or the output
    /// dimensions are invalid.
    pub fn render(&self, config: &PrintConfig, images: &EmbeddedImages) -> PrintResult<PrintArtifact> {
        let dpi = self.effective_dpi(config);
        let canvas = self.document.canvas;
        let svg = render_svg(
            self.document.elements(),
            canvas,
            dpi,
            config.background.as_deref(),
            images,
        )?;
        Ok(PrintArtifact {
            name: self.artifact_name(config),
            width_px: pixel_size(canvas.width, dpi),
            height_px: pixel_size(canvas.height, dpi),
            dpi,
            degraded_images: images.degraded().to_vec(),
            svg,
        })
    }
}

/// A generated print file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintArtifact {
    /// Deterministic name without extension.
    pub name: String,
    /// Output width in pixels.
    pub width_px: u32,
    /// Output height in pixels.
    pub height_px: u32,
    /// Resolution.
    pub dpi: u32,
    /// Image references emitted un-inlined.
    pub degraded_images: Vec<String>,
    /// SVG markup.
    #[serde(skip)]
    pub svg: String,
}

impl PrintArtifact {
    /// File name for the artifact.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.svg", self.name)
    }

    /// Write the artifact into `dir`, replacing an earlier run's file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_to(&self, dir: &Path) -> PrintResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.svg)?;
        tracing::info!(path = %path.display(), "print artifact written");
        Ok(path)
    }
}

/// Generate the artifact for one job.
///
/// Images are inlined first when enabled; an image that cannot be inlined
/// keeps its original reference. The document is never modified.
///
/// # Errors
///
/// Returns an error scoped to this job; it can be retried independently.
pub async fn generate(job: &PrintJob, config: &PrintConfig, fetcher: &dyn ImageFetcher) -> PrintResult<PrintArtifact> {
    check_output(job.document.canvas, job.effective_dpi(config))?;
    let elements = job.document.elements();
    if !elements.iter().any(|e| e.visible) {
        return Err(PrintError::EmptyDocument);
    }

    let images = if config.embed_images {
        embed_images(elements, fetcher).await
    } else {
        EmbeddedImages::default()
    };
    let artifact = job.render(config, &images)?;

    tracing::info!(
        name = %artifact.name,
        width_px = artifact.width_px,
        height_px = artifact.height_px,
        degraded = artifact.degraded_images.len(),
        "print artifact generated"
    );
    Ok(artifact)
}

fn encode_component(s: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::Canvas;

    #[test]
    fn test_artifact_name() {
        let job = PrintJob::new("A1001", 2, DesignDocument::new(Canvas::new(72.0, 36.0)));
        let config = PrintConfig::default();
        assert_eq!(job.artifact_name(&config), "A1001_item2_72x36_150dpi");
        assert_eq!(job.clone().with_dpi(300).artifact_name(&config), "A1001_item2_72x36_300dpi");
    }

    #[test]
    fn test_artifact_name_fractional_and_encoded() {
        let job = PrintJob::new("PO 55/7", 0, DesignDocument::new(Canvas::new(3.5, 2.25)));
        assert_eq!(job.artifact_name(&PrintConfig::default()), "PO%2055%2F7_item0_3.5x2.25_150dpi");
    }

    #[test]
    fn test_order_encoding_is_distinct() {
        assert_eq!(encode_component("A-1"), "A-1");
        assert_eq!(encode_component("A_1"), "A%5F1");
        assert_eq!(encode_component("100%"), "100%25");
    }
}
