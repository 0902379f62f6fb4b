//! Stamp pipeline: apply a document's stamps to its PDF as a chain of
//! single-watermark rewrites.
//!
//! # Example
//!
//! ```no_run
//! use capgo::geometry::Rect;
//! use capgo::model::Stamp;
//! use capgo::pipeline::{ExportOptions, StampPipeline};
//!
//! let pipeline = StampPipeline::new(ExportOptions::new().with_output_dir("out"));
//! let stamps = vec![Stamp::new("seal.png", Rect::new(50.0, 50.0, 105.0, 56.0), 1)];
//! let output = pipeline.run("contract.pdf", &stamps)?;
//! println!("wrote {}", output.display());
//! # Ok::<(), capgo::Error>(())
//! ```

mod batch;
mod naming;
mod options;

pub use batch::{BatchEvent, BatchExporter, BatchReport};
pub use naming::{candidate_name, clean_base_name, reserve_output_path, ReservedOutput};
pub(crate) use naming::absolute;
pub use options::{default_output_dir, ExportOptions, DEFAULT_SUFFIX};

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::backend::{LopdfBackend, PdfBackend};
use crate::compose::{Compositor, StampAsset};
use crate::error::{Error, Result};
use crate::model::{Document, PageDims, Stamp};

/// Stamping payload as sent by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampRequest {
    #[serde(alias = "pdfPath")]
    pub pdf_file_path: PathBuf,
    #[serde(default)]
    pub stamps: Vec<Stamp>,
}

impl StampRequest {
    /// Parse a request from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Request(format!("stamp request: {e}")))
    }
}

/// Applies stamps to PDF files.
pub struct StampPipeline<B = LopdfBackend> {
    backend: B,
    options: ExportOptions,
}

impl StampPipeline<LopdfBackend> {
    /// Create a pipeline over the lopdf backend.
    pub fn new(options: ExportOptions) -> Self {
        let backend = LopdfBackend::new().with_compression(options.compress);
        Self { backend, options }
    }
}

impl Default for StampPipeline<LopdfBackend> {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

impl<B: PdfBackend> StampPipeline<B> {
    /// Create a pipeline over a custom backend.
    pub fn with_backend(backend: B, options: ExportOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Stamp `pdf` with `stamps`, in order, and return the output path.
    ///
    /// With no stamps the input path is returned and nothing is written.
    /// On failure no output file and no intermediate file is left behind.
    pub fn run(&self, pdf: impl AsRef<Path>, stamps: &[Stamp]) -> Result<PathBuf> {
        let pdf = pdf.as_ref();
        if stamps.is_empty() {
            log::info!("{}: no stamps, nothing to export", pdf.display());
            return Ok(pdf.to_path_buf());
        }

        let pages = self.backend.inspect(pdf)?;
        let targets = stamps
            .iter()
            .enumerate()
            .map(|(index, stamp)| target_page(&pages, index, stamp))
            .collect::<Result<Vec<_>>>()?;
        let assets = self.prepare(stamps, &targets)?;

        let reserved = reserve_output_path(&self.options.output_dir, pdf, &self.options.suffix)?;
        let scratch = tempfile::Builder::new()
            .prefix("capgo_")
            .tempdir()
            .map_err(|e| Error::fs(std::env::temp_dir(), e))?;

        let mut current = pdf.to_path_buf();
        let last = assets.len() - 1;
        for (index, asset) in assets.iter().enumerate() {
            let next = if index == last {
                reserved.path().to_path_buf()
            } else {
                scratch.path().join(format!("intermediate_{index}.pdf"))
            };
            self.backend
                .apply_watermark(&current, &next, asset.path(), &asset.watermark)?;
            log::debug!(
                "applied stamp {}/{} on page {}",
                index + 1,
                assets.len(),
                asset.watermark.page
            );
            current = next;
        }

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            log::warn!(
                "could not remove intermediates in {}: {e}",
                scratch_path.display()
            );
        }

        let output = reserved.commit();
        log::info!(
            "{}: applied {} stamps -> {}",
            pdf.display(),
            stamps.len(),
            output.display()
        );
        Ok(output)
    }

    /// Export one document, moving its status through processing to
    /// completed or error.
    pub fn export_document(&self, doc: &mut Document) -> Result<PathBuf> {
        doc.mark_processing();
        match self.run(&doc.path, doc.stamps.as_slice()) {
            Ok(output) => {
                doc.mark_completed(output.clone());
                Ok(output)
            }
            Err(e) => {
                log::warn!("export of {} failed: {e}", doc.name);
                doc.mark_failed(&e);
                Err(e)
            }
        }
    }

    /// Decode and supersample every stamp before the PDF is touched.
    fn prepare(&self, stamps: &[Stamp], pages: &[PageDims]) -> Result<Vec<StampAsset>> {
        let compositor = Compositor::new(self.options.quality_factor, self.options.resample_filter)
            .with_limits(self.options.raster_limits);
        let compose = |(index, (stamp, page)): (usize, (&Stamp, &PageDims))| {
            compositor.compose(index, stamp, page)
        };
        if self.options.parallel {
            stamps
                .par_iter()
                .zip(pages.par_iter())
                .enumerate()
                .map(compose)
                .collect()
        } else {
            stamps.iter().zip(pages).enumerate().map(compose).collect()
        }
    }
}

/// Dimensions of the page a stamp targets.
fn target_page(pages: &[PageDims], index: usize, stamp: &Stamp) -> Result<PageDims> {
    stamp.validate()?;
    stamp
        .page_num
        .checked_sub(1)
        .and_then(|i| pages.get(i as usize))
        .copied()
        .ok_or_else(|| Error::WatermarkPlacement {
            page: stamp.page_num,
            reason: format!(
                "stamp {index} targets a page beyond the document ({} pages)",
                pages.len()
            ),
        })
}
