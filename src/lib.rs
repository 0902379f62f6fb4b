//! # capgo
//!
//! Place signature and seal images onto PDF pages, and reorder, duplicate,
//! or delete pages while keeping stamps attached to their pages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use capgo::geometry::Rect;
//! use capgo::model::Stamp;
//!
//! fn main() -> capgo::Result<()> {
//!     // A 105x56 pt signature box, 50 pt from the top-left corner of page 1
//!     let stamp = Stamp::new("signature.png", Rect::new(50.0, 50.0, 105.0, 56.0), 1);
//!
//!     // Writes ~/Downloads/contract_capgo.pdf (or contract_capgo (1).pdf, ...)
//!     let output = capgo::stamp_pdf("contract.pdf", &[stamp])?;
//!     println!("{}", output.display());
//!
//!     // Swap pages 1 and 2 and duplicate page 3
//!     let reordered = capgo::update_pdf_pages("contract.pdf", &[2, 1, 3, 3])?;
//!     println!("{}", reordered.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Coordinate mapping**: screen, document, and PDF point space
//! - **Contain-fit compositing**: aspect-preserving, 4x supersampled stamps
//! - **Transparent stamps**: alpha is kept as a PDF soft mask
//! - **Collision-safe naming**: `name_capgo.pdf`, `name_capgo (1).pdf`, ...
//! - **Page transforms**: reorder, duplicate, and delete pages; stamps follow
//! - **Batch export**: sequential, failure-isolated, stoppable between documents
//! - **Async handles** (feature `async`): run exports on tokio's blocking pool

pub mod backend;
pub mod compose;
pub mod detect;
pub mod error;
pub mod geometry;
pub mod model;
pub mod pipeline;
pub mod state;
pub mod transform;

#[cfg(feature = "async")]
pub mod task;

// Re-export commonly used types
pub use backend::{LopdfBackend, PdfBackend};
pub use compose::{Compositor, RasterLimits, StampAsset, Watermark};
pub use detect::{sniff_pdf, PdfVersion};
pub use error::{Error, ErrorKind, Result};
pub use geometry::{PageLayout, Point, Rect, ViewerScale, ZoomRange};
pub use model::{
    Document, DocumentId, GeometryUpdate, PageDims, PageOrder, ProcessingStatus, Stamp, StampId,
    StampImage, StampList,
};
pub use pipeline::{
    BatchEvent, BatchExporter, BatchReport, ExportOptions, StampPipeline, StampRequest,
};
pub use state::AppState;
pub use transform::{remap_stamps, PageTransform, TransformOptions, TransformRequest};

use std::path::{Path, PathBuf};

/// Stamp a PDF with default options and return the output path.
///
/// Returns `path` itself when `stamps` is empty.
///
/// # Example
///
/// ```no_run
/// use capgo::{stamp_pdf, Rect, Stamp};
///
/// let stamps = [Stamp::new("seal.png", Rect::new(400.0, 650.0, 80.0, 80.0), 2)];
/// let output = stamp_pdf("invoice.pdf", &stamps).unwrap();
/// ```
pub fn stamp_pdf<P: AsRef<Path>>(path: P, stamps: &[Stamp]) -> Result<PathBuf> {
    StampPipeline::default().run(path, stamps)
}

/// Stamp a PDF with custom options.
///
/// # Example
///
/// ```no_run
/// use capgo::{stamp_pdf_with_options, ExportOptions};
///
/// let options = ExportOptions::new()
///     .with_output_dir("./signed")
///     .with_quality_factor(2.0);
/// let output = stamp_pdf_with_options("invoice.pdf", &[], options).unwrap();
/// ```
pub fn stamp_pdf_with_options<P: AsRef<Path>>(
    path: P,
    stamps: &[Stamp],
    options: ExportOptions,
) -> Result<PathBuf> {
    StampPipeline::new(options).run(path, stamps)
}

/// Write a copy of a PDF with its pages in `order` (1-indexed original page
/// numbers; repeats duplicate, omissions delete) into the temp directory.
///
/// # Example
///
/// ```no_run
/// use capgo::update_pdf_pages;
///
/// let output = update_pdf_pages("scan.pdf", &[3, 1, 2]).unwrap();
/// ```
pub fn update_pdf_pages<P: AsRef<Path>>(path: P, order: &[u32]) -> Result<PathBuf> {
    PageTransform::default().transform(path, &PageOrder::new(order.to_vec()))
}

/// Displayed size of every page of a PDF (CropBox and `/Rotate` applied).
pub fn inspect_pdf<P: AsRef<Path>>(path: P) -> Result<Vec<PageDims>> {
    LopdfBackend::new().inspect(path.as_ref())
}

/// Builder for stamping and transforming PDF documents.
///
/// # Example
///
/// ```no_run
/// use capgo::Capgo;
///
/// let capgo = Capgo::new()
///     .with_output_dir("./signed")
///     .with_transform_dir("./work")
///     .sequential();
/// let output = capgo.stamp_json(r#"{"pdfFilePath": "a.pdf", "stamps": []}"#)?;
/// # Ok::<(), capgo::Error>(())
/// ```
pub struct Capgo {
    export_options: ExportOptions,
    transform_options: TransformOptions,
}

impl Capgo {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            export_options: ExportOptions::default(),
            transform_options: TransformOptions::default(),
        }
    }

    /// Set the export destination directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_options = self.export_options.with_output_dir(dir);
        self
    }

    /// Set the export file name suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.export_options = self.export_options.with_suffix(suffix);
        self
    }

    /// Set the supersampling factor.
    pub fn with_quality_factor(mut self, factor: f64) -> Self {
        self.export_options = self.export_options.with_quality_factor(factor);
        self
    }

    /// Prepare stamp rasters one at a time.
    pub fn sequential(mut self) -> Self {
        self.export_options = self.export_options.sequential();
        self
    }

    /// Write uncompressed streams.
    pub fn without_compression(mut self) -> Self {
        self.export_options = self.export_options.with_compression(false);
        self
    }

    /// Set the directory receiving transformed files.
    pub fn with_transform_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.transform_options = self.transform_options.with_output_dir(dir);
        self
    }

    /// Set the file name prefix of transformed files.
    pub fn with_transform_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.transform_options = self.transform_options.with_prefix(prefix);
        self
    }

    /// Build a stamp pipeline from these options.
    pub fn pipeline(&self) -> StampPipeline {
        StampPipeline::new(self.export_options.clone())
    }

    /// Build a page transform from these options.
    pub fn page_transform(&self) -> PageTransform {
        PageTransform::new(self.transform_options.clone())
    }

    /// Build a batch exporter from these options.
    pub fn batch(&self) -> BatchExporter {
        BatchExporter::new(self.pipeline())
    }

    /// Stamp a PDF.
    pub fn stamp<P: AsRef<Path>>(&self, path: P, stamps: &[Stamp]) -> Result<PathBuf> {
        self.pipeline().run(path, stamps)
    }

    /// Reorder a PDF's pages.
    pub fn update_pages<P: AsRef<Path>>(&self, path: P, order: &PageOrder) -> Result<PathBuf> {
        self.page_transform().transform(path, order)
    }

    /// Handle a JSON stamping payload: `{pdfFilePath, stamps: [...]}`.
    pub fn stamp_json(&self, json: &str) -> Result<PathBuf> {
        let request = StampRequest::from_json(json)?;
        self.stamp(&request.pdf_file_path, &request.stamps)
    }

    /// Handle a JSON page transform payload: `{pdfFilePath, newPageOrder}`.
    pub fn update_pages_json(&self, json: &str) -> Result<PathBuf> {
        let request = TransformRequest::from_json(json)?;
        self.update_pages(&request.pdf_file_path, &request.new_page_order)
    }
}

impl Default for Capgo {
    fn default() -> Self {
        Self::new()
    }
}
