//! Page transform: reorder, duplicate, or delete pages, and move stamps
//! along with their pages.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::{LopdfBackend, PdfBackend};
use crate::error::{Error, Result};
use crate::model::{Document, PageOrder, StampId, StampList};
use crate::pipeline::absolute;

/// Prefix of transformed file names.
pub const DEFAULT_PREFIX: &str = "capgo_mod";

/// Options for page transforms.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Directory receiving transformed files
    pub output_dir: PathBuf,

    /// File name prefix, followed by a random token and the source name
    pub prefix: String,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Page transform payload as sent by the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    #[serde(alias = "pdfPath")]
    pub pdf_file_path: PathBuf,
    pub new_page_order: PageOrder,
}

impl TransformRequest {
    /// Parse a request from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Request(format!("transform request: {e}")))
    }
}

/// Move stamps to follow their pages through `order`.
///
/// A stamp whose page appears at several positions is copied onto each of
/// them; a stamp whose page is absent is dropped. Every resulting stamp gets
/// a fresh id.
pub fn remap_stamps(stamps: &StampList, order: &PageOrder) -> StampList {
    let mut remapped = Vec::with_capacity(stamps.len());
    for stamp in stamps {
        for position in order.positions_of(stamp.page_num) {
            let mut copy = stamp.clone();
            copy.id = StampId::new();
            copy.page_num = position as u32 + 1;
            remapped.push(copy);
        }
    }
    StampList::from_stamps(remapped)
}

/// Writes reordered copies of PDF files.
pub struct PageTransform<B = LopdfBackend> {
    backend: B,
    options: TransformOptions,
}

impl PageTransform<LopdfBackend> {
    /// Create a transform over the lopdf backend.
    pub fn new(options: TransformOptions) -> Self {
        Self {
            backend: LopdfBackend::new(),
            options,
        }
    }
}

impl Default for PageTransform<LopdfBackend> {
    fn default() -> Self {
        Self::new(TransformOptions::default())
    }
}

impl<B: PdfBackend> PageTransform<B> {
    /// Create a transform over a custom backend.
    pub fn with_backend(backend: B, options: TransformOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Write a new PDF holding `source`'s pages in `order` and return its
    /// path. The source file is left untouched.
    pub fn transform(&self, source: impl AsRef<Path>, order: &PageOrder) -> Result<PathBuf> {
        let source = source.as_ref();
        let page_count = self.backend.inspect(source)?.len() as u32;
        order.validate(page_count)?;

        let dir = &absolute(&self.options.output_dir)?;
        std::fs::create_dir_all(dir).map_err(|e| Error::fs(dir, e))?;
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let base = strip_transform_prefix(&file_name, &self.options.prefix);

        let output = tempfile::Builder::new()
            .prefix(&format!("{}_", self.options.prefix))
            .suffix(&format!("_{base}"))
            .tempfile_in(dir)
            .map_err(|e| Error::fs(dir, e))?;
        self.backend.collect_pages(source, output.path(), order)?;
        let (_, path) = output
            .keep()
            .map_err(|e| Error::fs(e.file.path(), e.error))?;

        log::info!(
            "{}: {} pages -> {} pages at {}",
            source.display(),
            page_count,
            order.len(),
            path.display()
        );
        Ok(path)
    }

    /// Transform a document's source and remap its stamps. On failure the
    /// document is left exactly as it was.
    ///
    /// When the previous source was itself written by this transform, it is
    /// deleted once the document points at the new file. User files are
    /// never removed.
    pub fn apply(&self, doc: &mut Document, order: &PageOrder) -> Result<PathBuf> {
        let path = self.transform(&doc.path, order).map_err(|e| {
            log::warn!("page transform of {} failed: {e}", doc.name);
            e
        })?;
        let stamps = remap_stamps(&doc.stamps, order);
        log::debug!(
            "{}: {} stamps remapped to {}",
            doc.name,
            doc.stamps.len(),
            stamps.len()
        );
        let previous = doc.path.clone();
        doc.replace_source(path.clone(), order.len() as u32, stamps);

        if self.owns(&previous) {
            match std::fs::remove_file(&previous) {
                Ok(()) => log::debug!("removed superseded {}", previous.display()),
                Err(e) => log::warn!("could not remove {}: {e}", previous.display()),
            }
        }
        Ok(path)
    }

    /// Whether `path` is an earlier output of this transform.
    fn owns(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if strip_transform_prefix(name, &self.options.prefix) == name {
            return false;
        }
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        match (absolute(parent), absolute(&self.options.output_dir)) {
            (Ok(parent), Ok(dir)) => parent == dir,
            _ => false,
        }
    }
}

/// Drop a `{prefix}_{token}_` head left by an earlier transform.
fn strip_transform_prefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.split_once('_'))
        .map(|(_, base)| base)
        .filter(|base| !base.is_empty())
        .unwrap_or(name)
}
