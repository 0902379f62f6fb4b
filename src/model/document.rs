//! Document-level types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PageDims, Stamp, StampId, StampList};
use crate::error::{Error, Result};

/// Process-unique document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Export state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

/// An imported PDF and the stamps placed on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,

    /// Display name (the imported file name)
    pub name: String,

    /// Current source file. Changes after a page transform.
    pub path: PathBuf,

    /// Stamps in z-order
    pub stamps: StampList,

    pub status: ProcessingStatus,

    /// Output of the last successful export
    pub result_path: Option<PathBuf>,

    /// Message of the last failed operation
    pub last_error: Option<String>,

    /// Included in batch export
    pub selected: bool,

    /// Page count of the current source file, once known
    page_count: Option<u32>,

    /// Intrinsic size of the first observed page
    page_size: Option<PageDims>,
}

impl Document {
    /// Create a document for a file. The display name is the file name.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            id: DocumentId::new(),
            name,
            path,
            stamps: StampList::new(),
            status: ProcessingStatus::Pending,
            result_path: None,
            last_error: None,
            selected: true,
            page_count: None,
            page_size: None,
        }
    }

    /// Override the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> Option<u32> {
        self.page_count
    }

    pub fn page_size(&self) -> Option<PageDims> {
        self.page_size
    }

    /// Record the page count of the current source file.
    pub fn set_page_count(&mut self, page_count: u32) {
        self.page_count = Some(page_count);
    }

    /// Record a page's intrinsic size as reported by the viewer.
    ///
    /// The first valid observation wins; later ones are ignored.
    pub fn observe_page_size(&mut self, dims: PageDims) {
        if self.page_size.is_none() && dims.is_valid() {
            self.page_size = Some(dims);
        }
    }

    /// Whether stamps may be placed yet.
    pub fn is_ready(&self) -> bool {
        self.page_size.is_some()
    }

    /// Place a stamp, enforcing the page-size gate and the page range.
    pub fn add_stamp(&mut self, stamp: Stamp) -> Result<StampId> {
        self.ensure_ready()?;
        self.check_page(stamp.page_num)?;
        self.stamps.add(stamp)
    }

    /// Paste a copy of `source` onto `page_num`, under the same rules as
    /// [`add_stamp`](Self::add_stamp).
    pub fn paste_stamp(&mut self, source: &Stamp, page_num: u32) -> Result<StampId> {
        self.ensure_ready()?;
        self.check_page(page_num)?;
        self.stamps.duplicate_on_paste(source, page_num)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::InvalidGeometry(format!(
                "no page size observed yet for {}",
                self.name
            )))
        }
    }

    /// Fail if `page_num` is beyond the known page count.
    pub fn check_page(&self, page_num: u32) -> Result<()> {
        match self.page_count {
            Some(count) if page_num == 0 || page_num > count => Err(Error::InvalidGeometry(
                format!("page {page_num} is out of range (document has {count} pages)"),
            )),
            _ => Ok(()),
        }
    }

    /// Replace the source after a page transform.
    pub(crate) fn replace_source(&mut self, path: PathBuf, page_count: u32, stamps: StampList) {
        self.path = path;
        self.page_count = Some(page_count);
        self.stamps = stamps;
    }

    pub fn mark_processing(&mut self) {
        self.status = ProcessingStatus::Processing;
        self.last_error = None;
    }

    pub fn mark_completed(&mut self, result_path: PathBuf) {
        self.status = ProcessingStatus::Completed;
        self.result_path = Some(result_path);
        self.last_error = None;
    }

    pub fn mark_failed(&mut self, err: &Error) {
        self.status = ProcessingStatus::Error;
        self.last_error = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn stamp(page: u32) -> Stamp {
        Stamp::new("sig.png", Rect::new(10.0, 10.0, 50.0, 20.0), page)
    }

    #[test]
    fn test_document_open() {
        let doc = Document::open("/tmp/contracts/lease.pdf");
        assert_eq!(doc.name, "lease.pdf");
        assert_eq!(doc.status, ProcessingStatus::Pending);
        assert!(doc.stamps.is_empty());
        assert!(!doc.is_ready());
    }

    #[test]
    fn test_stamp_requires_observed_page() {
        let mut doc = Document::open("a.pdf");
        assert!(doc.add_stamp(stamp(1)).is_err());

        doc.observe_page_size(PageDims::new(0.0, 0.0));
        assert!(!doc.is_ready());

        doc.observe_page_size(PageDims::letter());
        doc.observe_page_size(PageDims::a4());
        assert_eq!(doc.page_size(), Some(PageDims::letter()));
        assert!(doc.add_stamp(stamp(1)).is_ok());
    }

    #[test]
    fn test_stamp_page_range() {
        let mut doc = Document::open("a.pdf");
        doc.observe_page_size(PageDims::letter());
        doc.set_page_count(2);
        assert!(doc.add_stamp(stamp(2)).is_ok());
        assert!(doc.add_stamp(stamp(3)).is_err());
        assert_eq!(doc.stamps.len(), 1);
    }

    #[test]
    fn test_paste_follows_placement_rules() {
        let mut doc = Document::open("a.pdf");
        let source = stamp(1);
        assert!(doc.paste_stamp(&source, 1).is_err());

        doc.observe_page_size(PageDims::letter());
        doc.set_page_count(3);
        let id = doc.paste_stamp(&source, 3).unwrap();
        let pasted = doc.stamps.get(id).unwrap();
        assert_eq!((pasted.x, pasted.y, pasted.page_num), (30.0, 30.0, 3));
        assert!(doc.paste_stamp(&source, 4).is_err());
    }

    #[test]
    fn test_status_transitions() {
        let mut doc = Document::open("a.pdf");
        doc.mark_processing();
        assert_eq!(doc.status, ProcessingStatus::Processing);

        doc.mark_failed(&Error::PdfInspection("truncated".into()));
        assert_eq!(doc.status, ProcessingStatus::Error);
        assert_eq!(
            doc.last_error.as_deref(),
            Some("Cannot inspect PDF: truncated")
        );

        doc.mark_processing();
        doc.mark_completed(PathBuf::from("/out/a_capgo.pdf"));
        assert_eq!(doc.status, ProcessingStatus::Completed);
        assert!(doc.last_error.is_none());
        assert_eq!(doc.result_path, Some(PathBuf::from("/out/a_capgo.pdf")));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ProcessingStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
