//! Application state: the open documents, which one is active, and the
//! stamp clipboard.
//!
//! The state is a plain value owned by the caller. Core services
//! ([`StampPipeline`](crate::pipeline::StampPipeline),
//! [`PageTransform`](crate::transform::PageTransform)) are passed in where an
//! operation needs them.

use std::path::PathBuf;

use crate::backend::PdfBackend;
use crate::error::{Error, Result};
use crate::geometry::{resolve_target_page, screen_rect_to_document, PageLayout, Rect, ViewerScale};
use crate::model::{
    Document, DocumentId, GeometryUpdate, PageDims, PageOrder, Stamp, StampId, StampImage,
};
use crate::pipeline::{BatchExporter, BatchReport};
use crate::transform::PageTransform;

/// Open documents plus UI selection state.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    documents: Vec<Document>,
    active: Option<usize>,
    active_page: u32,
    clipboard: Option<Stamp>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a PDF. The first document opened becomes active.
    pub fn import(&mut self, path: impl Into<PathBuf>) -> DocumentId {
        self.import_document(Document::open(path))
    }

    /// Add an already built document.
    pub fn import_document(&mut self, doc: Document) -> DocumentId {
        let id = doc.id;
        log::debug!("imported {} as {id}", doc.path().display());
        self.documents.push(doc);
        if self.active.is_none() {
            self.active = Some(self.documents.len() - 1);
            self.active_page = 1;
        }
        id
    }

    /// Close a document. The active index follows the remaining documents.
    pub fn remove_document(&mut self, id: DocumentId) -> Option<Document> {
        let index = self.position(id)?;
        let doc = self.documents.remove(index);
        self.active = match self.active {
            _ if self.documents.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) if active == index => {
                self.active_page = 1;
                Some(active.min(self.documents.len() - 1))
            }
            other => other,
        };
        Some(doc)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn document_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active.and_then(|i| self.documents.get(i))
    }

    pub fn active_document_mut(&mut self) -> Option<&mut Document> {
        self.active.and_then(|i| self.documents.get_mut(i))
    }

    /// Switch documents. The active page goes back to 1.
    pub fn set_active(&mut self, id: DocumentId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.active = Some(index);
                self.active_page = 1;
                true
            }
            None => false,
        }
    }

    /// Page that receives pasted stamps.
    pub fn active_page(&self) -> u32 {
        self.active_page
    }

    pub fn set_active_page(&mut self, page_num: u32) -> Result<()> {
        let doc = self.require_active()?;
        if page_num == 0 {
            return Err(Error::InvalidGeometry("page numbers start at 1".into()));
        }
        doc.check_page(page_num)?;
        self.active_page = page_num;
        Ok(())
    }

    /// Record a page size reported by the viewer for the active document.
    pub fn observe_page_size(&mut self, dims: PageDims) -> Result<()> {
        self.require_active_mut()?.observe_page_size(dims);
        Ok(())
    }

    /// Place a stamp on the active document, geometry in document space.
    pub fn place_stamp(
        &mut self,
        image: impl Into<StampImage>,
        rect: Rect,
        page_num: u32,
    ) -> Result<StampId> {
        let stamp = Stamp::new(image, rect, page_num);
        self.require_active_mut()?.add_stamp(stamp)
    }

    /// Place a stamp from a screen rectangle, on the page under its center.
    /// Falls back to the active page when the center is over no page.
    pub fn place_stamp_on_screen(
        &mut self,
        image: impl Into<StampImage>,
        screen_rect: Rect,
        scale: ViewerScale,
        layouts: &[PageLayout],
    ) -> Result<StampId> {
        let page_num = resolve_target_page(screen_rect, layouts).unwrap_or(self.active_page);
        let layout = layouts
            .iter()
            .find(|l| l.page_num == page_num)
            .ok_or_else(|| {
                Error::InvalidGeometry(format!("page {page_num} is not laid out on screen"))
            })?;
        let rect = screen_rect_to_document(screen_rect, scale, layout.bounds.origin());
        self.place_stamp(image, rect, page_num)
    }

    /// Finish a drag: move the stamp to the page under the center of
    /// `screen_rect`. Returns `Ok(false)` and leaves the stamp alone when the
    /// center is over no page.
    pub fn drop_stamp_on_screen(
        &mut self,
        id: StampId,
        screen_rect: Rect,
        scale: ViewerScale,
        layouts: &[PageLayout],
    ) -> Result<bool> {
        let Some(page_num) = resolve_target_page(screen_rect, layouts) else {
            log::debug!("stamp {id} dropped outside every page");
            return Ok(false);
        };
        let Some(layout) = layouts.iter().find(|l| l.page_num == page_num) else {
            return Ok(false);
        };
        let rect = screen_rect_to_document(screen_rect, scale, layout.bounds.origin());
        self.update_stamp(id, &GeometryUpdate::rect(rect).on_page(page_num))
    }

    /// Change a stamp's geometry on the active document.
    pub fn update_stamp(&mut self, id: StampId, update: &GeometryUpdate) -> Result<bool> {
        let doc = self.require_active_mut()?;
        if let Some(page_num) = update.page_num {
            doc.check_page(page_num)?;
        }
        doc.stamps.update(id, update)
    }

    pub fn remove_stamp(&mut self, id: StampId) -> Result<Option<Stamp>> {
        Ok(self.require_active_mut()?.stamps.remove(id))
    }

    pub fn clear_stamps(&mut self) -> Result<()> {
        self.require_active_mut()?.stamps.clear();
        Ok(())
    }

    /// Put a stamp of the active document on the clipboard.
    pub fn copy_stamp(&mut self, id: StampId) -> Result<()> {
        let stamp = self
            .require_active()?
            .stamps
            .get(id)
            .cloned()
            .ok_or(Error::StampNotFound(id))?;
        self.clipboard = Some(stamp);
        Ok(())
    }

    pub fn clipboard(&self) -> Option<&Stamp> {
        self.clipboard.as_ref()
    }

    /// Paste the clipboard onto the active page of the active document.
    /// Returns `Ok(None)` when the clipboard is empty.
    pub fn paste(&mut self) -> Result<Option<StampId>> {
        let Some(source) = self.clipboard.clone() else {
            return Ok(None);
        };
        let page_num = self.active_page;
        self.require_active_mut()?
            .paste_stamp(&source, page_num)
            .map(Some)
    }

    /// Include or exclude a document from batch export.
    pub fn set_selected(&mut self, id: DocumentId, selected: bool) -> bool {
        match self.document_mut(id) {
            Some(doc) => {
                doc.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn selected_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|d| d.selected)
    }

    /// Export every selected document in order.
    pub fn export_selected<B: PdfBackend>(&mut self, exporter: &BatchExporter<B>) -> BatchReport {
        exporter.export(&mut self.documents)
    }

    /// Reorder a document's pages and move its stamps along.
    pub fn apply_transform<B: PdfBackend>(
        &mut self,
        transform: &PageTransform<B>,
        id: DocumentId,
        order: &PageOrder,
    ) -> Result<PathBuf> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::PageCollection(format!("no open document {id}")))?;
        let path = transform.apply(&mut self.documents[index], order)?;
        if self.active == Some(index) && self.active_page as usize > order.len() {
            self.active_page = 1;
        }
        Ok(path)
    }

    fn position(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    fn require_active(&self) -> Result<&Document> {
        self.active_document()
            .ok_or_else(|| Error::InvalidGeometry("no active document".into()))
    }

    fn require_active_mut(&mut self) -> Result<&mut Document> {
        self.active_document_mut()
            .ok_or_else(|| Error::InvalidGeometry("no active document".into()))
    }
}
