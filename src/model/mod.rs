//! In-memory model: documents, stamps, and page orders.
//!
//! Stamp geometry is always stored in document space (PDF points at scale
//! 1.0, top-left origin) so it is independent of the viewer's zoom.

mod document;
mod page;
mod page_order;
mod stamp;

pub use document::{Document, DocumentId, ProcessingStatus};
pub use page::{Matrix, PageDims, IDENTITY};
pub use page_order::PageOrder;
pub use stamp::{GeometryUpdate, Stamp, StampId, StampImage, StampList, PASTE_OFFSET};
