//! Placed stamps and the per-document stamp collection.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};

/// Offset applied to a pasted copy, in PDF points.
pub const PASTE_OFFSET: f64 = 20.0;

/// Process-unique stamp identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampId(Uuid);

impl StampId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StampId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Source raster of a stamp.
///
/// On the wire this is a single string: anything containing `;base64,` is
/// an inline `data:` URL, everything else is a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StampImage {
    /// `data:image/png;base64,...`
    DataUrl(String),
    /// PNG or JPEG file on disk
    Path(PathBuf),
}

impl StampImage {
    /// Whether the image is carried inline.
    pub fn is_inline(&self) -> bool {
        matches!(self, StampImage::DataUrl(_))
    }
}

impl From<String> for StampImage {
    fn from(value: String) -> Self {
        if value.contains(";base64,") {
            StampImage::DataUrl(value)
        } else {
            StampImage::Path(PathBuf::from(value))
        }
    }
}

impl From<&str> for StampImage {
    fn from(value: &str) -> Self {
        StampImage::from(value.to_string())
    }
}

impl From<PathBuf> for StampImage {
    fn from(value: PathBuf) -> Self {
        StampImage::Path(value)
    }
}

impl From<StampImage> for String {
    fn from(value: StampImage) -> Self {
        match value {
            StampImage::DataUrl(url) => url,
            StampImage::Path(path) => path.to_string_lossy().into_owned(),
        }
    }
}

/// A placed image.
///
/// Geometry is in document space: PDF points at scale 1.0, top-left origin.
/// It never holds zoomed or scrolled screen units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
    #[serde(default)]
    pub id: StampId,
    pub image: StampImage,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Target page (1-indexed) in the document's current page order
    pub page_num: u32,
}

impl Stamp {
    /// Create a stamp covering `rect` on `page_num`.
    pub fn new(image: impl Into<StampImage>, rect: Rect, page_num: u32) -> Self {
        Self {
            id: StampId::new(),
            image: image.into(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            page_num,
        }
    }

    /// Placement box in document space.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Check the geometry invariants.
    pub fn validate(&self) -> Result<()> {
        validate_geometry(self.x, self.y, self.width, self.height)?;
        if self.page_num == 0 {
            return Err(Error::InvalidGeometry("page numbers start at 1".into()));
        }
        Ok(())
    }

    fn apply(&mut self, update: &GeometryUpdate) {
        if let Some(x) = update.x {
            self.x = x;
        }
        if let Some(y) = update.y {
            self.y = y;
        }
        if let Some(width) = update.width {
            self.width = width;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(page_num) = update.page_num {
            self.page_num = page_num;
        }
    }
}

fn validate_geometry(x: f64, y: f64, width: f64, height: f64) -> Result<()> {
    if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
        return Err(Error::InvalidGeometry("coordinates must be finite".into()));
    }
    if width <= 0.0 || height <= 0.0 {
        return Err(Error::InvalidGeometry(format!(
            "stamp size must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Partial geometry change. `None` fields are left as they are.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub page_num: Option<u32>,
}

impl GeometryUpdate {
    /// Move the top-left corner.
    pub fn moved_to(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Replace the whole box.
    pub fn rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            page_num: None,
        }
    }

    /// Also retarget to another page.
    pub fn on_page(mut self, page_num: u32) -> Self {
        self.page_num = Some(page_num);
        self
    }
}

/// Ordered stamps of one document. Order is z-order: later entries draw on
/// top and win hit-test ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StampList {
    stamps: Vec<Stamp>,
}

impl StampList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stamp under a freshly assigned id.
    pub fn add(&mut self, mut stamp: Stamp) -> Result<StampId> {
        stamp.validate()?;
        stamp.id = StampId::new();
        let id = stamp.id;
        self.stamps.push(stamp);
        Ok(id)
    }

    /// Apply a partial geometry change. Returns `Ok(false)` when `id` is
    /// unknown; the image and id are never touched.
    pub fn update(&mut self, id: StampId, update: &GeometryUpdate) -> Result<bool> {
        let Some(stamp) = self.stamps.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        let mut candidate = stamp.clone();
        candidate.apply(update);
        candidate.validate()?;
        *stamp = candidate;
        Ok(true)
    }

    /// Remove by id.
    pub fn remove(&mut self, id: StampId) -> Option<Stamp> {
        let index = self.stamps.iter().position(|s| s.id == id)?;
        Some(self.stamps.remove(index))
    }

    /// Paste a copy of `source` onto `active_page`, shifted by [`PASTE_OFFSET`].
    pub fn duplicate_on_paste(&mut self, source: &Stamp, active_page: u32) -> Result<StampId> {
        let mut copy = source.clone();
        copy.x += PASTE_OFFSET;
        copy.y += PASTE_OFFSET;
        copy.page_num = active_page;
        self.add(copy)
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }

    pub fn get(&self, id: StampId) -> Option<&Stamp> {
        self.stamps.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stamp> {
        self.stamps.iter()
    }

    pub fn as_slice(&self) -> &[Stamp] {
        &self.stamps
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Stamps targeting `page_num`, in z-order.
    pub fn on_page(&self, page_num: u32) -> impl Iterator<Item = &Stamp> {
        self.stamps.iter().filter(move |s| s.page_num == page_num)
    }

    /// Topmost stamp on `page_num` containing `point` (document space).
    pub fn hit_test(&self, page_num: u32, point: Point) -> Option<StampId> {
        self.stamps
            .iter()
            .rev()
            .find(|s| s.page_num == page_num && s.rect().contains(point))
            .map(|s| s.id)
    }

    /// Build a list from stamps that already carry unique ids.
    pub(crate) fn from_stamps(stamps: Vec<Stamp>) -> Self {
        Self { stamps }
    }
}

impl<'a> IntoIterator for &'a StampList {
    type Item = &'a Stamp;
    type IntoIter = std::slice::Iter<'a, Stamp>;

    fn into_iter(self) -> Self::IntoIter {
        self.stamps.iter()
    }
}
