//! Conversions between screen, layout, and PDF point space.
//!
//! Three coordinate spaces meet here:
//!
//! - **Screen space**: pixels the pointer operates in, after zoom and scroll.
//! - **Document space**: PDF points at scale 1.0 with a top-left origin. This
//!   is what [`Stamp`](crate::model::Stamp) geometry is stored in.
//! - **PDF space**: PDF points with a bottom-left origin, used when drawing.
//!
//! Document space and PDF space differ only by the vertical flip, see
//! [`flip_y`] and [`unflip_y`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point in any of the three spaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `p` lies inside the rectangle (edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Allowed range for the user zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    /// Clamp a requested zoom into the range. Non-finite requests fall back to 1.0.
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(self.min, self.max)
        } else {
            1.0_f64.clamp(self.min, self.max)
        }
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 0.4, max: 4.0 }
    }
}

/// Combined fit-to-container scale and user zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerScale {
    base: f64,
    zoom: f64,
}

impl ViewerScale {
    /// Build a viewer scale using the default zoom range.
    pub fn new(base: f64, zoom: f64) -> Result<Self> {
        Self::with_range(base, zoom, ZoomRange::default())
    }

    /// Build a viewer scale. `base` must be finite and positive; `zoom` is
    /// clamped into `range`.
    pub fn with_range(base: f64, zoom: f64, range: ZoomRange) -> Result<Self> {
        if !base.is_finite() || base <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "base scale must be positive, got {base}"
            )));
        }
        Ok(Self {
            base,
            zoom: range.clamp(zoom),
        })
    }

    /// Fit-to-container scale for a page of `page_width` points shown in a
    /// container `container_width` pixels wide.
    pub fn fit_width(container_width: f64, page_width: f64, zoom: f64) -> Result<Self> {
        if !page_width.is_finite() || page_width <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "page width must be positive, got {page_width}"
            )));
        }
        Self::new(container_width / page_width, zoom)
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Pixels per PDF point.
    pub fn value(&self) -> f64 {
        self.base * self.zoom
    }
}

/// `(screen - page_origin) / scale`.
pub fn screen_to_document(screen: Point, scale: ViewerScale, page_origin: Point) -> Point {
    let s = scale.value();
    Point::new((screen.x - page_origin.x) / s, (screen.y - page_origin.y) / s)
}

/// Inverse of [`screen_to_document`].
pub fn document_to_screen(doc: Point, scale: ViewerScale, page_origin: Point) -> Point {
    let s = scale.value();
    Point::new(doc.x * s + page_origin.x, doc.y * s + page_origin.y)
}

/// Map a whole screen rectangle into document space.
pub fn screen_rect_to_document(rect: Rect, scale: ViewerScale, page_origin: Point) -> Rect {
    let origin = screen_to_document(rect.origin(), scale, page_origin);
    let s = scale.value();
    Rect::new(origin.x, origin.y, rect.width / s, rect.height / s)
}

/// Where a page is currently painted on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    /// Page number (1-indexed)
    pub page_num: u32,
    /// Rendered bounds in screen pixels
    pub bounds: Rect,
}

/// Page whose rendered bounds contain the center of `screen_rect`.
///
/// Returns `None` when the center is outside every page; the caller keeps
/// the stamp on its previous page.
pub fn resolve_target_page(screen_rect: Rect, pages: &[PageLayout]) -> Option<u32> {
    let center = screen_rect.center();
    pages
        .iter()
        .find(|layout| layout.bounds.contains(center))
        .map(|layout| layout.page_num)
}

/// Bottom edge, measured from the page bottom, of a box whose top edge is
/// `top` points below the page top.
pub fn flip_y(top: f64, height: f64, page_height: f64) -> f64 {
    page_height - (top + height)
}

/// Inverse of [`flip_y`].
pub fn unflip_y(bottom: f64, height: f64, page_height: f64) -> f64 {
    page_height - bottom - height
}
