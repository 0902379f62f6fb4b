//! Page-level types.

use serde::{Deserialize, Serialize};

/// Size of one page as a viewer displays it: the CropBox (clipped to the
/// MediaBox) with `/Rotate` applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDims {
    /// Page width in points (1 point = 1/72 inch)
    pub width: f64,

    /// Page height in points
    pub height: f64,

    /// Lower-left x of the visible box in user space (usually 0)
    #[serde(default)]
    pub origin_x: f64,

    /// Lower-left y of the visible box in user space (usually 0)
    #[serde(default)]
    pub origin_y: f64,

    /// Clockwise page rotation: 0, 90, 180, or 270
    #[serde(default)]
    pub rotation: u16,
}

/// `[a b c d e f]` mapping the displayed page to user space.
pub type Matrix = [f64; 6];

/// The matrix that changes nothing.
pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl PageDims {
    /// Create page dimensions with a zero origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
            rotation: 0,
        }
    }

    /// Create page dimensions from a MediaBox `[llx lly urx ury]`.
    pub fn from_media_box(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self {
            width: urx - llx,
            height: ury - lly,
            origin_x: llx,
            origin_y: lly,
            rotation: 0,
        }
    }

    /// Displayed size from normalized `[llx lly urx ury]` boxes and a raw
    /// `/Rotate` value.
    ///
    /// A CropBox that does not overlap the MediaBox is ignored. Rotations
    /// that are not a multiple of 90 are treated as 0.
    pub fn from_page_boxes(media: [f64; 4], crop: Option<[f64; 4]>, rotate: i64) -> Self {
        let visible = crop
            .map(|c| {
                [
                    c[0].max(media[0]),
                    c[1].max(media[1]),
                    c[2].min(media[2]),
                    c[3].min(media[3]),
                ]
            })
            .filter(|b| b[2] > b[0] && b[3] > b[1])
            .unwrap_or(media);
        let mut dims = Self::from_media_box(visible[0], visible[1], visible[2], visible[3]);
        let rotation = rotate.rem_euclid(360);
        if rotation % 90 == 0 {
            dims.rotation = rotation as u16;
        }
        if dims.rotation % 180 == 90 {
            std::mem::swap(&mut dims.width, &mut dims.height);
        }
        dims
    }

    /// Map from displayed coordinates (origin at the visible lower-left
    /// corner) to the page's user space.
    pub fn display_matrix(&self) -> Matrix {
        let (ox, oy) = (self.origin_x, self.origin_y);
        // Unrotated size of the visible box
        let (w, h) = if self.rotation % 180 == 90 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        match self.rotation {
            90 => [0.0, 1.0, -1.0, 0.0, ox + w, oy],
            180 => [-1.0, 0.0, 0.0, -1.0, ox + w, oy + h],
            270 => [0.0, -1.0, 1.0, 0.0, ox, oy + h],
            _ => [1.0, 0.0, 0.0, 1.0, ox, oy],
        }
    }

    /// US Letter (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0) // 8.5 * 72, 11 * 72
    }

    /// A4 (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Both sides finite and positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for PageDims {
    fn default() -> Self {
        Self::letter()
    }
}
