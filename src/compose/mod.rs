//! Image compositing: turn a stamp into a supersampled raster and a
//! placement descriptor for the PDF writer.
//!
//! # Example
//!
//! ```no_run
//! use capgo::compose::Compositor;
//! use capgo::geometry::Rect;
//! use capgo::model::{PageDims, Stamp};
//!
//! let stamp = Stamp::new("signature.png", Rect::new(50.0, 50.0, 105.0, 56.0), 1);
//! let asset = Compositor::default().compose(0, &stamp, &PageDims::letter())?;
//! println!("draw at ({}, {})", asset.watermark.x, asset.watermark.y);
//! # Ok::<(), capgo::Error>(())
//! ```

mod fit;
mod source;

pub use fit::{fit_contain, PlacementBox};
pub use source::{decode_source, read_source};

use std::io::{Cursor, Write};
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::geometry::flip_y;
use crate::model::{PageDims, Stamp};

/// Default supersampling factor.
pub const DEFAULT_QUALITY_FACTOR: f64 = 4.0;

/// How many page widths (or heights) a stamp box may span.
const MAX_BOX_TO_PAGE: f64 = 4.0;

/// Upper bounds on the supersampled raster of a single stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterLimits {
    /// Longest allowed side, in pixels
    pub max_side: u32,
    /// Largest allowed width x height, in pixels
    pub max_pixels: u64,
}

impl RasterLimits {
    fn check(&self, width: f64, height: f64) -> Result<()> {
        let max_side = f64::from(self.max_side);
        if width > max_side || height > max_side {
            return Err(Error::InvalidGeometry(format!(
                "stamp raster of {width:.0}x{height:.0} px exceeds {} px per side",
                self.max_side
            )));
        }
        if width * height > self.max_pixels as f64 {
            return Err(Error::InvalidGeometry(format!(
                "stamp raster of {width:.0}x{height:.0} px exceeds {} pixels",
                self.max_pixels
            )));
        }
        Ok(())
    }
}

impl Default for RasterLimits {
    fn default() -> Self {
        Self {
            max_side: 16_384,
            max_pixels: 64 * 1024 * 1024,
        }
    }
}

/// Instruction for the PDF writer: draw the asset on `page` with its
/// lower-left corner at (`x`, `y`), at `scale` points per pixel.
///
/// Coordinates are in the page as displayed: origin at the lower-left of
/// the visible box, after `/Rotate` is applied. The writer maps them back
/// to user space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Watermark {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub page: u32,
}

impl Watermark {
    /// Reject placements the writer cannot draw.
    pub fn validate(&self) -> Result<()> {
        let reason = if !(self.x.is_finite() && self.y.is_finite()) {
            Some("position must be finite".to_string())
        } else if !self.scale.is_finite() || self.scale <= 0.0 {
            Some(format!("scale must be positive, got {}", self.scale))
        } else if self.page == 0 {
            Some("page numbers start at 1".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(Error::WatermarkPlacement {
                page: self.page,
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Supersampled stamp raster in a temporary PNG, removed on drop.
#[derive(Debug)]
pub struct StampAsset {
    file: NamedTempFile,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub placement: PlacementBox,
    pub watermark: Watermark,
}

impl StampAsset {
    /// Location of the temporary PNG.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Drawn size in PDF points.
    pub fn drawn_size(&self) -> (f64, f64) {
        (
            f64::from(self.pixel_width) * self.watermark.scale,
            f64::from(self.pixel_height) * self.watermark.scale,
        )
    }
}

/// Pure placement math for one stamp, before any pixels are touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan {
    pub placement: PlacementBox,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub watermark: Watermark,
}

/// Fits, supersamples, and positions stamp images.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    quality_factor: f64,
    filter: FilterType,
    limits: RasterLimits,
}

impl Compositor {
    pub fn new(quality_factor: f64, filter: FilterType) -> Self {
        Self {
            quality_factor,
            filter,
            limits: RasterLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RasterLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn quality_factor(&self) -> f64 {
        self.quality_factor
    }

    /// Compute placement for a stamp whose source is `image_width` x
    /// `image_height` pixels, on a page of size `page`.
    ///
    /// Boxes far larger than the page, or rasters over the configured
    /// limits, are rejected before any pixels are allocated.
    pub fn plan(
        &self,
        stamp: &Stamp,
        image_width: u32,
        image_height: u32,
        page: &PageDims,
    ) -> Result<Plan> {
        if stamp.width > page.width * MAX_BOX_TO_PAGE
            || stamp.height > page.height * MAX_BOX_TO_PAGE
        {
            return Err(Error::InvalidGeometry(format!(
                "stamp box {:.2}x{:.2} pt is too large for a {:.2}x{:.2} pt page",
                stamp.width, stamp.height, page.width, page.height
            )));
        }
        let placement = fit_contain(stamp.width, stamp.height, image_width, image_height)?;
        let k = self.quality_factor;
        let (raw_width, raw_height) = (placement.final_width * k, placement.final_height * k);
        self.limits.check(raw_width, raw_height)?;
        let pixel_width = (raw_width as u32).max(1);
        let pixel_height = (raw_height as u32).max(1);

        let x = stamp.x + placement.offset_x;
        let y = flip_y(
            stamp.y + placement.offset_y,
            placement.final_height,
            page.height,
        );

        Ok(Plan {
            placement,
            pixel_width,
            pixel_height,
            watermark: Watermark {
                x,
                y,
                scale: 1.0 / k,
                page: stamp.page_num,
            },
        })
    }

    /// Decode, fit, and supersample the stamp at `index`, writing the result
    /// to a temporary PNG.
    pub fn compose(&self, index: usize, stamp: &Stamp, page: &PageDims) -> Result<StampAsset> {
        if !self.quality_factor.is_finite() || self.quality_factor <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "quality factor must be positive, got {}",
                self.quality_factor
            )));
        }

        let (source, _) = decode_source(index, &stamp.image)?;
        let plan = self.plan(stamp, source.width(), source.height(), page)?;

        let resized = DynamicImage::ImageRgba8(source.to_rgba8()).resize_exact(
            plan.pixel_width,
            plan.pixel_height,
            self.filter,
        );

        let mut encoded = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|e| Error::ImageDecode {
                index,
                reason: format!("cannot encode supersampled image: {e}"),
            })?;

        let mut file = tempfile::Builder::new()
            .prefix("stamp_")
            .suffix(".png")
            .tempfile()
            .map_err(|e| Error::fs(std::env::temp_dir(), e))?;
        file.write_all(&encoded)
            .and_then(|_| file.flush())
            .map_err(|e| Error::fs(file.path(), e))?;

        log::debug!(
            "stamp {index}: {}x{} px for {:.2}x{:.2} pt on page {}",
            plan.pixel_width,
            plan.pixel_height,
            plan.placement.final_width,
            plan.placement.final_height,
            stamp.page_num
        );

        Ok(StampAsset {
            file,
            pixel_width: plan.pixel_width,
            pixel_height: plan.pixel_height,
            placement: plan.placement,
            watermark: plan.watermark,
        })
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY_FACTOR, FilterType::Lanczos3)
    }
}
