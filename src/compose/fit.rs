//! "object-fit: contain" placement of a raster inside a stamp box.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the image lands inside its stamp box, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementBox {
    pub final_width: f64,
    pub final_height: f64,
    /// Offset from the box's left edge
    pub offset_x: f64,
    /// Offset from the box's top edge
    pub offset_y: f64,
}

/// Fit an `image_width` x `image_height` raster into a `box_width` x
/// `box_height` box, preserving aspect ratio and centering along the slack
/// axis.
///
/// Relatively wider images fill the box width; everything else, including an
/// exact ratio match, fills the box height.
pub fn fit_contain(
    box_width: f64,
    box_height: f64,
    image_width: u32,
    image_height: u32,
) -> Result<PlacementBox> {
    if !(box_width.is_finite() && box_height.is_finite()) || box_width <= 0.0 || box_height <= 0.0
    {
        return Err(Error::InvalidGeometry(format!(
            "stamp box must be positive, got {box_width}x{box_height}"
        )));
    }
    if image_width == 0 || image_height == 0 {
        return Err(Error::InvalidGeometry(format!(
            "image has no pixels ({image_width}x{image_height})"
        )));
    }

    let target_ratio = box_width / box_height;
    let image_ratio = f64::from(image_width) / f64::from(image_height);

    let placement = if image_ratio > target_ratio {
        let final_height = box_width / image_ratio;
        PlacementBox {
            final_width: box_width,
            final_height,
            offset_x: 0.0,
            offset_y: (box_height - final_height) / 2.0,
        }
    } else {
        let final_width = box_height * image_ratio;
        PlacementBox {
            final_width,
            final_height: box_height,
            offset_x: (box_width - final_width) / 2.0,
            offset_y: 0.0,
        }
    };
    Ok(placement)
}
