//! Export options and configuration.

use std::path::PathBuf;

use image::imageops::FilterType;

use crate::compose::{RasterLimits, DEFAULT_QUALITY_FACTOR};

/// Suffix appended to exported file names.
pub const DEFAULT_SUFFIX: &str = "_capgo";

/// Options for exporting stamped documents.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Suffix inserted before the extension of the output name
    pub suffix: String,

    /// Destination directory for exported files
    pub output_dir: PathBuf,

    /// Supersampling factor for stamp rasters
    pub quality_factor: f64,

    /// Resampling filter used when supersampling
    pub resample_filter: FilterType,

    /// Size bounds for each supersampled stamp raster
    pub raster_limits: RasterLimits,

    /// Whether to prepare stamp rasters in parallel
    pub parallel: bool,

    /// Whether to Flate-compress written streams
    pub compress: bool,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output name suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the destination directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the supersampling factor.
    pub fn with_quality_factor(mut self, factor: f64) -> Self {
        self.quality_factor = factor;
        self
    }

    /// Set the resampling filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.resample_filter = filter;
        self
    }

    /// Set the size bounds for stamp rasters.
    pub fn with_raster_limits(mut self, limits: RasterLimits) -> Self {
        self.raster_limits = limits;
        self
    }

    /// Enable or disable parallel raster preparation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel raster preparation.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            output_dir: default_output_dir(),
            quality_factor: DEFAULT_QUALITY_FACTOR,
            resample_filter: FilterType::Lanczos3,
            raster_limits: RasterLimits::default(),
            parallel: true,
            compress: true,
        }
    }
}

/// The user's downloads directory, or the system temp dir when no home
/// directory is known.
pub fn default_output_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join("Downloads"))
        .unwrap_or_else(std::env::temp_dir)
}
