//! Error types for capgo.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for capgo operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while stamping or transforming a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error not tied to a specific path.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// A stamp's source raster could not be read or is not PNG/JPEG.
    #[error("Cannot decode image for stamp {index}: {reason}")]
    ImageDecode {
        /// Position of the stamp in the export order
        index: usize,
        /// What went wrong
        reason: String,
    },

    /// Page count or page dimensions could not be read from the source PDF.
    #[error("Cannot inspect PDF: {0}")]
    PdfInspection(String),

    /// The PDF writer rejected a computed placement.
    #[error("Watermark placement rejected on page {page}: {reason}")]
    WatermarkPlacement {
        /// Target page (1-indexed)
        page: u32,
        /// What went wrong
        reason: String,
    },

    /// The page selection step of a page transform failed.
    #[error("Page collection failed: {0}")]
    PageCollection(String),

    /// A file could not be created, written, or removed.
    #[error("File system error at {}: {source}", path.display())]
    FileSystem {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Stamp geometry or viewer scale is degenerate.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A JSON request payload could not be parsed.
    #[error("Malformed request: {0}")]
    Request(String),

    /// No stamp with the given id exists in the document.
    #[error("Stamp not found: {0}")]
    StampNotFound(crate::model::StampId),

    /// The operation was stopped before it started.
    #[error("Operation cancelled")]
    Cancelled,

    /// A background task panicked or was aborted.
    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

/// Coarse failure category, for callers that report errors to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ImageDecode,
    PdfInspection,
    WatermarkPlacement,
    PageCollection,
    FileSystem,
    InvalidInput,
    Cancelled,
    Internal,
}

impl Error {
    /// Build a [`Error::FileSystem`] for `path`.
    pub fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::FileSystem { .. } => ErrorKind::FileSystem,
            Error::UnknownFormat | Error::UnsupportedVersion(_) | Error::PdfInspection(_) => {
                ErrorKind::PdfInspection
            }
            Error::ImageDecode { .. } => ErrorKind::ImageDecode,
            Error::WatermarkPlacement { .. } => ErrorKind::WatermarkPlacement,
            Error::PageCollection(_) => ErrorKind::PageCollection,
            Error::InvalidGeometry(_) | Error::Request(_) | Error::StampNotFound(_) => {
                ErrorKind::InvalidInput
            }
            Error::Cancelled => ErrorKind::Cancelled,
            Error::TaskJoin(_) => ErrorKind::Internal,
        }
    }
}

/// Map a `lopdf` load failure into an inspection error.
pub(crate) fn inspection_error(err: lopdf::Error) -> Error {
    match err {
        lopdf::Error::Decryption(_) => Error::PdfInspection("document is encrypted".into()),
        other => Error::PdfInspection(other.to_string()),
    }
}
