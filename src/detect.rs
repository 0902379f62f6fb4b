//! Format sniffing for input PDFs and stamp rasters.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Version from a `%PDF-M.m` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl std::fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}.{}", self.major, self.minor)
    }
}

/// Raster formats accepted as stamp sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub(crate) fn image_format(&self) -> image::ImageFormat {
        match self {
            RasterFormat::Png => image::ImageFormat::Png,
            RasterFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

const PDF_HEADER: &[u8] = b"%PDF-";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Read the header of the file at `path` and reject anything that is not a
/// PDF before a full parse is attempted.
pub fn sniff_pdf(path: &Path) -> Result<PdfVersion> {
    let mut head = [0u8; 8];
    let mut file = File::open(path).map_err(|e| Error::fs(path, e))?;
    let mut filled = 0;
    while filled < head.len() {
        match file.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::fs(path, e)),
        }
    }
    parse_header(&head[..filled])
}

fn parse_header(head: &[u8]) -> Result<PdfVersion> {
    let rest = head.strip_prefix(PDF_HEADER).ok_or(Error::UnknownFormat)?;
    match rest {
        [major @ b'0'..=b'9', b'.', minor @ b'0'..=b'9', ..] => Ok(PdfVersion {
            major: major - b'0',
            minor: minor - b'0',
        }),
        [_, _, _, ..] => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(&rest[..3]).into_owned(),
        )),
        _ => Err(Error::UnknownFormat),
    }
}

/// Sniff a PNG or JPEG signature. Anything else is unsupported.
pub fn detect_raster(data: &[u8]) -> Option<RasterFormat> {
    if data.starts_with(PNG_MAGIC) {
        Some(RasterFormat::Png)
    } else if data.starts_with(JPEG_MAGIC) {
        Some(RasterFormat::Jpeg)
    } else {
        None
    }
}
