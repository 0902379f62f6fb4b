//! Decoding stamp sources from `data:` URLs or files.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use image::DynamicImage;

use crate::detect::{detect_raster, RasterFormat};
use crate::error::{Error, Result};
use crate::model::StampImage;

const BASE64_MARKER: &str = ";base64,";

/// Raw bytes of a stamp source.
pub fn read_source(image: &StampImage) -> std::result::Result<Vec<u8>, String> {
    match image {
        StampImage::DataUrl(url) => decode_data_url(url),
        StampImage::Path(path) => {
            std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
        }
    }
}

fn decode_data_url(url: &str) -> std::result::Result<Vec<u8>, String> {
    let start = url
        .find(BASE64_MARKER)
        .ok_or_else(|| "invalid base64 data format".to_string())?;
    let payload: String = url[start + BASE64_MARKER.len()..]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if payload.is_empty() {
        return Err("invalid base64 data format".into());
    }
    B64.decode(payload.as_bytes())
        .map_err(|e| format!("invalid base64 payload: {e}"))
}

/// Decode the stamp at `index` into pixels. Only PNG and JPEG are accepted.
pub fn decode_source(index: usize, image: &StampImage) -> Result<(DynamicImage, RasterFormat)> {
    let fail = |reason: String| Error::ImageDecode { index, reason };

    let bytes = read_source(image).map_err(fail)?;
    let format = detect_raster(&bytes)
        .ok_or_else(|| fail("unsupported image format (expected PNG or JPEG)".into()))?;
    let decoded = image::load_from_memory_with_format(&bytes, format.image_format())
        .map_err(|e| fail(e.to_string()))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(fail("image has no pixels".into()));
    }
    Ok((decoded, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 255, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_decode_data_url() {
        let url = format!("data:image/png;base64,{}", B64.encode(png_bytes(6, 3)));
        let (img, format) = decode_source(0, &StampImage::from(url)).unwrap();
        assert_eq!((img.width(), img.height()), (6, 3));
        assert_eq!(format, RasterFormat::Png);
    }

    #[test]
    fn test_decode_data_url_with_line_breaks() {
        let encoded = B64.encode(png_bytes(2, 2));
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let url = format!("data:image/png;base64,{head}\n{tail}");
        assert!(decode_source(0, &StampImage::DataUrl(url)).is_ok());
    }

    #[test]
    fn test_decode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seal.png");
        std::fs::write(&path, png_bytes(4, 8)).unwrap();
        let (img, _) = decode_source(0, &StampImage::Path(path)).unwrap();
        assert_eq!((img.width(), img.height()), (4, 8));
    }

    #[test]
    fn test_bad_sources() {
        let err = decode_source(2, &StampImage::DataUrl("data:image/png;base64,!!!".into()))
            .unwrap_err();
        assert!(matches!(err, Error::ImageDecode { index: 2, .. }));

        let gif = format!("data:image/gif;base64,{}", B64.encode(b"GIF89a\x01\x00"));
        assert!(decode_source(0, &StampImage::DataUrl(gif)).is_err());

        let missing = StampImage::from("/definitely/not/here.png");
        assert!(matches!(
            decode_source(1, &missing),
            Err(Error::ImageDecode { index: 1, .. })
        ));

        // PNG signature followed by garbage.
        let truncated = format!(
            "data:image/png;base64,{}",
            B64.encode(b"\x89PNG\r\n\x1a\nnot really")
        );
        assert!(decode_source(0, &StampImage::DataUrl(truncated)).is_err());
    }
}
