//! Fixture PDFs and stamp images shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba, RgbaImage};
use lopdf::{dictionary, Document as LopdfDocument, Object, Stream};

/// Route library logs to the test output.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Write a PDF whose pages have the given sizes and draw `Page N` text.
pub fn write_pdf(dir: &Path, name: &str, sizes: &[(i64, i64)]) -> PathBuf {
    let rect = |w: i64, h: i64| Object::Array(vec![0.into(), 0.into(), w.into(), h.into()]);
    let mut doc = LopdfDocument::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for (i, (w, h)) in sizes.iter().enumerate() {
        let text = format!("BT /F1 12 Tf 72 72 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => rect(*w, *h),
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => sizes.len() as i64,
            "Resources" => dictionary! {},
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Write `count` US Letter pages.
pub fn write_letter_pdf(dir: &Path, name: &str, count: usize) -> PathBuf {
    write_pdf(dir, name, &vec![(612, 792); count])
}

/// Write a semi-transparent `width` x `height` PNG.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 160])))
        .save(&path)
        .unwrap();
    path
}

/// Concatenated content of page `num` (1-indexed).
pub fn page_text(path: &Path, num: u32) -> String {
    let doc = LopdfDocument::load(path).unwrap();
    let id = doc.get_pages()[&num];
    String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned()
}

pub fn page_count(path: &Path) -> usize {
    LopdfDocument::load(path).unwrap().get_pages().len()
}
