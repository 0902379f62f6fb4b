//! PDF backend abstraction layer.
//!
//! The pipeline and the page transform only talk to [`PdfBackend`]; the
//! concrete PDF library (lopdf) stays behind [`LopdfBackend`].

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use lopdf::{dictionary, Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::compose::Watermark;
use crate::detect::sniff_pdf;
use crate::error::{inspection_error, Error, Result};
use crate::model::{PageDims, PageOrder, IDENTITY};

/// How far up the page tree inherited attributes are looked for.
const MAX_TREE_DEPTH: usize = 32;

/// Attributes a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Abstract interface for the PDF operations the stamper needs.
///
/// Every method reads its input from disk and, where it produces a
/// document, writes a complete new file to `output`. Inputs are never
/// modified in place.
pub trait PdfBackend: Send + Sync {
    /// Displayed size of every page, in page order.
    fn inspect(&self, path: &Path) -> Result<Vec<PageDims>>;

    /// Draw the raster at `image` onto one page of `input` and save the
    /// result to `output`.
    fn apply_watermark(
        &self,
        input: &Path,
        output: &Path,
        image: &Path,
        watermark: &Watermark,
    ) -> Result<()>;

    /// Write a document whose pages are `order` (1-indexed source pages,
    /// duplicates allowed) taken from `input`.
    fn collect_pages(&self, input: &Path, output: &Path, order: &PageOrder) -> Result<()>;
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
#[derive(Debug, Clone, Copy)]
pub struct LopdfBackend {
    compress: bool,
}

impl LopdfBackend {
    pub fn new() -> Self {
        Self { compress: true }
    }

    /// Whether written streams are Flate-compressed.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    fn load(&self, path: &Path) -> Result<LopdfDocument> {
        let version = sniff_pdf(path)?;
        let doc = LopdfDocument::load(path).map_err(inspection_error)?;
        if doc.is_encrypted() {
            return Err(Error::PdfInspection("document is encrypted".into()));
        }
        log::trace!("loaded {} ({version})", path.display());
        Ok(doc)
    }

    fn save(&self, doc: &mut LopdfDocument, output: &Path) -> Result<()> {
        if self.compress {
            doc.compress();
        }
        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| Error::fs(output, std::io::Error::other(e.to_string())))?;
        std::fs::write(output, &buf).map_err(|e| Error::fs(output, e))
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBackend for LopdfBackend {
    fn inspect(&self, path: &Path) -> Result<Vec<PageDims>> {
        let doc = self.load(path)?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(Error::PdfInspection("document has no pages".into()));
        }
        pages
            .iter()
            .map(|(&num, &id)| {
                page_box(&doc, id).ok_or_else(|| {
                    Error::PdfInspection(format!("page {num} has no usable MediaBox"))
                })
            })
            .collect()
    }

    fn apply_watermark(
        &self,
        input: &Path,
        output: &Path,
        image: &Path,
        watermark: &Watermark,
    ) -> Result<()> {
        watermark.validate()?;
        let page = watermark.page;
        let fail = |reason: String| Error::WatermarkPlacement { page, reason };

        let mut doc = self.load(input)?;
        let pages = doc.get_pages();
        let page_id = *pages.get(&page).ok_or_else(|| {
            fail(format!(
                "page out of range (document has {} pages)",
                pages.len()
            ))
        })?;

        let raster = image::open(image)
            .map_err(|e| fail(format!("cannot load stamp raster: {e}")))?
            .to_rgba8();
        let (width, height) = (
            f64::from(raster.width()) * watermark.scale,
            f64::from(raster.height()) * watermark.scale,
        );

        let dims = page_box(&doc, page_id)
            .ok_or_else(|| fail("page has no usable MediaBox".to_string()))?;

        let image_id = embed_rgba(&mut doc, &raster, self.compress)?;
        let name = register_xobject(&mut doc, page_id, image_id).map_err(fail)?;
        let matrix = dims.display_matrix();
        let to_user = if matrix == IDENTITY {
            String::new()
        } else {
            let [a, b, c, d, e, f] = matrix;
            format!("{a:.4} {b:.4} {c:.4} {d:.4} {e:.4} {f:.4} cm ")
        };
        let ops = format!(
            "q {to_user}{width:.4} 0 0 {height:.4} {:.4} {:.4} cm /{name} Do Q",
            watermark.x, watermark.y
        );
        append_isolated(&mut doc, page_id, ops.into_bytes()).map_err(fail)?;

        log::debug!(
            "drew {name} ({width:.2}x{height:.2} pt) at ({:.2}, {:.2}) on page {page}",
            watermark.x,
            watermark.y
        );
        self.save(&mut doc, output)
    }

    fn collect_pages(&self, input: &Path, output: &Path, order: &PageOrder) -> Result<()> {
        let mut doc = self.load(input)?;
        let pages = doc.get_pages();
        order.validate(pages.len() as u32)?;

        let root_id = doc
            .catalog()
            .and_then(|c| c.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|e| Error::PageCollection(format!("missing page tree root: {e}")))?;

        let mut used = HashSet::new();
        let mut kids = Vec::with_capacity(order.len());
        for &num in order.as_slice() {
            let source_id = *pages
                .get(&num)
                .ok_or_else(|| Error::PageCollection(format!("page {num} not found")))?;
            let mut dict = flattened_page(&doc, source_id)?;
            dict.set("Parent", Object::Reference(root_id));

            let id = if used.insert(source_id) {
                source_id
            } else {
                let copy_id = doc.new_object_id();
                copy_annotations(&mut doc, &mut dict, copy_id);
                copy_id
            };
            doc.objects.insert(id, Object::Dictionary(dict));
            kids.push(Object::Reference(id));
        }

        let count = kids.len() as i64;
        let root = doc
            .get_object_mut(root_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| Error::PageCollection(format!("invalid page tree root: {e}")))?;
        root.set("Kids", Object::Array(kids));
        root.set("Count", Object::Integer(count));

        let pruned = doc.prune_objects();
        log::debug!(
            "collected {count} pages from {}, pruned {} objects",
            input.display(),
            pruned.len()
        );
        self.save(&mut doc, output)
    }
}

/// Read a PDF number.
fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Follow a reference, if `obj` is one.
fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look `key` up on the page, then on its ancestors.
fn inherited<'a>(doc: &'a LopdfDocument, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

/// An inherited rectangle attribute, normalized to `[llx lly urx ury]`.
fn rect(doc: &LopdfDocument, page_id: ObjectId, key: &[u8]) -> Option<[f64; 4]> {
    let obj = resolve(doc, inherited(doc, page_id, key)?)?;
    let values: Vec<f64> = obj
        .as_array()
        .ok()?
        .iter()
        .filter_map(|o| resolve(doc, o).and_then(number))
        .collect();
    let [a, b, c, d] = values[..] else {
        return None;
    };
    Some([a.min(c), b.min(d), a.max(c), b.max(d)])
}

/// The page as displayed: CropBox within MediaBox, then `/Rotate`.
fn page_box(doc: &LopdfDocument, page_id: ObjectId) -> Option<PageDims> {
    let media = rect(doc, page_id, b"MediaBox")?;
    let crop = rect(doc, page_id, b"CropBox");
    let rotate = inherited(doc, page_id, b"Rotate")
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0);
    let dims = PageDims::from_page_boxes(media, crop, rotate);
    dims.is_valid().then_some(dims)
}

/// A copy of the page dictionary with every inheritable attribute made
/// explicit, so the page survives being re-parented.
fn flattened_page(doc: &LopdfDocument, page_id: ObjectId) -> Result<Dictionary> {
    let mut dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PageCollection(format!("invalid page object {page_id:?}: {e}")))?
        .clone();
    for key in INHERITABLE {
        if !dict.has(key) {
            if let Some(value) = inherited(doc, page_id, key) {
                dict.set(key.to_vec(), value.clone());
            }
        }
    }
    Ok(dict)
}

/// Give a duplicated page its own annotation objects pointing back at it.
fn copy_annotations(doc: &mut LopdfDocument, dict: &mut Dictionary, page_id: ObjectId) {
    let Some(annots) = dict
        .get(b"Annots")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_array().ok())
        .cloned()
    else {
        return;
    };

    let mut copies = Vec::with_capacity(annots.len());
    for annot in annots {
        let copy = resolve(doc, &annot)
            .and_then(|o| o.as_dict().ok())
            .cloned()
            .map(|mut annot_dict| {
                if annot_dict.has(b"P") {
                    annot_dict.set("P", Object::Reference(page_id));
                }
                Object::Reference(doc.add_object(annot_dict))
            });
        copies.push(copy.unwrap_or(annot));
    }
    dict.set("Annots", Object::Array(copies));
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn image_stream(
    width: u32,
    height: u32,
    color_space: &str,
    data: Vec<u8>,
    compress: bool,
) -> Result<Stream> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(width),
        "Height" => i64::from(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8_i64,
    };
    let content = if compress {
        dict.set("Filter", "FlateDecode");
        deflate(&data)?
    } else {
        data
    };
    Ok(Stream::new(dict, content).with_compression(false))
}

/// Add an RGBA raster as an RGB image XObject, with a soft mask when any
/// pixel is not fully opaque.
fn embed_rgba(doc: &mut LopdfDocument, raster: &RgbaImage, compress: bool) -> Result<ObjectId> {
    let (width, height) = raster.dimensions();
    let pixels = raster.as_raw();
    let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
    let mut alpha = Vec::with_capacity(pixels.len() / 4);
    for px in pixels.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }

    let mut image = image_stream(width, height, "DeviceRGB", rgb, compress)?;
    if alpha.iter().any(|&a| a != u8::MAX) {
        let mask = image_stream(width, height, "DeviceGray", alpha, compress)?;
        let mask_id = doc.add_object(mask);
        image.dict.set("SMask", Object::Reference(mask_id));
    }
    Ok(doc.add_object(image))
}

/// Register `image_id` under a fresh name in the page's XObject resources.
///
/// Shared resource dictionaries are copied onto the page before editing,
/// so other pages are unaffected.
fn register_xobject(
    doc: &mut LopdfDocument,
    page_id: ObjectId,
    image_id: ObjectId,
) -> std::result::Result<String, String> {
    let mut resources = inherited(doc, page_id, b"Resources")
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default();
    let mut xobjects = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default();

    let name = (1..)
        .map(|n| format!("CapgoStamp{n}"))
        .find(|candidate| !xobjects.has(candidate.as_bytes()))
        .ok_or_else(|| "no free XObject name".to_string())?;
    xobjects.set(name.as_bytes().to_vec(), Object::Reference(image_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    doc.get_dictionary_mut(page_id)
        .map_err(|e| format!("invalid page object: {e}"))?
        .set("Resources", Object::Dictionary(resources));
    Ok(name)
}

/// Wrap the page's existing content in `q`/`Q` and append `ops` after it,
/// so the stamp is drawn on top with an untouched graphics state.
fn append_isolated(
    doc: &mut LopdfDocument,
    page_id: ObjectId,
    ops: Vec<u8>,
) -> std::result::Result<(), String> {
    let existing: Vec<Object> = {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| format!("invalid page object: {e}"))?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(parts)) => parts.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(parts)) => parts.clone(),
            _ => Vec::new(),
        }
    };

    let mut tail = b"\nQ\n".to_vec();
    tail.extend_from_slice(&ops);
    tail.push(b'\n');
    let head_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let tail_id = doc.add_object(Stream::new(Dictionary::new(), tail));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(head_id));
    contents.extend(existing);
    contents.push(Object::Reference(tail_id));

    doc.get_dictionary_mut(page_id)
        .map_err(|e| format!("invalid page object: {e}"))?
        .set("Contents", Object::Array(contents));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba};

    /// Build a PDF with one content stream per page. A `None` size leaves
    /// the MediaBox to be inherited from the page tree root (US Letter).
    fn sample_pdf(sizes: &[Option<(i64, i64)>]) -> LopdfDocument {
        let rect = |w: i64, h: i64| Object::Array(vec![0.into(), 0.into(), w.into(), h.into()]);
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        for (i, size) in sizes.iter().enumerate() {
            let text = format!("BT /F1 12 Tf 72 72 Td (Page {}) Tj ET", i + 1);
            let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if let Some((w, h)) = size {
                page.set("MediaBox", rect(*w, *h));
            }
            kids.push(doc.add_object(page).into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => sizes.len() as i64,
                "MediaBox" => rect(612, 792),
                "Resources" => dictionary! {},
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    /// Set `key` on the first page.
    fn with_first_page(mut doc: LopdfDocument, key: &str, value: Object) -> LopdfDocument {
        let id = doc.get_pages()[&1];
        doc.get_dictionary_mut(id).unwrap().set(key, value);
        doc
    }

    fn write_pdf(dir: &Path, name: &str, mut doc: LopdfDocument) -> std::path::PathBuf {
        let path = dir.join(name);
        doc.save(&path).unwrap();
        path
    }

    fn write_png(dir: &Path, alpha: u8) -> std::path::PathBuf {
        let path = dir.join(format!("stamp_{alpha}.png"));
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, alpha])))
            .save(&path)
            .unwrap();
        path
    }

    fn page_text(doc: &LopdfDocument, num: u32) -> String {
        let id = doc.get_pages()[&num];
        String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned()
    }

    #[test]
    fn test_inspect_reads_own_and_inherited_media_boxes() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = write_pdf(
            dir.path(),
            "in.pdf",
            sample_pdf(&[Some((595, 842)), None, Some((842, 595))]),
        );

        let dims = LopdfBackend::new().inspect(&pdf).unwrap();
        assert_eq!(dims.len(), 3);
        assert_eq!(dims[0], PageDims::a4());
        assert_eq!(dims[1], PageDims::letter());
        assert!(dims[2].is_landscape());
    }

    #[test]
    fn test_inspect_reports_displayed_box() {
        let dir = tempfile::tempdir().unwrap();
        let crop = Object::Array(
            [36, 36, 576, 756]
                .into_iter()
                .map(Object::Integer)
                .collect(),
        );
        let doc = with_first_page(sample_pdf(&[None, None]), "CropBox", crop);
        let pdf = write_pdf(dir.path(), "cropped.pdf", doc);

        let dims = LopdfBackend::new().inspect(&pdf).unwrap();
        assert_eq!(dims[0].dimensions(), (540.0, 720.0));
        assert_eq!((dims[0].origin_x, dims[0].origin_y), (36.0, 36.0));
        assert_eq!(dims[1], PageDims::letter());
    }

    #[test]
    fn test_rotated_page_maps_stamp_through_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let doc = with_first_page(sample_pdf(&[None]), "Rotate", Object::Integer(90));
        let input = write_pdf(dir.path(), "rotated.pdf", doc);
        let output = dir.path().join("out.pdf");
        let png = write_png(dir.path(), 255);

        let backend = LopdfBackend::new().with_compression(false);
        let dims = backend.inspect(&input).unwrap();
        assert_eq!((dims[0].dimensions(), dims[0].rotation), ((792.0, 612.0), 90));

        let watermark = Watermark {
            x: 10.0,
            y: 20.0,
            scale: 1.0,
            page: 1,
        };
        backend
            .apply_watermark(&input, &output, &png, &watermark)
            .unwrap();

        let doc = LopdfDocument::load(&output).unwrap();
        let text = page_text(&doc, 1);
        assert!(text.contains(
            "q 0.0000 1.0000 -1.0000 0.0000 612.0000 0.0000 cm \
             8.0000 0 0 4.0000 10.0000 20.0000 cm /CapgoStamp1 Do Q"
        ));
    }

    #[test]
    fn test_inspect_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"just some text").unwrap();
        let err = LopdfBackend::new().inspect(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::PdfInspection);
    }

    #[test]
    fn test_apply_watermark_draws_on_target_page() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "in.pdf", sample_pdf(&[None, None]));
        let output = dir.path().join("out.pdf");
        let png = write_png(dir.path(), 128);
        let watermark = Watermark {
            x: 50.0,
            y: 600.0,
            scale: 0.25,
            page: 2,
        };

        LopdfBackend::new()
            .with_compression(false)
            .apply_watermark(&input, &output, &png, &watermark)
            .unwrap();

        let doc = LopdfDocument::load(&output).unwrap();
        let text = page_text(&doc, 2);
        assert!(text.contains("q 2.0000 0 0 1.0000 50.0000 600.0000 cm /CapgoStamp1 Do Q"));
        assert!(text.starts_with("q\n"));
        assert!(!page_text(&doc, 1).contains("CapgoStamp"));

        let page = doc.get_dictionary(doc.get_pages()[&2]).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects
            .get(b"CapgoStamp1")
            .unwrap()
            .as_reference()
            .unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 8);
        assert!(image.dict.has(b"SMask"));
    }

    #[test]
    fn test_apply_watermark_twice_uses_fresh_names() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "in.pdf", sample_pdf(&[None]));
        let middle = dir.path().join("middle.pdf");
        let output = dir.path().join("out.pdf");
        let png = write_png(dir.path(), 255);
        let watermark = Watermark {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            page: 1,
        };

        let backend = LopdfBackend::new();
        backend
            .apply_watermark(&input, &middle, &png, &watermark)
            .unwrap();
        backend
            .apply_watermark(&middle, &output, &png, &watermark)
            .unwrap();

        let doc = LopdfDocument::load(&output).unwrap();
        let text = page_text(&doc, 1);
        assert!(text.contains("/CapgoStamp1 Do"));
        assert!(text.contains("/CapgoStamp2 Do"));
    }

    #[test]
    fn test_opaque_raster_has_no_soft_mask() {
        let mut doc = sample_pdf(&[None]);
        let raster = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let id = embed_rgba(&mut doc, &raster, true).unwrap();
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert!(!stream.dict.has(b"SMask"));
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
    }

    #[test]
    fn test_apply_watermark_page_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "in.pdf", sample_pdf(&[None]));
        let output = dir.path().join("out.pdf");
        let png = write_png(dir.path(), 255);
        let watermark = Watermark {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            page: 3,
        };

        let err = LopdfBackend::new()
            .apply_watermark(&input, &output, &png, &watermark)
            .unwrap_err();
        assert!(matches!(err, Error::WatermarkPlacement { page: 3, .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_collect_pages_reorders_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(
            dir.path(),
            "in.pdf",
            sample_pdf(&[Some((100, 100)), None, Some((300, 300))]),
        );
        let output = dir.path().join("out.pdf");

        LopdfBackend::new()
            .collect_pages(&input, &output, &PageOrder::new(vec![3, 1, 1]))
            .unwrap();

        let doc = LopdfDocument::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        assert!(page_text(&doc, 1).contains("(Page 3)"));
        assert!(page_text(&doc, 2).contains("(Page 1)"));
        assert!(page_text(&doc, 3).contains("(Page 1)"));

        let dims = LopdfBackend::new().inspect(&output).unwrap();
        assert_eq!(dims[0].width, 300.0);
        assert_eq!(dims[1].width, 100.0);
        assert_eq!(dims[2].width, 100.0);
    }

    #[test]
    fn test_collect_pages_keeps_inherited_media_box() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "in.pdf", sample_pdf(&[None, None]));
        let output = dir.path().join("out.pdf");

        LopdfBackend::new()
            .collect_pages(&input, &output, &PageOrder::new(vec![2]))
            .unwrap();

        let dims = LopdfBackend::new().inspect(&output).unwrap();
        assert_eq!(dims, vec![PageDims::letter()]);
    }

    #[test]
    fn test_collect_pages_rejects_bad_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pdf(dir.path(), "in.pdf", sample_pdf(&[None, None]));
        let output = dir.path().join("out.pdf");
        let backend = LopdfBackend::new();

        for order in [vec![], vec![0], vec![1, 3]] {
            let err = backend
                .collect_pages(&input, &output, &PageOrder::new(order))
                .unwrap_err();
            assert!(matches!(err, Error::PageCollection(_)));
        }
        assert!(!output.exists());
    }
}
