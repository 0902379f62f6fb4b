//! Batch export over real files.

mod common;

use capgo::{
    BatchEvent, BatchExporter, Document, ErrorKind, ExportOptions, ProcessingStatus, Rect, Stamp,
    StampPipeline,
};
use common::{page_text, write_letter_pdf, write_png};

fn with_stamp(path: &std::path::Path, image: &std::path::Path) -> Document {
    let mut doc = Document::open(path);
    doc.stamps
        .add(Stamp::new(image.to_path_buf(), Rect::new(20.0, 20.0, 50.0, 50.0), 1))
        .unwrap();
    doc
}

#[test]
fn test_broken_file_does_not_stop_the_batch() {
    common::init_logger();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let png = write_png(dir.path(), "sig.png", 4, 4);
    let good_a = write_letter_pdf(dir.path(), "a.pdf", 1);
    let good_c = write_letter_pdf(dir.path(), "c.pdf", 2);
    let broken = dir.path().join("b.pdf");
    std::fs::write(&broken, b"%PDF-1.7\nthis is not a real document").unwrap();

    let mut docs = vec![
        with_stamp(&good_a, &png),
        with_stamp(&broken, &png),
        with_stamp(&good_c, &png),
    ];
    let (tx, rx) = crossbeam_channel::unbounded();
    let exporter = BatchExporter::new(StampPipeline::new(
        ExportOptions::new().with_output_dir(&out),
    ))
    .with_events(tx);

    let report = exporter.export(&mut docs);

    assert_eq!(report.completed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(docs[0].status, ProcessingStatus::Completed);
    assert_eq!(docs[1].status, ProcessingStatus::Error);
    assert!(docs[1].last_error.is_some());
    assert_eq!(docs[2].status, ProcessingStatus::Completed);

    assert_eq!(docs[0].result_path, Some(out.join("a_capgo.pdf")));
    assert!(page_text(&out.join("c_capgo.pdf"), 1).contains("/CapgoStamp1 Do"));
    assert!(!out.join("b_capgo.pdf").exists());

    let failures: Vec<_> = rx
        .try_iter()
        .filter_map(|e| match e {
            BatchEvent::Failed { name, kind, .. } => Some((name, kind)),
            _ => None,
        })
        .collect();
    assert_eq!(failures, vec![("b.pdf".to_string(), ErrorKind::PdfInspection)]);
}

#[test]
fn test_unselected_documents_are_not_exported() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "sig.png", 4, 4);
    let pdf = write_letter_pdf(dir.path(), "a.pdf", 1);

    let mut doc = with_stamp(&pdf, &png);
    doc.selected = false;
    let mut docs = vec![doc];

    let exporter = BatchExporter::new(StampPipeline::new(
        ExportOptions::new().with_output_dir(dir.path()),
    ));
    let report = exporter.export(&mut docs);

    assert!(report.completed.is_empty());
    assert_eq!(docs[0].status, ProcessingStatus::Pending);
    assert!(!dir.path().join("a_capgo.pdf").exists());
}
