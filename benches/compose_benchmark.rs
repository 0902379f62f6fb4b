//! Benchmarks for stamp compositing and page remapping.
//!
//! Run with: cargo bench

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use capgo::compose::fit_contain;
use capgo::{Compositor, PageDims, PageOrder, Rect, Stamp, StampList};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

/// Inline PNG signature of the given size.
fn signature_data_url(width: u32, height: u32) -> String {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 40, if (x + y) % 3 == 0 { 0 } else { 255 }])
    });
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    format!("data:image/png;base64,{}", B64.encode(png))
}

fn bench_fit_contain(c: &mut Criterion) {
    c.bench_function("fit_contain", |b| {
        b.iter(|| fit_contain(black_box(105.0), black_box(56.0), black_box(640), black_box(480)));
    });
}

/// Benchmark compositing at various quality factors.
fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    let stamp = Stamp::new(
        signature_data_url(400, 150),
        Rect::new(50.0, 50.0, 105.0, 56.0),
        1,
    );
    let page = PageDims::letter();

    for factor in [1.0, 2.0, 4.0] {
        let compositor = Compositor::new(factor, FilterType::Lanczos3);
        group.bench_function(format!("quality_{factor}"), |b| {
            b.iter(|| compositor.compose(0, black_box(&stamp), &page).unwrap());
        });
    }

    group.finish();
}

fn bench_remap_stamps(c: &mut Criterion) {
    let mut stamps = StampList::new();
    for page in 1..=50 {
        stamps
            .add(Stamp::new("sig.png", Rect::new(10.0, 10.0, 50.0, 20.0), page))
            .unwrap();
    }
    let order = PageOrder::new((1..=50).rev().chain(1..=25).collect());

    c.bench_function("remap_stamps_50_pages", |b| {
        b.iter(|| capgo::remap_stamps(black_box(&stamps), black_box(&order)));
    });
}

criterion_group!(benches, bench_fit_contain, bench_compose, bench_remap_stamps);
criterion_main!(benches);
