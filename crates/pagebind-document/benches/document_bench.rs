// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for document processing in the pagebind-document crate.
// Currently benchmarks one full page normalisation (crop, enhance, pad, scale,
// encode) on a synthetic scanned page.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use pagebind_core::{CanvasSize, ProcessingConfig};
use pagebind_document::ImageNormalizer;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark normalisation of a 600x800 synthetic page.
///
/// The page is off-white with dark horizontal bands standing in for lines of
/// text, so the median and unsharp filters have edges to work on.
fn bench_normalize_page(c: &mut Criterion) {
    let (width, height) = (600u32, 800u32);
    let mut img = RgbImage::from_pixel(width, height, Rgb([235, 232, 228]));
    for y in (60..740).step_by(24) {
        for row in y..y + 8 {
            for x in 50..550 {
                img.put_pixel(x, row, Rgb([40, 40, 40]));
            }
        }
    }
    let dynamic = DynamicImage::ImageRgb8(img);
    let config = ProcessingConfig::default();
    let canvas = CanvasSize::new(620, 800);

    c.bench_function("normalize_page (600x800)", |b| {
        b.iter(|| {
            let normalizer = ImageNormalizer::new(&config);
            let page = normalizer
                .normalize(black_box(dynamic.clone()), canvas)
                .expect("normalize");
            black_box(page.bytes);
        });
    });
}

criterion_group!(benches, bench_normalize_page);
criterion_main!(benches);
