//! Benchmarks for listing page extraction.

use ao3_listings::extract::{DateMode, RecordExtractor};
use ao3_listings::testing::{Blurb, ListingHtml, NextControl};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bookmarks_page() -> String {
    (0..20)
        .fold(ListingHtml::bookmarks(), |page, i| {
            let id = (1000 + i).to_string();
            let blurb = if i % 7 == 3 {
                Blurb::deleted()
            } else if i % 5 == 0 {
                Blurb::series(&id).bookmarked("01 Feb 2022")
            } else {
                Blurb::work(&id).updated("10 Jan 2021").bookmarked("01 Feb 2022")
            };
            page.blurb(blurb)
        })
        .next(NextControl::Enabled)
        .render()
}

fn extraction_benchmark(c: &mut Criterion) {
    let extractor = RecordExtractor::new().expect("markup compiles");
    let html = bookmarks_page();

    c.bench_function("scan_bookmarks_page", |b| {
        b.iter(|| black_box(extractor.scan(black_box(&html), DateMode::ByInteractionDate)))
    });

    c.bench_function("compile_markup", |b| {
        b.iter(|| black_box(RecordExtractor::new()))
    });
}

criterion_group!(benches, extraction_benchmark);
criterion_main!(benches);
