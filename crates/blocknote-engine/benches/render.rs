use blocknote_engine::{BlockStore, PulldownMarkdown, extract_headings, render_store};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
mod common;

fn bench_render_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(20);
    let markdown = PulldownMarkdown::new();

    for blocks in [10, 100, 500] {
        let store = common::generate_store(blocks);

        group.bench_with_input(BenchmarkId::new("cold", blocks), &store, |b, store| {
            b.iter(|| {
                let mut s = store.detached();
                std::hint::black_box(render_store(&mut s, &markdown));
            });
        });

        // Every block already memoized: only headings and activity lists
        let mut warm: BlockStore = store.detached();
        render_store(&mut warm, &markdown);
        group.bench_function(BenchmarkId::new("memoized", blocks), |b| {
            b.iter(|| std::hint::black_box(render_store(&mut warm, &markdown)));
        });
    }

    group.finish();
}

fn bench_heading_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("headings");
    let content = common::generate_block_content(0).repeat(100);

    group.bench_function("extract_headings", |b| {
        b.iter(|| std::hint::black_box(extract_headings(std::hint::black_box(&content), 0)));
    });

    group.finish();
}

criterion_group!(benches, bench_render_pipeline, bench_heading_extraction);
criterion_main!(benches);
