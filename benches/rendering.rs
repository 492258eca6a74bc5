//! Benchmarks for output writers.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use styledown::output::{to_json, write_ansi, write_runs};
use styledown::parser::MarkdownParser;

fn bench_write_ansi(c: &mut Criterion) {
    let parser = MarkdownParser::default();
    let text = parser.parse(include_str!("../tests/fixtures/sample.md")).unwrap();

    c.bench_function("write_ansi", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(4096);
            write_ansi(&mut out, black_box(&text), parser.font_color()).unwrap();
            out
        })
    });
}

fn bench_write_runs(c: &mut Criterion) {
    let text = MarkdownParser::default()
        .parse(include_str!("../tests/fixtures/sample.md"))
        .unwrap();

    c.bench_function("write_runs", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(4096);
            write_runs(&mut out, black_box(&text)).unwrap();
            out
        })
    });
}

fn bench_to_json(c: &mut Criterion) {
    let text = MarkdownParser::default()
        .parse(include_str!("../tests/fixtures/sample.md"))
        .unwrap();

    c.bench_function("to_json", |b| b.iter(|| to_json(black_box(&text)).unwrap()));
}

criterion_group!(benches, bench_write_ansi, bench_write_runs, bench_to_json);
criterion_main!(benches);
