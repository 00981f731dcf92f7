use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use peloton_core::{Document, parse_duration, rider_year_results, stage_list, stage_results};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for name in ["stage_overview.html", "stage_results.html", "rider_season.html"] {
        let html = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), &html, |b, html| {
            b.iter(|| Document::parse(black_box(html)))
        });
    }

    group.finish();
}

fn bench_extractors(c: &mut Criterion) {
    let overview = Document::parse(&fixture("stage_overview.html")).unwrap();
    let results = Document::parse(&fixture("stage_results.html")).unwrap();
    let season = Document::parse(&fixture("rider_season.html")).unwrap();

    let mut group = c.benchmark_group("extract");
    group.bench_function("stage_list", |b| b.iter(|| stage_list(black_box(&overview))));
    group.bench_function("stage_results", |b| b.iter(|| stage_results(black_box(&results))));
    group.bench_function("rider_year_results", |b| {
        b.iter(|| rider_year_results(black_box(&season), 2020))
    });
    group.finish();
}

fn bench_coerce(c: &mut Criterion) {
    c.bench_function("parse_duration", |b| b.iter(|| parse_duration(black_box("3:46:23"))));
}

criterion_group!(benches, bench_parse, bench_extractors, bench_coerce);
criterion_main!(benches);
