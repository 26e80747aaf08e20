//! Query throughput benchmarks
//!
//! Measures:
//! - XML parsing for growing documents (10, 100, 1000 records)
//! - Compiling through a cached vs. an uncached `QueryEngine`
//! - `find` vs. `find_one` on the same expression
//!
//! Run benchmarks: `cargo bench --bench query_throughput`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use xquery::{CacheConfig, QueryEngine, XmlDocument, find, find_one};

const NESTED_QUERY: &str = "/AAA/BBB/DDD/CCC/EEE/ancestor::*";

/// A catalog of `count` records, each with an id attribute and two children.
fn generate_catalog(count: usize) -> String {
    let mut xml = String::from(r#"<?xml version="1.0"?><catalog>"#);
    for i in 0..count {
        xml.push_str(&format!(
            r#"<record id="r{i}"><name>Record {i}</name><value>{}</value></record>"#,
            i * 100
        ));
    }
    xml.push_str("</catalog>");
    xml
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("xml_parse");
    for count in [10, 100, 1000] {
        let xml = generate_catalog(count);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::new("records", count), &xml, |b, xml| {
            b.iter(|| XmlDocument::parse(black_box(xml)).expect("Failed to parse catalog"));
        });
    }
    group.finish();
}

/// Compile-heavy loop: the same expression is compiled on every call unless cached.
fn benchmark_query_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_cache");
    let doc = XmlDocument::parse(
        r#"<?xml version="1.0"?><AAA><BBB><DDD><CCC><EEE/></CCC></DDD></BBB></AAA>"#,
    )
    .expect("Failed to parse document");

    for (label, config) in [
        ("cached", CacheConfig::default()),
        ("uncached", CacheConfig::disabled()),
    ] {
        let engine = QueryEngine::new(config);
        group.bench_function(label, |b| {
            b.iter(|| {
                engine
                    .find(doc.root(), black_box(NESTED_QUERY))
                    .expect("Query failed")
            });
        });
    }
    group.finish();
}

/// `find_one` stops at the first match of a descendant search.
fn benchmark_find_vs_find_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_match");
    let xml = generate_catalog(1000);
    let doc = XmlDocument::parse(&xml).expect("Failed to parse catalog");

    group.bench_function("find", |b| {
        b.iter(|| find(doc.root(), black_box("//record")).expect("Query failed"));
    });
    group.bench_function("find_one", |b| {
        b.iter(|| find_one(doc.root(), black_box("//record")).expect("Query failed"));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_parse,
    benchmark_query_cache,
    benchmark_find_vs_find_one
);
criterion_main!(benches);
