mod common;

use common::{BOOKSTORE_XML, GALLERY_HTML, TestResult, init_logging};
use std::thread;
use xquery::{CacheConfig, HtmlDocument, QueryEngine, XmlDocument, find, find_one};

#[test]
fn test_parse_and_query_in_parallel() {
    init_logging();
    let handles: Vec<_> = (0..10)
        .map(|i| {
            thread::spawn(move || {
                let doc = HtmlDocument::parse("<html><head></head><body><div>a</div></body>")
                    .expect("parse");
                let div = find_one(doc.root(), "//div").expect("query");
                assert!(div.is_some(), "thread {i} found nothing");
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }
}

#[test]
fn test_shared_document_read_by_many_threads() -> TestResult {
    init_logging();
    let doc = HtmlDocument::parse(GALLERY_HTML)?;
    let expected = find(doc.root(), "//li/a")?;

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..50 {
                    let links = find(doc.root(), "//li/a").expect("query");
                    assert_eq!(links, expected);
                }
            });
        }
    });
    Ok(())
}

#[test]
fn test_shared_engine_and_cache() -> TestResult {
    init_logging();
    let engine = QueryEngine::new(CacheConfig::default().with_capacity(2));
    let doc = XmlDocument::parse(BOOKSTORE_XML)?;
    let exprs = ["//title", "//price", "//author", "//book[1]/title"];

    thread::scope(|s| {
        for t in 0..4 {
            let engine = &engine;
            let doc = &doc;
            s.spawn(move || {
                for round in 0..25 {
                    let expr = exprs[(t + round) % exprs.len()];
                    let found = engine.find(doc.root(), expr).expect("query");
                    assert!(!found.is_empty(), "{expr} found nothing");
                    assert!(engine.cache().len() <= 2);
                }
            });
        }
    });
    assert_eq!(engine.cache().capacity(), 2);
    Ok(())
}
