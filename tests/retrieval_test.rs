mod helpers;

use helpers::{offline_service, seed, temp_db, BrokenSource};
use kbqa::config::RetrievalConfig;
use kbqa::kb::SqliteKnowledgeSource;
use kbqa::qa::retrieval::retrieve_best;
use kbqa::qa::text::BigramVector;

#[test]
fn exact_match_scores_above_one() {
    let (_tmp, path, conn) = temp_db();
    let ids = seed(&conn, &[("今天天气怎么样", "晴"), ("你好吗", "我很好"), ("退货流程", "七天无理由")]);

    let result = offline_service(&path).retrieve_best("你好吗");
    let entry = result.entry.expect("should match");
    assert_eq!(entry.id, ids[1]);
    assert!(result.score >= 1.0);
    assert!((result.score - 1.2).abs() < 1e-9);
}

#[test]
fn substring_match_gets_smaller_bonus() {
    let (_tmp, path, conn) = temp_db();
    seed(&conn, &[("今天天气怎么样", "晴")]);

    let result = offline_service(&path).retrieve_best("天气");
    let cos = BigramVector::from_text("天气").cosine(&BigramVector::from_text("今天天气怎么样"));
    assert!(result.entry.is_some());
    assert!((result.score - (cos + 0.1)).abs() < 1e-9);
    assert!(result.score < cos + 0.2);
}

#[test]
fn newest_entry_wins_ties() {
    let (_tmp, path, conn) = temp_db();
    let ids = seed(&conn, &[("怎么退货", "旧答案"), ("怎么退货", "新答案")]);

    let result = offline_service(&path).retrieve_best("怎么退货");
    let entry = result.entry.unwrap();
    assert_eq!(entry.id, ids[1]);
    assert_eq!(entry.answer, "新答案");
}

#[test]
fn empty_store_returns_none() {
    let (_tmp, path, _conn) = temp_db();
    let result = offline_service(&path).retrieve_best("anything");
    assert!(result.entry.is_none());
    assert_eq!(result.score, 0.0);
}

#[test]
fn missing_database_returns_none() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = SqliteKnowledgeSource::new(tmp.path().join("absent.db"));
    let result = retrieve_best(&source, "你好", &RetrievalConfig::default());
    assert!(result.entry.is_none());
    assert_eq!(result.score, 0.0);
    // Reading must not create the file.
    assert!(!tmp.path().join("absent.db").exists());
}

#[test]
fn broken_store_returns_none() {
    let result = retrieve_best(&BrokenSource, "你好", &RetrievalConfig::default());
    assert!(result.entry.is_none());
    assert_eq!(result.score, 0.0);
}

#[test]
fn edits_are_visible_on_next_query() {
    let (_tmp, path, conn) = temp_db();
    let svc = offline_service(&path);
    assert!(svc.retrieve_best("发票怎么开").entry.is_none());

    seed(&conn, &[("发票怎么开", "联系客服")]);
    assert!(svc.retrieve_best("发票怎么开").entry.is_some());
}
