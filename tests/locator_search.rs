//! Record locator against a mock directory

use alumtrace::locator::{OutcomeKind, RecordLocator, SearchDebouncer, SEARCH_FAILED_MESSAGE};
use alumtrace::utils::ScoringConfig;
use std::sync::Arc;
use std::time::Duration;

#[allow(dead_code)]
mod common;
use common::mock_directory::MockDirectory;
use common::sample_directory;

#[tokio::test]
async fn test_aliases_normalized_and_nameless_dropped() {
    let directory = Arc::new(MockDirectory::new(sample_directory()));
    let locator = RecordLocator::new(directory, ScoringConfig::default());

    let outcome = locator.search("", "2020").await.expect("search");
    let found: Vec<_> = outcome
        .results
        .iter()
        .map(|r| (r.id.as_deref(), r.full_name.as_str(), r.program_course.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            (Some("12"), "Juana Cruz", "BS Nursing"),
            (Some("A-13"), "Maria Santos", "BS Accountancy"),
        ]
    );
    assert!(outcome.results[1].has_credentials());
    assert!(!outcome.results[0].has_credentials());
}

#[tokio::test]
async fn test_directory_down_reports_failure() {
    let directory = Arc::new(MockDirectory::new(sample_directory()));
    *directory.should_fail.lock().unwrap() = true;
    let locator = RecordLocator::new(directory.clone(), ScoringConfig::default());

    let outcome = locator.search("juan", "").await.expect("outcome");
    assert_eq!(outcome.kind, OutcomeKind::Failed);
    assert_eq!(outcome.message.as_deref(), Some(SEARCH_FAILED_MESSAGE));
    assert!(outcome.results.is_empty());
    assert_eq!(directory.get_queries().len(), 1);
}

#[tokio::test]
async fn test_blank_search_never_reaches_directory() {
    let directory = Arc::new(MockDirectory::new(sample_directory()));
    let locator = RecordLocator::new(directory.clone(), ScoringConfig::default());
    assert!(locator.search(" ", " ").await.is_err());
    assert!(directory.get_queries().is_empty());
}

#[tokio::test]
async fn test_superseded_keystrokes_skip_the_directory() {
    let directory = Arc::new(MockDirectory::new(sample_directory()));
    let locator = Arc::new(RecordLocator::new(directory.clone(), ScoringConfig::default()));
    let debouncer = SearchDebouncer::new(locator, Duration::from_millis(50));

    let (a, b) = tokio::join!(debouncer.schedule("ma", ""), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        debouncer.schedule("maria", "").await
    });

    assert!(a.is_none());
    let outcome = b.expect("latest runs").expect("search");
    assert_eq!(outcome.results[0].full_name, "Maria Santos");
    assert_eq!(directory.get_queries(), vec![("maria".to_string(), String::new())]);
}
