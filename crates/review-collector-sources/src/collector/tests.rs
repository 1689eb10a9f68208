use super::*;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Snapshots are comma separated review ids; the last snapshot repeats forever
struct ScriptedPage {
    snapshots: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    reveal_calls: Mutex<u32>,
    fail_reveal_after: Option<u32>,
    fail_snapshot: bool,
}

impl ScriptedPage {
    fn new(snapshots: &[&str]) -> Self {
        Self {
            snapshots: Mutex::new(snapshots.iter().map(|s| s.to_string()).collect()),
            last: Mutex::new(String::new()),
            reveal_calls: Mutex::new(0),
            fail_reveal_after: None,
            fail_snapshot: false,
        }
    }

    fn reveal_calls(&self) -> u32 {
        *self.reveal_calls.lock().unwrap()
    }
}

#[async_trait]
impl RevealPage for ScriptedPage {
    async fn snapshot(&self) -> Result<String, CollectError> {
        if self.fail_snapshot {
            return Err(CollectError::ReviewsNotFound(Duration::from_secs(1)));
        }
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.snapshots.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }

    async fn reveal_more(&self) -> Result<(), CollectError> {
        let mut calls = self.reveal_calls.lock().unwrap();
        if let Some(limit) = self.fail_reveal_after {
            if *calls >= limit {
                return Err(CollectError::Reveal("scroll container not found".to_string()));
            }
        }
        *calls += 1;
        Ok(())
    }
}

fn parse_ids(html: &str) -> Vec<Review> {
    html.split(',')
        .filter(|s| !s.is_empty())
        .map(Review::new)
        .collect()
}

fn ids(reviews: &[Review]) -> Vec<&str> {
    reviews.iter().map(|r| r.review_id.as_str()).collect()
}

#[tokio::test]
async fn test_loop_stops_when_target_reached() {
    let page = ScriptedPage::new(&["a,b", "a,b,c,d", "a,b,c,d,e,f"]);
    let report = run_reveal_loop(&page, parse_ids, 4, 3).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::TargetReached);
    assert_eq!(ids(&report.reviews), vec!["a", "b", "c", "d"]);
    assert_eq!(report.snapshots, 2);
    // No scroll once the target is met
    assert_eq!(page.reveal_calls(), 1);
}

#[tokio::test]
async fn test_loop_truncates_to_max_reviews() {
    let page = ScriptedPage::new(&["1,2,3,4,5"]);
    let report = run_reveal_loop(&page, parse_ids, 3, 3).await.unwrap();

    assert_eq!(ids(&report.reviews), vec!["1", "2", "3"]);
    assert_eq!(page.reveal_calls(), 0);
}

#[tokio::test]
async fn test_loop_stalls_after_three_empty_rounds() {
    let page = ScriptedPage::new(&["a,b,c"]);
    let report = run_reveal_loop(&page, parse_ids, 10, 3).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::Stalled);
    assert_eq!(report.reviews.len(), 3);
    // One growing snapshot plus three that add nothing
    assert_eq!(report.snapshots, 4);
    assert_eq!(page.reveal_calls(), 3);
}

#[tokio::test]
async fn test_loop_with_nothing_on_page_stalls() {
    let page = ScriptedPage::new(&[""]);
    let report = run_reveal_loop(&page, parse_ids, 10, 3).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::Stalled);
    assert!(report.reviews.is_empty());
    assert_eq!(report.snapshots, 3);
}

#[tokio::test]
async fn test_slow_growth_resets_stall_counter() {
    let page = ScriptedPage::new(&["a", "a", "a", "a,b", "a,b", "a,b", "a,b,c"]);
    let report = run_reveal_loop(&page, parse_ids, 3, 3).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::TargetReached);
    assert_eq!(ids(&report.reviews), vec!["a", "b", "c"]);
    assert_eq!(report.snapshots, 7);
}

#[tokio::test]
async fn test_reveal_failure_stops_immediately() {
    let mut page = ScriptedPage::new(&["a,b", "a,b,c"]);
    page.fail_reveal_after = Some(0);
    let report = run_reveal_loop(&page, parse_ids, 10, 3).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::RevealFailed);
    assert_eq!(ids(&report.reviews), vec!["a", "b"]);
    assert_eq!(report.snapshots, 1);
}

#[tokio::test]
async fn test_snapshot_failure_is_returned() {
    let mut page = ScriptedPage::new(&["a"]);
    page.fail_snapshot = true;
    let result = run_reveal_loop(&page, parse_ids, 10, 3).await;

    assert!(matches!(result, Err(CollectError::ReviewsNotFound(_))));
}

#[tokio::test]
async fn test_repeated_snapshots_merge_without_duplicates() {
    let page = ScriptedPage::new(&["r1,r2,r3,r4,r5", "r1,r2,r3,r4,r5,r6,r7"]);
    let report = run_reveal_loop(&page, parse_ids, 50, 3).await.unwrap();

    let mut unique = ids(&report.reviews);
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), report.reviews.len());
    assert_eq!(report.reviews.len(), 7);
}

/// Source whose fetch outcome is fixed up front
struct FixedSource {
    outcome: Mutex<Option<Result<Vec<Review>, CollectError>>>,
}

impl FixedSource {
    fn new(outcome: Result<Vec<Review>, CollectError>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Some(outcome)),
        })
    }
}

#[async_trait]
impl ReviewSource for FixedSource {
    fn source_name(&self) -> &str {
        "fixed"
    }

    fn matches_url(&self, _url: &str) -> bool {
        true
    }

    async fn fetch(&self, _url: &str, _max_reviews: usize) -> Result<Vec<Review>, CollectError> {
        self.outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn parse(&self, html: &str) -> Vec<Review> {
        parse_ids(html)
    }
}

#[tokio::test]
async fn test_collect_turns_page_failure_into_empty_result() {
    let source = FixedSource::new(Err(CollectError::ReviewsNotFound(Duration::from_secs(10))));
    let collector = ReviewCollector::new(source);

    let reviews = collector.collect("https://maps.example/place", 10).await.unwrap();
    assert!(reviews.is_empty());
}

#[tokio::test]
async fn test_collect_propagates_launch_failure() {
    let source = FixedSource::new(Err(CollectError::Launch("no browser".to_string())));
    let collector = ReviewCollector::new(source);

    let result = collector.collect("https://maps.example/place", 10).await;
    assert!(matches!(result, Err(CollectError::Launch(_))));
}

#[tokio::test]
async fn test_collect_truncates_source_output() {
    let source = FixedSource::new(Ok(parse_ids("1,2,3,4,5")));
    let collector = ReviewCollector::new(source);

    let reviews = collector.collect("https://maps.example/place", 3).await.unwrap();
    assert_eq!(ids(&reviews), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_collect_zero_max_skips_fetch() {
    let source = FixedSource::new(Err(CollectError::Launch("should not run".to_string())));
    let collector = ReviewCollector::new(source);

    let reviews = collector.collect("https://maps.example/place", 0).await.unwrap();
    assert!(reviews.is_empty());
}

#[test]
fn test_parse_html_file_dedups() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "a,b,a,c").unwrap();
    let collector = ReviewCollector::new(FixedSource::new(Ok(Vec::new())));

    let reviews = collector.parse_html_file(file.path()).unwrap();
    assert_eq!(ids(&reviews), vec!["a", "b", "c"]);
}

#[test]
fn test_parse_html_file_missing() {
    let collector = ReviewCollector::new(FixedSource::new(Ok(Vec::new())));
    let result = collector.parse_html_file(Path::new("/nonexistent/reviews.html"));
    assert!(matches!(result, Err(CollectError::Io { .. })));
}
