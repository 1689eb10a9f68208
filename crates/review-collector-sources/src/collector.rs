use crate::accumulator::{ReviewAccumulator, StopReason};
use crate::error::CollectError;
use crate::traits::ReviewSource;
use async_trait::async_trait;
use review_collector_models::Review;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// A live page that can be snapshotted and scrolled for more content
#[async_trait]
pub trait RevealPage: Send + Sync {
    /// Current rendered markup
    async fn snapshot(&self) -> Result<String, CollectError>;

    /// Cause more review containers to be rendered
    async fn reveal_more(&self) -> Result<(), CollectError>;
}

#[derive(Debug)]
pub struct CollectionReport {
    pub reviews: Vec<Review>,
    pub stop_reason: StopReason,
    pub snapshots: u32,
}

/// Snapshot, parse and merge until the target is met, the page stalls
/// `max_stalls` times in a row, or revealing more content fails.
///
/// A snapshot error aborts the loop and is returned to the caller.
pub async fn run_reveal_loop<P, F>(
    page: &P,
    parse: F,
    max_reviews: usize,
    max_stalls: u32,
) -> Result<CollectionReport, CollectError>
where
    P: RevealPage + ?Sized,
    F: Fn(&str) -> Vec<Review>,
{
    let mut accumulator = ReviewAccumulator::new(max_reviews, max_stalls);
    let mut snapshots = 0;

    let stop_reason = loop {
        let html = page.snapshot().await?;
        snapshots += 1;

        accumulator.merge(parse(&html));
        info!(
            operation = "collect",
            collected = accumulator.len(),
            snapshot = snapshots,
            "Collected {} reviews so far",
            accumulator.len()
        );

        if let Some(reason) = accumulator.stop_reason() {
            if accumulator.is_empty() {
                warn!(snapshots = snapshots, "No review containers appeared on the page");
            }
            break reason;
        }

        if let Err(e) = page.reveal_more().await {
            warn!("Scrolling error, stopping collection: {}", e);
            break StopReason::RevealFailed;
        }
    };

    info!(
        operation = "collect",
        reason = ?stop_reason,
        snapshots = snapshots,
        "Review collection loop finished"
    );

    Ok(CollectionReport {
        reviews: accumulator.into_reviews(),
        stop_reason,
        snapshots,
    })
}

/// Front door for a collection run against one review source.
///
/// Holds no state between calls.
pub struct ReviewCollector {
    source: Arc<dyn ReviewSource>,
}

impl ReviewCollector {
    pub fn new(source: Arc<dyn ReviewSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.source_name()
    }

    /// Collect up to `max_reviews` unique reviews from `url`.
    ///
    /// Anything that goes wrong after the page is opened yields an empty
    /// list. Only failures to start the browser are returned as errors.
    pub async fn collect(&self, url: &str, max_reviews: usize) -> Result<Vec<Review>, CollectError> {
        if max_reviews == 0 {
            return Ok(Vec::new());
        }

        info!(source = self.source.source_name(), "Navigating to: {}", url);

        match self.source.fetch(url, max_reviews).await {
            Ok(mut reviews) => {
                reviews.truncate(max_reviews);
                info!("Successfully scraped {} reviews", reviews.len());
                Ok(reviews)
            }
            Err(e) if e.is_page_failure() => {
                warn!(error = %e, "Error during scraping, returning no reviews");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Parse saved markup without a browser. Repeated ids keep their first
    /// occurrence.
    pub fn parse_html(&self, html: &str) -> Vec<Review> {
        let mut accumulator = ReviewAccumulator::new(usize::MAX, u32::MAX);
        accumulator.merge(self.source.parse(html));
        accumulator.into_reviews()
    }

    pub fn parse_html_file(&self, path: &Path) -> Result<Vec<Review>, CollectError> {
        let html = std::fs::read_to_string(path).map_err(|source| CollectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reviews = self.parse_html(&html);
        info!("Found {} reviews in {}", reviews.len(), path.display());
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests;
