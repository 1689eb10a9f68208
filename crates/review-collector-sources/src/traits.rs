use crate::error::CollectError;
use async_trait::async_trait;
use review_collector_models::Review;

/// A review platform: how to fetch reviews from a live page and how to read
/// them out of saved markup.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    // Source metadata
    fn source_name(&self) -> &str;

    /// Whether this source knows how to handle the given page address
    fn matches_url(&self, url: &str) -> bool;

    /// Open `url`, reveal reviews until `max_reviews` unique ones are found or
    /// the page runs dry. Owns any browser it starts and closes it before
    /// returning.
    async fn fetch(&self, url: &str, max_reviews: usize) -> Result<Vec<Review>, CollectError>;

    /// Extract every review container present in a markup snapshot
    fn parse(&self, html: &str) -> Vec<Review>;
}
