use serde::{Deserialize, Serialize};

/// Placeholder used for author and date when the page does not render them
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub review_id: String, // Value of data-review-id, primary dedup key
    pub author: String,
    pub author_info: String, // Local Guide badge, review count, etc.
    pub rating: u8, // 0-5, 0 when the label could not be read
    pub date: String, // Relative date as rendered ("2 weeks ago")
    pub review_text: String,
    pub photos_count: u32,
    pub has_photos: bool,
}

impl Review {
    /// Create a review carrying only its identifier, every other field defaulted
    pub fn new(review_id: impl Into<String>) -> Self {
        Self {
            review_id: review_id.into(),
            author: UNKNOWN.to_string(),
            author_info: String::new(),
            rating: 0,
            date: UNKNOWN.to_string(),
            review_text: String::new(),
            photos_count: 0,
            has_photos: false,
        }
    }

    /// Set the photo count, keeping `has_photos` in step with it
    pub fn with_photos(mut self, photos_count: u32) -> Self {
        self.photos_count = photos_count;
        self.has_photos = photos_count > 0;
        self
    }
}
