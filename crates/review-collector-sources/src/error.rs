use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("No review appeared within {0:?}")]
    ReviewsNotFound(Duration),

    #[error("Could not reveal more reviews: {0}")]
    Reveal(String),

    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CollectError {
    /// Failures that happen once a page is open. These end the run with no
    /// reviews instead of surfacing to the caller.
    pub fn is_page_failure(&self) -> bool {
        matches!(
            self,
            CollectError::Navigation { .. }
                | CollectError::ReviewsNotFound(_)
                | CollectError::Reveal(_)
                | CollectError::Browser(_)
        )
    }
}

/// Why a selector or a rating label could not be parsed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid selector {selector}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Rating {0} is outside the 0-5 range")]
    RatingOutOfRange(u64),
}
