use crate::error::ParseError;
use crate::google::selectors;
use review_collector_models::{Review, UNKNOWN};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error};

/// Compiled selectors for one parse pass
pub struct ReviewSelectors {
    container: Selector,
    author: Selector,
    author_info: Selector,
    rating: Selector,
    text: Selector,
    text_expanded: Selector,
    date: Selector,
    photo: Selector,
}

fn compile(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        selector: css.to_string(),
        reason: format!("{:?}", e),
    })
}

impl ReviewSelectors {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            container: compile(selectors::REVIEW_CONTAINER)?,
            author: compile(selectors::AUTHOR_NAME)?,
            author_info: compile(selectors::AUTHOR_INFO)?,
            rating: compile(selectors::RATING)?,
            text: compile(selectors::REVIEW_TEXT)?,
            text_expanded: compile(selectors::REVIEW_TEXT_EXPANDED)?,
            date: compile(selectors::DATE)?,
            photo: compile(selectors::PHOTO_BUTTON)?,
        })
    }
}

/// Parse every review container in a page snapshot, in document order.
///
/// Every container yields a record. No dedup happens here; nested
/// containers sharing an id are all returned.
pub fn parse_reviews(html: &str) -> Vec<Review> {
    let selectors = match ReviewSelectors::new() {
        Ok(selectors) => selectors,
        Err(e) => {
            error!("Cannot parse reviews: {}", e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let reviews: Vec<Review> = document
        .select(&selectors.container)
        .map(|container| parse_single_review(container, &selectors))
        .collect();

    debug!(parsed = reviews.len(), "Parsed review containers");
    reviews
}

/// Turn one review container into a `Review`, defaulting any missing field
pub fn parse_single_review(
    container: ElementRef<'_>,
    selectors: &ReviewSelectors,
) -> Review {
    let review_id = container
        .value()
        .attr(selectors::REVIEW_ID_ATTR)
        .unwrap_or_default()
        .to_string();

    let author = first_text(container, &selectors.author).unwrap_or_else(|| UNKNOWN.to_string());

    let rating = match container.select(&selectors.rating).next() {
        Some(element) => {
            let label = element.value().attr(selectors::RATING_LABEL_ATTR).unwrap_or_default();
            parse_rating_label(label).unwrap_or_else(|e| {
                debug!(review_id = %review_id, label = label, "Rating read as 0: {}", e);
                0
            })
        }
        None => 0,
    };

    let mut review_text = first_text(container, &selectors.text).unwrap_or_default();
    if review_text.is_empty() {
        // Truncated reviews keep their body in the expanded block instead
        if let Some(expanded) = container.select(&selectors.text_expanded).next() {
            review_text = expanded.text().map(str::trim).collect();
        }
    }

    let date = first_text(container, &selectors.date).unwrap_or_else(|| UNKNOWN.to_string());
    let author_info = first_text(container, &selectors.author_info).unwrap_or_default();
    let photos_count = container.select(&selectors.photo).count() as u32;

    let mut review = Review::new(review_id).with_photos(photos_count);
    review.author = author;
    review.author_info = author_info;
    review.rating = rating;
    review.date = date;
    review.review_text = review_text;
    review
}

/// Trimmed text of the first descendant matching `selector`
fn first_text(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    container
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// Star count from an accessible label such as "4 stars" or "Rated 5.0 out of 5".
///
/// Labels without digits read as 0. A leading number above 5 is reported as
/// an error; callers keep the review and record its rating as 0.
pub fn parse_rating_label(label: &str) -> Result<u8, ParseError> {
    match first_integer(label) {
        Some(value) if value <= 5 => Ok(value as u8),
        Some(value) => Err(ParseError::RatingOutOfRange(value)),
        None => Ok(0),
    }
}

/// First run of ASCII digits in `text`, saturating on overflow
fn first_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    Some(digits[..end].parse::<u64>().unwrap_or(u64::MAX))
}
