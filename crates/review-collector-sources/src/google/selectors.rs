// Markup hooks on the Google Maps reviews panel. The class names are
// obfuscated build output and change without notice.

/// One rendered review
pub const REVIEW_CONTAINER: &str = "div[data-review-id]";
pub const REVIEW_ID_ATTR: &str = "data-review-id";

pub const AUTHOR_NAME: &str = "div.d4r55";
pub const AUTHOR_INFO: &str = "div.RfnDt";
pub const RATING: &str = "span[role=\"img\"]";
pub const RATING_LABEL_ATTR: &str = "aria-label";
pub const REVIEW_TEXT: &str = "span.wiI7pd";
/// Full text shown once a truncated review is expanded
pub const REVIEW_TEXT_EXPANDED: &str = "div.MyEned";
pub const DATE: &str = "span.rsqaWe";
pub const PHOTO_BUTTON: &str = "button[data-photo-index]";

/// Present on the page once reviews have started rendering
pub const REVIEW_MARKER: &str = "[data-review-id]";
pub const SORT_BUTTON: &str = "button[data-value=\"Sort\"]";

/// Scrollable panel wrapping the first review
pub const SCROLL_CONTAINER_XPATH: &str = "(//*[@data-review-id])[1]/ancestor::div[contains(@class, \"review\") or contains(@style, \"overflow\")]";
