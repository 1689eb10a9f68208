pub mod parser;
pub mod selectors;
pub mod source;

pub use parser::{parse_reviews, parse_single_review};
pub use source::GoogleMapsSource;
