pub mod accumulator;
pub mod browser;
pub mod collector;
pub mod debug;
pub mod error;
pub mod google;
pub mod registry;
pub mod traits;

pub use accumulator::{ReviewAccumulator, StopReason};
pub use collector::{run_reveal_loop, CollectionReport, RevealPage, ReviewCollector};
pub use error::{CollectError, ParseError};
pub use google::GoogleMapsSource;
pub use registry::SourceRegistry;
pub use traits::ReviewSource;
