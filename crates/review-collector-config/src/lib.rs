pub mod config;
pub mod paths;

pub use config::{BrowserSettings, CollectorSettings, Config, DebugSettings, ExportFormat, OutputSettings, DEFAULT_USER_AGENT};
pub use paths::{PathManager, container_base_path};
