use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Desktop Chrome identification presented to the review page
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub collector: CollectorSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub debug: DebugSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    /// Explicit Chromium binary; discovered on PATH or fetched when unset
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorSettings {
    #[serde(default = "default_max_reviews")]
    pub max_reviews: usize,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    #[serde(default = "default_review_wait_secs")]
    pub review_wait_secs: u64,
    #[serde(default = "default_sort_settle_ms")]
    pub sort_settle_ms: u64,
    #[serde(default = "default_scroll_repetitions")]
    pub scroll_repetitions: u32,
    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,
    #[serde(default = "default_settle_pause_ms")]
    pub settle_pause_ms: u64,
    /// Consecutive snapshots without a new review before giving up
    #[serde(default = "default_max_stalls")]
    pub max_stalls: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Json
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugSettings {
    #[serde(default = "default_debug_enabled")]
    pub enabled: bool,
    /// Defaults to the data directory's `debug` folder when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_max_reviews() -> usize {
    50
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_review_wait_secs() -> u64 {
    10
}

fn default_sort_settle_ms() -> u64 {
    2000
}

fn default_scroll_repetitions() -> u32 {
    3
}

fn default_scroll_pause_ms() -> u64 {
    1000
}

fn default_settle_pause_ms() -> u64 {
    2000
}

fn default_max_stalls() -> u32 {
    3
}

fn default_output_path() -> PathBuf {
    PathBuf::from("google_reviews.json")
}

fn default_debug_enabled() -> bool {
    std::env::var("REVIEW_COLLECTOR_DEBUG")
        .map(|v| !v.is_empty() && v != "0")
        .unwrap_or(false)
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_true(),
            user_agent: default_user_agent(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            chrome_executable: None,
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_reviews: default_max_reviews(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            review_wait_secs: default_review_wait_secs(),
            sort_settle_ms: default_sort_settle_ms(),
            scroll_repetitions: default_scroll_repetitions(),
            scroll_pause_ms: default_scroll_pause_ms(),
            settle_pause_ms: default_settle_pause_ms(),
            max_stalls: default_max_stalls(),
        }
    }
}

impl CollectorSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn review_wait(&self) -> Duration {
        Duration::from_secs(self.review_wait_secs)
    }

    pub fn sort_settle(&self) -> Duration {
        Duration::from_millis(self.sort_settle_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn settle_pause(&self) -> Duration {
        Duration::from_millis(self.settle_pause_ms)
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: ExportFormat::default(),
        }
    }
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: default_debug_enabled(),
            output_dir: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load the config file if it exists, falling back to defaults otherwise
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            anyhow::bail!(
                "Viewport must be non-zero, got {}x{}",
                self.browser.viewport_width,
                self.browser.viewport_height
            );
        }
        if self.browser.user_agent.trim().is_empty() {
            anyhow::bail!("browser.user_agent must not be empty");
        }
        if self.collector.max_reviews == 0 {
            anyhow::bail!("collector.max_reviews must be at least 1");
        }
        if self.collector.scroll_repetitions == 0 {
            anyhow::bail!("collector.scroll_repetitions must be at least 1");
        }
        if self.collector.max_stalls == 0 {
            anyhow::bail!("collector.max_stalls must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.browser.headless = false;
        config.collector.max_reviews = 120;
        config.output.format = ExportFormat::Csv;

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.browser.headless, false);
        assert_eq!(loaded.collector.max_reviews, 120);
        assert_eq!(loaded.output.format, ExportFormat::Csv);
        assert_eq!(loaded.browser.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [collector]
            max_reviews = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.collector.max_reviews, 10);
        assert_eq!(config.collector.scroll_repetitions, 3);
        assert_eq!(config.collector.max_stalls, 3);
        assert_eq!(config.collector.navigation_timeout(), Duration::from_secs(30));
        assert_eq!(config.collector.review_wait(), Duration::from_secs(10));
        assert_eq!(config.browser.viewport_width, 1920);
        assert_eq!(config.browser.viewport_height, 1080);
        assert_eq!(config.output.path, PathBuf::from("google_reviews.json"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.collector.max_reviews, 50);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.collector.max_reviews = 0;
        assert!(config.validate().is_err());
        config.collector.max_reviews = 5;

        config.collector.max_stalls = 0;
        assert!(config.validate().is_err());
        config.collector.max_stalls = 3;

        config.browser.viewport_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[collector\nmax_reviews = ").unwrap();
        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
