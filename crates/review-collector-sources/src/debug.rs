use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Saves page HTML and a screenshot when a collection run goes wrong
#[derive(Debug, Clone)]
pub struct SnapshotCapture {
    enabled: bool,
    output_dir: PathBuf,
}

impl SnapshotCapture {
    pub fn new(enabled: bool, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            output_dir: output_dir.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Capture the page if enabled. Capture problems are logged, never raised.
    pub async fn capture(&self, page: &Page, label: &str) {
        if !self.is_enabled() {
            return;
        }
        if let Err(e) = self.try_capture(page, label).await {
            warn!("Failed to capture debug snapshot: {:#}", e);
        }
    }

    async fn try_capture(&self, page: &Page, label: &str) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create debug output directory: {:?}", self.output_dir))?;

        let stem = snapshot_stem(label);

        let html = page.content().await?;
        let html_path = self.output_dir.join(format!("{}.html", stem));
        std::fs::write(&html_path, html)
            .with_context(|| format!("Failed to write HTML to {:?}", html_path))?;
        info!("Page HTML saved: {:?}", html_path);

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let png = page.screenshot(params).await?;
        let png_path = self.output_dir.join(format!("{}.png", stem));
        std::fs::write(&png_path, png)
            .with_context(|| format!("Failed to write screenshot to {:?}", png_path))?;
        info!("Screenshot saved: {:?}", png_path);

        Ok(())
    }
}

fn snapshot_stem(label: &str) -> String {
    format!("{}_{}", Utc::now().format("%Y%m%dT%H%M%S"), sanitize_label(label))
}

/// Keep labels safe for use in file names
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "snapshot".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("reviews not found"), "reviews_not_found");
        assert_eq!(sanitize_label("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_label(""), "snapshot");
    }

    #[test]
    fn test_snapshot_stem_has_timestamp_prefix() {
        let stem = snapshot_stem("wait failed");
        assert!(stem.ends_with("_wait_failed"));
        assert_eq!(stem.len(), "20260101T000000".len() + "_wait_failed".len());
    }

    #[test]
    fn test_disabled_capture() {
        let capture = SnapshotCapture::new(false, "/tmp/review-collector-debug");
        assert!(!capture.is_enabled());
        assert_eq!(capture.output_dir(), Path::new("/tmp/review-collector-debug"));
    }
}
