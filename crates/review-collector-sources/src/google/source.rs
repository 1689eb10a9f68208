use crate::browser::with_session;
use crate::collector::{run_reveal_loop, RevealPage};
use crate::debug::SnapshotCapture;
use crate::error::CollectError;
use crate::google::parser::parse_reviews;
use crate::google::selectors;
use crate::traits::ReviewSource;
use async_trait::async_trait;
use chromiumoxide::Page;
use futures::FutureExt;
use review_collector_config::{BrowserSettings, CollectorSettings, Config, PathManager};
use review_collector_models::Review;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

const MARKER_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Reviews on a Google Maps place page
pub struct GoogleMapsSource {
    browser: BrowserSettings,
    collector: CollectorSettings,
    fetch_dir: PathBuf,
    capture: SnapshotCapture,
}

impl GoogleMapsSource {
    pub fn new(config: &Config, paths: &PathManager) -> Self {
        let debug_dir = config
            .debug
            .output_dir
            .clone()
            .unwrap_or_else(|| paths.debug_dir());
        let capture = SnapshotCapture::new(config.debug.enabled, debug_dir);
        if capture.is_enabled() {
            info!(dir = %capture.output_dir().display(), "Debug snapshots enabled");
        }

        Self {
            browser: config.browser.clone(),
            collector: config.collector.clone(),
            fetch_dir: paths.chromium_dir(),
            capture,
        }
    }
}

#[async_trait]
impl ReviewSource for GoogleMapsSource {
    fn source_name(&self) -> &str {
        "google_maps"
    }

    fn matches_url(&self, url: &str) -> bool {
        let url = url.to_ascii_lowercase();
        (url.contains("google.") && url.contains("/maps"))
            || url.contains("maps.app.goo.gl")
            || url.contains("goo.gl/maps")
    }

    async fn fetch(&self, url: &str, max_reviews: usize) -> Result<Vec<Review>, CollectError> {
        let url = url.to_string();
        let user_agent = self.browser.user_agent.clone();
        let settings = self.collector.clone();
        let capture = self.capture.clone();

        with_session(&self.browser, &self.fetch_dir, move |session| {
            async move {
                session
                    .with_page(move |page| {
                        async move {
                            open_reviews(page, &url, &user_agent, &settings, &capture).await?;

                            let reveal = ChromiumReviewPage {
                                page,
                                settings: &settings,
                            };
                            let report =
                                run_reveal_loop(&reveal, parse_reviews, max_reviews, settings.max_stalls).await?;
                            Ok(report.reviews)
                        }
                        .boxed()
                    })
                    .await
            }
            .boxed()
        })
        .await
    }

    fn parse(&self, html: &str) -> Vec<Review> {
        parse_reviews(html)
    }
}

/// Navigate to the place page and get it to the point where reviews are listed
async fn open_reviews(
    page: &Page,
    url: &str,
    user_agent: &str,
    settings: &CollectorSettings,
    capture: &SnapshotCapture,
) -> Result<(), CollectError> {
    if let Err(e) = page.enable_stealth_mode_with_agent(user_agent).await {
        warn!("Failed to enable stealth mode: {}", e);
    }

    match tokio::time::timeout(settings.navigation_timeout(), page.goto(url)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => {
            return Err(CollectError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
        }
        Err(_) => {
            return Err(CollectError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {:?}", settings.navigation_timeout()),
            })
        }
    }

    if let Err(e) = wait_for_reviews(page, settings.review_wait()).await {
        capture.capture(page, "reviews_not_found").await;
        return Err(e);
    }

    activate_sort_control(page, settings.sort_settle()).await;
    Ok(())
}

/// Poll until at least one review container is rendered
async fn wait_for_reviews(page: &Page, wait: Duration) -> Result<(), CollectError> {
    let deadline = Instant::now() + wait;
    loop {
        if page.find_element(selectors::REVIEW_MARKER).await.is_ok() {
            debug!("Review marker present");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(CollectError::ReviewsNotFound(wait));
        }
        sleep(MARKER_POLL_INTERVAL).await;
    }
}

/// Click the sort control when it is visible. Never fails the run.
async fn activate_sort_control(page: &Page, settle: Duration) {
    let button = match page.find_element(selectors::SORT_BUTTON).await {
        Ok(button) => button,
        Err(_) => {
            info!("Reviews tab not found or already active");
            return;
        }
    };

    let visible = button
        .bounding_box()
        .await
        .map(|bbox| bbox.width > 0.0 && bbox.height > 0.0)
        .unwrap_or(false);
    if !visible {
        debug!("Sort control present but hidden");
        return;
    }

    match button.click().await {
        Ok(_) => sleep(settle).await,
        Err(e) => debug!("Sort control click failed: {}", e),
    }
}

/// The live reviews panel of an open place page
struct ChromiumReviewPage<'a> {
    page: &'a Page,
    settings: &'a CollectorSettings,
}

#[async_trait]
impl<'a> RevealPage for ChromiumReviewPage<'a> {
    async fn snapshot(&self) -> Result<String, CollectError> {
        Ok(self.page.content().await?)
    }

    async fn reveal_more(&self) -> Result<(), CollectError> {
        let reveal_error = |e: chromiumoxide::error::CdpError| CollectError::Reveal(e.to_string());

        let container = self
            .page
            .find_xpath(selectors::SCROLL_CONTAINER_XPATH)
            .await
            .map_err(|e| CollectError::Reveal(format!("scroll container not found: {}", e)))?;
        container.scroll_into_view().await.map_err(reveal_error)?;

        for _ in 0..self.settings.scroll_repetitions {
            container.press_key("End").await.map_err(reveal_error)?;
            sleep(self.settings.scroll_pause()).await;
        }
        sleep(self.settings.settle_pause()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn source() -> GoogleMapsSource {
        GoogleMapsSource::new(&Config::default(), &PathManager::from_base("/tmp/review-collector-test"))
    }

    #[test]
    fn test_matches_google_maps_urls() {
        let source = source();
        assert!(source.matches_url("https://www.google.com/maps/place/Seng+Leong+Engineering/@3.01,101.46,15z"));
        assert!(source.matches_url("https://www.google.com.my/maps/place/Some+Shop"));
        assert!(source.matches_url("https://maps.app.goo.gl/AbCdEf123"));
        assert!(!source.matches_url("https://www.yelp.com/biz/some-shop"));
        assert!(!source.matches_url("https://www.google.com/search?q=aircond"));
    }

    #[test]
    fn test_parse_delegates_to_parser() {
        let html = r#"<div data-review-id="g1"><div class="d4r55">Lim</div></div>"#;
        let reviews = source().parse(html);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].author, "Lim");
    }

    #[test]
    fn test_debug_dir_defaults_to_data_dir() {
        let source = source();
        assert_eq!(
            source.capture.output_dir(),
            PathBuf::from("/tmp/review-collector-test/data/debug").as_path()
        );
        assert_eq!(source.fetch_dir, PathBuf::from("/tmp/review-collector-test/data/chromium"));
    }

    #[test]
    fn test_debug_settings_drive_capture() {
        let mut config = Config::default();
        config.debug.enabled = true;
        config.debug.output_dir = Some(PathBuf::from("/tmp/review-collector-snapshots"));

        let source = GoogleMapsSource::new(&config, &PathManager::from_base("/tmp/review-collector-test"));
        assert!(source.capture.is_enabled());
        assert_eq!(source.capture.output_dir(), Path::new("/tmp/review-collector-snapshots"));
    }
}
