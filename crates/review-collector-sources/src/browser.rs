use crate::error::CollectError;
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::future::BoxFuture;
use futures::StreamExt;
use review_collector_config::BrowserSettings;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use which::which;

/// A running Chromium instance plus the task pumping its CDP connection
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// Locate (or download) Chromium and launch it with desktop-like settings
    pub async fn launch(settings: &BrowserSettings, fetch_dir: &Path) -> Result<Self, CollectError> {
        let chrome_path = match settings.chrome_executable.clone().or_else(find_system_chromium) {
            Some(path) => path,
            None => fetch_chromium(fetch_dir).await?,
        };
        info!("Using Chromium at {:?}", chrome_path);

        let config = build_browser_config(settings, chrome_path)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| CollectError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            let mut error_count = 0;
            const MAX_ERRORS: usize = 10;

            while let Some(event) = handler.next().await {
                match event {
                    Ok(_) => error_count = 0,
                    Err(e) => {
                        error_count += 1;
                        warn!("Browser handler error (count: {}/{}): {:?}", error_count, MAX_ERRORS, e);
                        if error_count >= MAX_ERRORS {
                            error!("Browser handler received {} consecutive errors. Browser process may have crashed.", error_count);
                            break;
                        }
                    }
                }
            }
            debug!("Browser handler task ended");
        });

        Ok(Self { browser, handler_task })
    }

    /// Run `operation` against a fresh blank page, closing the page afterwards
    /// whatever the outcome
    pub async fn with_page<F, R>(&self, operation: F) -> Result<R, CollectError>
    where
        F: for<'a> FnOnce(&'a Page) -> BoxFuture<'a, Result<R, CollectError>>,
    {
        let page = self.browser.new_page("about:blank").await?;

        let result = operation(&page).await;

        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }

        result
    }

    /// Shut the browser down and wait for the process and handler to finish
    pub async fn close(mut self) {
        info!("Shutting down browser instance");
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed waiting for browser process to exit: {}", e);
        }
        if tokio::time::timeout(Duration::from_secs(2), &mut self.handler_task).await.is_err() {
            self.handler_task.abort();
        }
        info!("Browser instance shut down");
    }
}

/// Launch a browser, run `operation` with it, and always shut it down.
///
/// Launch failures are returned before `operation` runs.
pub async fn with_session<F, R>(
    settings: &BrowserSettings,
    fetch_dir: &Path,
    operation: F,
) -> Result<R, CollectError>
where
    F: for<'a> FnOnce(&'a BrowserSession) -> BoxFuture<'a, Result<R, CollectError>>,
{
    let session = BrowserSession::launch(settings, fetch_dir).await?;
    let result = operation(&session).await;
    session.close().await;
    result
}

/// Build browser configuration that looks like an ordinary desktop Chrome
pub fn build_browser_config(settings: &BrowserSettings, chrome_path: PathBuf) -> Result<BrowserConfig, CollectError> {
    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .window_size(settings.viewport_width, settings.viewport_height)
        .viewport(Viewport {
            width: settings.viewport_width,
            height: settings.viewport_height,
            ..Viewport::default()
        })
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-extensions")
        .arg("--disable-notifications")
        .arg("--log-level=3")
        .arg(format!("--user-agent={}", settings.user_agent));

    if !settings.headless {
        builder = builder.with_head();
    }

    builder.build().map_err(CollectError::Launch)
}

/// Find system Chromium on well-known paths, then on PATH
pub fn find_system_chromium() -> Option<PathBuf> {
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
            "/usr/local/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/local/bin/chromium",
            "/usr/local/bin/chromium-browser",
            "/opt/chromium/chromium",
        ]
    };

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
        .or_else(|| {
            which("chromium")
                .or_else(|_| which("chromium-browser"))
                .or_else(|_| which("google-chrome"))
                .ok()
        })
}

async fn fetch_chromium(fetch_dir: &Path) -> Result<PathBuf, CollectError> {
    info!("No system Chromium found, downloading via BrowserFetcher...");
    tokio::fs::create_dir_all(fetch_dir)
        .await
        .map_err(|e| CollectError::Launch(format!("Cannot create {}: {}", fetch_dir.display(), e)))?;

    let options = BrowserFetcherOptions::builder()
        .with_path(fetch_dir)
        .build()
        .map_err(|e| CollectError::Launch(format!("Failed to create BrowserFetcherOptions: {}", e)))?;

    let fetched = BrowserFetcher::new(options)
        .fetch()
        .await
        .map_err(|e| CollectError::Launch(format!("Failed to fetch Chromium: {}", e)))?;

    info!("Chromium downloaded to: {:?}", fetched.executable_path);
    Ok(fetched.executable_path)
}
