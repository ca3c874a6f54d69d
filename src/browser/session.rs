//! Headless Chromium session lifecycle
//!
//! One [`BrowserSession`] wraps one browser process and one page. The
//! session is an explicit resource handle: acquired at startup, restarted
//! on driver failures by whoever owns the retry policy, and released when
//! the run ends.

use crate::browser::FetchError;
use crate::config::BrowserSettings;
use crate::QuarryError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Finds the Chromium binary to launch.
///
/// Order: `QUARRY_CHROMIUM_PATH` env var, then the configured
/// `chrome-path`, then well-known binary names on `PATH`.
pub fn find_chromium(configured: Option<&str>) -> Option<PathBuf> {
    if let Ok(p) = std::env::var("QUARRY_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(p) = configured {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    None
}

/// A live headless Chromium session: one browser process, one page.
pub struct BrowserSession {
    page: Page,
    // Held so the browser process stays alive; killed on drop.
    _browser: Browser,
    handler_task: JoinHandle<()>,
    settings: BrowserSettings,
}

impl BrowserSession {
    /// Launches a fresh headless Chromium session.
    ///
    /// A launch failure is fatal to the run: nothing has been opened yet,
    /// so the caller aborts without any partial output risk.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, QuarryError> {
        let chrome_path = find_chromium(settings.chrome_path.as_deref()).ok_or_else(|| {
            QuarryError::Browser(
                "no Chromium binary found (set QUARRY_CHROMIUM_PATH or chrome-path)".to_string(),
            )
        })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", USER_AGENT))
            .arg("--window-size=1920,1080");
        if settings.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| QuarryError::Browser(format!("failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| QuarryError::Browser(format!("failed to launch Chromium: {}", e)))?;

        // Drain CDP events for the life of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| QuarryError::Browser(format!("failed to open page: {}", e)))?;

        tracing::info!("browser session started");

        Ok(Self {
            page,
            _browser: browser,
            handler_task,
            settings: settings.clone(),
        })
    }

    /// Tears the session down and launches a replacement.
    ///
    /// Used between retry attempts after a transient driver failure; a
    /// failed relaunch is itself transient (the next attempt retries it).
    pub async fn restart(&mut self) -> Result<(), FetchError> {
        tracing::warn!("restarting browser session");
        self.handler_task.abort();

        let fresh = Self::launch(&self.settings)
            .await
            .map_err(|e| FetchError::Transient(format!("session relaunch failed: {}", e)))?;

        let old = std::mem::replace(self, fresh);
        drop(old);
        Ok(())
    }

    /// Navigates the page to `url`, bounded by `timeout`.
    pub async fn goto(&self, url: &str, timeout: Duration) -> Result<(), FetchError> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {
                let _ = self.page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => Err(FetchError::Transient(format!("navigation failed: {}", e))),
            Err(_) => Err(FetchError::Transient(format!(
                "navigation timed out after {}ms",
                timeout.as_millis()
            ))),
        }
    }

    /// Evaluates a script on the live page and deserializes its result.
    pub async fn evaluate<T: DeserializeOwned>(&self, script: String) -> Result<T, FetchError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| FetchError::Transient(format!("script evaluation failed: {}", e)))?;

        result
            .into_value::<T>()
            .map_err(|e| FetchError::Transient(format!("script result conversion failed: {}", e)))
    }

    /// Reads the fully rendered document.
    pub async fn html(&self) -> Result<String, FetchError> {
        self.evaluate("document.documentElement.outerHTML".to_string())
            .await
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
