//! The real rendered-page fetcher backed by a Chromium session
//!
//! Implements [`PageFetcher`] over a [`BrowserSession`]: navigate, settle,
//! optionally scroll, read the rendered document. Click support locates the
//! control on the live page, verifies it is visible, scrolls it into view
//! and clicks it — reporting absent/hidden controls as data, not errors.

use crate::browser::session::BrowserSession;
use crate::browser::{ClickOutcome, FetchError, PageFetcher, PostLoadAction};
use async_trait::async_trait;
use std::time::Duration;

/// Production [`PageFetcher`] driving one shared Chromium session.
pub struct ChromiumFetcher {
    session: BrowserSession,
    nav_timeout: Duration,
    scroll_settle: Duration,
}

impl ChromiumFetcher {
    pub fn new(session: BrowserSession, nav_timeout: Duration, scroll_settle: Duration) -> Self {
        Self {
            session,
            nav_timeout,
            scroll_settle,
        }
    }

    async fn apply(&self, action: &PostLoadAction) -> Result<(), FetchError> {
        let script = match action {
            PostLoadAction::ScrollToBottom => {
                "window.scrollTo(0, document.body.scrollHeight); true".to_string()
            }
            PostLoadAction::ScrollTo(y) => format!("window.scrollTo(0, {}); true", y),
        };
        let _: bool = self.session.evaluate(script).await?;
        Ok(())
    }
}

#[async_trait]
impl PageFetcher for ChromiumFetcher {
    async fn fetch(
        &mut self,
        url: &str,
        settle: Duration,
        action: Option<PostLoadAction>,
    ) -> Result<String, FetchError> {
        self.session.goto(url, self.nav_timeout).await?;
        tokio::time::sleep(settle).await;

        if let Some(action) = action {
            self.apply(&action).await?;
            tokio::time::sleep(self.scroll_settle).await;
        }

        self.session.html().await
    }

    async fn click(&mut self, selector: &str, settle: Duration) -> Result<ClickOutcome, FetchError> {
        let outcome: String = self.session.evaluate(click_script(selector)).await?;

        match outcome.as_str() {
            "clicked" => {
                tokio::time::sleep(settle).await;
                Ok(ClickOutcome::Clicked(self.session.html().await?))
            }
            "hidden" => Ok(ClickOutcome::Hidden),
            _ => Ok(ClickOutcome::Absent),
        }
    }

    async fn restart(&mut self) -> Result<(), FetchError> {
        self.session.restart().await
    }
}

/// Builds the click-probe script for a selector.
///
/// The script reports "absent" when nothing matches, "hidden" when the
/// control exists but is not interactable, and "clicked" after scrolling
/// it into view and clicking it.
fn click_script(selector: &str) -> String {
    let quoted = serde_json::Value::from(selector).to_string();
    format!(
        r#"(() => {{
    const el = document.querySelector({quoted});
    if (!el) return "absent";
    const style = window.getComputedStyle(el);
    if (style.display === "none" || style.visibility === "hidden" || el.offsetParent === null) {{
        return "hidden";
    }}
    el.scrollIntoView(true);
    el.click();
    return "clicked";
}})()"#,
        quoted = quoted
    )
}
