//! Listing expansion: reveal the full content of a listing page
//!
//! Two strategies exist in the wild: a single scroll to the bottom, and a
//! "load more" control clicked until it disappears. Either way the result
//! is one rendered document holding every entry the site will reveal.
//!
//! Expansion is never fatal to a category: transient click failures burn a
//! consecutive-failure budget, and on exhaustion the best-effort document
//! gathered so far is returned.

use crate::browser::{ClickOutcome, FetchError, PageFetcher, PostLoadAction};
use crate::pipeline::{CancelFlag, RetryPolicy};
use crate::site::ListingExpansion;
use std::time::Duration;

/// Expands a listing root into a fully loaded rendered document.
pub struct ListingExpander {
    expansion: ListingExpansion,
    settle: Duration,
    click_settle: Duration,
    max_consecutive_failures: u32,
    retry: RetryPolicy,
}

impl ListingExpander {
    pub fn new(
        expansion: ListingExpansion,
        settle: Duration,
        click_settle: Duration,
        max_consecutive_failures: u32,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            expansion,
            settle,
            click_settle,
            max_consecutive_failures,
            retry,
        }
    }

    /// Fetches the listing root and drives its expansion to exhaustion.
    ///
    /// Errors only when the root itself cannot be fetched within the retry
    /// budget; a partially expanded listing is returned as a success.
    pub async fn expand<F: PageFetcher>(
        &self,
        fetcher: &mut F,
        root_url: &str,
        cancel: &CancelFlag,
    ) -> Result<String, FetchError> {
        let mut document = self.fetch_root(fetcher, root_url).await?;

        let selector = match &self.expansion {
            ListingExpansion::ScrollToBottom => return Ok(document),
            ListingExpansion::LoadMore { selector } => selector,
        };

        let mut consecutive_failures = 0;
        let mut blocks_loaded = 0u32;

        loop {
            if cancel.is_cancelled() {
                tracing::info!("cancellation requested, stopping listing expansion");
                break;
            }

            match fetcher.click(selector, self.click_settle).await {
                Ok(ClickOutcome::Clicked(html)) => {
                    document = html;
                    blocks_loaded += 1;
                    consecutive_failures = 0;
                    tracing::debug!(blocks_loaded, "loaded another listing block");
                }
                Ok(ClickOutcome::Absent) | Ok(ClickOutcome::Hidden) => {
                    tracing::debug!(blocks_loaded, "load-more control exhausted");
                    break;
                }
                Err(FetchError::Transient(e)) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        consecutive_failures,
                        max = self.max_consecutive_failures,
                        "load-more click failed: {}",
                        e
                    );
                    if consecutive_failures >= self.max_consecutive_failures {
                        tracing::warn!("expansion aborted, keeping partial listing");
                        break;
                    }
                    self.retry.wait().await;
                }
            }
        }

        Ok(document)
    }

    /// Fetches the listing root with bounded retry, restarting the session
    /// between attempts.
    async fn fetch_root<F: PageFetcher>(
        &self,
        fetcher: &mut F,
        root_url: &str,
    ) -> Result<String, FetchError> {
        let pre_action = match &self.expansion {
            ListingExpansion::ScrollToBottom => Some(PostLoadAction::ScrollToBottom),
            ListingExpansion::LoadMore { .. } => None,
        };

        let mut attempt = 1;
        loop {
            match fetcher.fetch(root_url, self.settle, pre_action.clone()).await {
                Ok(html) => return Ok(html),
                Err(e) if attempt < self.retry.max_attempts => {
                    tracing::warn!(
                        attempt,
                        max = self.retry.max_attempts,
                        "listing root fetch failed: {}",
                        e
                    );
                    if let Err(restart_err) = fetcher.restart().await {
                        tracing::warn!("session restart failed: {}", restart_err);
                    }
                    self.retry.wait().await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
