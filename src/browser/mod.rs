//! Browser session management and the rendered-page fetch boundary
//!
//! This module owns everything that touches the live browser:
//! - Launching and restarting the shared headless Chromium session
//! - Navigating to a URL and reading the rendered document
//! - Issuing scroll and click actions against the live page
//!
//! The [`PageFetcher`] trait is the seam the rest of the pipeline depends
//! on, so tests can substitute a scripted fetcher for the real browser.

mod fetcher;
mod session;

pub use fetcher::ChromiumFetcher;
pub use session::{find_chromium, BrowserSession};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors at the browser boundary
#[derive(Debug, Error)]
pub enum FetchError {
    /// Driver-level failure (crashed session, lost connection, timeout).
    /// Recoverable by a session restart plus retry; the caller owns
    /// recovery, the fetcher does not restart itself.
    #[error("transient browser failure: {0}")]
    Transient(String),
}

/// An action issued against the live page after navigation, before the
/// rendered document is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostLoadAction {
    /// Scroll to the bottom of the page (triggers lazy-loaded content).
    ScrollToBottom,
    /// Scroll to a fixed vertical offset in pixels.
    ScrollTo(u32),
}

/// Outcome of a click attempt against a selector on the live page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The control was clicked; carries the re-read rendered document.
    Clicked(String),
    /// No element matched the selector.
    Absent,
    /// The element exists but is not visible/interactable. Listing
    /// expansion treats this the same as [`ClickOutcome::Absent`].
    Hidden,
}

/// The rendered-page fetch boundary.
///
/// Implementations drive one shared browser session; all calls are strictly
/// sequential by design (the session is a single mutable resource).
#[async_trait]
pub trait PageFetcher: Send {
    /// Navigates to `url`, waits for `settle`, optionally applies a
    /// post-load action, and returns the rendered document.
    async fn fetch(
        &mut self,
        url: &str,
        settle: Duration,
        action: Option<PostLoadAction>,
    ) -> Result<String, FetchError>;

    /// Clicks the element matching `selector` on the current page, waits
    /// for `settle`, and returns the re-read document — or reports that the
    /// control is absent or hidden.
    async fn click(&mut self, selector: &str, settle: Duration) -> Result<ClickOutcome, FetchError>;

    /// Tears down and relaunches the browser session. Called by components
    /// that own retry policies, between attempts.
    async fn restart(&mut self) -> Result<(), FetchError>;
}
