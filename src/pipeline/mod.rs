//! The resumable crawl-and-extract pipeline
//!
//! This module contains the moving parts between the browser boundary and
//! durable storage:
//! - [`ListingExpander`] reveals the full content of a listing page
//! - [`DetailEnricher`] fills in detail-page fields with bounded retry
//! - [`Orchestrator`] sequences categories, filters against the
//!   checkpoint, and owns the write-then-mark ordering
//! - [`RetryPolicy`] is the injected bounded-retry/backoff object

mod enricher;
mod expander;
mod orchestrator;
mod retry;

pub use enricher::DetailEnricher;
pub use expander::ListingExpander;
pub use orchestrator::{Orchestrator, RunOutcome};
pub use retry::RetryPolicy;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag.
///
/// Set from the interrupt handler; checked between candidates and between
/// listing-expansion iterations — never inside a single fetch, which is
/// allowed to complete or time out on its own.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
