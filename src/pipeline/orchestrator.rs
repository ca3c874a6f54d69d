//! Crawl orchestration: categories → expansion → extraction → enrichment
//!
//! The orchestrator owns the run-level loop and the two durability rules
//! everything else depends on:
//! - a candidate whose identifier is already checkpointed is skipped
//!   before enrichment, which also de-duplicates repeated listing entries
//!   within one run;
//! - a row is appended to the sink **before** its identifier is marked, so
//!   a crash window can only re-process, never lose, a record.
//!
//! Per-category failures are contained and logged; they never abort the
//! multi-category run. On cancellation the current candidate finishes,
//! then checkpoint and sink are flushed before returning.

use crate::browser::PageFetcher;
use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::pipeline::{CancelFlag, DetailEnricher, ListingExpander, RetryPolicy};
use crate::record::CategorySpec;
use crate::sink::CsvSink;
use crate::site::{ListingExpansion, Site};
use crate::QuarryError;
use std::time::Duration;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All categories were processed.
    Completed,
    /// A cancellation signal stopped the run early; state was flushed.
    Interrupted,
}

/// Top-level controller for one site's crawl.
pub struct Orchestrator<F: PageFetcher> {
    site: Box<dyn Site>,
    fetcher: F,
    checkpoint: CheckpointStore,
    sink: CsvSink,
    category_override: Vec<CategorySpec>,
    retry: RetryPolicy,
    settle: Duration,
    click_settle: Duration,
    max_consecutive_failures: u32,
    pause: Duration,
    cancel: CancelFlag,
}

impl<F: PageFetcher> Orchestrator<F> {
    pub fn new(
        site: Box<dyn Site>,
        fetcher: F,
        checkpoint: CheckpointStore,
        sink: CsvSink,
        config: &Config,
        cancel: CancelFlag,
    ) -> Self {
        let category_override = config
            .category
            .iter()
            .map(|c| CategorySpec::new(c.label.clone(), c.url.clone()))
            .collect();

        Self {
            site,
            fetcher,
            checkpoint,
            sink,
            category_override,
            retry: RetryPolicy::new(
                config.crawl.max_retries,
                Duration::from_millis(config.crawl.retry_backoff_ms),
            ),
            settle: Duration::from_millis(config.browser.settle_delay_ms),
            click_settle: Duration::from_millis(config.browser.scroll_settle_ms),
            max_consecutive_failures: config.crawl.max_consecutive_failures,
            pause: Duration::from_millis(config.crawl.pause_between_products_ms),
            cancel: cancel.clone(),
        }
    }

    /// Runs the crawl to completion or interruption.
    ///
    /// Always flushes the checkpoint and the sink before returning a
    /// success; a failing final flush is the one persistence error that
    /// propagates, since silently dropping it would hide lost marks.
    pub async fn run(&mut self) -> Result<RunOutcome, QuarryError> {
        tracing::info!(
            site = self.site.name(),
            already_processed = self.checkpoint.len(),
            "starting crawl"
        );

        let categories = self.resolve_categories().await;
        if categories.is_empty() {
            tracing::warn!("no categories to crawl");
        }

        for category in &categories {
            if self.cancel.is_cancelled() {
                break;
            }
            self.process_category(category).await;
        }

        self.checkpoint.persist()?;
        self.sink.flush()?;

        let outcome = if self.cancel.is_cancelled() {
            tracing::info!("run interrupted, progress flushed");
            RunOutcome::Interrupted
        } else {
            tracing::info!(
                total_processed = self.checkpoint.len(),
                "run completed"
            );
            RunOutcome::Completed
        };
        Ok(outcome)
    }

    /// Resolves the category list: explicit override, then the site's
    /// collections index, then the site's built-in list.
    async fn resolve_categories(&mut self) -> Vec<CategorySpec> {
        if !self.category_override.is_empty() {
            return self.category_override.clone();
        }

        let Some(index_url) = self.site.collections_index() else {
            return self.site.categories();
        };

        tracing::info!(url = index_url, "discovering collections");
        let expander = ListingExpander::new(
            ListingExpansion::ScrollToBottom,
            self.settle,
            self.click_settle,
            self.max_consecutive_failures,
            self.retry,
        );
        match expander
            .expand(&mut self.fetcher, index_url, &self.cancel)
            .await
        {
            Ok(html) => {
                let collections = self.site.extract_categories(&html);
                tracing::info!(count = collections.len(), "collections discovered");
                collections
            }
            Err(e) => {
                tracing::error!("collections index fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Processes one category end to end. Failures are contained here.
    async fn process_category(&mut self, category: &CategorySpec) {
        tracing::info!(category = %category.label, url = %category.url, "processing category");

        let expander = ListingExpander::new(
            self.site.listing_expansion(),
            self.settle,
            self.click_settle,
            self.max_consecutive_failures,
            self.retry,
        );
        let listing = match expander
            .expand(&mut self.fetcher, &category.url, &self.cancel)
            .await
        {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(
                    category = %category.label,
                    "listing fetch failed, skipping category: {}",
                    e
                );
                return;
            }
        };

        let candidates = self.site.extract_listing(&listing, category);
        let unseen = candidates
            .iter()
            .filter(|c| !self.checkpoint.contains(&c.url))
            .count();
        tracing::info!(
            category = %category.label,
            candidates = candidates.len(),
            unseen,
            "listing extracted"
        );

        for candidate in candidates {
            if self.cancel.is_cancelled() {
                return;
            }

            // Checkpoint filter: covers prior runs and duplicates earlier
            // in this listing, since marks land before later occurrences.
            if self.checkpoint.contains(&candidate.url) {
                tracing::debug!(url = %candidate.url, "already processed, skipping");
                continue;
            }

            tracing::info!(title = %candidate.title, url = %candidate.url, "enriching");
            let enricher = DetailEnricher::new(self.site.as_ref(), self.retry, self.settle);
            let record = enricher
                .enrich(&mut self.fetcher, &candidate, category)
                .await;

            let row = record.row(self.site.fields(), self.site.gallery_arity());
            if let Err(e) = self.sink.append_row(&row) {
                // Not marked: the record stays eligible for the next run.
                tracing::error!(url = %candidate.url, "row write failed: {}", e);
                continue;
            }

            self.checkpoint.mark_processed(candidate.url.clone());
            if let Err(e) = self.checkpoint.persist_if_due() {
                tracing::error!("checkpoint flush failed, continuing in memory: {}", e);
            }

            tokio::time::sleep(self.pause).await;
        }

        tracing::info!(category = %category.label, "category done");
    }

    /// Consumes the orchestrator and hands back the fetcher, releasing the
    /// checkpoint and sink handles.
    pub fn into_fetcher(self) -> F {
        self.fetcher
    }
}
