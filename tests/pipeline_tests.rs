//! Integration tests for the crawl pipeline
//!
//! These tests drive the full orchestrator — expansion, extraction,
//! enrichment, sink, checkpoint — against a scripted fetcher standing in
//! for the browser, using the topovi site profile over synthetic HTML.

use async_trait::async_trait;
use quarry::browser::{ClickOutcome, FetchError, PageFetcher, PostLoadAction};
use quarry::checkpoint::CheckpointStore;
use quarry::config::{CategoryEntry, Config};
use quarry::pipeline::{CancelFlag, Orchestrator, RunOutcome};
use quarry::record::header_row;
use quarry::sink::CsvSink;
use quarry::site::{by_name, Site};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const LISTING_URL: &str = "https://test.local/stones";

/// Scripted stand-in for the browser: a fixed listing document, per-URL
/// detail documents, and a set of URLs that always fail transiently.
struct ScriptedFetcher {
    listing_html: String,
    details: HashMap<String, String>,
    failing: HashSet<String>,
    fetched_urls: Vec<String>,
}

impl ScriptedFetcher {
    fn new(listing_html: String) -> Self {
        Self {
            listing_html,
            details: HashMap::new(),
            failing: HashSet::new(),
            fetched_urls: Vec::new(),
        }
    }

    fn with_detail(mut self, url: &str, html: &str) -> Self {
        self.details.insert(url.to_string(), html.to_string());
        self
    }

    fn with_failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    fn detail_fetch_count(&self, url: &str) -> usize {
        self.fetched_urls.iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(
        &mut self,
        url: &str,
        _settle: Duration,
        _action: Option<PostLoadAction>,
    ) -> Result<String, FetchError> {
        self.fetched_urls.push(url.to_string());

        if url == LISTING_URL {
            return Ok(self.listing_html.clone());
        }
        if self.failing.contains(url) {
            return Err(FetchError::Transient("connection lost".to_string()));
        }
        Ok(self
            .details
            .get(url)
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }

    async fn click(
        &mut self,
        _selector: &str,
        _settle: Duration,
    ) -> Result<ClickOutcome, FetchError> {
        // The load-more control is never present in these fixtures.
        Ok(ClickOutcome::Absent)
    }

    async fn restart(&mut self) -> Result<(), FetchError> {
        Ok(())
    }
}

fn stone_card(id: &str, title: &str) -> String {
    format!(
        r#"<div class="stone_card">
          <a class="info" href="https://test.local/stone/{id}"></a>
          <p class="stone_name" title="{title}">{title}</p>
          <p class="stone_company">Avant Quartz</p>
          <img class="stone_cover" src="https://test.local/img/540/{id}.jpg"/>
          <div class="additional-info__title"><span>Матова</span></div>
        </div>"#
    )
}

fn detail_page(code: &str, images: usize) -> String {
    let mut html = format!(r#"<html><body><h1>{}</h1><div class="gellery_for">"#, code);
    for i in 0..images {
        html.push_str(&format!(
            r#"<img data-fancybox="gallery" src="https://test.local/img/1280/{}-{}.jpg"/>"#,
            code, i
        ));
    }
    html.push_str("</div></body></html>");
    html
}

/// Listing with identifiers [A, B, A, C] — A duplicated by the site.
fn duplicated_listing() -> String {
    format!(
        "<html><body>{}{}{}{}</body></html>",
        stone_card("a", "Stone A"),
        stone_card("b", "Stone B"),
        stone_card("a", "Stone A"),
        stone_card("c", "Stone C"),
    )
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.browser.settle_delay_ms = 0;
    config.browser.scroll_settle_ms = 0;
    config.crawl.retry_backoff_ms = 0;
    config.crawl.pause_between_products_ms = 0;
    config.crawl.checkpoint_every = 2;
    config.category.push(CategoryEntry {
        label: "Stone".to_string(),
        url: LISTING_URL.to_string(),
    });
    config
}

fn open_stores(dir: &TempDir, site: &dyn Site, config: &Config) -> (CheckpointStore, CsvSink, PathBuf, PathBuf) {
    let checkpoint_path = dir.path().join("progress_test.json");
    let results_path = dir.path().join("test_products.csv");

    let checkpoint =
        CheckpointStore::load(&checkpoint_path, config.crawl.checkpoint_every).unwrap();
    let sink = CsvSink::open(
        &results_path,
        &header_row(site.fields(), site.gallery_arity()),
    )
    .unwrap();

    (checkpoint, sink, checkpoint_path, results_path)
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_duplicate_and_failing_candidates_scenario() {
    let dir = TempDir::new().unwrap();
    let site = by_name("topovi").unwrap();
    let config = test_config();

    let fetcher = ScriptedFetcher::new(duplicated_listing())
        .with_detail("https://test.local/stone/a", &detail_page("CODE-A", 2))
        .with_detail("https://test.local/stone/c", &detail_page("CODE-C", 6))
        .with_failing("https://test.local/stone/b");

    let (checkpoint, sink, checkpoint_path, results_path) = open_stores(&dir, site.as_ref(), &config);
    let mut orchestrator = Orchestrator::new(
        site,
        fetcher,
        checkpoint,
        sink,
        &config,
        CancelFlag::new(),
    );

    let outcome = orchestrator.run().await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    // Exactly one header and three data rows: A once, B placeholder, C.
    let rows = read_rows(&results_path);
    assert_eq!(rows.len(), 4);

    let titles: Vec<&str> = rows[1..].iter().map(|r| r[2].as_str()).collect();
    assert_eq!(titles, vec!["Stone A", "Stone B", "Stone C"]);

    // A's gallery: 2 images then empty padding up to arity 5.
    let row_a = &rows[1];
    assert_eq!(row_a[3], "CODE-A");
    assert_eq!(row_a[6], "https://test.local/img/1280/CODE-A-0.jpg");
    assert!(row_a[8].is_empty() && row_a[10].is_empty());

    // B degraded to a placeholder: listing fields kept, enrichment empty.
    let row_b = &rows[2];
    assert_eq!(row_b[0], "Avant Quartz");
    assert_eq!(row_b[5], "Матова");
    assert!(row_b[3].is_empty());
    assert!(row_b[6..11].iter().all(|g| g.is_empty()));

    // C's oversized gallery truncated to exactly 5 slots.
    let row_c = &rows[3];
    assert_eq!(row_c[10], "https://test.local/img/1280/CODE-C-4.jpg");
    assert_eq!(row_c.len(), 11);

    // Checkpoint holds all three identifiers, including the failed one.
    let reloaded = CheckpointStore::load(&checkpoint_path, 10).unwrap();
    assert_eq!(reloaded.len(), 3);
    for id in ["a", "b", "c"] {
        assert!(reloaded.contains(&format!("https://test.local/stone/{}", id)));
    }
}

#[tokio::test]
async fn test_at_most_once_detail_fetch_per_identifier() {
    let dir = TempDir::new().unwrap();
    let site = by_name("topovi").unwrap();
    let config = test_config();

    let fetcher = ScriptedFetcher::new(duplicated_listing())
        .with_detail("https://test.local/stone/a", &detail_page("CODE-A", 1))
        .with_detail("https://test.local/stone/c", &detail_page("CODE-C", 1));

    let (checkpoint, sink, _, _) = open_stores(&dir, site.as_ref(), &config);
    let mut orchestrator = Orchestrator::new(
        site,
        fetcher,
        checkpoint,
        sink,
        &config,
        CancelFlag::new(),
    );
    orchestrator.run().await.unwrap();

    let fetcher = orchestrator.into_fetcher();
    // A appears twice in the listing but is enriched exactly once.
    assert_eq!(fetcher.detail_fetch_count("https://test.local/stone/a"), 1);
    assert_eq!(fetcher.detail_fetch_count("https://test.local/stone/c"), 1);
}

#[tokio::test]
async fn test_idempotent_resume_produces_no_new_rows() {
    let dir = TempDir::new().unwrap();
    let config = test_config();

    // First run processes everything.
    {
        let site = by_name("topovi").unwrap();
        let fetcher = ScriptedFetcher::new(duplicated_listing())
            .with_detail("https://test.local/stone/a", &detail_page("CODE-A", 1))
            .with_detail("https://test.local/stone/b", &detail_page("CODE-B", 1))
            .with_detail("https://test.local/stone/c", &detail_page("CODE-C", 1));
        let (checkpoint, sink, _, _) = open_stores(&dir, site.as_ref(), &config);
        let mut orchestrator = Orchestrator::new(
            site,
            fetcher,
            checkpoint,
            sink,
            &config,
            CancelFlag::new(),
        );
        orchestrator.run().await.unwrap();
    }

    let checkpoint_path = dir.path().join("progress_test.json");
    let results_path = dir.path().join("test_products.csv");
    let rows_after_first = read_rows(&results_path).len();
    let processed_after_first = CheckpointStore::load(&checkpoint_path, 10).unwrap().len();

    // Second run over the identical listing: nothing new.
    {
        let site = by_name("topovi").unwrap();
        let fetcher = ScriptedFetcher::new(duplicated_listing());
        let (checkpoint, sink, _, _) = open_stores(&dir, site.as_ref(), &config);
        assert_eq!(checkpoint.len(), processed_after_first);

        let mut orchestrator = Orchestrator::new(
            site,
            fetcher,
            checkpoint,
            sink,
            &config,
            CancelFlag::new(),
        );
        orchestrator.run().await.unwrap();

        let fetcher = orchestrator.into_fetcher();
        // Only the listing itself was fetched; no detail pages.
        assert_eq!(fetcher.fetched_urls, vec![LISTING_URL.to_string()]);
    }

    assert_eq!(read_rows(&results_path).len(), rows_after_first);
    assert_eq!(
        CheckpointStore::load(&checkpoint_path, 10).unwrap().len(),
        processed_after_first
    );
}

#[tokio::test]
async fn test_cancelled_run_flushes_and_reports_interrupted() {
    let dir = TempDir::new().unwrap();
    let site = by_name("topovi").unwrap();
    let config = test_config();

    let fetcher = ScriptedFetcher::new(duplicated_listing());
    let (checkpoint, sink, checkpoint_path, results_path) = open_stores(&dir, site.as_ref(), &config);

    let cancel = CancelFlag::new();
    cancel.cancel();

    let mut orchestrator = Orchestrator::new(site, fetcher, checkpoint, sink, &config, cancel);
    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(outcome, RunOutcome::Interrupted);
    // Nothing processed, but both stores exist and are flushed.
    assert!(checkpoint_path.exists());
    assert_eq!(read_rows(&results_path).len(), 1);
}

#[tokio::test]
async fn test_transient_detail_failures_recover_within_budget() {
    let dir = TempDir::new().unwrap();
    let site = by_name("topovi").unwrap();
    let config = test_config();

    // One candidate; its detail page fails twice, then succeeds.
    struct FlakyFetcher {
        listing: String,
        failures_left: u32,
        restarts: u32,
    }

    #[async_trait]
    impl PageFetcher for FlakyFetcher {
        async fn fetch(
            &mut self,
            url: &str,
            _settle: Duration,
            _action: Option<PostLoadAction>,
        ) -> Result<String, FetchError> {
            if url == LISTING_URL {
                return Ok(self.listing.clone());
            }
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(FetchError::Transient("flaky".to_string()));
            }
            Ok(detail_page("CODE-A", 1))
        }

        async fn click(
            &mut self,
            _selector: &str,
            _settle: Duration,
        ) -> Result<ClickOutcome, FetchError> {
            Ok(ClickOutcome::Absent)
        }

        async fn restart(&mut self) -> Result<(), FetchError> {
            self.restarts += 1;
            Ok(())
        }
    }

    let fetcher = FlakyFetcher {
        listing: format!("<html><body>{}</body></html>", stone_card("a", "Stone A")),
        failures_left: 2,
        restarts: 0,
    };

    let (checkpoint, sink, _, results_path) = open_stores(&dir, site.as_ref(), &config);
    let mut orchestrator = Orchestrator::new(
        site,
        fetcher,
        checkpoint,
        sink,
        &config,
        CancelFlag::new(),
    );
    orchestrator.run().await.unwrap();

    let fetcher = orchestrator.into_fetcher();
    assert_eq!(fetcher.restarts, 2);

    // The third attempt succeeded, so the row is fully enriched.
    let rows = read_rows(&results_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][3], "CODE-A");
}
