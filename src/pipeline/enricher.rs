//! Detail-page enrichment with bounded retry
//!
//! Given a candidate's detail URL, fetch the page, extract the gallery and
//! remaining scalar fields, normalize the finish label, and merge the
//! result with the candidate's preview fields. A transient browser failure
//! triggers a session restart plus backoff; after the retry budget is
//! exhausted the candidate degrades to a placeholder row (all enrichment
//! fields empty) rather than blocking progress forever.

use crate::browser::{PageFetcher, PostLoadAction};
use crate::pipeline::RetryPolicy;
use crate::record::{fix_gallery_arity, CandidateRecord, CategorySpec, DetailFields, EnrichedRecord};
use crate::site::Site;
use std::time::Duration;

/// Enriches candidates from their detail pages.
pub struct DetailEnricher<'s> {
    site: &'s dyn Site,
    retry: RetryPolicy,
    settle: Duration,
}

impl<'s> DetailEnricher<'s> {
    pub fn new(site: &'s dyn Site, retry: RetryPolicy, settle: Duration) -> Self {
        Self {
            site,
            retry,
            settle,
        }
    }

    /// Fetches and extracts the candidate's detail page.
    ///
    /// Never fails: after `max_attempts` transient failures the candidate
    /// is merged with empty detail fields, and the caller still records it
    /// as processed so a permanently broken page cannot stall the crawl.
    pub async fn enrich<F: PageFetcher>(
        &self,
        fetcher: &mut F,
        candidate: &CandidateRecord,
        category: &CategorySpec,
    ) -> EnrichedRecord {
        let action = self.site.detail_scroll().map(PostLoadAction::ScrollTo);

        for attempt in 1..=self.retry.max_attempts {
            match fetcher
                .fetch(&candidate.url, self.settle, action.clone())
                .await
            {
                Ok(html) => {
                    let detail = self.site.extract_detail(&html);
                    return self.merge(candidate, category, detail);
                }
                Err(e) => {
                    tracing::warn!(
                        url = %candidate.url,
                        attempt,
                        max = self.retry.max_attempts,
                        "detail fetch failed: {}",
                        e
                    );
                    if attempt < self.retry.max_attempts {
                        if let Err(restart_err) = fetcher.restart().await {
                            tracing::warn!("session restart failed: {}", restart_err);
                        }
                        self.retry.wait().await;
                    }
                }
            }
        }

        tracing::warn!(
            url = %candidate.url,
            "enrichment failed permanently, writing placeholder row"
        );
        self.merge(candidate, category, DetailFields::default())
    }

    /// Merges listing-level and detail-level fields into the output record.
    ///
    /// The finish label prefers the detail page and falls back to the
    /// listing preview; either way it passes through the site's
    /// translation table. The gallery is forced to the declared arity.
    fn merge(
        &self,
        candidate: &CandidateRecord,
        category: &CategorySpec,
        detail: DetailFields,
    ) -> EnrichedRecord {
        let raw_finish = if detail.finish.is_empty() {
            candidate.finish.as_str()
        } else {
            detail.finish.as_str()
        };

        let (record_category, collection) = match self.site.fixed_category() {
            Some(fixed) => (fixed.to_string(), category.label.clone()),
            None => (category.label.clone(), String::new()),
        };

        EnrichedRecord {
            brand: candidate.brand.clone(),
            category: record_category,
            collection,
            title: candidate.title.clone(),
            code: detail.code,
            description: candidate.description.clone(),
            feature_photo: candidate.feature_photo.clone(),
            finish: self.site.translate_finish(raw_finish),
            gallery: fix_gallery_arity(detail.gallery, self.site.gallery_arity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{ClickOutcome, FetchError};
    use crate::site::{Sapienstone, Topovi};
    use async_trait::async_trait;

    /// Fetcher that always fails, counting attempts and restarts.
    struct AlwaysFailing {
        attempts: u32,
        restarts: u32,
    }

    #[async_trait]
    impl PageFetcher for AlwaysFailing {
        async fn fetch(
            &mut self,
            _url: &str,
            _settle: Duration,
            _action: Option<PostLoadAction>,
        ) -> Result<String, FetchError> {
            self.attempts += 1;
            Err(FetchError::Transient("connection lost".to_string()))
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

    /// Fetcher that serves a fixed detail document.
    struct FixedDetail(String);

    #[async_trait]
    impl PageFetcher for FixedDetail {
        async fn fetch(
            &mut self,
            _url: &str,
            _settle: Duration,
            _action: Option<PostLoadAction>,
        ) -> Result<String, FetchError> {
            Ok(self.0.clone())
        }

        async fn click(
            &mut self,
            _selector: &str,
            _settle: Duration,
        ) -> Result<ClickOutcome, FetchError> {
            Ok(ClickOutcome::Absent)
        }

        async fn restart(&mut self) -> Result<(), FetchError> {
            Ok(())
        }
    }

    fn candidate() -> CandidateRecord {
        CandidateRecord {
            url: "https://topovi.com.ua/stone/avant-9010".to_string(),
            title: "Avant 9010".to_string(),
            brand: "Avant Quartz".to_string(),
            description: String::new(),
            feature_photo: "https://topovi.com.ua/img/540/avant.jpg".to_string(),
            finish: "Матова".to_string(),
        }
    }

    fn category() -> CategorySpec {
        CategorySpec::new("Кварцовий камінь", "https://topovi.com.ua/stones")
    }

    #[tokio::test]
    async fn test_retry_exhaustion_yields_placeholder_after_exact_attempts() {
        let mut fetcher = AlwaysFailing {
            attempts: 0,
            restarts: 0,
        };
        let enricher = DetailEnricher::new(
            &Topovi,
            RetryPolicy::new(3, Duration::ZERO),
            Duration::ZERO,
        );

        let record = enricher.enrich(&mut fetcher, &candidate(), &category()).await;

        assert_eq!(fetcher.attempts, 3);
        // No restart after the final attempt.
        assert_eq!(fetcher.restarts, 2);

        // Placeholder keeps the listing preview fields, empties enrichment.
        assert_eq!(record.title, "Avant 9010");
        assert_eq!(record.brand, "Avant Quartz");
        assert_eq!(record.finish, "Матова");
        assert!(record.code.is_empty());
        assert_eq!(record.gallery.len(), 5);
        assert!(record.gallery.iter().all(|g| g.is_empty()));
    }

    #[tokio::test]
    async fn test_gallery_forced_to_declared_arity() {
        let detail_html = r#"
        <html><body>
          <h1>AQ-1</h1>
          <div class="gellery_for">
            <img data-fancybox="gallery" src="https://topovi.com.ua/img/1280/a.jpg"/>
          </div>
        </body></html>
        "#;
        let mut fetcher = FixedDetail(detail_html.to_string());
        let enricher = DetailEnricher::new(
            &Topovi,
            RetryPolicy::new(3, Duration::ZERO),
            Duration::ZERO,
        );

        let record = enricher.enrich(&mut fetcher, &candidate(), &category()).await;

        assert_eq!(record.code, "AQ-1");
        assert_eq!(record.gallery.len(), 5);
        assert_eq!(record.gallery[0], "https://topovi.com.ua/img/1280/a.jpg");
        assert!(record.gallery[1..].iter().all(|g| g.is_empty()));
    }

    #[tokio::test]
    async fn test_listing_finish_translated_when_detail_has_none() {
        let mut fetcher = FixedDetail("<html><body></body></html>".to_string());
        let enricher = DetailEnricher::new(
            &Sapienstone,
            RetryPolicy::new(3, Duration::ZERO),
            Duration::ZERO,
        );

        let sapien_candidate = CandidateRecord {
            url: "https://www.sapienstone.com/collections/calacatta".to_string(),
            title: "Calacatta".to_string(),
            brand: "Sapienstone".to_string(),
            description: String::new(),
            feature_photo: String::new(),
            finish: "Polished".to_string(),
        };
        let sapien_category =
            CategorySpec::new("Керамограніт", "https://www.sapienstone.com/collections");

        let record = enricher
            .enrich(&mut fetcher, &sapien_candidate, &sapien_category)
            .await;

        assert_eq!(record.finish, "Полірована");
        assert_eq!(record.category, "Керамограніт");
        assert!(record.collection.is_empty());
    }
}
