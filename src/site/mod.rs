//! Site profiles: the per-site selector tables behind one seam
//!
//! Everything a target site makes unique — listing roots, how its listing
//! reveals more content, which selectors yield which fields, gallery arity,
//! output column order and the finish-type vocabulary — lives behind the
//! [`Site`] trait. The pipeline itself never mentions a concrete site.

mod ascale;
mod sapienstone;
mod topovi;
mod translate;

pub use ascale::Ascale;
pub use sapienstone::Sapienstone;
pub use topovi::Topovi;
pub use translate::FinishTranslator;

use crate::record::{CandidateRecord, CategorySpec, DetailFields, Field};
use scraper::ElementRef;
use url::Url;

/// How a site reveals the full content of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingExpansion {
    /// Scroll to the bottom once and re-settle.
    ScrollToBottom,
    /// Click a "load more" control until it is absent or hidden.
    LoadMore { selector: String },
}

/// A catalog site variant.
///
/// Extraction methods are pure and total: a missing field yields an empty
/// string, an entry without a resolvable detail link is skipped, and no
/// input document is ever an error.
pub trait Site: Send + Sync {
    /// Short machine name; also the stem of the output and checkpoint files.
    fn name(&self) -> &'static str;

    /// Built-in categories to crawl, in order. Ignored when the site
    /// discovers its categories from a collections index.
    fn categories(&self) -> Vec<CategorySpec>;

    /// Index page whose entries become the categories, for sites that list
    /// their collections on a dedicated page.
    fn collections_index(&self) -> Option<&'static str> {
        None
    }

    /// Extracts category specs from the collections index document.
    fn extract_categories(&self, _html: &str) -> Vec<CategorySpec> {
        Vec::new()
    }

    /// Fixed category label overriding the per-category label in output
    /// rows (used when category specs are collections, not categories).
    fn fixed_category(&self) -> Option<&'static str> {
        None
    }

    /// How this site's listings are expanded before extraction.
    fn listing_expansion(&self) -> ListingExpansion;

    /// Number of gallery slots in every output row.
    fn gallery_arity(&self) -> usize;

    /// Scalar output columns, in order; gallery columns follow.
    fn fields(&self) -> &'static [Field];

    /// Vertical scroll offset applied before reading a detail page.
    fn detail_scroll(&self) -> Option<u32> {
        None
    }

    /// Maps a rendered listing document to candidate records, in document
    /// order. No dedup happens here; that is the orchestrator's job.
    fn extract_listing(&self, html: &str, category: &CategorySpec) -> Vec<CandidateRecord>;

    /// Maps a rendered detail document to the detail-only fields.
    fn extract_detail(&self, html: &str) -> DetailFields;

    /// Normalizes a raw finish label via the site's translation table.
    /// Unknown labels pass through unchanged.
    fn translate_finish(&self, raw: &str) -> String;
}

/// Returns the site profile for a machine name, if one exists.
pub fn by_name(name: &str) -> Option<Box<dyn Site>> {
    match name {
        "topovi" => Some(Box::new(Topovi)),
        "sapienstone" => Some(Box::new(Sapienstone)),
        "ascale" => Some(Box::new(Ascale)),
        _ => None,
    }
}

/// Collects an element's text content, trimmed.
pub(crate) fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves a possibly-relative href against a site base URL.
///
/// Absolute hrefs pass through; anything unresolvable yields the href
/// as-is (extraction is total, the enricher's fetch will surface bad URLs).
pub(crate) fn resolve(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => href.to_string(),
    }
}
