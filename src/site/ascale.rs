//! Site profile for ascale.es (large-format porcelain)
//!
//! Collections are discovered from a dedicated index page, then each
//! collection page is a scroll-to-bottom listing whose cards include a
//! description. Detail pages expose a swiper gallery (whose carousel clones
//! must be skipped) and a comma-separated finish label in the format table.

use crate::record::{CandidateRecord, CategorySpec, DetailFields, Field};
use crate::site::{text_of, FinishTranslator, ListingExpansion, Site};
use scraper::{Html, Selector};

const COLLECTIONS_INDEX: &str = "https://www.ascale.es/en/collections/";

const COLUMNS: &[Field] = &[
    Field::Brand,
    Field::Category,
    Field::Collection,
    Field::Title,
    Field::Description,
    Field::FeaturePhoto,
    Field::Finish,
];

const TRANSLATIONS: FinishTranslator = FinishTranslator::new(
    &[
        ("Polished", "Полірована"),
        ("Matt", "Матова"),
        ("Lappato", "Лаппатована"),
        ("Feel", "Натуральна"),
        ("Natural", "Натуральна"),
        ("Velvet", "Оксамитова"),
        ("Structured", "Структурована"),
    ],
    true,
);

pub struct Ascale;

impl Site for Ascale {
    fn name(&self) -> &'static str {
        "ascale"
    }

    fn categories(&self) -> Vec<CategorySpec> {
        Vec::new()
    }

    fn collections_index(&self) -> Option<&'static str> {
        Some(COLLECTIONS_INDEX)
    }

    fn extract_categories(&self, html: &str) -> Vec<CategorySpec> {
        let doc = Html::parse_document(html);
        let mut collections = Vec::new();

        let block_sel = match Selector::parse("div.jet-listing-grid__item") {
            Ok(sel) => sel,
            Err(_) => return collections,
        };
        let link_sel = Selector::parse(r#"a[data-element_type="container"]"#).ok();
        let heading_sel = Selector::parse("h3.elementor-heading-title").ok();

        for block in doc.select(&block_sel) {
            let href = link_sel
                .as_ref()
                .and_then(|sel| block.select(sel).next())
                .and_then(|a| a.value().attr("href"))
                .unwrap_or("");
            if href.is_empty() {
                continue;
            }

            let name = heading_sel
                .as_ref()
                .and_then(|sel| block.select(sel).next())
                .map(text_of)
                .unwrap_or_default();

            collections.push(CategorySpec::new(name, href));
        }

        collections
    }

    fn fixed_category(&self) -> Option<&'static str> {
        Some("Керамограніт")
    }

    fn listing_expansion(&self) -> ListingExpansion {
        ListingExpansion::ScrollToBottom
    }

    fn gallery_arity(&self) -> usize {
        3
    }

    fn fields(&self) -> &'static [Field] {
        COLUMNS
    }

    fn detail_scroll(&self) -> Option<u32> {
        Some(800)
    }

    fn extract_listing(&self, html: &str, _category: &CategorySpec) -> Vec<CandidateRecord> {
        let doc = Html::parse_document(html);
        let mut candidates = Vec::new();

        let card_sel = match Selector::parse("div.jet-listing-grid__item") {
            Ok(sel) => sel,
            Err(_) => return candidates,
        };
        let heading_sel = Selector::parse("h3.elementor-heading-title").ok();
        let heading_link_sel = Selector::parse("h3.elementor-heading-title a").ok();
        let desc_sel =
            Selector::parse("div.description div.elementor-widget-container p").ok();
        let lazy_img_sel = Selector::parse("img.lazyloaded").ok();
        let img_sel = Selector::parse("img").ok();

        for card in doc.select(&card_sel) {
            let heading = heading_sel.as_ref().and_then(|sel| card.select(sel).next());
            let Some(heading) = heading else {
                continue;
            };

            let link = heading_link_sel.as_ref().and_then(|sel| card.select(sel).next());
            let url = link
                .and_then(|a| a.value().attr("href"))
                .unwrap_or("")
                .to_string();
            if url.is_empty() {
                continue;
            }

            let title = link.map(text_of).unwrap_or_else(|| text_of(heading));

            let description = desc_sel
                .as_ref()
                .map(|sel| {
                    card.select(sel)
                        .map(text_of)
                        .filter(|p| !p.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default();

            // Lazy-loaded card image, falling back to any image present.
            let image = lazy_img_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .or_else(|| img_sel.as_ref().and_then(|sel| card.select(sel).next()));
            let feature_photo = image
                .and_then(|img| {
                    img.value()
                        .attr("src")
                        .or_else(|| img.value().attr("data-lazy-src"))
                })
                .unwrap_or("")
                .to_string();

            candidates.push(CandidateRecord {
                url,
                title,
                brand: "Ascale".to_string(),
                description,
                feature_photo,
                finish: String::new(),
            });
        }

        candidates
    }

    fn extract_detail(&self, html: &str) -> DetailFields {
        let doc = Html::parse_document(html);

        let mut gallery = Vec::new();
        if let Ok(slide_sel) = Selector::parse("div.swiper-slide") {
            let img_sel = Selector::parse("img.swiper-slide-image").ok();
            for slide in doc.select(&slide_sel) {
                if gallery.len() >= self.gallery_arity() {
                    break;
                }
                // The carousel appends cloned slides for wrap-around.
                if slide
                    .value()
                    .classes()
                    .any(|c| c == "swiper-slide-duplicate")
                {
                    continue;
                }
                let src = img_sel
                    .as_ref()
                    .and_then(|sel| slide.select(sel).next())
                    .and_then(|img| {
                        img.value()
                            .attr("data-lazy-src")
                            .or_else(|| img.value().attr("src"))
                    })
                    .unwrap_or("");
                if src.starts_with("http") {
                    gallery.push(src.to_string());
                }
            }
        }

        DetailFields {
            code: String::new(),
            finish: extract_finish(&doc),
            gallery,
        }
    }

    fn translate_finish(&self, raw: &str) -> String {
        TRANSLATIONS.translate(raw)
    }
}

/// Reads the finish label out of the format table: the third heading of the
/// first enabled format row.
fn extract_finish(doc: &Html) -> String {
    let row_sel = match Selector::parse("div.jedv-enabled--yes") {
        Ok(sel) => sel,
        Err(_) => return String::new(),
    };
    let heading_sel = Selector::parse("div.elementor-widget-heading").ok();
    let span_sel = Selector::parse("span.elementor-heading-title").ok();

    for row in doc.select(&row_sel) {
        let headings: Vec<_> = heading_sel
            .as_ref()
            .map(|sel| row.select(sel).collect())
            .unwrap_or_default();

        if headings.len() >= 3 {
            if let Some(span) = span_sel
                .as_ref()
                .and_then(|sel| headings[2].select(sel).next())
            {
                return text_of(span);
            }
        }
    }

    String::new()
}
