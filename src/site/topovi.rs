//! Site profile for topovi.com.ua (engineered & natural stone)
//!
//! Listings grow through a "load more" button; product cards already carry
//! brand, finish and a preview photo. Detail pages add the product code and
//! a five-image gallery served in several renditions, of which the
//! 1280-pixel one goes into the output.

use crate::record::{CandidateRecord, CategorySpec, DetailFields, Field};
use crate::site::{text_of, ListingExpansion, Site};
use scraper::{Html, Selector};

const COLUMNS: &[Field] = &[
    Field::Brand,
    Field::Category,
    Field::Title,
    Field::Code,
    Field::FeaturePhoto,
    Field::Finish,
];

pub struct Topovi;

impl Site for Topovi {
    fn name(&self) -> &'static str {
        "topovi"
    }

    fn categories(&self) -> Vec<CategorySpec> {
        vec![
            CategorySpec::new(
                "Кварцовий камінь",
                "https://topovi.com.ua/stones/types=kvarcevyy-kamen",
            ),
            CategorySpec::new(
                "Натуральний камінь",
                "https://topovi.com.ua/stones/types=naturalniy-kamin",
            ),
            CategorySpec::new(
                "Акриловий камінь",
                "https://topovi.com.ua/stones/types=akrilovyy-kamen",
            ),
        ]
    }

    fn listing_expansion(&self) -> ListingExpansion {
        ListingExpansion::LoadMore {
            selector: ".btn.load-more".to_string(),
        }
    }

    fn gallery_arity(&self) -> usize {
        5
    }

    fn fields(&self) -> &'static [Field] {
        COLUMNS
    }

    fn extract_listing(&self, html: &str, _category: &CategorySpec) -> Vec<CandidateRecord> {
        let doc = Html::parse_document(html);
        let mut candidates = Vec::new();

        let card_sel = match Selector::parse("div.stone_card") {
            Ok(sel) => sel,
            Err(_) => return candidates,
        };
        let link_sel = Selector::parse("a.info").ok();
        let name_sel = Selector::parse("p.stone_name").ok();
        let brand_sel = Selector::parse("p.stone_company").ok();
        let cover_sel = Selector::parse("img.stone_cover").ok();
        let finish_sel = Selector::parse("div.additional-info__title span").ok();

        for card in doc.select(&card_sel) {
            let url = link_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .and_then(|a| a.value().attr("href"))
                .unwrap_or("")
                .to_string();
            if url.is_empty() {
                continue;
            }

            let title = name_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .and_then(|p| p.value().attr("title"))
                .unwrap_or("")
                .to_string();

            let brand = brand_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .map(text_of)
                .unwrap_or_default();

            let feature_photo = cover_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .and_then(|img| img.value().attr("src"))
                .unwrap_or("")
                .to_string();

            let finish = finish_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .map(text_of)
                .unwrap_or_default();

            candidates.push(CandidateRecord {
                url,
                title,
                brand,
                description: String::new(),
                feature_photo,
                finish,
            });
        }

        candidates
    }

    fn extract_detail(&self, html: &str) -> DetailFields {
        let doc = Html::parse_document(html);

        let code = Selector::parse("h1")
            .ok()
            .and_then(|sel| doc.select(&sel).next())
            .map(text_of)
            .unwrap_or_default();

        let mut gallery = Vec::new();
        if let Ok(img_sel) = Selector::parse(r#"div.gellery_for img[data-fancybox="gallery"]"#) {
            for img in doc.select(&img_sel) {
                if gallery.len() >= self.gallery_arity() {
                    break;
                }
                let raw = img
                    .value()
                    .attr("href")
                    .or_else(|| img.value().attr("src"))
                    .unwrap_or("");
                if raw.is_empty() {
                    continue;
                }
                gallery.push(prefer_large_rendition(raw));
            }
        }

        DetailFields {
            code,
            finish: String::new(),
            gallery,
        }
    }

    fn translate_finish(&self, raw: &str) -> String {
        // Finish labels on this site are already in the output vocabulary.
        raw.trim().to_string()
    }
}

/// Picks the 1280-pixel rendition of a gallery image URL, rewriting the
/// smaller rendition path segments when the large one is not linked.
fn prefer_large_rendition(url: &str) -> String {
    if url.contains("1280") {
        url.to_string()
    } else {
        url.replace("/320/", "/1280/").replace("/540/", "/1280/")
    }
}
