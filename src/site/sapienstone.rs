//! Site profile for sapienstone.com (porcelain kitchen tops)
//!
//! A single collections catalog revealed by scrolling to the bottom. Cards
//! carry the title, finish label and a preview image; detail pages add a
//! three-slide gallery. All links and images are site-relative.

use crate::record::{CandidateRecord, CategorySpec, DetailFields, Field};
use crate::site::{resolve, text_of, FinishTranslator, ListingExpansion, Site};
use scraper::{Html, Selector};

const BASE_URL: &str = "https://www.sapienstone.com";

const COLUMNS: &[Field] = &[
    Field::Brand,
    Field::Category,
    Field::Title,
    Field::Finish,
    Field::FeaturePhoto,
];

const TRANSLATIONS: FinishTranslator = FinishTranslator::new(
    &[
        ("Cashmere", "Кашемір"),
        ("Polished", "Полірована"),
        ("Matt", "Матова"),
        ("Silk", "Шовкова"),
        ("Natural", "Натуральна"),
        ("Honed", "Шліфована"),
        ("Structured", "Структурована"),
    ],
    false,
);

pub struct Sapienstone;

impl Site for Sapienstone {
    fn name(&self) -> &'static str {
        "sapienstone"
    }

    fn categories(&self) -> Vec<CategorySpec> {
        vec![CategorySpec::new(
            "Керамограніт",
            "https://www.sapienstone.com/collections",
        )]
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
        // The gallery slider sits just below the fold.
        Some(500)
    }

    fn extract_listing(&self, html: &str, _category: &CategorySpec) -> Vec<CandidateRecord> {
        let doc = Html::parse_document(html);
        let mut candidates = Vec::new();

        let card_sel = match Selector::parse("div.product-container") {
            Ok(sel) => sel,
            Err(_) => return candidates,
        };
        let link_sel = Selector::parse("a").ok();
        let title_sel = Selector::parse("p strong").ok();
        let finish_sel = Selector::parse("p i").ok();
        let img_sel = Selector::parse("img").ok();

        for card in doc.select(&card_sel) {
            let href = link_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .and_then(|a| a.value().attr("href"))
                .unwrap_or("");
            if href.is_empty() {
                continue;
            }
            let url = resolve(BASE_URL, href);

            let title = title_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .map(text_of)
                .unwrap_or_default();

            let finish = finish_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .map(text_of)
                .unwrap_or_default();

            let feature_photo = img_sel
                .as_ref()
                .and_then(|sel| card.select(sel).next())
                .and_then(|img| img.value().attr("src"))
                .map(|src| resolve(BASE_URL, src))
                .unwrap_or_default();

            candidates.push(CandidateRecord {
                url,
                title,
                brand: "Sapienstone".to_string(),
                description: String::new(),
                feature_photo,
                finish,
            });
        }

        candidates
    }

    fn extract_detail(&self, html: &str) -> DetailFields {
        let doc = Html::parse_document(html);
        let mut gallery = Vec::new();

        if let Ok(slide_sel) = Selector::parse("div.slick-track div.slick-slide") {
            let link_sel = Selector::parse("a").ok();
            for slide in doc.select(&slide_sel) {
                if gallery.len() >= self.gallery_arity() {
                    break;
                }
                // Slide anchors link the full-size image, not the thumb.
                let href = link_sel
                    .as_ref()
                    .and_then(|sel| slide.select(sel).next())
                    .and_then(|a| a.value().attr("href"))
                    .unwrap_or("");
                if href.is_empty() {
                    continue;
                }
                gallery.push(resolve(BASE_URL, href));
            }
        }

        DetailFields {
            code: String::new(),
            finish: String::new(),
            gallery,
        }
    }

    fn translate_finish(&self, raw: &str) -> String {
        TRANSLATIONS.translate(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category() -> CategorySpec {
        CategorySpec::new("Керамограніт", "https://www.sapienstone.com/collections")
    }

    const LISTING: &str = r#"
    <html><body>
      <div class="product-container">
        <a href="/collections/calacatta"></a>
        <p><strong>Calacatta</strong> <i>Polished</i></p>
        <img src="/img/calacatta-thumb.jpg"/>
      </div>
      <div class="product-container">
        <p><strong>Orphan Without Link</strong></p>
      </div>
    </body></html>
    "#;

    #[test]
    fn test_extract_listing_resolves_relative_urls() {
        let candidates = Sapienstone.extract_listing(LISTING, &category());
        assert_eq!(candidates.len(), 1);

        let first = &candidates[0];
        assert_eq!(first.url, "https://www.sapienstone.com/collections/calacatta");
        assert_eq!(first.title, "Calacatta");
        assert_eq!(first.brand, "Sapienstone");
        assert_eq!(first.finish, "Polished");
        assert_eq!(
            first.feature_photo,
            "https://www.sapienstone.com/img/calacatta-thumb.jpg"
        );
    }

    const DETAIL: &str = r#"
    <html><body>
      <div class="slick-track">
        <div class="slick-slide"><a href="/img/big/1.jpg"><img src="/img/thumb/1.jpg"/></a></div>
        <div class="slick-slide"><a href="/img/big/2.jpg"><img src="/img/thumb/2.jpg"/></a></div>
        <div class="slick-slide"><a href="/img/big/3.jpg"><img src="/img/thumb/3.jpg"/></a></div>
        <div class="slick-slide"><a href="/img/big/4.jpg"><img src="/img/thumb/4.jpg"/></a></div>
      </div>
    </body></html>
    "#;

    #[test]
    fn test_extract_detail_takes_first_three_full_size_images() {
        let detail = Sapienstone.extract_detail(DETAIL);
        assert_eq!(
            detail.gallery,
            vec![
                "https://www.sapienstone.com/img/big/1.jpg",
                "https://www.sapienstone.com/img/big/2.jpg",
                "https://www.sapienstone.com/img/big/3.jpg",
            ]
        );
    }

    #[test]
    fn test_extract_detail_without_slider() {
        let detail = Sapienstone.extract_detail("<html><body><p>No slider</p></body></html>");
        assert!(detail.gallery.is_empty());
    }

    #[test]
    fn test_translate_finish() {
        assert_eq!(Sapienstone.translate_finish("Cashmere"), "Кашемір");
        assert_eq!(Sapienstone.translate_finish("Unknown"), "Unknown");
    }
}
