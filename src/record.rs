//! Product record types shared across the pipeline
//!
//! A listing page yields [`CandidateRecord`]s; the detail page fills in the
//! remaining fields to produce an [`EnrichedRecord`], which maps 1:1 onto an
//! output row. The output schema is fixed-width: every scalar column is
//! always present (possibly empty) and the gallery always has exactly the
//! site's declared number of slots.

/// A category to crawl: a human-readable label plus a listing-root URL.
///
/// For collection-based sites the label doubles as the collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub label: String,
    pub url: String,
}

impl CategorySpec {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Scalar output columns a site can place in its layout.
///
/// Gallery columns are not listed here; they are appended after the scalar
/// columns, one per slot up to the site's gallery arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Brand,
    Category,
    Collection,
    Title,
    Code,
    Description,
    FeaturePhoto,
    Finish,
}

impl Field {
    /// Header cell text for this column.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Brand => "Brand",
            Self::Category => "Category",
            Self::Collection => "Collection",
            Self::Title => "Title",
            Self::Code => "Code",
            Self::Description => "Description",
            Self::FeaturePhoto => "Feature photo",
            Self::Finish => "Type",
        }
    }
}

/// Builds the full header row for a site layout: scalar columns followed by
/// `Gallery1..GalleryN`.
pub fn header_row(fields: &[Field], gallery_arity: usize) -> Vec<String> {
    let mut row: Vec<String> = fields.iter().map(|f| f.header().to_string()).collect();
    for i in 1..=gallery_arity {
        row.push(format!("Gallery{}", i));
    }
    row
}

/// A minimally-populated record discovered on a listing page.
///
/// The `url` is the canonical detail-page URL and the record's natural key.
/// Preview fields missing from the listing are empty strings, never errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateRecord {
    pub url: String,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub feature_photo: String,
    /// Finish label when the listing already exposes it (some sites only
    /// reveal it on the detail page).
    pub finish: String,
}

/// Fields only available on a product's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub code: String,
    pub finish: String,
    pub gallery: Vec<String>,
}

/// A fully-populated record ready for durable output. Written once, never
/// mutated after write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub brand: String,
    pub category: String,
    pub collection: String,
    pub title: String,
    pub code: String,
    pub description: String,
    pub feature_photo: String,
    pub finish: String,
    /// Always exactly the site's gallery arity; absent slots are empty
    /// strings.
    pub gallery: Vec<String>,
}

impl EnrichedRecord {
    /// Renders the record as an output row for the given column layout.
    pub fn row(&self, fields: &[Field], gallery_arity: usize) -> Vec<String> {
        let mut row: Vec<String> = fields
            .iter()
            .map(|f| match f {
                Field::Brand => self.brand.clone(),
                Field::Category => self.category.clone(),
                Field::Collection => self.collection.clone(),
                Field::Title => self.title.clone(),
                Field::Code => self.code.clone(),
                Field::Description => self.description.clone(),
                Field::FeaturePhoto => self.feature_photo.clone(),
                Field::Finish => self.finish.clone(),
            })
            .collect();
        for i in 0..gallery_arity {
            row.push(self.gallery.get(i).cloned().unwrap_or_default());
        }
        row
    }
}

/// Truncates or pads a gallery to exactly `arity` slots.
pub fn fix_gallery_arity(mut gallery: Vec<String>, arity: usize) -> Vec<String> {
    gallery.truncate(arity);
    gallery.resize(arity, String::new());
    gallery
}
