//! Finish-type vocabulary normalization
//!
//! Each site ships the finish labels its vendor uses; output rows carry the
//! normalized (translated) vocabulary. Unknown labels pass through
//! unchanged — an unmapped finish is data, not an error.

/// A static finish-label translation table.
pub struct FinishTranslator {
    entries: &'static [(&'static str, &'static str)],
    /// Some sites emit comma-separated multi-finish labels; each element is
    /// then translated independently.
    split_commas: bool,
}

impl FinishTranslator {
    pub const fn new(
        entries: &'static [(&'static str, &'static str)],
        split_commas: bool,
    ) -> Self {
        Self {
            entries,
            split_commas,
        }
    }

    /// Identity table: labels pass through untouched.
    pub const fn identity() -> Self {
        Self {
            entries: &[],
            split_commas: false,
        }
    }

    /// Translates a raw finish label.
    pub fn translate(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }

        if self.split_commas {
            raw.split(',')
                .map(|part| self.lookup(part.trim()))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            self.lookup(raw).to_string()
        }
    }

    fn lookup<'a>(&self, label: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(from, _)| *from == label)
            .map(|(_, to)| *to)
            .unwrap_or(label)
    }
}
