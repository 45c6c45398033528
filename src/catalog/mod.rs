//! Word catalog for the ten-level curriculum
//!
//! The catalog is fixed for the lifetime of the process. The progression
//! engine only ever reads from it through [`WordCatalog`].

pub mod models;
pub mod static_catalog;

pub use models::*;
pub use static_catalog::{CatalogError, StaticCatalog};

/// Read access to the words of each curriculum level
pub trait WordCatalog: Send + Sync {
    /// Words of a level in catalog order. Unknown levels yield an empty slice.
    fn words_for_level(&self, level: u8) -> &[Word];

    /// Look up a single word by id
    fn word(&self, id: &str) -> Option<&Word>;

    fn level_word_count(&self, level: u8) -> usize {
        self.words_for_level(level).len()
    }

    /// Distinct categories of a level, in order of first appearance
    fn categories_for_level(&self, level: u8) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for word in self.words_for_level(level) {
            if !categories.iter().any(|c| c == &word.category) {
                categories.push(word.category.clone());
            }
        }
        categories
    }
}
