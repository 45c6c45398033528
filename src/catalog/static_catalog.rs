//! In-memory catalog built from a JSON word list

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::models::{is_valid_level, Word};
use super::WordCatalog;

/// Sample vocabulary shipped with the binary
const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog holding every word in memory, grouped by level
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    levels: BTreeMap<u8, Vec<Word>>,
    /// word id -> (level, position within the level)
    index: HashMap<String, (u8, usize)>,
}

impl StaticCatalog {
    /// Build a catalog, keeping the given order within each level.
    /// Words with an out-of-range level or a duplicate id are skipped.
    pub fn new(words: Vec<Word>) -> Self {
        let mut catalog = Self::default();

        for word in words {
            if !is_valid_level(word.level) {
                log::warn!(
                    "Skipping catalog word {} with invalid level {}",
                    word.id,
                    word.level
                );
                continue;
            }
            if catalog.index.contains_key(&word.id) {
                log::warn!("Skipping duplicate catalog word {}", word.id);
                continue;
            }

            let level_words = catalog.levels.entry(word.level).or_default();
            catalog
                .index
                .insert(word.id.clone(), (word.level, level_words.len()));
            level_words.push(word);
        }

        catalog
    }

    /// Parse a JSON array of words
    pub fn from_json(json: &str) -> Result<Self> {
        let words: Vec<Word> = serde_json::from_str(json)?;
        Ok(Self::new(words))
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        log::info!(
            "Loaded {} catalog words from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// The sample catalog compiled into the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl WordCatalog for StaticCatalog {
    fn words_for_level(&self, level: u8) -> &[Word] {
        self.levels
            .get(&level)
            .map(|words| words.as_slice())
            .unwrap_or(&[])
    }

    fn word(&self, id: &str) -> Option<&Word> {
        let (level, position) = self.index.get(id)?;
        self.levels.get(level).and_then(|words| words.get(*position))
    }
}
