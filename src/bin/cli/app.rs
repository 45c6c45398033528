use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};

use kotoba_lib::achievements::{AchievementTracker, Milestone};
use kotoba_lib::catalog::{StaticCatalog, Word, WordCatalog, MAX_LEVEL, MIN_LEVEL};
use kotoba_lib::config::AppConfig;
use kotoba_lib::progress::{JsonFileStore, LevelController, LoadSource};

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub store: JsonFileStore,
    pub controller: LevelController,
    achievements: Arc<Mutex<AchievementTracker>>,
    milestones_at_load: usize,
}

impl App {
    /// Load config, catalog and saved progress
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => AppConfig::default_path().context("Failed to get config directory")?,
        };
        let config = AppConfig::load(&config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;

        let catalog = match &config.catalog_path {
            Some(path) => StaticCatalog::load(path)
                .with_context(|| format!("Failed to load catalog {}", path.display()))?,
            None => StaticCatalog::bundled().context("Failed to parse bundled catalog")?,
        };

        let data_dir = config
            .resolve_data_dir()
            .context("Failed to get data directory")?;
        let store = JsonFileStore::in_dir(&data_dir);

        let mut controller = LevelController::new(Arc::new(catalog), config.progression.clone());
        if controller.load(&store) == LoadSource::Recovered {
            let moved = store
                .quarantine()
                .context("Failed to move unreadable progress aside")?;
            eprintln!(
                "warning: {} could not be read, starting over",
                store.path().display()
            );
            if let Some(path) = moved {
                eprintln!("warning: the unreadable file was kept at {}", path.display());
            }
        }

        let tracker = AchievementTracker::from_progress(controller.progress()?);
        let milestones_at_load = tracker.milestones().len();
        let achievements = Arc::new(Mutex::new(tracker));
        controller.add_listener(achievements.clone());

        Ok(Self {
            config,
            store,
            controller,
            achievements,
            milestones_at_load,
        })
    }

    /// Persist progress after a mutating command
    pub fn save(&self) -> Result<()> {
        self.controller
            .save(&self.store)
            .with_context(|| format!("Failed to save progress to {}", self.store.path().display()))
    }

    /// Milestones reached since the app was started
    pub fn new_milestones(&self) -> Vec<Milestone> {
        let tracker = self
            .achievements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tracker
            .milestones()
            .iter()
            .skip(self.milestones_at_load)
            .copied()
            .collect()
    }

    pub fn current_level(&self) -> Result<u8> {
        Ok(self.controller.progress()?.current_level)
    }

    /// Requested level or the current one, checked against 1..=10
    pub fn resolve_level(&self, level: Option<u8>) -> Result<u8> {
        let level = match level {
            Some(level) => level,
            None => self.current_level()?,
        };
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            bail!("Level must be between {} and {}", MIN_LEVEL, MAX_LEVEL);
        }
        Ok(level)
    }

    /// Find a word by id, Japanese, romaji or English (case-insensitive,
    /// exact match first, then prefix match)
    pub fn find_word(&self, query: &str) -> Result<Word> {
        let catalog = self.controller.catalog();
        if let Some(word) = catalog.word(query) {
            return Ok(word.clone());
        }

        let query_lower = query.to_lowercase();
        let words: Vec<&Word> = (MIN_LEVEL..=MAX_LEVEL)
            .flat_map(|level| catalog.words_for_level(level))
            .collect();

        // Exact match first
        if let Some(word) = words.iter().find(|w| search_keys(w).contains(&query_lower)) {
            return Ok((*word).clone());
        }

        // Prefix match
        let matches: Vec<&&Word> = words
            .iter()
            .filter(|w| search_keys(w).iter().any(|k| k.starts_with(&query_lower)))
            .collect();

        match matches.len() {
            0 => bail!("No word matching '{}'", query),
            1 => Ok((*matches[0]).clone()),
            _ => bail!(
                "Ambiguous word '{}'. Matches:\n{}",
                query,
                matches
                    .iter()
                    .map(|w| format!("  - {} ({}, {})", w.id, w.japanese, w.english))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }
}

fn search_keys(word: &Word) -> [String; 4] {
    [
        word.id.to_lowercase(),
        word.japanese.to_lowercase(),
        word.romaji.to_lowercase(),
        word.english.to_lowercase(),
    ]
}
