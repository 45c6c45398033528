//! Word mastery aggregation per level

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::definitions::RequiredWordMastery;
use crate::catalog::{is_valid_level, Word, WordCatalog};
use crate::progress::{UserProgress, WordProgress};

/// Mastered/total word counts of one level. Always derived, never the
/// source of truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordMasteryStatus {
    pub mastered_words: u32,
    pub total_words: u32,
    pub mastery_percentage: f64,
    pub meets_requirements: bool,
}

/// Compute the mastery status of a level from scratch.
///
/// Levels outside 1..=10 and levels without words yield a zero status that
/// never meets requirements.
pub fn calculate_word_mastery(
    level: u8,
    progress: &UserProgress,
    catalog: &dyn WordCatalog,
) -> WordMasteryStatus {
    if !is_valid_level(level) {
        return WordMasteryStatus::default();
    }
    let words = catalog.words_for_level(level);
    let rule = RequiredWordMastery::for_word_count(words.len());
    mastery_for_words(words, &progress.word_progress, &rule)
}

/// Mastery status of an arbitrary word set under a rule
pub fn mastery_for_words(
    words: &[Word],
    word_progress: &BTreeMap<String, WordProgress>,
    rule: &RequiredWordMastery,
) -> WordMasteryStatus {
    let total_words = u32::try_from(words.len()).unwrap_or(u32::MAX);
    if total_words == 0 {
        return WordMasteryStatus::default();
    }

    let mastered_words = words
        .iter()
        .filter(|w| word_progress.get(&w.id).map_or(false, |p| p.mastered))
        .count() as u32;
    let mastery_percentage = mastered_words as f64 / total_words as f64 * 100.0;

    WordMasteryStatus {
        mastered_words,
        total_words,
        mastery_percentage,
        meets_requirements: mastered_words >= rule.min_words
            && mastery_percentage >= rule.mastery_threshold,
    }
}

/// Memoized mastery statuses, keyed per level by the word-progress version
/// they were computed at. A version bump invalidates every level at once.
#[derive(Debug, Default)]
pub struct MasteryCache {
    entries: HashMap<u8, (u64, WordMasteryStatus)>,
}

impl MasteryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached status for `level` at `version`, computing it on a miss
    pub fn get_or_compute<F>(&mut self, level: u8, version: u64, compute: F) -> WordMasteryStatus
    where
        F: FnOnce() -> WordMasteryStatus,
    {
        if let Some((cached_version, status)) = self.entries.get(&level) {
            if *cached_version == version {
                return *status;
            }
        }
        let status = compute();
        self.entries.insert(level, (version, status));
        status
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::Cell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 18, 0, 0).unwrap()
    }

    fn catalog(level: u8, count: usize) -> StaticCatalog {
        StaticCatalog::new(
            (0..count)
                .map(|i| Word {
                    id: format!("w{}", i),
                    japanese: String::new(),
                    english: String::new(),
                    romaji: String::new(),
                    level,
                    category: "nouns".to_string(),
                    jlpt_level: None,
                    difficulty: 1,
                })
                .collect(),
        )
    }

    fn master(progress: &mut UserProgress, count: usize) {
        for i in 0..count {
            progress.word_entry(&format!("w{}", i), now()).mastered = true;
        }
    }

    #[test]
    fn test_scenario_threshold_on_hundred_words() {
        let catalog = catalog(3, 100);
        let mut progress = UserProgress::new(now());

        master(&mut progress, 19);
        let status = calculate_word_mastery(3, &progress, &catalog);
        assert_eq!(status.mastered_words, 19);
        assert_eq!(status.total_words, 100);
        assert_eq!(status.mastery_percentage, 19.0);
        assert!(!status.meets_requirements);

        master(&mut progress, 85);
        let status = calculate_word_mastery(3, &progress, &catalog);
        assert_eq!(status.mastered_words, 85);
        assert_eq!(status.mastery_percentage, 85.0);
        assert!(status.meets_requirements);
    }

    #[test]
    fn test_empty_level_never_meets_requirements() {
        let catalog = catalog(1, 5);
        let progress = UserProgress::new(now());

        let status = calculate_word_mastery(2, &progress, &catalog);
        assert_eq!(status.total_words, 0);
        assert_eq!(status.mastery_percentage, 0.0);
        assert!(!status.meets_requirements);
    }

    #[test]
    fn test_out_of_range_level_is_neutral() {
        let catalog = catalog(1, 5);
        let mut progress = UserProgress::new(now());
        master(&mut progress, 5);

        assert_eq!(
            calculate_word_mastery(0, &progress, &catalog),
            WordMasteryStatus::default()
        );
        assert_eq!(
            calculate_word_mastery(11, &progress, &catalog),
            WordMasteryStatus::default()
        );
    }

    #[test]
    fn test_mastered_never_exceeds_total() {
        let catalog = catalog(1, 4);
        let mut progress = UserProgress::new(now());
        // Progress for words outside the level must not be counted
        for i in 0..10 {
            progress.word_entry(&format!("w{}", i), now()).mastered = true;
        }
        progress.word_entry("stray", now()).mastered = true;

        let status = calculate_word_mastery(1, &progress, &catalog);
        assert_eq!(status.mastered_words, 4);
        assert!(status.mastered_words <= status.total_words);
        assert!(status.meets_requirements);
    }

    #[test]
    fn test_small_level_needs_every_word_below_floor() {
        let catalog = catalog(1, 4);
        let mut progress = UserProgress::new(now());

        master(&mut progress, 3);
        let status = calculate_word_mastery(1, &progress, &catalog);
        assert_eq!(status.mastery_percentage, 75.0);
        assert!(!status.meets_requirements);
    }

    #[test]
    fn test_cache_recomputes_only_on_version_change() {
        let mut cache = MasteryCache::new();
        let computed = Cell::new(0);
        let compute = || {
            computed.set(computed.get() + 1);
            WordMasteryStatus {
                mastered_words: computed.get(),
                ..WordMasteryStatus::default()
            }
        };

        let first = cache.get_or_compute(1, 0, compute);
        let again = cache.get_or_compute(1, 0, compute);
        assert_eq!(first, again);
        assert_eq!(computed.get(), 1);

        let bumped = cache.get_or_compute(1, 1, compute);
        assert_eq!(computed.get(), 2);
        assert_eq!(bumped.mastered_words, 2);

        cache.get_or_compute(2, 1, compute);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
