//! Review queue and statistics over tracked words

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::WordCatalog;
use crate::progress::{UserProgress, WordProgress};

/// All due words, oldest due date first
pub fn due_words(progress: &UserProgress, now: DateTime<Utc>) -> Vec<&WordProgress> {
    let mut due: Vec<&WordProgress> = progress
        .word_progress
        .values()
        .filter(|w| w.is_due(now))
        .collect();

    due.sort_by(|a, b| {
        a.next_review_date
            .cmp(&b.next_review_date)
            .then_with(|| a.word_id.cmp(&b.word_id))
    });
    due
}

/// Due words that belong to one level of the catalog
pub fn due_words_for_level<'a>(
    progress: &'a UserProgress,
    catalog: &dyn WordCatalog,
    level: u8,
    now: DateTime<Utc>,
) -> Vec<&'a WordProgress> {
    due_words(progress, now)
        .into_iter()
        .filter(|w| catalog.word(&w.word_id).map_or(false, |word| word.level == level))
        .collect()
}

/// The earliest scheduled review, for reminder scheduling
pub fn next_review_at(progress: &UserProgress) -> Option<DateTime<Utc>> {
    progress
        .word_progress
        .values()
        .map(|w| w.next_review_date)
        .min()
}

/// Statistics over every tracked word
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub tracked_words: usize,
    /// Tier 0
    pub new_words: usize,
    /// Tiers 1-2
    pub learning_words: usize,
    /// Tiers 3-4
    pub reviewing_words: usize,
    /// Top tier
    pub solid_words: usize,
    pub due_words: usize,
    /// Words carrying the coarse `mastered` flag
    pub mastered_words: usize,
}

pub fn review_stats(progress: &UserProgress, now: DateTime<Utc>) -> ReviewStats {
    let mut stats = ReviewStats::default();

    for word in progress.word_progress.values() {
        stats.tracked_words += 1;

        match word.mastery_level {
            0 => stats.new_words += 1,
            1 | 2 => stats.learning_words += 1,
            3 | 4 => stats.reviewing_words += 1,
            _ => stats.solid_words += 1,
        }

        if word.is_due(now) {
            stats.due_words += 1;
        }
        if word.mastered {
            stats.mastered_words += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StaticCatalog, Word};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap()
    }

    fn tracked(progress: &mut UserProgress, id: &str, tier: u8, due_in_hours: i64) {
        let word = progress.word_entry(id, now());
        word.mastery_level = tier;
        word.next_review_date = now() + Duration::hours(due_in_hours);
    }

    #[test]
    fn test_due_words_sorted_oldest_first() {
        let mut progress = UserProgress::new(now());
        tracked(&mut progress, "a", 1, -1);
        tracked(&mut progress, "b", 2, -5);
        tracked(&mut progress, "c", 3, 4);
        tracked(&mut progress, "d", 0, 0);

        let due: Vec<&str> = due_words(&progress, now())
            .iter()
            .map(|w| w.word_id.as_str())
            .collect();
        assert_eq!(due, vec!["b", "a", "d"]);
    }

    #[test]
    fn test_due_words_for_level() {
        let word = |id: &str, level: u8| Word {
            id: id.to_string(),
            japanese: String::new(),
            english: String::new(),
            romaji: String::new(),
            level,
            category: "misc".to_string(),
            jlpt_level: None,
            difficulty: 1,
        };
        let catalog = StaticCatalog::new(vec![word("a", 1), word("b", 2)]);

        let mut progress = UserProgress::new(now());
        tracked(&mut progress, "a", 0, -1);
        tracked(&mut progress, "b", 0, -1);
        tracked(&mut progress, "unknown", 0, -1);

        let due = due_words_for_level(&progress, &catalog, 2, now());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].word_id, "b");
    }

    #[test]
    fn test_next_review_at() {
        let mut progress = UserProgress::new(now());
        assert_eq!(next_review_at(&progress), None);

        tracked(&mut progress, "a", 1, 12);
        tracked(&mut progress, "b", 0, 2);
        assert_eq!(next_review_at(&progress), Some(now() + Duration::hours(2)));
    }

    #[test]
    fn test_review_stats() {
        let mut progress = UserProgress::new(now());
        tracked(&mut progress, "a", 0, -1);
        tracked(&mut progress, "b", 2, 3);
        tracked(&mut progress, "c", 4, 30);
        tracked(&mut progress, "d", 5, -2);
        progress.word_progress.get_mut("d").unwrap().mastered = true;

        let stats = review_stats(&progress, now());
        assert_eq!(
            stats,
            ReviewStats {
                tracked_words: 4,
                new_words: 1,
                learning_words: 1,
                reviewing_words: 1,
                solid_words: 1,
                due_words: 2,
                mastered_words: 1,
            }
        );
    }
}
