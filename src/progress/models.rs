//! Data models for learner progress
//!
//! [`UserProgress`] is the aggregate root persisted by a
//! [`ProgressStore`](super::storage::ProgressStore). Everything else in here
//! hangs off it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{is_valid_level, JlptLevel, MAX_LEVEL, MIN_LEVEL};
use crate::levels::WordMasteryStatus;
use crate::srs::MAX_MASTERY_LEVEL;

/// Correct answers needed before a word counts as mastered
pub const MASTERED_CORRECT_ATTEMPTS: u32 = 5;
/// Wrong answers after which a word can no longer count as mastered
pub const DEMOTION_INCORRECT_ATTEMPTS: u32 = 3;

/// Learning state of a single word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordProgress {
    pub word_id: String,
    #[serde(default)]
    pub correct_attempts: u32,
    #[serde(default)]
    pub incorrect_attempts: u32,
    /// Coarse flag driven by answer counts, independent of `mastery_level`
    #[serde(default)]
    pub mastered: bool,
    /// Spaced repetition tier (0-5)
    #[serde(default)]
    pub mastery_level: u8,
    /// Unix epoch when missing from a stored document
    #[serde(default)]
    pub last_practiced: DateTime<Utc>,
    /// A missing date makes the word due immediately
    #[serde(default)]
    pub next_review_date: DateTime<Utc>,
}

impl WordProgress {
    /// Zero-state progress, due immediately
    pub fn new(word_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            word_id: word_id.into(),
            correct_attempts: 0,
            incorrect_attempts: 0,
            mastered: false,
            mastery_level: 0,
            last_practiced: now,
            next_review_date: now,
        }
    }

    /// Check if the word is due for review
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }

    pub fn total_attempts(&self) -> u32 {
        self.correct_attempts + self.incorrect_attempts
    }

    /// Apply a practice answer to the coarse mastery flag.
    ///
    /// Three or more wrong answers force `mastered` off even when the
    /// correct count is still above the mastery bar.
    pub fn record_answer(&mut self, is_correct: bool, now: DateTime<Utc>) {
        if is_correct {
            self.correct_attempts += 1;
        } else {
            self.incorrect_attempts += 1;
        }

        self.mastered = self.correct_attempts >= MASTERED_CORRECT_ATTEMPTS;
        if self.incorrect_attempts >= DEMOTION_INCORRECT_ATTEMPTS {
            self.mastered = false;
        }

        self.last_practiced = now;
    }
}

/// Externally visible state of a level. "In progress" is the same as unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelStatus {
    Locked,
    Unlocked,
    Completed,
}

/// Per-level progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: u8,
    /// Latched: never reverts once set
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub words_mastered: u32,
    #[serde(default)]
    pub total_words: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub word_mastery: WordMasteryStatus,
}

impl LevelProgress {
    /// A locked level with no recorded progress
    pub fn new(level: u8) -> Self {
        Self {
            level,
            completed: false,
            score: 0.0,
            words_mastered: 0,
            total_words: 0,
            unlocked_at: None,
            completed_at: None,
            word_mastery: WordMasteryStatus::default(),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    pub fn status(&self) -> LevelStatus {
        if self.completed {
            LevelStatus::Completed
        } else if self.is_unlocked() {
            LevelStatus::Unlocked
        } else {
            LevelStatus::Locked
        }
    }

    /// Copy a freshly computed mastery status into this record
    pub fn apply_mastery(&mut self, mastery: WordMasteryStatus) {
        self.words_mastered = mastery.mastered_words;
        self.total_words = mastery.total_words;
        self.word_mastery = mastery;
    }
}

/// A finished vocabulary quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub level: u8,
    pub score: f64,
    pub date: DateTime<Utc>,
}

impl QuizResult {
    pub fn new(level: u8, score: f64, date: DateTime<Utc>) -> Self {
        Self { level, score, date }
    }
}

/// A finished JLPT mock test. `level` is the JLPT tier, not the curriculum level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JlptResult {
    pub level: JlptLevel,
    pub score: f64,
    pub date: DateTime<Utc>,
}

impl JlptResult {
    pub fn new(level: JlptLevel, score: f64, date: DateTime<Utc>) -> Self {
        Self { level, score, date }
    }
}

/// A reading exercise attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingResult {
    pub level: u8,
    pub completed: bool,
    pub date: DateTime<Utc>,
}

impl ReadingResult {
    pub fn new(level: u8, completed: bool, date: DateTime<Utc>) -> Self {
        Self {
            level,
            completed,
            date,
        }
    }
}

fn default_current_level() -> u8 {
    MIN_LEVEL
}

/// Everything known about a learner. Persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    #[serde(default = "default_current_level")]
    pub current_level: u8,
    #[serde(default)]
    pub levels: Vec<LevelProgress>,
    #[serde(default)]
    pub word_progress: BTreeMap<String, WordProgress>,
    #[serde(default)]
    pub quiz_history: Vec<QuizResult>,
    #[serde(default)]
    pub jlpt_tests: Vec<JlptResult>,
    #[serde(default)]
    pub reading_practice: Vec<ReadingResult>,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
}

impl UserProgress {
    /// Fresh progress: level 1 unlocked, every history empty
    pub fn new(now: DateTime<Utc>) -> Self {
        let levels = (MIN_LEVEL..=MAX_LEVEL)
            .map(|level| {
                let mut progress = LevelProgress::new(level);
                if level == MIN_LEVEL {
                    progress.unlocked_at = Some(now);
                }
                progress
            })
            .collect();

        Self {
            current_level: MIN_LEVEL,
            levels,
            word_progress: BTreeMap::new(),
            quiz_history: Vec::new(),
            jlpt_tests: Vec::new(),
            reading_practice: Vec::new(),
            total_score: 0.0,
            last_updated: now,
        }
    }

    pub fn level(&self, level: u8) -> Option<&LevelProgress> {
        self.levels.iter().find(|l| l.level == level)
    }

    pub fn level_mut(&mut self, level: u8) -> Option<&mut LevelProgress> {
        self.levels.iter_mut().find(|l| l.level == level)
    }

    pub fn is_unlocked(&self, level: u8) -> bool {
        self.level(level).map_or(false, |l| l.is_unlocked())
    }

    /// Levels with an unlock timestamp, ascending
    pub fn unlocked_levels(&self) -> Vec<u8> {
        self.levels
            .iter()
            .filter(|l| l.is_unlocked())
            .map(|l| l.level)
            .collect()
    }

    pub fn word(&self, word_id: &str) -> Option<&WordProgress> {
        self.word_progress.get(word_id)
    }

    /// Progress for a word, created in zero state on first use
    pub fn word_entry(&mut self, word_id: &str, now: DateTime<Utc>) -> &mut WordProgress {
        self.word_progress
            .entry(word_id.to_string())
            .or_insert_with(|| WordProgress::new(word_id, now))
    }

    /// Sum of the scores of every unlocked level
    pub fn recompute_total_score(&mut self) {
        self.total_score = self
            .levels
            .iter()
            .filter(|l| l.is_unlocked())
            .map(|l| l.score)
            .sum();
    }

    /// Bring a loaded document back within its invariants.
    ///
    /// Returns true when anything had to be changed.
    pub fn repair(&mut self, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        let before = self.levels.len();
        self.levels.retain(|l| is_valid_level(l.level));
        self.levels.sort_by_key(|l| l.level);
        self.levels.dedup_by_key(|l| l.level);
        changed |= self.levels.len() != before;

        for level in MIN_LEVEL..=MAX_LEVEL {
            if self.level(level).is_none() {
                self.levels.push(LevelProgress::new(level));
                changed = true;
            }
        }
        self.levels.sort_by_key(|l| l.level);

        // A completed level must have been unlocked at some point
        for level in self.levels.iter_mut() {
            if level.completed && level.unlocked_at.is_none() {
                level.unlocked_at = Some(level.completed_at.unwrap_or(now));
                changed = true;
            }
        }

        for (word_id, progress) in self.word_progress.iter_mut() {
            if progress.mastery_level > MAX_MASTERY_LEVEL {
                progress.mastery_level = MAX_MASTERY_LEVEL;
                changed = true;
            }
            if &progress.word_id != word_id {
                progress.word_id = word_id.clone();
                changed = true;
            }
        }

        let clamped = self.current_level.clamp(MIN_LEVEL, MAX_LEVEL);
        if clamped != self.current_level {
            self.current_level = clamped;
            changed = true;
        }

        if self.last_updated == DateTime::<Utc>::default() {
            self.last_updated = now;
            changed = true;
        }

        for level in [MIN_LEVEL, self.current_level] {
            if let Some(progress) = self.level_mut(level) {
                if progress.unlocked_at.is_none() {
                    progress.unlocked_at = Some(now);
                    changed = true;
                }
            }
        }

        changed
    }
}
