//! Level progression controller
//!
//! Every learner action is one read-compute-write transition over the
//! loaded [`UserProgress`]: the aggregate is taken out, mutated, the
//! affected level is re-evaluated from scratch and the result is put back
//! before any listener sees it. Mutations take `&mut self`, so a controller
//! is always driven by a single writer; share it behind a `Mutex` when
//! several tasks submit answers.
//!
//! Level state machine: `locked -> unlocked -> completed`. Unlocking is
//! monotonic and completion is a latch.

use std::cell::RefCell;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::events::{dispatch, ProgressEvent, ProgressListener};
use super::models::{
    JlptResult, LevelProgress, QuizResult, ReadingResult, UserProgress, WordProgress,
};
use super::storage::{ProgressError, ProgressStore, Result};
use crate::catalog::{is_valid_level, WordCatalog, MAX_LEVEL};
use crate::config::Settings;
use crate::levels::requirements::{JLPT_PASSING_SCORE, QUIZ_PASSING_SCORE};
use crate::levels::{
    all_definitions, calculate_word_mastery, evaluate_with_mastery, LevelDefinition,
    LevelEvaluation, MasteryCache, RequirementProgress, WordMasteryStatus,
};
use crate::srs::{self, ReviewStats};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed instant is a clock that never moves
impl Clock for DateTime<Utc> {
    fn now(&self) -> DateTime<Utc> {
        *self
    }
}

/// Where the progress attached by [`LevelController::load`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Read back from the store
    Restored,
    /// Nothing saved yet, started from defaults
    Fresh,
    /// Saved state was unreadable, started from defaults
    Recovered,
}

/// Result of an explicit advancement request
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Advanced { from: u8, to: u8 },
    /// The current level is not completable yet
    Blocked(LevelEvaluation),
    AtFinalLevel,
}

/// Everything a UI needs about the level being worked on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentLevelData {
    pub level: u8,
    pub definition: LevelDefinition,
    pub progress: LevelProgress,
    pub evaluation: LevelEvaluation,
    pub due_words: usize,
}

pub struct LevelController {
    catalog: Arc<dyn WordCatalog>,
    settings: Settings,
    intervals: Vec<Duration>,
    definitions: Vec<LevelDefinition>,
    clock: Box<dyn Clock + Send>,
    progress: Option<UserProgress>,
    /// Bumped on every word-progress mutation
    version: u64,
    mastery_cache: RefCell<MasteryCache>,
    listeners: Vec<Box<dyn ProgressListener + Send>>,
}

impl LevelController {
    pub fn new(catalog: Arc<dyn WordCatalog>, settings: Settings) -> Self {
        let definitions = all_definitions(catalog.as_ref());
        let intervals = settings.review_intervals();
        Self {
            catalog,
            settings,
            intervals,
            definitions,
            clock: Box::new(SystemClock),
            progress: None,
            version: 0,
            mastery_cache: RefCell::new(MasteryCache::new()),
            listeners: Vec::new(),
        }
    }

    /// Builder method to replace the clock
    pub fn with_clock<C: Clock + Send + 'static>(mut self, clock: C) -> Self {
        self.set_clock(clock);
        self
    }

    pub fn set_clock<C: Clock + Send + 'static>(&mut self, clock: C) {
        self.clock = Box::new(clock);
    }

    /// Register a consumer of [`ProgressEvent`]s
    pub fn add_listener<L: ProgressListener + Send + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &dyn WordCatalog {
        self.catalog.as_ref()
    }

    pub fn definition(&self, level: u8) -> Option<&LevelDefinition> {
        self.definitions.iter().find(|d| d.level == level)
    }

    pub fn is_ready(&self) -> bool {
        self.progress.is_some()
    }

    // ==================== Persistence ====================

    /// Attach the stored progress. Missing or unreadable state falls back
    /// to fresh defaults; the failure is logged, never returned.
    pub fn load(&mut self, store: &dyn ProgressStore) -> LoadSource {
        let now = self.clock.now();
        let (progress, source) = match store.load() {
            Ok(Some(progress)) => (progress, LoadSource::Restored),
            Ok(None) => {
                log::info!("No saved progress, starting at level 1");
                (UserProgress::new(now), LoadSource::Fresh)
            }
            Err(e) => {
                log::warn!("Discarding unreadable progress: {}", e);
                (UserProgress::new(now), LoadSource::Recovered)
            }
        };
        self.attach(progress, now);
        source
    }

    /// Attach an in-memory aggregate directly
    pub fn load_progress(&mut self, progress: UserProgress) {
        let now = self.clock.now();
        self.attach(progress, now);
    }

    fn attach(&mut self, mut progress: UserProgress, now: DateTime<Utc>) {
        if progress.repair(now) {
            log::warn!("Repaired inconsistent progress data");
        }
        log::debug!(
            "Progress attached at level {} with {} tracked words",
            progress.current_level,
            progress.word_progress.len()
        );
        self.progress = Some(progress);
        self.version += 1;
        self.mastery_cache.get_mut().clear();
    }

    /// Persist the current aggregate. The action is durable once this returns.
    pub fn save(&self, store: &dyn ProgressStore) -> Result<()> {
        store.save(self.progress()?)
    }

    pub fn progress(&self) -> Result<&UserProgress> {
        self.progress.as_ref().ok_or(ProgressError::NotReady)
    }

    fn take_progress(&mut self) -> Result<UserProgress> {
        self.progress.take().ok_or(ProgressError::NotReady)
    }

    /// Finish a transition: refresh totals, publish, notify listeners
    fn commit(&mut self, mut progress: UserProgress, now: DateTime<Utc>, events: Vec<ProgressEvent>) {
        progress.recompute_total_score();
        progress.last_updated = now;
        dispatch(&mut self.listeners, &events, &progress);
        self.progress = Some(progress);
    }

    // ==================== Evaluation ====================

    fn cached_mastery(&self, level: u8, progress: &UserProgress) -> WordMasteryStatus {
        if !is_valid_level(level) {
            return WordMasteryStatus::default();
        }
        self.mastery_cache
            .borrow_mut()
            .get_or_compute(level, self.version, || {
                calculate_word_mastery(level, progress, self.catalog.as_ref())
            })
    }

    fn evaluate(&self, level: u8, progress: &UserProgress) -> LevelEvaluation {
        match self.definition(level) {
            Some(definition) => {
                let mastery = self.cached_mastery(level, progress);
                evaluate_with_mastery(definition, mastery, progress)
            }
            None => LevelEvaluation::empty(level),
        }
    }

    /// Snapshot a level's mastery and score, latching completion when the
    /// level became completable
    fn refresh_level(
        &self,
        progress: &mut UserProgress,
        level: u8,
        now: DateTime<Utc>,
        events: &mut Vec<ProgressEvent>,
    ) {
        let evaluation = self.evaluate(level, progress);
        let Some(record) = progress.level_mut(level) else {
            return;
        };

        record.apply_mastery(evaluation.word_mastery);
        record.score = evaluation.score;

        if evaluation.completable && !record.completed {
            record.completed = true;
            record.completed_at = Some(now);
            log::info!("Level {} completed with score {:.1}", level, evaluation.score);
            events.push(ProgressEvent::LevelCompleted {
                level,
                score: evaluation.score,
            });

            // Only ever one level ahead of the completed one
            if self.settings.auto_unlock && level < MAX_LEVEL {
                unlock(progress, level + 1, now, events);
            }
        }
    }

    // ==================== Word Actions ====================

    /// Record a practice answer against the coarse `mastered` flag and
    /// re-evaluate the current level
    pub fn update_word_progress(&mut self, word_id: &str, is_correct: bool) -> Result<WordProgress> {
        let mut progress = self.take_progress()?;
        let now = self.clock.now();

        if self.catalog.word(word_id).is_none() {
            log::debug!("Tracking word {} which is not in the catalog", word_id);
        }

        let word = progress.word_entry(word_id, now);
        word.record_answer(is_correct, now);
        let updated = word.clone();
        self.version += 1;

        let mut events = vec![ProgressEvent::WordAnswered {
            word_id: updated.word_id.clone(),
            correct: is_correct,
            mastered: updated.mastered,
        }];
        let current = progress.current_level;
        self.refresh_level(&mut progress, current, now, &mut events);

        self.commit(progress, now, events);
        Ok(updated)
    }

    /// Run a spaced repetition review for a word. Leaves `mastered` alone.
    pub fn handle_review(&mut self, word_id: &str, is_correct: bool) -> Result<WordProgress> {
        let mut progress = self.take_progress()?;
        let now = self.clock.now();

        let current = progress
            .word(word_id)
            .cloned()
            .unwrap_or_else(|| WordProgress::new(word_id, now));
        let reviewed = srs::schedule_review(&current, is_correct, now, &self.intervals);
        progress
            .word_progress
            .insert(word_id.to_string(), reviewed.clone());
        self.version += 1;

        let events = vec![ProgressEvent::WordReviewed {
            word_id: reviewed.word_id.clone(),
            correct: is_correct,
            mastery_level: reviewed.mastery_level,
            next_review_date: reviewed.next_review_date,
        }];

        self.commit(progress, now, events);
        Ok(reviewed)
    }

    // ==================== Level Actions ====================

    /// Unlock a level. Returns false when it already was unlocked or is
    /// outside 1..=10.
    pub fn unlock_level(&mut self, level: u8) -> Result<bool> {
        let mut progress = self.take_progress()?;
        if !is_valid_level(level) {
            log::debug!("Ignoring unlock of out-of-range level {}", level);
            self.progress = Some(progress);
            return Ok(false);
        }

        let now = self.clock.now();
        let mut events = Vec::new();
        let unlocked = unlock(&mut progress, level, now, &mut events);
        if unlocked {
            let evaluation = self.evaluate(level, &progress);
            if let Some(record) = progress.level_mut(level) {
                record.apply_mastery(evaluation.word_mastery);
                record.score = evaluation.score;
            }
        }

        self.commit(progress, now, events);
        Ok(unlocked)
    }

    /// Move to the next level if the current one is completable
    pub fn advance_level(&mut self) -> Result<AdvanceOutcome> {
        let mut progress = self.take_progress()?;
        let from = progress.current_level;

        if from >= MAX_LEVEL {
            self.progress = Some(progress);
            return Ok(AdvanceOutcome::AtFinalLevel);
        }

        let evaluation = self.evaluate(from, &progress);
        if !evaluation.completable {
            log::debug!(
                "Level {} cannot be advanced: {} of {} requirements met, score {:.1}",
                from,
                evaluation.completed_requirements(),
                evaluation.requirements.len(),
                evaluation.score
            );
            self.progress = Some(progress);
            return Ok(AdvanceOutcome::Blocked(evaluation));
        }

        let now = self.clock.now();
        let mut events = Vec::new();
        self.refresh_level(&mut progress, from, now, &mut events);

        let to = from + 1;
        unlock(&mut progress, to, now, &mut events);
        progress.current_level = to;

        let snapshot = self.evaluate(to, &progress);
        if let Some(record) = progress.level_mut(to) {
            record.apply_mastery(snapshot.word_mastery);
            record.score = snapshot.score;
        }

        log::info!("Advanced from level {} to level {}", from, to);
        events.push(ProgressEvent::LevelAdvanced { from, to });

        self.commit(progress, now, events);
        Ok(AdvanceOutcome::Advanced { from, to })
    }

    // ==================== History Events ====================

    /// Append a quiz result
    pub fn update_quiz_progress(&mut self, result: QuizResult) -> Result<()> {
        let mut progress = self.take_progress()?;
        if !is_valid_level(result.level) || !result.score.is_finite() {
            log::warn!("Ignoring quiz result for level {} ({})", result.level, result.score);
            self.progress = Some(progress);
            return Ok(());
        }

        let now = self.clock.now();
        let mut events = vec![ProgressEvent::QuizRecorded {
            level: result.level,
            score: result.score,
            passed: result.score >= QUIZ_PASSING_SCORE,
        }];
        progress.quiz_history.push(result);

        let current = progress.current_level;
        self.refresh_level(&mut progress, current, now, &mut events);
        self.commit(progress, now, events);
        Ok(())
    }

    /// Append a JLPT mock test result
    pub fn update_jlpt_progress(&mut self, result: JlptResult) -> Result<()> {
        let mut progress = self.take_progress()?;
        if !result.score.is_finite() {
            log::warn!("Ignoring JLPT {} result with score {}", result.level, result.score);
            self.progress = Some(progress);
            return Ok(());
        }

        let now = self.clock.now();
        let mut events = vec![ProgressEvent::JlptRecorded {
            level: result.level,
            score: result.score,
            passed: result.score >= JLPT_PASSING_SCORE,
        }];
        progress.jlpt_tests.push(result);

        let current = progress.current_level;
        self.refresh_level(&mut progress, current, now, &mut events);
        self.commit(progress, now, events);
        Ok(())
    }

    /// Append a reading exercise result
    pub fn update_reading_progress(&mut self, result: ReadingResult) -> Result<()> {
        let mut progress = self.take_progress()?;
        if !is_valid_level(result.level) {
            log::warn!("Ignoring reading result for level {}", result.level);
            self.progress = Some(progress);
            return Ok(());
        }

        let now = self.clock.now();
        let mut events = vec![ProgressEvent::ReadingRecorded {
            level: result.level,
            completed: result.completed,
        }];
        progress.reading_practice.push(result);

        let current = progress.current_level;
        self.refresh_level(&mut progress, current, now, &mut events);
        self.commit(progress, now, events);
        Ok(())
    }

    // ==================== Getters ====================

    /// Stored record of a level; a neutral locked record outside 1..=10
    pub fn get_level_progress(&self, level: u8) -> Result<LevelProgress> {
        let progress = self.progress()?;
        Ok(progress
            .level(level)
            .cloned()
            .unwrap_or_else(|| LevelProgress::new(level)))
    }

    /// Progress of a word; zero state for words never practiced
    pub fn get_word_progress(&self, word_id: &str) -> Result<WordProgress> {
        let progress = self.progress()?;
        Ok(progress
            .word(word_id)
            .cloned()
            .unwrap_or_else(|| WordProgress::new(word_id, self.clock.now())))
    }

    /// Live mastery status of the current level
    pub fn get_word_mastery(&self) -> Result<WordMasteryStatus> {
        let progress = self.progress()?;
        Ok(self.cached_mastery(progress.current_level, progress))
    }

    /// Live mastery status of any level
    pub fn word_mastery(&self, level: u8) -> Result<WordMasteryStatus> {
        let progress = self.progress()?;
        Ok(self.cached_mastery(level, progress))
    }

    pub fn get_level_requirements(&self, level: u8) -> Result<Vec<RequirementProgress>> {
        let progress = self.progress()?;
        Ok(self.evaluate(level, progress).requirements)
    }

    pub fn evaluate_level(&self, level: u8) -> Result<LevelEvaluation> {
        let progress = self.progress()?;
        Ok(self.evaluate(level, progress))
    }

    /// Whether the current level may be advanced from
    pub fn can_advance_level(&self) -> Result<bool> {
        let progress = self.progress()?;
        Ok(self.evaluate(progress.current_level, progress).completable)
    }

    pub fn can_advance(&self, level: u8) -> Result<bool> {
        let progress = self.progress()?;
        Ok(self.evaluate(level, progress).completable)
    }

    pub fn get_current_level_data(&self) -> Result<CurrentLevelData> {
        let progress = self.progress()?;
        let level = progress.current_level;
        let definition = self
            .definition(level)
            .cloned()
            .ok_or(ProgressError::UnknownLevel(level))?;
        let record = progress
            .level(level)
            .cloned()
            .ok_or(ProgressError::UnknownLevel(level))?;
        let due_words =
            srs::due_words_for_level(progress, self.catalog.as_ref(), level, self.clock.now())
                .len();

        Ok(CurrentLevelData {
            level,
            definition,
            progress: record,
            evaluation: self.evaluate(level, progress),
            due_words,
        })
    }

    /// Words due for review now, oldest first
    pub fn due_words(&self) -> Result<Vec<WordProgress>> {
        let progress = self.progress()?;
        Ok(srs::due_words(progress, self.clock.now())
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn review_stats(&self) -> Result<ReviewStats> {
        Ok(srs::review_stats(self.progress()?, self.clock.now()))
    }

    /// Earliest upcoming review, for reminders
    pub fn next_review_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(srs::next_review_at(self.progress()?))
    }

    /// Next-review offsets for a correct and a wrong answer
    pub fn preview_review(&self, word_id: &str) -> Result<(Duration, Duration)> {
        let word = self.get_word_progress(word_id)?;
        Ok(srs::preview_intervals(&word, &self.intervals))
    }
}

/// Stamp `unlocked_at` if the level is still locked
fn unlock(
    progress: &mut UserProgress,
    level: u8,
    now: DateTime<Utc>,
    events: &mut Vec<ProgressEvent>,
) -> bool {
    match progress.level_mut(level) {
        Some(record) if record.unlocked_at.is_none() => {
            record.unlocked_at = Some(now);
            log::info!("Level {} unlocked", level);
            events.push(ProgressEvent::LevelUnlocked { level });
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{JlptLevel, StaticCatalog, Word};
    use crate::progress::{EventLog, JsonFileStore, LevelStatus, MemoryStore};
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 3, 8, 30, 0).unwrap()
    }

    fn word(id: &str, level: u8) -> Word {
        Word {
            id: id.to_string(),
            japanese: String::new(),
            english: String::new(),
            romaji: String::new(),
            level,
            category: "nouns".to_string(),
            jlpt_level: None,
            difficulty: 1,
        }
    }

    fn test_catalog() -> Arc<dyn WordCatalog> {
        let mut words = Vec::new();
        for i in 0..4 {
            words.push(word(&format!("a{}", i), 1));
            words.push(word(&format!("b{}", i), 2));
        }
        Arc::new(StaticCatalog::new(words))
    }

    fn create_test_controller() -> LevelController {
        let mut controller =
            LevelController::new(test_catalog(), Settings::default()).with_clock(now());
        controller.load(&MemoryStore::new());
        controller
    }

    fn master(controller: &mut LevelController, word_id: &str) {
        for _ in 0..5 {
            controller.update_word_progress(word_id, true).unwrap();
        }
    }

    fn complete_level_one(controller: &mut LevelController) {
        for i in 0..4 {
            master(controller, &format!("a{}", i));
        }
        controller
            .update_quiz_progress(QuizResult::new(1, 90.0, now()))
            .unwrap();
        controller
            .update_quiz_progress(QuizResult::new(1, 85.0, now()))
            .unwrap();
    }

    #[test]
    fn test_not_ready_before_load() {
        let mut controller = LevelController::new(test_catalog(), Settings::default());
        assert!(!controller.is_ready());
        assert!(matches!(controller.progress(), Err(ProgressError::NotReady)));
        assert!(matches!(controller.get_word_mastery(), Err(ProgressError::NotReady)));
        assert!(matches!(
            controller.update_word_progress("a0", true),
            Err(ProgressError::NotReady)
        ));
        assert!(matches!(controller.advance_level(), Err(ProgressError::NotReady)));
        assert!(matches!(
            controller.save(&MemoryStore::new()),
            Err(ProgressError::NotReady)
        ));
    }

    #[test]
    fn test_load_sources() {
        let mut controller = LevelController::new(test_catalog(), Settings::default());
        assert_eq!(controller.load(&MemoryStore::new()), LoadSource::Fresh);
        assert!(controller.is_ready());

        let corrupt = MemoryStore::with_document("{ nope");
        assert_eq!(controller.load(&corrupt), LoadSource::Recovered);
        assert_eq!(controller.progress().unwrap().current_level, 1);

        let store = MemoryStore::new();
        let mut saved = UserProgress::new(now());
        saved.current_level = 2;
        store.save(&saved).unwrap();
        assert_eq!(controller.load(&store), LoadSource::Restored);
        assert_eq!(controller.progress().unwrap().current_level, 2);
        // repair unlocks the current level
        assert!(controller.progress().unwrap().is_unlocked(2));
    }

    #[test]
    fn test_answers_drive_mastered_flag() {
        let mut controller = create_test_controller();
        for _ in 0..4 {
            controller.update_word_progress("a0", true).unwrap();
        }
        let word = controller.update_word_progress("a0", true).unwrap();
        assert_eq!(word.correct_attempts, 5);
        assert!(word.mastered);

        controller.update_word_progress("a0", false).unwrap();
        controller.update_word_progress("a0", false).unwrap();
        let word = controller.update_word_progress("a0", false).unwrap();
        assert_eq!(word.correct_attempts, 5);
        assert_eq!(word.incorrect_attempts, 3);
        assert!(!word.mastered);
        assert_eq!(controller.get_word_progress("a0").unwrap(), word);
    }

    #[test]
    fn test_unknown_word_is_tracked() {
        let mut controller = create_test_controller();
        let word = controller.update_word_progress("not-in-catalog", true).unwrap();
        assert_eq!(word.correct_attempts, 1);
        assert_eq!(controller.get_word_mastery().unwrap().mastered_words, 0);

        let untouched = controller.get_word_progress("never-seen").unwrap();
        assert_eq!(untouched.total_attempts(), 0);
        assert!(controller.progress().unwrap().word("never-seen").is_none());
    }

    #[test]
    fn test_mastery_reflects_new_answers() {
        let mut controller = create_test_controller();
        assert_eq!(controller.get_word_mastery().unwrap().mastered_words, 0);

        master(&mut controller, "a0");
        let status = controller.get_word_mastery().unwrap();
        assert_eq!(status.mastered_words, 1);
        assert_eq!(status.total_words, 4);
        assert!((status.mastery_percentage - 25.0).abs() < 1e-9);
        assert_eq!(controller.get_level_progress(1).unwrap().words_mastered, 1);

        master(&mut controller, "b0");
        assert_eq!(controller.word_mastery(2).unwrap().mastered_words, 1);
    }

    #[test]
    fn test_completion_latches_and_unlocks_next() {
        let log = Arc::new(Mutex::new(EventLog::new()));
        let mut controller = create_test_controller();
        controller.add_listener(log.clone());

        complete_level_one(&mut controller);

        let level_one = controller.get_level_progress(1).unwrap();
        assert!(level_one.completed);
        assert_eq!(level_one.completed_at, Some(now()));
        assert_eq!(level_one.status(), LevelStatus::Completed);
        assert!(controller.get_level_progress(2).unwrap().is_unlocked());
        assert!(!controller.get_level_progress(3).unwrap().is_unlocked());

        let events = log.lock().unwrap().drain();
        assert!(events.contains(&ProgressEvent::LevelCompleted {
            level: 1,
            score: level_one.score
        }));
        assert!(events.contains(&ProgressEvent::LevelUnlocked { level: 2 }));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, ProgressEvent::LevelCompleted { .. }))
                .count(),
            1
        );

        // Demotion afterwards does not revoke completion
        for _ in 0..3 {
            controller.update_word_progress("a0", false).unwrap();
        }
        assert!(!controller.can_advance_level().unwrap());
        assert!(controller.get_level_progress(1).unwrap().completed);
    }

    #[test]
    fn test_no_auto_unlock_when_disabled() {
        let settings = Settings {
            auto_unlock: false,
            ..Settings::default()
        };
        let mut controller = LevelController::new(test_catalog(), settings).with_clock(now());
        controller.load(&MemoryStore::new());

        complete_level_one(&mut controller);
        assert!(controller.get_level_progress(1).unwrap().completed);
        assert!(!controller.get_level_progress(2).unwrap().is_unlocked());
    }

    #[test]
    fn test_advance_blocked_until_completable() {
        let mut controller = create_test_controller();
        master(&mut controller, "a0");

        match controller.advance_level().unwrap() {
            AdvanceOutcome::Blocked(evaluation) => {
                assert_eq!(evaluation.level, 1);
                assert!(!evaluation.completable);
                assert!(evaluation.outstanding().count() > 0);
            }
            other => panic!("expected blocked, got {:?}", other),
        }
        assert_eq!(controller.progress().unwrap().current_level, 1);
    }

    #[test]
    fn test_advance_moves_to_next_level() {
        let log = Arc::new(Mutex::new(EventLog::new()));
        let mut controller = create_test_controller();
        complete_level_one(&mut controller);
        master(&mut controller, "b0");
        controller.add_listener(log.clone());

        assert!(controller.can_advance_level().unwrap());
        assert_eq!(
            controller.advance_level().unwrap(),
            AdvanceOutcome::Advanced { from: 1, to: 2 }
        );

        let progress = controller.progress().unwrap();
        assert_eq!(progress.current_level, 2);
        assert!(progress.is_unlocked(2));
        assert_eq!(progress.level(2).unwrap().words_mastered, 1);

        let events = log.lock().unwrap().drain();
        assert_eq!(events, vec![ProgressEvent::LevelAdvanced { from: 1, to: 2 }]);

        let data = controller.get_current_level_data().unwrap();
        assert_eq!(data.level, 2);
        assert_eq!(data.definition.jlpt_level, JlptLevel::N5);
        assert_eq!(data.evaluation.word_mastery.mastered_words, 1);
    }

    #[test]
    fn test_advance_at_final_level() {
        let mut controller = create_test_controller();
        let mut progress = UserProgress::new(now());
        progress.current_level = 10;
        controller.load_progress(progress);

        assert_eq!(controller.advance_level().unwrap(), AdvanceOutcome::AtFinalLevel);
        assert_eq!(controller.progress().unwrap().current_level, 10);
    }

    #[test]
    fn test_unlock_is_monotonic() {
        let mut controller = create_test_controller();
        assert!(controller.unlock_level(3).unwrap());
        let unlocked_at = controller.get_level_progress(3).unwrap().unlocked_at;
        assert_eq!(unlocked_at, Some(now()));

        let later = now() + Duration::days(1);
        controller.set_clock(later);
        assert!(!controller.unlock_level(3).unwrap());
        assert_eq!(controller.get_level_progress(3).unwrap().unlocked_at, unlocked_at);

        assert!(!controller.unlock_level(0).unwrap());
        assert!(!controller.unlock_level(11).unwrap());
        assert_eq!(controller.progress().unwrap().unlocked_levels(), vec![1, 3]);
    }

    #[test]
    fn test_out_of_range_level_progress_is_neutral() {
        let controller = create_test_controller();
        let record = controller.get_level_progress(42).unwrap();
        assert_eq!(record.level, 42);
        assert_eq!(record.status(), LevelStatus::Locked);
        assert!(controller.get_level_requirements(42).unwrap().is_empty());
        assert!(!controller.can_advance(42).unwrap());
    }

    #[test]
    fn test_review_schedules_without_touching_mastered() {
        let mut controller = create_test_controller();
        let reviewed = controller.handle_review("a1", true).unwrap();
        assert_eq!(reviewed.mastery_level, 1);
        assert_eq!(reviewed.next_review_date, now() + Duration::hours(12));
        assert!(!reviewed.mastered);
        assert_eq!(reviewed.correct_attempts, 1);

        master(&mut controller, "a2");
        let reviewed = controller.handle_review("a2", false).unwrap();
        assert_eq!(reviewed.mastery_level, 0);
        assert!(reviewed.mastered);

        assert_eq!(
            controller.next_review_at().unwrap(),
            Some(now() + Duration::hours(2))
        );
        assert_eq!(
            controller.preview_review("a1").unwrap(),
            (Duration::hours(24), Duration::hours(2))
        );
    }

    #[test]
    fn test_oversized_intervals_do_not_break_reviews() {
        let settings = Settings {
            auto_unlock: true,
            review_intervals_hours: vec![1_000_000_000_000; 6],
        };
        let mut controller = LevelController::new(test_catalog(), settings).with_clock(now());
        controller.load(&MemoryStore::new());

        let reviewed = controller.handle_review("a0", true).unwrap();
        assert_eq!(reviewed.next_review_date, now() + Duration::hours(12));
        assert!(controller.is_ready());
    }

    #[test]
    fn test_due_words_follow_clock() {
        let mut controller = create_test_controller();
        controller.handle_review("a0", true).unwrap();
        controller.update_word_progress("a1", true).unwrap();

        let due: Vec<String> = controller
            .due_words()
            .unwrap()
            .into_iter()
            .map(|w| w.word_id)
            .collect();
        assert_eq!(due, vec!["a1".to_string()]);

        controller.set_clock(now() + Duration::hours(13));
        assert_eq!(controller.due_words().unwrap().len(), 2);
        assert_eq!(controller.review_stats().unwrap().due_words, 2);
    }

    #[test]
    fn test_history_validation() {
        let mut controller = create_test_controller();
        controller
            .update_quiz_progress(QuizResult::new(12, 90.0, now()))
            .unwrap();
        controller
            .update_quiz_progress(QuizResult::new(1, f64::NAN, now()))
            .unwrap();
        controller
            .update_reading_progress(ReadingResult::new(0, true, now()))
            .unwrap();
        controller
            .update_jlpt_progress(JlptResult::new(JlptLevel::N5, f64::INFINITY, now()))
            .unwrap();

        let progress = controller.progress().unwrap();
        assert!(progress.quiz_history.is_empty());
        assert!(progress.reading_practice.is_empty());
        assert!(progress.jlpt_tests.is_empty());

        controller
            .update_jlpt_progress(JlptResult::new(JlptLevel::N5, 72.0, now()))
            .unwrap();
        controller
            .update_reading_progress(ReadingResult::new(3, true, now()))
            .unwrap();
        let progress = controller.progress().unwrap();
        assert_eq!(progress.jlpt_tests.len(), 1);
        assert_eq!(progress.reading_practice.len(), 1);
    }

    #[test]
    fn test_quiz_completes_ready_level() {
        let mut controller = create_test_controller();
        for i in 0..4 {
            master(&mut controller, &format!("a{}", i));
        }
        controller
            .update_quiz_progress(QuizResult::new(1, 95.0, now()))
            .unwrap();
        assert!(!controller.get_level_progress(1).unwrap().completed);

        controller
            .update_quiz_progress(QuizResult::new(1, 80.0, now()))
            .unwrap();
        assert!(controller.get_level_progress(1).unwrap().completed);
    }

    #[test]
    fn test_total_score_sums_unlocked_levels() {
        let mut controller = create_test_controller();
        master(&mut controller, "a0");
        let progress = controller.progress().unwrap();
        let level_one = progress.level(1).unwrap().score;
        assert!(level_one > 0.0);
        assert_eq!(progress.total_score, level_one);
        assert_eq!(progress.last_updated, now());
    }

    #[test]
    fn test_save_and_restore_through_file() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(temp.path());

        let mut controller = create_test_controller();
        complete_level_one(&mut controller);
        controller.save(&store).unwrap();
        let saved = controller.progress().unwrap().clone();

        let mut restored =
            LevelController::new(test_catalog(), Settings::default()).with_clock(now());
        assert_eq!(restored.load(&store), LoadSource::Restored);
        assert_eq!(restored.progress().unwrap(), &saved);
        assert!(restored.get_level_progress(1).unwrap().completed);
    }
}
