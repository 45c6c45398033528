//! Achievement counters fed by progress events
//!
//! The tracker never writes into [`UserProgress`]; it only reads the
//! aggregate handed to it alongside each event.

use serde::{Deserialize, Serialize};

use crate::catalog::MAX_LEVEL;
use crate::levels::requirements::{JLPT_PASSING_SCORE, QUIZ_PASSING_SCORE};
use crate::progress::{ProgressEvent, ProgressListener, UserProgress};

/// Running counters for achievement checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementProgress {
    /// Words currently flagged as mastered
    pub words_mastered: u32,
    pub reviews: u32,
    pub correct_reviews: u32,
    pub quizzes_passed: u32,
    pub jlpt_passed: u32,
    pub readings_completed: u32,
    pub levels_completed: u32,
    pub highest_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    FirstWordMastered,
    HundredWordsMastered,
    FirstReview,
    HundredReviews,
    FirstQuizPassed,
    FirstJlptPassed,
    FirstLevelCompleted,
    HalfwayThere,
    CurriculumComplete,
}

impl Milestone {
    pub fn title(&self) -> &'static str {
        match self {
            Self::FirstWordMastered => "First word mastered",
            Self::HundredWordsMastered => "100 words mastered",
            Self::FirstReview => "First review",
            Self::HundredReviews => "100 reviews",
            Self::FirstQuizPassed => "First quiz passed",
            Self::FirstJlptPassed => "First JLPT mock test passed",
            Self::FirstLevelCompleted => "First level completed",
            Self::HalfwayThere => "Reached level 5",
            Self::CurriculumComplete => "All levels completed",
        }
    }
}

impl AchievementProgress {
    /// Milestones reached so far, in declaration order
    pub fn reached_milestones(&self) -> Vec<Milestone> {
        let checks = [
            (Milestone::FirstWordMastered, self.words_mastered >= 1),
            (Milestone::HundredWordsMastered, self.words_mastered >= 100),
            (Milestone::FirstReview, self.reviews >= 1),
            (Milestone::HundredReviews, self.reviews >= 100),
            (Milestone::FirstQuizPassed, self.quizzes_passed >= 1),
            (Milestone::FirstJlptPassed, self.jlpt_passed >= 1),
            (Milestone::FirstLevelCompleted, self.levels_completed >= 1),
            (Milestone::HalfwayThere, self.highest_level >= 5),
            (
                Milestone::CurriculumComplete,
                self.levels_completed >= u32::from(MAX_LEVEL),
            ),
        ];
        checks
            .into_iter()
            .filter(|(_, reached)| *reached)
            .map(|(milestone, _)| milestone)
            .collect()
    }
}

/// Listener that keeps [`AchievementProgress`] current and remembers
/// milestones as they are reached
#[derive(Debug, Default)]
pub struct AchievementTracker {
    progress: AchievementProgress,
    unlocked: Vec<Milestone>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker seeded from an existing aggregate, so counters that can be
    /// read off the progress document start out right
    pub fn from_progress(progress: &UserProgress) -> Self {
        let mut tracker = Self::new();
        tracker.sync_from(progress);
        tracker.unlocked = tracker.progress.reached_milestones();
        tracker
    }

    pub fn progress(&self) -> &AchievementProgress {
        &self.progress
    }

    /// Milestones in the order they were reached
    pub fn milestones(&self) -> &[Milestone] {
        &self.unlocked
    }

    fn sync_from(&mut self, progress: &UserProgress) {
        let stats = &mut self.progress;
        stats.words_mastered = progress
            .word_progress
            .values()
            .filter(|w| w.mastered)
            .count() as u32;
        stats.levels_completed = progress.levels.iter().filter(|l| l.completed).count() as u32;
        stats.highest_level = stats.highest_level.max(progress.current_level);
        stats.quizzes_passed = stats.quizzes_passed.max(
            progress
                .quiz_history
                .iter()
                .filter(|q| q.score >= QUIZ_PASSING_SCORE)
                .count() as u32,
        );
        stats.jlpt_passed = stats.jlpt_passed.max(
            progress
                .jlpt_tests
                .iter()
                .filter(|t| t.score >= JLPT_PASSING_SCORE)
                .count() as u32,
        );
        stats.readings_completed = stats
            .readings_completed
            .max(progress.reading_practice.iter().filter(|r| r.completed).count() as u32);
    }

    fn record_new_milestones(&mut self) {
        for milestone in self.progress.reached_milestones() {
            if !self.unlocked.contains(&milestone) {
                log::info!("Achievement reached: {}", milestone.title());
                self.unlocked.push(milestone);
            }
        }
    }
}

impl ProgressListener for AchievementTracker {
    fn on_event(&mut self, event: &ProgressEvent, progress: &UserProgress) {
        if let ProgressEvent::WordReviewed { correct, .. } = event {
            self.progress.reviews += 1;
            if *correct {
                self.progress.correct_reviews += 1;
            }
        }
        self.sync_from(progress);
        self.record_new_milestones();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{StaticCatalog, Word, WordCatalog};
    use crate::config::Settings;
    use crate::progress::{LevelController, MemoryStore, QuizResult};
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 14, 18, 0, 0).unwrap()
    }

    fn controller_with_tracker() -> (LevelController, Arc<Mutex<AchievementTracker>>) {
        let words = (0..4)
            .map(|i| Word {
                id: format!("w{}", i),
                japanese: String::new(),
                english: String::new(),
                romaji: String::new(),
                level: 1,
                category: "greetings".to_string(),
                jlpt_level: None,
                difficulty: 1,
            })
            .collect();
        let catalog: Arc<dyn WordCatalog> = Arc::new(StaticCatalog::new(words));
        let mut controller = LevelController::new(catalog, Settings::default()).with_clock(now());
        controller.load(&MemoryStore::new());

        let tracker = Arc::new(Mutex::new(AchievementTracker::new()));
        controller.add_listener(tracker.clone());
        (controller, tracker)
    }

    #[test]
    fn test_counts_reviews_and_mastery() {
        let (mut controller, tracker) = controller_with_tracker();
        controller.handle_review("w0", true).unwrap();
        controller.handle_review("w0", false).unwrap();
        for _ in 0..5 {
            controller.update_word_progress("w1", true).unwrap();
        }

        let tracker = tracker.lock().unwrap();
        let stats = tracker.progress();
        assert_eq!(stats.reviews, 2);
        assert_eq!(stats.correct_reviews, 1);
        assert_eq!(stats.words_mastered, 1);
        assert_eq!(
            tracker.milestones(),
            &[Milestone::FirstReview, Milestone::FirstWordMastered]
        );
    }

    #[test]
    fn test_level_completion_milestone() {
        let (mut controller, tracker) = controller_with_tracker();
        for i in 0..4 {
            for _ in 0..5 {
                controller.update_word_progress(&format!("w{}", i), true).unwrap();
            }
        }
        controller.update_quiz_progress(QuizResult::new(1, 90.0, now())).unwrap();
        controller.update_quiz_progress(QuizResult::new(1, 60.0, now())).unwrap();
        controller.update_quiz_progress(QuizResult::new(1, 81.0, now())).unwrap();

        let tracker = tracker.lock().unwrap();
        assert_eq!(tracker.progress().quizzes_passed, 2);
        assert_eq!(tracker.progress().levels_completed, 1);
        assert!(tracker.milestones().contains(&Milestone::FirstLevelCompleted));
        assert!(tracker.milestones().contains(&Milestone::FirstQuizPassed));
        assert!(!tracker.milestones().contains(&Milestone::HalfwayThere));
    }

    #[test]
    fn test_seed_from_progress() {
        let mut progress = UserProgress::new(now());
        progress.current_level = 6;
        progress.level_mut(1).unwrap().completed = true;
        progress.word_entry("x", now()).mastered = true;

        let tracker = AchievementTracker::from_progress(&progress);
        assert_eq!(tracker.progress().highest_level, 6);
        assert_eq!(tracker.progress().levels_completed, 1);
        assert_eq!(
            tracker.milestones(),
            &[
                Milestone::FirstWordMastered,
                Milestone::FirstLevelCompleted,
                Milestone::HalfwayThere
            ]
        );
    }
}
