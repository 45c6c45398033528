//! Level requirement evaluation
//!
//! Each requirement counts passing entries from one history:
//! - quiz: quizzes taken at the level scoring at least 80
//! - practice: mastered words of the level
//! - jlpt: mock tests of the level's JLPT tier scoring at least 70
//! - reading: completed reading exercises at the level
//!
//! A level can be completed once its word mastery meets requirements, every
//! requirement reached its target and the weighted score clears the bar.

use serde::{Deserialize, Serialize};

use super::definitions::{LevelDefinition, RequirementType};
use super::mastery::{calculate_word_mastery, WordMasteryStatus};
use crate::catalog::WordCatalog;
use crate::progress::UserProgress;

pub const QUIZ_PASSING_SCORE: f64 = 80.0;
pub const JLPT_PASSING_SCORE: f64 = 70.0;

const MASTERY_WEIGHT: f64 = 0.7;
const REQUIREMENT_WEIGHT: f64 = 0.3;

/// Progress towards one requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementProgress {
    #[serde(rename = "type")]
    pub requirement_type: RequirementType,
    pub target: u32,
    pub current: u32,
    pub completed: bool,
}

/// Full evaluation of a level against its definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEvaluation {
    pub level: u8,
    pub word_mastery: WordMasteryStatus,
    pub requirements: Vec<RequirementProgress>,
    pub score: f64,
    pub required_score: f64,
    pub completable: bool,
}

impl LevelEvaluation {
    /// Neutral evaluation for levels that do not exist
    pub fn empty(level: u8) -> Self {
        Self {
            level,
            word_mastery: WordMasteryStatus::default(),
            requirements: Vec::new(),
            score: 0.0,
            required_score: 0.0,
            completable: false,
        }
    }

    pub fn completed_requirements(&self) -> usize {
        self.requirements.iter().filter(|r| r.completed).count()
    }

    /// Requirements still short of their target
    pub fn outstanding(&self) -> impl Iterator<Item = &RequirementProgress> {
        self.requirements.iter().filter(|r| !r.completed)
    }
}

/// Passing entries counted towards one requirement kind.
/// `practice` is read from the precomputed mastery status.
pub fn requirement_current(
    requirement_type: RequirementType,
    definition: &LevelDefinition,
    mastery: &WordMasteryStatus,
    progress: &UserProgress,
) -> u32 {
    let level = definition.level;
    let count = match requirement_type {
        RequirementType::Quiz => progress
            .quiz_history
            .iter()
            .filter(|q| q.level == level && q.score >= QUIZ_PASSING_SCORE)
            .count(),
        RequirementType::Practice => return mastery.mastered_words,
        RequirementType::Jlpt => progress
            .jlpt_tests
            .iter()
            .filter(|t| t.level == definition.jlpt_level && t.score >= JLPT_PASSING_SCORE)
            .count(),
        RequirementType::Reading => progress
            .reading_practice
            .iter()
            .filter(|r| r.level == level && r.completed)
            .count(),
    };
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Progress of every requirement of a level
pub fn evaluate_requirements(
    definition: &LevelDefinition,
    mastery: &WordMasteryStatus,
    progress: &UserProgress,
) -> Vec<RequirementProgress> {
    definition
        .requirements
        .iter()
        .map(|requirement| {
            let current =
                requirement_current(requirement.requirement_type, definition, mastery, progress);
            RequirementProgress {
                requirement_type: requirement.requirement_type,
                target: requirement.target,
                current,
                completed: current >= requirement.target,
            }
        })
        .collect()
}

/// `0.7 * mastery % + 0.3 * completed requirement %`.
/// A level without requirements counts its requirement share as complete.
pub fn level_score(mastery_percentage: f64, requirements: &[RequirementProgress]) -> f64 {
    let requirement_percentage = if requirements.is_empty() {
        100.0
    } else {
        let completed = requirements.iter().filter(|r| r.completed).count();
        completed as f64 / requirements.len() as f64 * 100.0
    };
    MASTERY_WEIGHT * mastery_percentage + REQUIREMENT_WEIGHT * requirement_percentage
}

/// Evaluate a level given an already computed mastery status
pub fn evaluate_with_mastery(
    definition: &LevelDefinition,
    mastery: WordMasteryStatus,
    progress: &UserProgress,
) -> LevelEvaluation {
    let requirements = evaluate_requirements(definition, &mastery, progress);
    let score = level_score(mastery.mastery_percentage, &requirements);
    let completable = mastery.meets_requirements
        && requirements.iter().all(|r| r.completed)
        && score >= definition.required_score;

    LevelEvaluation {
        level: definition.level,
        word_mastery: mastery,
        requirements,
        score,
        required_score: definition.required_score,
        completable,
    }
}

/// Evaluate a level from scratch. Out-of-range levels are neutral.
pub fn evaluate_level(
    level: u8,
    progress: &UserProgress,
    catalog: &dyn WordCatalog,
) -> LevelEvaluation {
    match LevelDefinition::derive(level, catalog) {
        Some(definition) => {
            let mastery = calculate_word_mastery(level, progress, catalog);
            evaluate_with_mastery(&definition, mastery, progress)
        }
        None => LevelEvaluation::empty(level),
    }
}

/// Whether a level satisfies every completion condition
pub fn can_advance(level: u8, progress: &UserProgress, catalog: &dyn WordCatalog) -> bool {
    evaluate_level(level, progress, catalog).completable
}
