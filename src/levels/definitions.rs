//! Static level rules
//!
//! Definitions are derived once from the catalog: word-count dependent
//! values (minimum mastered words, practice target, categories) come from
//! the words of each level, everything else from fixed per-level tables.

use serde::{Deserialize, Serialize};

use crate::catalog::{is_valid_level, JlptLevel, WordCatalog, MAX_LEVEL, MIN_LEVEL};

/// Minimum share of a level's words that must be mastered, in percent
pub const MASTERY_THRESHOLD: f64 = 80.0;
/// Floor for the minimum mastered-word count on large levels
pub const MIN_WORDS_FLOOR: u32 = 20;

/// Score needed to complete each level, indexed by level - 1
const REQUIRED_SCORES: [f64; 10] = [70.0, 70.0, 75.0, 75.0, 80.0, 80.0, 85.0, 85.0, 90.0, 90.0];

/// Kind of activity a level requirement counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementType {
    Quiz,
    Practice,
    Jlpt,
    Reading,
}

impl RequirementType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Practice => "practice",
            Self::Jlpt => "jlpt",
            Self::Reading => "reading",
        }
    }
}

/// One requirement: reach `target` passing entries of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    #[serde(rename = "type")]
    pub requirement_type: RequirementType,
    pub target: u32,
}

impl Requirement {
    pub fn new(requirement_type: RequirementType, target: u32) -> Self {
        Self {
            requirement_type,
            target,
        }
    }
}

/// How many words of a level must be mastered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredWordMastery {
    pub min_words: u32,
    /// Percentage (0-100)
    pub mastery_threshold: f64,
}

impl RequiredWordMastery {
    /// Rule for a level holding `word_count` words:
    /// `min(count, max(20, count / 5))` words at 80 %
    pub fn for_word_count(word_count: usize) -> Self {
        let count = u32::try_from(word_count).unwrap_or(u32::MAX);
        Self {
            min_words: count.min(MIN_WORDS_FLOOR.max(count / 5)),
            mastery_threshold: MASTERY_THRESHOLD,
        }
    }
}

/// Everything needed to decide whether a level is complete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    pub level: u8,
    pub required_score: f64,
    pub jlpt_level: JlptLevel,
    pub practice_categories: Vec<String>,
    pub required_word_mastery: RequiredWordMastery,
    pub requirements: Vec<Requirement>,
}

impl LevelDefinition {
    /// Derive the definition of a level. `None` outside 1..=10.
    pub fn derive(level: u8, catalog: &dyn WordCatalog) -> Option<Self> {
        if !is_valid_level(level) {
            return None;
        }
        let jlpt_level = JlptLevel::for_level(level)?;
        let required_word_mastery =
            RequiredWordMastery::for_word_count(catalog.level_word_count(level));

        let quiz_target = if level <= 5 { 2 } else { 3 };
        let mut requirements = vec![
            Requirement::new(RequirementType::Quiz, quiz_target),
            Requirement::new(RequirementType::Practice, required_word_mastery.min_words),
        ];
        // The JLPT mock test closes out each tier
        if level % 2 == 0 {
            requirements.push(Requirement::new(RequirementType::Jlpt, 1));
        }
        match level {
            3..=6 => requirements.push(Requirement::new(RequirementType::Reading, 1)),
            7..=10 => requirements.push(Requirement::new(RequirementType::Reading, 2)),
            _ => {}
        }

        Some(Self {
            level,
            required_score: REQUIRED_SCORES[(level - MIN_LEVEL) as usize],
            jlpt_level,
            practice_categories: catalog.categories_for_level(level),
            required_word_mastery,
            requirements,
        })
    }

    pub fn requirement(&self, requirement_type: RequirementType) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|r| r.requirement_type == requirement_type)
    }
}

/// Definitions for every level, ascending
pub fn all_definitions(catalog: &dyn WordCatalog) -> Vec<LevelDefinition> {
    (MIN_LEVEL..=MAX_LEVEL)
        .filter_map(|level| LevelDefinition::derive(level, catalog))
        .collect()
}
