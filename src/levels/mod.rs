//! Level rules, mastery aggregation and requirement checks

pub mod definitions;
pub mod mastery;
pub mod requirements;

pub use definitions::{
    all_definitions, LevelDefinition, RequiredWordMastery, Requirement, RequirementType,
};
pub use mastery::{calculate_word_mastery, MasteryCache, WordMasteryStatus};
pub use requirements::{
    can_advance, evaluate_level, evaluate_with_mastery, LevelEvaluation, RequirementProgress,
};
