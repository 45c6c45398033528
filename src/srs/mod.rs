//! Spaced repetition for vocabulary review
//!
//! This module provides:
//! - The tiered review scheduler (tiers 0-5)
//! - Due-word queues and review statistics

pub mod algorithm;
pub mod queue;

pub use algorithm::{
    default_intervals, format_interval, preview_intervals, schedule_review,
    DEFAULT_INTERVAL_HOURS, MAX_MASTERY_LEVEL,
};
pub use queue::{due_words, due_words_for_level, next_review_at, review_stats, ReviewStats};
