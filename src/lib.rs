//! Kotoba: level progression and spaced repetition for Japanese vocabulary

pub mod achievements;
pub mod catalog;
pub mod config;
pub mod levels;
pub mod progress;
pub mod srs;
