//! Learner progress
//!
//! This module provides:
//! - The persisted progress aggregate and its records
//! - Progress stores (JSON file, in-memory)
//! - The level progression controller
//! - Events emitted after every progress transition

pub mod controller;
pub mod events;
pub mod models;
pub mod storage;

pub use controller::{
    AdvanceOutcome, Clock, CurrentLevelData, LevelController, LoadSource, SystemClock,
};
pub use events::{EventLog, ProgressEvent, ProgressListener};
pub use models::*;
pub use storage::{JsonFileStore, MemoryStore, ProgressError, ProgressStore, Result};
