//! Events emitted after each progress transition
//!
//! Listeners see the event together with a shared borrow of the updated
//! aggregate, so they can read anything they need but never write back.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::UserProgress;
use crate::catalog::JlptLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ProgressEvent {
    /// A practice answer changed the coarse mastery counters
    WordAnswered {
        word_id: String,
        correct: bool,
        mastered: bool,
    },
    /// A spaced repetition review rescheduled a word
    WordReviewed {
        word_id: String,
        correct: bool,
        mastery_level: u8,
        next_review_date: DateTime<Utc>,
    },
    QuizRecorded {
        level: u8,
        score: f64,
        passed: bool,
    },
    JlptRecorded {
        level: JlptLevel,
        score: f64,
        passed: bool,
    },
    ReadingRecorded {
        level: u8,
        completed: bool,
    },
    LevelUnlocked {
        level: u8,
    },
    LevelCompleted {
        level: u8,
        score: f64,
    },
    LevelAdvanced {
        from: u8,
        to: u8,
    },
}

/// Consumer of progress events (achievements, quests, reminders)
pub trait ProgressListener {
    fn on_event(&mut self, event: &ProgressEvent, progress: &UserProgress);
}

/// Shared listeners stay readable by their owner after registration
impl<T: ProgressListener> ProgressListener for Arc<Mutex<T>> {
    fn on_event(&mut self, event: &ProgressEvent, progress: &UserProgress) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .on_event(event, progress);
    }
}

/// Listener that records every event in order
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<ProgressEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    /// Take every recorded event, leaving the log empty
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ProgressListener for EventLog {
    fn on_event(&mut self, event: &ProgressEvent, _progress: &UserProgress) {
        self.events.push(event.clone());
    }
}

/// Deliver events to every listener, in order
pub(crate) fn dispatch(
    listeners: &mut [Box<dyn ProgressListener + Send>],
    events: &[ProgressEvent],
    progress: &UserProgress,
) {
    for event in events {
        for listener in listeners.iter_mut() {
            listener.on_event(event, progress);
        }
    }
}
