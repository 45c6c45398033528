//! Tiered spaced repetition scheduling
//!
//! Every word sits on a mastery tier from 0 to 5. A correct review promotes
//! it one tier, a wrong review demotes it one tier, and the next review is
//! scheduled after the interval belonging to the new tier.
//!
//! Default intervals:
//! - 0: 2 hours
//! - 1: 12 hours
//! - 2: 1 day
//! - 3: 3 days
//! - 4: 1 week
//! - 5: 2 weeks

use chrono::{DateTime, Duration, Utc};

use crate::progress::WordProgress;

/// Highest mastery tier
pub const MAX_MASTERY_LEVEL: u8 = 5;

/// Review interval per tier, in hours
pub const DEFAULT_INTERVAL_HOURS: [i64; 6] = [2, 12, 24, 72, 168, 336];

/// The default interval table as durations
pub fn default_intervals() -> [Duration; 6] {
    DEFAULT_INTERVAL_HOURS.map(Duration::hours)
}

/// Tier after a review: one up when correct, one down when wrong, clamped to 0..=5
pub fn next_mastery_level(current: u8, is_correct: bool) -> u8 {
    let current = current.min(MAX_MASTERY_LEVEL);
    if is_correct {
        (current + 1).min(MAX_MASTERY_LEVEL)
    } else {
        current.saturating_sub(1)
    }
}

/// Interval for a tier. Tiers past the end of the table use its last entry;
/// an empty table falls back to the defaults.
pub fn interval_for(level: u8, intervals: &[Duration]) -> Duration {
    if intervals.is_empty() {
        let defaults = default_intervals();
        return defaults[(level as usize).min(defaults.len() - 1)];
    }
    intervals[(level as usize).min(intervals.len() - 1)]
}

/// Compute the state of a word after one review.
///
/// Pure: the same `(progress, is_correct, now, intervals)` always yields the
/// same result, so reviews can be replayed.
pub fn schedule_review(
    progress: &WordProgress,
    is_correct: bool,
    now: DateTime<Utc>,
    intervals: &[Duration],
) -> WordProgress {
    let mastery_level = next_mastery_level(progress.mastery_level, is_correct);

    let mut next = progress.clone();
    next.mastery_level = mastery_level;
    next.next_review_date = now
        .checked_add_signed(interval_for(mastery_level, intervals))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    next.last_practiced = now;
    if is_correct {
        next.correct_attempts += 1;
    } else {
        next.incorrect_attempts += 1;
    }

    next
}

/// Offsets until the next review for a correct and for a wrong answer.
/// Used to show the learner what each answer would do.
pub fn preview_intervals(progress: &WordProgress, intervals: &[Duration]) -> (Duration, Duration) {
    let correct = interval_for(next_mastery_level(progress.mastery_level, true), intervals);
    let wrong = interval_for(next_mastery_level(progress.mastery_level, false), intervals);
    (correct, wrong)
}

/// Format an interval to a short human-readable string
pub fn format_interval(interval: Duration) -> String {
    let hours = interval.num_hours();
    if interval <= Duration::zero() {
        "now".to_string()
    } else if hours < 1 {
        format!("{}m", interval.num_minutes().max(1))
    } else if hours < 24 {
        format!("{}h", hours)
    } else {
        let days = interval.num_days();
        if days < 7 {
            format!("{}d", days)
        } else if days < 30 {
            format!("{}w", days / 7)
        } else if days < 365 {
            format!("{}mo", days / 30)
        } else {
            format!("{}y", days / 365)
        }
    }
}
