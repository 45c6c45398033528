pub mod due;
pub mod level;
pub mod practice;
pub mod progression;
pub mod record;
pub mod status;
pub mod words;

use kotoba_lib::achievements::Milestone;

use crate::render::terminal::{highlight, paint, Color};

/// Announce milestones reached by the command that just ran
pub fn print_milestones(milestones: &[Milestone], use_color: bool) {
    for milestone in milestones {
        println!(
            "{} {}",
            paint("Achievement:", Color::YELLOW, use_color),
            highlight(milestone.title(), use_color)
        );
    }
}
