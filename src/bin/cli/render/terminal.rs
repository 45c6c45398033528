use kotoba_lib::levels::RequirementProgress;
use kotoba_lib::progress::LevelStatus;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap text in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Level status padded to a fixed width before coloring
pub fn status_label(status: LevelStatus, use_color: bool) -> String {
    let (label, color) = match status {
        LevelStatus::Locked => ("locked", Color::GRAY),
        LevelStatus::Unlocked => ("unlocked", Color::YELLOW),
        LevelStatus::Completed => ("completed", Color::GREEN),
    };
    paint(&format!("{:<9}", label), color, use_color)
}

/// Fixed-width bar for a percentage, e.g. `[#####.....]`
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let ratio = if percentage.is_finite() {
        (percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// One requirement as `[x] quiz 2/2`
pub fn requirement_line(requirement: &RequirementProgress, use_color: bool) -> String {
    let mark = if requirement.completed {
        paint("[x]", Color::GREEN, use_color)
    } else {
        paint("[ ]", Color::RED, use_color)
    };
    format!(
        "{} {:<9} {}/{}",
        mark,
        requirement.requirement_type.label(),
        requirement.current,
        requirement.target
    )
}

pub fn heading(text: &str, use_color: bool) -> String {
    paint(text, Color::BOLD, use_color)
}

pub fn dim(text: &str, use_color: bool) -> String {
    paint(text, Color::DIM, use_color)
}

pub fn highlight(text: &str, use_color: bool) -> String {
    paint(text, Color::CYAN, use_color)
}
