use anyhow::{bail, Result};
use chrono::Utc;

use kotoba_lib::catalog::JlptLevel;
use kotoba_lib::levels::requirements::{JLPT_PASSING_SCORE, QUIZ_PASSING_SCORE};
use kotoba_lib::progress::{JlptResult, QuizResult, ReadingResult};

use super::print_milestones;
use crate::app::App;
use crate::render::terminal::{paint, requirement_line, Color};
use crate::OutputFormat;

fn check_score(score: f64) -> Result<()> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        bail!("Score must be between 0 and 100");
    }
    Ok(())
}

pub fn run_quiz(
    app: &mut App,
    level: u8,
    score: f64,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let level = app.resolve_level(Some(level))?;
    check_score(score)?;

    let result = QuizResult::new(level, score, Utc::now());
    app.controller.update_quiz_progress(result.clone())?;
    app.save()?;

    let passed = score >= QUIZ_PASSING_SCORE;
    print_recorded(app, "Quiz", serde_json::json!(result), passed, format, use_color)
}

pub fn run_jlpt(
    app: &mut App,
    tier: JlptLevel,
    score: f64,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    check_score(score)?;

    let result = JlptResult::new(tier, score, Utc::now());
    app.controller.update_jlpt_progress(result.clone())?;
    app.save()?;

    let passed = score >= JLPT_PASSING_SCORE;
    print_recorded(app, "JLPT mock test", serde_json::json!(result), passed, format, use_color)
}

pub fn run_reading(
    app: &mut App,
    level: u8,
    completed: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let level = app.resolve_level(Some(level))?;

    let result = ReadingResult::new(level, completed, Utc::now());
    app.controller.update_reading_progress(result.clone())?;
    app.save()?;

    print_recorded(app, "Reading", serde_json::json!(result), completed, format, use_color)
}

/// Show the recorded entry and where the current level stands now
fn print_recorded(
    app: &App,
    what: &str,
    entry: serde_json::Value,
    passed: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let current = app.current_level()?;
    let evaluation = app.controller.evaluate_level(current)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "recorded": entry,
                "passed": passed,
                "currentLevel": evaluation,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let verdict = if passed {
                paint("passed", Color::GREEN, use_color)
            } else {
                paint("not passed", Color::RED, use_color)
            };
            println!("{} recorded: {}", what, verdict);
            println!("Level {} requirements:", current);
            for requirement in &evaluation.requirements {
                println!("  {}", requirement_line(requirement, use_color));
            }
            if app.controller.get_level_progress(current)?.completed {
                println!("Level {} is complete.", current);
            }
            print_milestones(&app.new_milestones(), use_color);
        }
    }

    Ok(())
}
