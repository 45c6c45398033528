use anyhow::Result;

use kotoba_lib::progress::AdvanceOutcome;

use super::print_milestones;
use crate::app::App;
use crate::render::terminal::{heading, requirement_line};
use crate::OutputFormat;

pub fn run_unlock(app: &mut App, level: u8, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let level = app.resolve_level(Some(level))?;
    let unlocked = app.controller.unlock_level(level)?;
    if unlocked {
        app.save()?;
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "level": level,
                "unlocked": unlocked,
                "progress": app.controller.get_level_progress(level)?,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if unlocked {
                println!("Level {} unlocked.", level);
            } else {
                println!("Level {} was already unlocked.", level);
            }
        }
    }

    Ok(())
}

pub fn run_advance(app: &mut App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let outcome = app.controller.advance_level()?;
    if matches!(outcome, AdvanceOutcome::Advanced { .. }) {
        app.save()?;
    }

    match format {
        OutputFormat::Json => {
            let output = match &outcome {
                AdvanceOutcome::Advanced { from, to } => serde_json::json!({
                    "advanced": true,
                    "from": from,
                    "to": to,
                }),
                AdvanceOutcome::Blocked(evaluation) => serde_json::json!({
                    "advanced": false,
                    "reason": "blocked",
                    "evaluation": evaluation,
                }),
                AdvanceOutcome::AtFinalLevel => serde_json::json!({
                    "advanced": false,
                    "reason": "finalLevel",
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match &outcome {
            AdvanceOutcome::Advanced { from, to } => {
                println!("{}", heading(&format!("Level {} -> level {}", from, to), use_color));
                print_milestones(&app.new_milestones(), use_color);
            }
            AdvanceOutcome::Blocked(evaluation) => {
                println!(
                    "Level {} is not complete yet (score {:.1} of {:.0}, mastery {:.1}%).",
                    evaluation.level,
                    evaluation.score,
                    evaluation.required_score,
                    evaluation.word_mastery.mastery_percentage
                );
                for requirement in evaluation.outstanding() {
                    println!("  {}", requirement_line(requirement, use_color));
                }
            }
            AdvanceOutcome::AtFinalLevel => {
                println!("Already at the final level.");
            }
        },
    }

    Ok(())
}
