use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{dim, heading, progress_bar, requirement_line, status_label};
use crate::OutputFormat;

pub fn run(app: &App, level: Option<u8>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let level = app.resolve_level(level)?;
    let record = app.controller.get_level_progress(level)?;
    let evaluation = app.controller.evaluate_level(level)?;
    let definition = app.controller.definition(level);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "level": level,
                "status": record.status(),
                "progress": record,
                "definition": definition,
                "evaluation": evaluation,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let title = match definition {
                Some(def) => format!("Level {} ({})", level, def.jlpt_level),
                None => format!("Level {}", level),
            };
            println!("{}  {}", heading(&title, use_color), status_label(record.status(), use_color));

            if let Some(def) = definition {
                if !def.practice_categories.is_empty() {
                    println!("{}", dim(&format!("Categories: {}", def.practice_categories.join(", ")), use_color));
                }
                println!(
                    "Needs {} of {} words mastered ({}%)",
                    def.required_word_mastery.min_words,
                    evaluation.word_mastery.total_words,
                    def.required_word_mastery.mastery_threshold
                );
            }

            let mastery = &evaluation.word_mastery;
            println!(
                "Mastery  {} {:.1}% ({}/{})",
                progress_bar(mastery.mastery_percentage, 20),
                mastery.mastery_percentage,
                mastery.mastered_words,
                mastery.total_words
            );
            println!(
                "Score    {} {:.1} / {:.0}",
                progress_bar(evaluation.score, 20),
                evaluation.score,
                evaluation.required_score
            );

            println!();
            for requirement in &evaluation.requirements {
                println!("  {}", requirement_line(requirement, use_color));
            }

            println!();
            if record.completed {
                if let Some(at) = record.completed_at {
                    println!("Completed {}", at.format("%Y-%m-%d"));
                }
            } else if evaluation.completable {
                println!("Ready to advance. Run `kotoba-cli advance`.");
            } else {
                println!("{} requirement(s) outstanding.", evaluation.outstanding().count());
            }
        }
    }

    Ok(())
}
