use anyhow::Result;

use kotoba_lib::srs::format_interval;

use crate::app::App;
use crate::render::terminal::dim;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let due = app.controller.due_words()?;
    let catalog = app.controller.catalog();

    match format {
        OutputFormat::Json => {
            let mut output = Vec::new();
            for progress in &due {
                let (correct, wrong) = app.controller.preview_review(&progress.word_id)?;
                output.push(serde_json::json!({
                    "progress": progress,
                    "word": catalog.word(&progress.word_id),
                    "ifCorrectHours": correct.num_hours(),
                    "ifWrongHours": wrong.num_hours(),
                }));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if due.is_empty() {
                println!("Nothing due for review.");
                if let Some(next) = app.controller.next_review_at()? {
                    println!("Next review at {}", next.format("%Y-%m-%d %H:%M UTC"));
                }
                return Ok(());
            }

            for progress in &due {
                let label = match catalog.word(&progress.word_id) {
                    Some(word) => format!("{} ({}, {})", word.japanese, word.romaji, word.english),
                    None => progress.word_id.clone(),
                };
                let (correct, wrong) = app.controller.preview_review(&progress.word_id)?;
                println!(
                    "{:<40} tier {}  {}",
                    label,
                    progress.mastery_level,
                    dim(
                        &format!("correct: {}, wrong: {}", format_interval(correct), format_interval(wrong)),
                        use_color
                    )
                );
            }
            println!("\n{} word(s) due", due.len());
        }
    }

    Ok(())
}
