use anyhow::Result;
use chrono::Utc;

use kotoba_lib::srs::format_interval;

use crate::app::App;
use crate::render::terminal::{dim, paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, level: Option<u8>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let level = app.resolve_level(level)?;
    let words = app.controller.catalog().words_for_level(level);
    let progress = app.controller.progress()?;
    let now = Utc::now();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = words
                .iter()
                .map(|word| {
                    serde_json::json!({
                        "word": word,
                        "progress": progress.word(&word.id),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if words.is_empty() {
                println!("No words at level {}.", level);
                return Ok(());
            }

            let id_width = words.iter().map(|w| w.id.len()).max().unwrap_or(2).max(2);

            println!(
                "{:<iw$} {:<14} {:<20} {:>7} {:>4}  {}",
                "Id", "Romaji", "English", "Score", "Tier", "Next",
                iw = id_width
            );
            println!("{}", "\u{2500}".repeat(id_width + 60));

            for word in words {
                let (score, tier, next, mastered) = match progress.word(&word.id) {
                    Some(p) => {
                        let next = if p.is_due(now) {
                            "due".to_string()
                        } else {
                            format_interval(p.next_review_date - now)
                        };
                        (
                            format!("{}/{}", p.correct_attempts, p.incorrect_attempts),
                            p.mastery_level.to_string(),
                            next,
                            p.mastered,
                        )
                    }
                    None => ("-".to_string(), "-".to_string(), "new".to_string(), false),
                };

                let id = if mastered {
                    paint(&format!("{:<iw$}", word.id, iw = id_width), Color::GREEN, use_color)
                } else {
                    format!("{:<iw$}", word.id, iw = id_width)
                };
                println!(
                    "{} {:<14} {:<20} {:>7} {:>4}  {}",
                    id, word.romaji, word.english, score, tier, next
                );
                println!("{}", dim(&format!("{:<iw$} {}", "", word.japanese, iw = id_width), use_color));
            }

            let mastered = words
                .iter()
                .filter(|w| progress.word(&w.id).map_or(false, |p| p.mastered))
                .count();
            println!("\n{} of {} words mastered", mastered, words.len());
        }
    }

    Ok(())
}
