use anyhow::Result;

use kotoba_lib::srs::format_interval;

use crate::app::App;
use crate::render::terminal::{dim, heading, progress_bar, status_label};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let progress = app.controller.progress()?;
    let stats = app.controller.review_stats()?;
    let next_review = app.controller.next_review_at()?;

    match format {
        OutputFormat::Json => {
            let levels: Vec<serde_json::Value> = progress
                .levels
                .iter()
                .map(|level| {
                    serde_json::json!({
                        "level": level.level,
                        "status": level.status(),
                        "score": level.score,
                        "wordsMastered": level.words_mastered,
                        "totalWords": level.total_words,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "currentLevel": progress.current_level,
                "totalScore": progress.total_score,
                "canAdvance": app.controller.can_advance_level()?,
                "autoUnlock": app.config.progression.auto_unlock,
                "levels": levels,
                "reviews": stats,
                "nextReviewAt": next_review.map(|t| t.to_rfc3339()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{}",
                heading(&format!("Level {}", progress.current_level), use_color)
            );
            println!("Total score: {:.1}", progress.total_score);
            println!();

            for level in &progress.levels {
                let marker = if level.level == progress.current_level { "*" } else { " " };
                let mastery = app.controller.word_mastery(level.level)?;
                println!(
                    "{} {:>2}  {} {} {:>3}/{:<3} {:>5.1}",
                    marker,
                    level.level,
                    status_label(level.status(), use_color),
                    progress_bar(mastery.mastery_percentage, 20),
                    mastery.mastered_words,
                    mastery.total_words,
                    level.score,
                );
            }

            println!();
            println!(
                "Words: {} tracked, {} mastered, {} due",
                stats.tracked_words, stats.mastered_words, stats.due_words
            );
            if let Some(next) = next_review {
                let wait = next - chrono::Utc::now();
                if wait > chrono::Duration::zero() {
                    println!("{}", dim(&format!("Next review in {}", format_interval(wait)), use_color));
                }
            }
        }
    }

    Ok(())
}
