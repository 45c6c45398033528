use anyhow::Result;

use kotoba_lib::catalog::Word;
use kotoba_lib::progress::WordProgress;
use kotoba_lib::srs::format_interval;

use super::print_milestones;
use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run_answer(
    app: &mut App,
    query: &str,
    is_correct: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let word = app.find_word(query)?;
    let updated = app.controller.update_word_progress(&word.id, is_correct)?;
    app.save()?;

    match format {
        OutputFormat::Json => print_json(&word, &updated)?,
        OutputFormat::Plain => {
            print_verdict(&word, is_correct, use_color);
            println!(
                "  {} correct, {} wrong{}",
                updated.correct_attempts,
                updated.incorrect_attempts,
                if updated.mastered { ", mastered" } else { "" }
            );
            print_milestones(&app.new_milestones(), use_color);
        }
    }

    Ok(())
}

pub fn run_review(
    app: &mut App,
    query: &str,
    is_correct: bool,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let word = app.find_word(query)?;
    let reviewed = app.controller.handle_review(&word.id, is_correct)?;
    app.save()?;

    match format {
        OutputFormat::Json => print_json(&word, &reviewed)?,
        OutputFormat::Plain => {
            print_verdict(&word, is_correct, use_color);
            let wait = reviewed.next_review_date - reviewed.last_practiced;
            println!(
                "  tier {}, next review in {}",
                reviewed.mastery_level,
                format_interval(wait)
            );
            print_milestones(&app.new_milestones(), use_color);
        }
    }

    Ok(())
}

fn print_verdict(word: &Word, is_correct: bool, use_color: bool) {
    let verdict = if is_correct {
        paint("correct", Color::GREEN, use_color)
    } else {
        paint("wrong", Color::RED, use_color)
    };
    println!("{} ({}, {}): {}", word.japanese, word.romaji, word.english, verdict);
}

fn print_json(word: &Word, progress: &WordProgress) -> Result<()> {
    let output = serde_json::json!({
        "word": word,
        "progress": progress,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
