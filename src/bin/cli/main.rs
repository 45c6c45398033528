mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kotoba_lib::catalog::JlptLevel;

#[derive(Parser)]
#[command(name = "kotoba-cli", about = "Japanese vocabulary levels and reviews", version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Overview of every level and the review queue
    Status,

    /// Requirements and mastery of a level
    Level {
        /// Level number (default: current level)
        level: Option<u8>,
    },

    /// List the words of a level with their progress
    Words {
        /// Level number (default: current level)
        level: Option<u8>,
    },

    /// Record a practice answer for a word
    Answer {
        /// Word id, Japanese, romaji or English
        word: String,
        /// The answer was wrong
        #[arg(long)]
        wrong: bool,
    },

    /// Record a spaced repetition review for a word
    Review {
        /// Word id, Japanese, romaji or English
        word: String,
        /// The answer was wrong
        #[arg(long)]
        wrong: bool,
    },

    /// List words due for review
    Due,

    /// Record a quiz result
    Quiz {
        level: u8,
        /// Score in percent
        score: f64,
    },

    /// Record a JLPT mock test result
    Jlpt {
        /// JLPT tier (N5..N1)
        tier: JlptLevel,
        /// Score in percent
        score: f64,
    },

    /// Record a reading exercise
    Reading {
        level: u8,
        /// The exercise was not finished
        #[arg(long)]
        incomplete: bool,
    },

    /// Unlock a level
    Unlock { level: u8 },

    /// Move on to the next level
    Advance,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();

    let mut app = app::App::new(cli.config.as_deref())?;

    match cli.command {
        Command::Status => {
            commands::status::run(&app, &cli.format, use_color)?;
        }
        Command::Level { level } => {
            commands::level::run(&app, level, &cli.format, use_color)?;
        }
        Command::Words { level } => {
            commands::words::run(&app, level, &cli.format, use_color)?;
        }
        Command::Answer { word, wrong } => {
            commands::practice::run_answer(&mut app, &word, !wrong, &cli.format, use_color)?;
        }
        Command::Review { word, wrong } => {
            commands::practice::run_review(&mut app, &word, !wrong, &cli.format, use_color)?;
        }
        Command::Due => {
            commands::due::run(&app, &cli.format, use_color)?;
        }
        Command::Quiz { level, score } => {
            commands::record::run_quiz(&mut app, level, score, &cli.format, use_color)?;
        }
        Command::Jlpt { tier, score } => {
            commands::record::run_jlpt(&mut app, tier, score, &cli.format, use_color)?;
        }
        Command::Reading { level, incomplete } => {
            commands::record::run_reading(&mut app, level, !incomplete, &cli.format, use_color)?;
        }
        Command::Unlock { level } => {
            commands::progression::run_unlock(&mut app, level, &cli.format, use_color)?;
        }
        Command::Advance => {
            commands::progression::run_advance(&mut app, &cli.format, use_color)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
