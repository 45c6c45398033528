//! Data models for the vocabulary catalog

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// First level of the curriculum
pub const MIN_LEVEL: u8 = 1;
/// Last level of the curriculum
pub const MAX_LEVEL: u8 = 10;

/// Whether a level number belongs to the curriculum
pub fn is_valid_level(level: u8) -> bool {
    (MIN_LEVEL..=MAX_LEVEL).contains(&level)
}

/// JLPT proficiency tier, from N5 (easiest) to N1 (hardest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JlptLevel {
    N5,
    N4,
    N3,
    N2,
    N1,
}

impl JlptLevel {
    /// The JLPT tier a curriculum level prepares for.
    /// Two curriculum levels map onto each tier.
    pub fn for_level(level: u8) -> Option<Self> {
        match level {
            1 | 2 => Some(Self::N5),
            3 | 4 => Some(Self::N4),
            5 | 6 => Some(Self::N3),
            7 | 8 => Some(Self::N2),
            9 | 10 => Some(Self::N1),
            _ => None,
        }
    }
}

impl fmt::Display for JlptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::N5 => "N5",
            Self::N4 => "N4",
            Self::N3 => "N3",
            Self::N2 => "N2",
            Self::N1 => "N1",
        };
        f.write_str(name)
    }
}

impl FromStr for JlptLevel {
    type Err = String;

    /// Accepts `N5`, `n5` or a bare `5`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('N')
            .or_else(|| trimmed.strip_prefix('n'))
            .unwrap_or(trimmed);
        match digits {
            "5" => Ok(Self::N5),
            "4" => Ok(Self::N4),
            "3" => Ok(Self::N3),
            "2" => Ok(Self::N2),
            "1" => Ok(Self::N1),
            _ => Err(format!("Unknown JLPT level '{}' (expected N5..N1)", s)),
        }
    }
}

fn default_difficulty() -> u8 {
    1
}

/// A vocabulary item. Immutable once loaded from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub japanese: String,
    pub english: String,
    pub romaji: String,
    /// Curriculum level (1-10)
    pub level: u8,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jlpt_level: Option<JlptLevel>,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
}
