use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the day felt. Every stored entry carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Lucky,
    Happy,
    Soso,
    Angry,
    Sad,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown mood: {0}")]
pub struct UnknownMood(pub String);

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Lucky, Mood::Happy, Mood::Soso, Mood::Angry, Mood::Sad];

    /// Lenient decode for persisted values. Missing or unrecognised input yields
    /// `Mood::default()` (`Lucky`) instead of an error.
    pub fn decode(raw: Option<&str>) -> Mood {
        match raw {
            Some(value) => value.parse().unwrap_or_else(|_| {
                log::warn!("unrecognised stored mood {:?}, using default", value);
                Mood::default()
            }),
            None => Mood::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Lucky => "lucky",
            Mood::Happy => "happy",
            Mood::Soso => "soso",
            Mood::Angry => "angry",
            Mood::Sad => "sad",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Mood::Lucky => "Lucky",
            Mood::Happy => "Happy",
            Mood::Soso => "Soso",
            Mood::Angry => "Angry",
            Mood::Sad => "Sad",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Mood::Lucky => Color::Green,
            Mood::Happy => Color::Yellow,
            Mood::Soso => Color::White,
            Mood::Angry => Color::Red,
            Mood::Sad => Color::Blue,
        }
    }
}

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lucky" => Ok(Mood::Lucky),
            "happy" => Ok(Mood::Happy),
            "soso" => Ok(Mood::Soso),
            "angry" => Ok(Mood::Angry),
            "sad" => Ok(Mood::Sad),
            _ => Err(UnknownMood(s.to_string())),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.title())
    }
}
