//! Mood vocabulary and emotion-to-mood detection.
//!
//! Free text is classified by an external emotion model; the raw emotion
//! label is then folded onto one of five moods, each of which carries a
//! fixed audio feature target used to query the catalog.

pub mod detector;
pub mod taxonomy;

pub use detector::{InputError, MoodDetector, UserText};
pub use taxonomy::{MoodTaxonomy, EMOTION_LABELS};

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of moods a playlist can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
    Focused,
}

impl Mood {
    /// All moods, in taxonomy order
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Energetic,
        Mood::Calm,
        Mood::Focused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Energetic => "energetic",
            Mood::Calm => "calm",
            Mood::Focused => "focused",
        }
    }

    /// Capitalized name, used in generated playlist titles
    pub fn display_name(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Energetic => "Energetic",
            Mood::Calm => "Calm",
            Mood::Focused => "Focused",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a mood name, defaulting to `Happy` for anything unrecognized
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or(Mood::Happy)
    }

    /// Uniformly random mood
    pub fn random() -> Self {
        Self::ALL
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(Mood::Happy)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mood name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood: {0}")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

/// Where a mood prediction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// The classifier answered
    Model,
    /// No classifier was available; the mood was picked at random
    Unavailable,
    /// The classifier failed during the call
    Error,
}

/// Result of mood detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodPrediction {
    pub mood: Mood,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
    pub source: PredictionSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_display() {
        assert_eq!(Mood::Energetic.to_string(), "energetic");
        assert_eq!(Mood::Focused.display_name(), "Focused");
    }

    #[test]
    fn test_mood_parse() {
        assert_eq!("calm".parse::<Mood>().unwrap(), Mood::Calm);
        assert_eq!(" SAD ".parse::<Mood>().unwrap(), Mood::Sad);
        assert!("melancholic".parse::<Mood>().is_err());
    }

    #[test]
    fn test_unknown_mood_defaults_to_happy() {
        assert_eq!(Mood::from_name_or_default("grumpy"), Mood::Happy);
        assert_eq!(Mood::from_name_or_default("focused"), Mood::Focused);
    }

    #[test]
    fn test_index_matches_taxonomy_order() {
        for (i, mood) in Mood::ALL.iter().enumerate() {
            assert_eq!(mood.index(), i);
        }
    }

    #[test]
    fn test_random_mood_is_member() {
        for _ in 0..50 {
            assert!(Mood::ALL.contains(&Mood::random()));
        }
    }

    #[test]
    fn test_prediction_serialization() {
        let prediction = MoodPrediction {
            mood: Mood::Sad,
            confidence: 0.75,
            source: PredictionSource::Model,
        };

        let json = serde_json::to_string(&prediction).unwrap();
        assert!(json.contains("\"sad\""));
        assert!(json.contains("0.75"));
        assert!(json.contains("\"model\""));
    }
}
