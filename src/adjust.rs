//! Playlist adjustments.
//!
//! Listener feedback ("make it more upbeat", "no vocals please") is resolved
//! to one of a fixed set of named adjustments, each of which carries a
//! signed delta over the audio feature vector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::features::{AudioFeatures, Feature, FeatureDelta, FeatureKey};

/// Named adjustment a listener can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Adjustment {
    #[serde(rename = "more energetic")]
    MoreEnergetic,
    #[serde(rename = "less energetic")]
    LessEnergetic,
    #[serde(rename = "happier")]
    Happier,
    #[serde(rename = "more acoustic")]
    MoreAcoustic,
    #[serde(rename = "more danceable")]
    MoreDanceable,
    #[serde(rename = "more instrumental")]
    MoreInstrumental,
    #[serde(rename = "more calm")]
    MoreCalm,
}

impl Adjustment {
    /// All adjustments, in table order. Exact-phrase matching follows this order.
    pub const ALL: [Adjustment; 7] = [
        Adjustment::MoreEnergetic,
        Adjustment::LessEnergetic,
        Adjustment::Happier,
        Adjustment::MoreAcoustic,
        Adjustment::MoreDanceable,
        Adjustment::MoreInstrumental,
        Adjustment::MoreCalm,
    ];

    pub fn phrase(&self) -> &'static str {
        match self {
            Adjustment::MoreEnergetic => "more energetic",
            Adjustment::LessEnergetic => "less energetic",
            Adjustment::Happier => "happier",
            Adjustment::MoreAcoustic => "more acoustic",
            Adjustment::MoreDanceable => "more danceable",
            Adjustment::MoreInstrumental => "more instrumental",
            Adjustment::MoreCalm => "more calm",
        }
    }

    fn standard_delta(&self) -> FeatureDelta {
        let target = FeatureKey::target;
        let changes = match self {
            Adjustment::MoreEnergetic => vec![(target(Feature::Energy), 0.2)],
            Adjustment::LessEnergetic => vec![(target(Feature::Energy), -0.2)],
            Adjustment::Happier => vec![(target(Feature::Valence), 0.2)],
            Adjustment::MoreAcoustic => vec![(target(Feature::Acousticness), 0.2)],
            Adjustment::MoreDanceable => vec![(target(Feature::Danceability), 0.2)],
            Adjustment::MoreInstrumental => vec![(target(Feature::Instrumentalness), 0.2)],
            Adjustment::MoreCalm => vec![
                (target(Feature::Energy), -0.3),
                (target(Feature::Tempo), -20.0),
            ],
        };
        FeatureDelta::new(changes)
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Error returned when a string is not an adjustment phrase
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown adjustment: {0}")]
pub struct UnknownAdjustment(pub String);

impl FromStr for Adjustment {
    type Err = UnknownAdjustment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Adjustment::ALL
            .into_iter()
            .find(|a| a.phrase() == normalized)
            .ok_or_else(|| UnknownAdjustment(s.to_string()))
    }
}

// ============================================================================
// Keyword heuristics, checked in priority order after exact phrases
// ============================================================================

const ENERGY_WORDS: &[&str] = &["energetic", "energy", "lively", "upbeat"];
const DECREASE_WORDS: &[&str] = &["less", "lower", "down"];
const HAPPY_WORDS: &[&str] = &["happy", "cheerful", "joyful"];
const ACOUSTIC_WORDS: &[&str] = &["acoustic", "unplugged"];
const DANCE_WORDS: &[&str] = &["dance", "groove", "rhythm"];
const INSTRUMENTAL_WORDS: &[&str] = &["instrumental", "no vocals", "no singing"];
const CALM_WORDS: &[&str] = &["calm", "relaxing", "peaceful", "chill"];

/// Applied when feedback matches nothing
const DEFAULT_ADJUSTMENT: Adjustment = Adjustment::MoreEnergetic;

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Adjustment table plus the text resolver.
///
/// Built once at startup and shared; never mutated.
#[derive(Debug, Clone)]
pub struct AdjustmentEngine {
    table: Vec<(Adjustment, FeatureDelta)>,
}

impl AdjustmentEngine {
    /// Engine with the standard seven-entry table
    pub fn standard() -> Self {
        Self::with_table(
            Adjustment::ALL
                .into_iter()
                .map(|a| (a, a.standard_delta()))
                .collect(),
        )
    }

    /// Engine with a custom table. Adjustments absent from the table apply
    /// as a no-op.
    pub fn with_table(table: Vec<(Adjustment, FeatureDelta)>) -> Self {
        Self { table }
    }

    pub fn entries(&self) -> impl Iterator<Item = &(Adjustment, FeatureDelta)> {
        self.table.iter()
    }

    pub fn delta_for(&self, adjustment: Adjustment) -> Option<&FeatureDelta> {
        self.table
            .iter()
            .find(|(a, _)| *a == adjustment)
            .map(|(_, delta)| delta)
    }

    /// Resolve listener feedback to an adjustment. Total: every input,
    /// including the empty string, yields an adjustment.
    pub fn resolve(&self, free_text: &str) -> Adjustment {
        let text = free_text.trim().to_lowercase();

        if let Some((adjustment, _)) = self
            .table
            .iter()
            .find(|(a, _)| text.contains(a.phrase()))
        {
            return *adjustment;
        }

        if mentions_any(&text, ENERGY_WORDS) {
            if mentions_any(&text, DECREASE_WORDS) {
                Adjustment::LessEnergetic
            } else {
                Adjustment::MoreEnergetic
            }
        } else if mentions_any(&text, HAPPY_WORDS) {
            Adjustment::Happier
        } else if mentions_any(&text, ACOUSTIC_WORDS) {
            Adjustment::MoreAcoustic
        } else if mentions_any(&text, DANCE_WORDS) {
            Adjustment::MoreDanceable
        } else if mentions_any(&text, INSTRUMENTAL_WORDS) {
            Adjustment::MoreInstrumental
        } else if mentions_any(&text, CALM_WORDS) {
            Adjustment::MoreCalm
        } else {
            DEFAULT_ADJUSTMENT
        }
    }

    /// Apply `adjustment` to `base`, returning a new vector
    pub fn apply(&self, base: &AudioFeatures, adjustment: Adjustment) -> AudioFeatures {
        match self.delta_for(adjustment) {
            Some(delta) => base.merged(delta),
            None => base.clone(),
        }
    }

    /// Apply an adjustment given by its phrase; unknown phrases are a no-op
    pub fn apply_named(&self, base: &AudioFeatures, name: &str) -> AudioFeatures {
        match name.parse::<Adjustment>() {
            Ok(adjustment) => self.apply(base, adjustment),
            Err(_) => base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::{Mood, MoodTaxonomy};

    fn energy() -> FeatureKey {
        FeatureKey::target(Feature::Energy)
    }

    fn tempo() -> FeatureKey {
        FeatureKey::target(Feature::Tempo)
    }

    #[test]
    fn test_exact_phrase_wins_over_heuristics() {
        let engine = AdjustmentEngine::standard();
        assert_eq!(
            engine.resolve("I want something more energetic but less loud"),
            Adjustment::MoreEnergetic
        );
        assert_eq!(
            engine.resolve("please make it more danceable"),
            Adjustment::MoreDanceable
        );
        assert_eq!(engine.resolve("  HAPPIER please "), Adjustment::Happier);
    }

    #[test]
    fn test_exact_phrase_follows_table_order() {
        let engine = AdjustmentEngine::standard();
        // Both phrases present; "more energetic" comes first in the table
        assert_eq!(
            engine.resolve("less energetic, no wait, more energetic"),
            Adjustment::MoreEnergetic
        );
        assert_eq!(
            engine.resolve("a bit less energetic"),
            Adjustment::LessEnergetic
        );
    }

    #[test]
    fn test_heuristic_priority() {
        let engine = AdjustmentEngine::standard();
        assert_eq!(engine.resolve("more upbeat"), Adjustment::MoreEnergetic);
        assert_eq!(engine.resolve("turn the energy down"), Adjustment::LessEnergetic);
        assert_eq!(engine.resolve("something cheerful"), Adjustment::Happier);
        assert_eq!(engine.resolve("go unplugged"), Adjustment::MoreAcoustic);
        assert_eq!(engine.resolve("needs more groove"), Adjustment::MoreDanceable);
        assert_eq!(engine.resolve("no vocals"), Adjustment::MoreInstrumental);
        assert_eq!(engine.resolve("make it super chill and relaxing"), Adjustment::MoreCalm);
        // Energy words outrank everything else
        assert_eq!(engine.resolve("lively and happy"), Adjustment::MoreEnergetic);
    }

    #[test]
    fn test_resolve_is_total() {
        let engine = AdjustmentEngine::standard();
        assert_eq!(engine.resolve(""), Adjustment::MoreEnergetic);
        assert_eq!(engine.resolve("qwerty"), Adjustment::MoreEnergetic);
        assert!(Adjustment::ALL.contains(&engine.resolve("🎸🎸🎸")));
    }

    #[test]
    fn test_apply_clamps_upper_bound() {
        let engine = AdjustmentEngine::standard();
        let base = AudioFeatures::new().with(energy(), 0.9);

        let adjusted = engine.apply(&base, Adjustment::MoreEnergetic);
        assert_eq!(adjusted.get(energy()), Some(1.0));
        assert_eq!(adjusted.len(), 1);
    }

    #[test]
    fn test_apply_calm_on_empty_base() {
        let engine = AdjustmentEngine::standard();
        let adjusted = engine.apply(&AudioFeatures::new(), Adjustment::MoreCalm);

        assert_eq!(adjusted.get(energy()), Some(0.0));
        assert_eq!(adjusted.get(tempo()), Some(-20.0));
        assert_eq!(adjusted.len(), 2);
    }

    #[test]
    fn test_apply_does_not_mutate_base_and_is_deterministic() {
        let engine = AdjustmentEngine::standard();
        let base = MoodTaxonomy::standard().features_for(Mood::Energetic);

        let first = engine.apply(&base, Adjustment::MoreCalm);
        let second = engine.apply(&base, Adjustment::MoreCalm);

        assert_eq!(first, second);
        assert_eq!(base, MoodTaxonomy::standard().features_for(Mood::Energetic));
        assert_eq!(first.get(tempo()), Some(130.0));
    }

    #[test]
    fn test_chained_adjustments_stay_in_unit_range() {
        let engine = AdjustmentEngine::standard();
        let taxonomy = MoodTaxonomy::standard();

        for mood in Mood::ALL {
            for adjustment in Adjustment::ALL {
                let mut features = taxonomy.features_for(mood);
                for _ in 0..10 {
                    features = engine.apply(&features, adjustment);
                }
                for (key, value) in features.iter() {
                    if key.is_unit_bounded() {
                        assert!(
                            (0.0..=1.0).contains(&value),
                            "{key} = {value} after {adjustment} x10 on {mood}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_adjustment_missing_from_table_is_noop() {
        let engine = AdjustmentEngine::with_table(vec![(
            Adjustment::Happier,
            Adjustment::Happier.standard_delta(),
        )]);
        let base = AudioFeatures::new().with(energy(), 0.5);

        assert_eq!(engine.apply(&base, Adjustment::MoreEnergetic), base);
        assert_ne!(engine.apply(&base, Adjustment::Happier), base);
    }

    #[test]
    fn test_apply_named_unknown_is_noop() {
        let engine = AdjustmentEngine::standard();
        let base = AudioFeatures::new().with(energy(), 0.5);

        assert_eq!(engine.apply_named(&base, "more cowbell"), base);
        let adjusted = engine.apply_named(&base, "more energetic");
        assert!((adjusted.value_or_zero(energy()) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_adjustment_serializes_as_phrase() {
        let json = serde_json::to_string(&Adjustment::MoreInstrumental).unwrap();
        assert_eq!(json, "\"more instrumental\"");
        assert_eq!("More Calm".parse::<Adjustment>().unwrap(), Adjustment::MoreCalm);
    }
}
