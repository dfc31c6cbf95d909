//! Fixed mood taxonomy: audio feature targets per mood and the emotion
//! label table used to fold classifier output onto moods.

use super::Mood;
use crate::features::{AudioFeatures, Feature, FeatureKey};

// ============================================================================
// Emotion labels
// ============================================================================

/// Classifier emotion label -> mood. Labels not listed map to `Happy`.
pub const EMOTION_LABELS: [(&str, Mood); 6] = [
    ("joy", Mood::Happy),
    ("sadness", Mood::Sad),
    ("anger", Mood::Energetic),
    ("fear", Mood::Sad),
    ("love", Mood::Happy),
    ("surprise", Mood::Energetic),
];

// ============================================================================
// Feature targets
// ============================================================================

const HAPPY: [(FeatureKey, f64); 3] = [
    (FeatureKey::target(Feature::Valence), 0.8),
    (FeatureKey::target(Feature::Energy), 0.7),
    (FeatureKey::min(Feature::Valence), 0.6),
];

const SAD: [(FeatureKey, f64); 3] = [
    (FeatureKey::target(Feature::Valence), 0.3),
    (FeatureKey::target(Feature::Energy), 0.4),
    (FeatureKey::max(Feature::Valence), 0.4),
];

const ENERGETIC: [(FeatureKey, f64); 3] = [
    (FeatureKey::target(Feature::Energy), 0.9),
    (FeatureKey::min(Feature::Energy), 0.8),
    (FeatureKey::target(Feature::Tempo), 150.0),
];

const CALM: [(FeatureKey, f64); 3] = [
    (FeatureKey::target(Feature::Energy), 0.2),
    (FeatureKey::max(Feature::Energy), 0.3),
    (FeatureKey::target(Feature::Acousticness), 0.8),
];

const FOCUSED: [(FeatureKey, f64); 3] = [
    (FeatureKey::target(Feature::Energy), 0.5),
    (FeatureKey::target(Feature::Instrumentalness), 0.7),
    (FeatureKey::max(Feature::Speechiness), 0.1),
];

/// Immutable mood registry, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct MoodTaxonomy {
    /// Indexed by `Mood::index`
    targets: [AudioFeatures; 5],
    emotion_labels: Vec<(String, Mood)>,
}

impl MoodTaxonomy {
    /// The standard taxonomy
    pub fn standard() -> Self {
        let table = |pairs: &[(FeatureKey, f64)]| pairs.iter().copied().collect::<AudioFeatures>();

        Self {
            targets: [
                table(&HAPPY),
                table(&SAD),
                table(&ENERGETIC),
                table(&CALM),
                table(&FOCUSED),
            ],
            emotion_labels: EMOTION_LABELS
                .iter()
                .map(|(label, mood)| (label.to_string(), *mood))
                .collect(),
        }
    }

    /// Audio feature targets for `mood`. Returns a fresh copy each call.
    pub fn features_for(&self, mood: Mood) -> AudioFeatures {
        self.targets[mood.index()].clone()
    }

    /// Fold a raw classifier label onto a mood
    pub fn mood_for_label(&self, label: &str) -> Mood {
        self.emotion_labels
            .iter()
            .find(|(known, _)| known == label)
            .map(|(_, mood)| *mood)
            .unwrap_or(Mood::Happy)
    }

    /// First mood whose name appears in `text` (case-insensitive)
    pub fn mood_mentioned_in(&self, text: &str) -> Option<Mood> {
        let text = text.to_lowercase();
        Mood::ALL.into_iter().find(|m| text.contains(m.as_str()))
    }
}
