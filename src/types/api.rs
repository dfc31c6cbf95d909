//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::adjust::Adjustment;
use crate::features::{AudioFeatures, FeatureDelta, FeatureKey};
use crate::mood::{Mood, MoodPrediction, PredictionSource};

pub use crate::curator::{CurationStatus, PlaylistResult as PlaylistResponse, TrackSummary};

/// Request to detect the mood of free text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectMoodRequest {
    pub text: String,
}

/// Detected mood.
///
/// `source` plays the role of the curation status tag for this endpoint:
/// `model` is a success, `unavailable` is a fallback (random mood at 0.5)
/// and `error` is the error tier (happy at 0.0). [`Self::status`] gives the
/// same answer as a [`CurationStatus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectMoodResponse {
    pub mood: Mood,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
    pub source: PredictionSource,
}

impl DetectMoodResponse {
    pub fn status(&self) -> CurationStatus {
        match self.source {
            PredictionSource::Model => CurationStatus::Success,
            PredictionSource::Unavailable => CurationStatus::Fallback,
            PredictionSource::Error => CurationStatus::Error,
        }
    }
}

impl From<MoodPrediction> for DetectMoodResponse {
    fn from(prediction: MoodPrediction) -> Self {
        Self {
            mood: prediction.mood,
            confidence: prediction.confidence,
            source: prediction.source,
        }
    }
}

/// Request to build a new playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePlaylistRequest {
    /// Mood name; unknown names are treated as `happy`
    pub mood: String,
    /// Playlist name (default: "<Mood> Mood Playlist")
    #[serde(default)]
    pub name: Option<String>,
    /// Number of tracks (default from config)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Request to adjust an existing playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyPlaylistRequest {
    pub playlist_id: String,
    /// Free-text adjustment, e.g. "more energetic" or "something to dance to"
    pub adjustment: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One signed change to a feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureChange {
    pub feature: FeatureKey,
    pub delta: f64,
}

fn changes(delta: &FeatureDelta) -> Vec<FeatureChange> {
    delta
        .iter()
        .map(|(feature, delta)| FeatureChange { feature, delta })
        .collect()
}

/// Request to resolve free text to an adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveAdjustmentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentInfo {
    pub adjustment: Adjustment,
    pub changes: Vec<FeatureChange>,
}

impl AdjustmentInfo {
    pub fn new(adjustment: Adjustment, delta: &FeatureDelta) -> Self {
        Self {
            adjustment,
            changes: changes(delta),
        }
    }
}

/// Response listing every known adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAdjustmentsResponse {
    pub adjustments: Vec<AdjustmentInfo>,
}

/// Mood definition with its feature targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodInfo {
    pub mood: Mood,
    pub name: String,
    pub features: AudioFeatures,
}

/// Response listing every mood
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMoodsResponse {
    pub moods: Vec<MoodInfo>,
    pub total: usize,
}
