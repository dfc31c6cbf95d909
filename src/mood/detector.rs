//! Mood detection from free text.
//!
//! Wraps the optional emotion backend and degrades instead of failing:
//! - no backend configured: a random mood with confidence 0.5
//! - backend error during the call: `Happy` with confidence 0.0

use std::sync::Arc;

use tracing::{error, warn};

use super::{Mood, MoodPrediction, MoodTaxonomy, PredictionSource};
use crate::inference::EmotionBackend;

/// Confidence reported when no classifier is available
const UNAVAILABLE_CONFIDENCE: f32 = 0.5;

/// Input validation failure for user text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Input text cannot be empty")]
    EmptyText,
}

/// Non-blank, trimmed user text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserText(String);

impl UserText {
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::EmptyText);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Emotion classifier adapter
#[derive(Clone)]
pub struct MoodDetector {
    backend: Option<Arc<dyn EmotionBackend>>,
    taxonomy: Arc<MoodTaxonomy>,
}

impl MoodDetector {
    pub fn new(backend: Option<Arc<dyn EmotionBackend>>, taxonomy: Arc<MoodTaxonomy>) -> Self {
        Self { backend, taxonomy }
    }

    /// Whether a classifier backend is configured
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.backend.as_deref().map(|b| b.model_name())
    }

    /// Predict the mood expressed by `text`. Never fails.
    pub async fn detect(&self, text: &UserText) -> MoodPrediction {
        let Some(backend) = self.backend.as_ref() else {
            let mood = Mood::random();
            warn!(%mood, "Emotion classifier not available, using random mood");
            return MoodPrediction {
                mood,
                confidence: UNAVAILABLE_CONFIDENCE,
                source: PredictionSource::Unavailable,
            };
        };

        match backend.classify(text.as_str()).await {
            Ok(score) => MoodPrediction {
                mood: self.taxonomy.mood_for_label(&score.label),
                confidence: score.score.clamp(0.0, 1.0),
                source: PredictionSource::Model,
            },
            Err(e) => {
                error!(error = %e, "Error predicting mood");
                MoodPrediction {
                    mood: Mood::Happy,
                    confidence: 0.0,
                    source: PredictionSource::Error,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{ClassifierError, EmotionScore};
    use async_trait::async_trait;

    struct FixedBackend(&'static str, f32);

    #[async_trait]
    impl EmotionBackend for FixedBackend {
        async fn classify(&self, _text: &str) -> Result<EmotionScore, ClassifierError> {
            Ok(EmotionScore {
                label: self.0.to_string(),
                score: self.1,
            })
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl EmotionBackend for FailingBackend {
        async fn classify(&self, _text: &str) -> Result<EmotionScore, ClassifierError> {
            Err(ClassifierError::Transport("connection reset".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    fn detector(backend: Option<Arc<dyn EmotionBackend>>) -> MoodDetector {
        MoodDetector::new(backend, Arc::new(MoodTaxonomy::standard()))
    }

    fn text(s: &str) -> UserText {
        UserText::parse(s).unwrap()
    }

    #[test]
    fn test_user_text_rejects_blank() {
        assert_eq!(UserText::parse(""), Err(InputError::EmptyText));
        assert_eq!(UserText::parse("   \n\t"), Err(InputError::EmptyText));
        assert_eq!(UserText::parse("  hi  ").unwrap().as_str(), "hi");
    }

    #[tokio::test]
    async fn test_model_label_is_mapped() {
        let detector = detector(Some(Arc::new(FixedBackend("sadness", 0.91))));
        let prediction = detector.detect(&text("rainy monday")).await;

        assert_eq!(prediction.mood, Mood::Sad);
        assert!((prediction.confidence - 0.91).abs() < 1e-6);
        assert_eq!(prediction.source, PredictionSource::Model);
    }

    #[tokio::test]
    async fn test_unknown_label_maps_to_happy() {
        let detector = detector(Some(Arc::new(FixedBackend("neutral", 0.6))));
        let prediction = detector.detect(&text("ok i guess")).await;
        assert_eq!(prediction.mood, Mood::Happy);
    }

    #[tokio::test]
    async fn test_unavailable_backend_picks_random_mood() {
        let detector = detector(None);
        assert!(!detector.is_available());

        let prediction = detector.detect(&text("anything")).await;
        assert!(Mood::ALL.contains(&prediction.mood));
        assert_eq!(prediction.confidence, 0.5);
        assert_eq!(prediction.source, PredictionSource::Unavailable);
    }

    #[tokio::test]
    async fn test_backend_error_yields_happy_zero_confidence() {
        let detector = detector(Some(Arc::new(FailingBackend)));
        let prediction = detector.detect(&text("anything")).await;

        assert_eq!(prediction.mood, Mood::Happy);
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.source, PredictionSource::Error);
    }
}
