//! Emotion classification backends.
//!
//! The service never runs the emotion model itself. It talks to a hosted
//! text-classification endpoint through the [`EmotionBackend`] trait so the
//! detector can be exercised with in-process fakes.

mod emotion;

pub use emotion::{HuggingFaceClassifier, HuggingFaceConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for classification calls
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier request failed: {0}")]
    Transport(String),

    #[error("Classifier returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed classifier response: {0}")]
    Malformed(String),

    #[error("Classifier returned no labels")]
    Empty,
}

/// Top label produced by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

/// Capability to classify the emotion of a piece of text
#[async_trait]
pub trait EmotionBackend: Send + Sync {
    /// Return the highest-scoring emotion label for `text`
    async fn classify(&self, text: &str) -> Result<EmotionScore, ClassifierError>;

    /// Identifier of the underlying model, for logs and health output
    fn model_name(&self) -> &str;
}
