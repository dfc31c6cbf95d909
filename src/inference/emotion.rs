//! Hosted text-classification backend (Hugging Face inference API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ClassifierError, EmotionBackend, EmotionScore};

/// Connection settings for the hosted classifier
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    /// Base URL; the model id is appended as a path segment
    pub endpoint: String,
    /// Model id, e.g. `bhadresh-savani/distilbert-base-uncased-emotion`
    pub model: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

/// The API nests results per input for single-string requests, but older
/// deployments return a flat list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<EmotionScore>>),
    Flat(Vec<EmotionScore>),
}

impl ClassifyResponse {
    fn top(self) -> Option<EmotionScore> {
        let scores = match self {
            Self::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            Self::Flat(scores) => scores,
        };
        scores
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    }
}

/// Emotion classifier backed by a hosted inference endpoint
#[derive(Debug, Clone)]
pub struct HuggingFaceClassifier {
    client: Client,
    url: String,
    model: String,
    api_token: Option<String>,
}

impl HuggingFaceClassifier {
    /// Build the HTTP client. Fails only if the TLS backend cannot be set up.
    pub fn new(config: HuggingFaceConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .user_agent(concat!("moodlist/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let url = format!(
            "{}/{}",
            config.endpoint.trim_end_matches('/'),
            config.model.trim_start_matches('/')
        );

        Ok(Self {
            client,
            url,
            model: config.model,
            api_token: config.api_token,
        })
    }
}

#[async_trait]
impl EmotionBackend for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<EmotionScore, ClassifierError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&ClassifyRequest { inputs: text });

        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        let top = body.top().ok_or(ClassifierError::Empty)?;
        debug!(label = %top.label, score = top.score, "Emotion classified");
        Ok(top)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
