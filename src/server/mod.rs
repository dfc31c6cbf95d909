//! HTTP server setup and routing.

mod extractors;
mod mood;
mod playlist;
mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::adjust::AdjustmentEngine;
use crate::catalog::{FallbackCatalog, RecommendationGateway, SpotifyCatalog};
use crate::config::AppConfig;
use crate::curator::Curator;
use crate::error::AppError;
use crate::inference::{EmotionBackend, HuggingFaceClassifier, HuggingFaceConfig};
use crate::mood::{MoodDetector, MoodTaxonomy};

pub use extractors::{BearerToken, MsgPackOrJson};
pub use routes::MsgPack;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub curator: Curator,
    /// Server start time for uptime calculation
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, curator: Curator) -> Self {
        Self {
            config: Arc::new(config),
            curator,
            started_at: Instant::now(),
        }
    }

    /// Build every component from configuration: the emotion backend (when
    /// enabled), the Spotify catalog, and the shared standard tables.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let taxonomy = Arc::new(MoodTaxonomy::standard());
        let detector = MoodDetector::new(emotion_backend(&config), taxonomy.clone());

        let catalog = SpotifyCatalog::new(&config.catalog.base_url, config.catalog.timeout())
            .map_err(|e| AppError::Config(::config::ConfigError::Message(e.to_string())))?;
        let gateway = RecommendationGateway::new(
            Arc::new(catalog),
            config.retry.policy(),
            Arc::new(FallbackCatalog::standard()),
        );

        let curator = Curator::new(
            taxonomy,
            detector,
            Arc::new(AdjustmentEngine::standard()),
            gateway,
        );

        Ok(Self::new(config, curator))
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Hosted classifier, or `None` when disabled or it cannot be constructed
fn emotion_backend(config: &AppConfig) -> Option<Arc<dyn EmotionBackend>> {
    let settings = &config.classifier;
    if !settings.enabled {
        info!("Emotion classifier disabled");
        return None;
    }

    let classifier = HuggingFaceClassifier::new(HuggingFaceConfig {
        endpoint: settings.endpoint.clone(),
        model: settings.model.clone(),
        api_token: settings.api_token.clone(),
        timeout: settings.timeout(),
    });

    match classifier {
        Ok(classifier) => {
            info!(model = %settings.model, "Emotion classifier ready");
            Some(Arc::new(classifier))
        }
        Err(e) => {
            warn!(error = %e, "Failed to set up emotion classifier, moods will be random");
            None
        }
    }
}

/// Creates the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(routes::health))
        // Mood endpoints
        .route("/moods", get(mood::list_moods))
        .route("/moods/:mood", get(mood::get_mood))
        .route("/mood/detect", post(mood::detect_mood))
        // Adjustment endpoints
        .route("/adjustments", get(playlist::list_adjustments))
        .route("/adjustments/resolve", post(playlist::resolve_adjustment))
        // Playlist endpoints (bearer token required)
        .route("/playlists/generate", post(playlist::generate_playlist))
        .route("/playlists/modify", post(playlist::modify_playlist));

    let cors = state.config.server.cors;
    let router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

    let router = if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
