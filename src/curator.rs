//! Playlist curation: mood detection, playlist generation and adjustment.
//!
//! Every operation answers. Degraded paths are reported through
//! [`CurationStatus`] and an explanatory message instead of an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::adjust::{Adjustment, AdjustmentEngine};
use crate::catalog::{AccessToken, Outcome, RecommendationGateway, TrackRecord, MAX_SEED_TRACKS};
use crate::mood::{Mood, MoodDetector, MoodPrediction, MoodTaxonomy, UserText};

/// Upper bound on tracks requested from the catalog
pub const MAX_PLAYLIST_TRACKS: usize = 100;

/// Existing tracks used as seeds when a playlist is adjusted
const MODIFY_SEED_TRACKS: usize = 3;

/// Outcome tag of a curation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurationStatus {
    /// Every catalog step answered live
    Success,
    /// At least one step used fallback data
    Fallback,
    /// The request could not be served at all
    Error,
}

/// Track as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artist: String,
}

impl From<&TrackRecord> for TrackSummary {
    fn from(track: &TrackRecord) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            artist: track.artist.clone(),
        }
    }
}

/// Result of generating or modifying a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistResult {
    pub status: CurationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_name: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlaylistResult {
    fn error(message: String) -> Self {
        Self {
            status: CurationStatus::Error,
            mood: None,
            adjustment: None,
            playlist_id: None,
            playlist_name: None,
            tracks: Vec::new(),
            message: Some(message),
        }
    }
}

/// Parameters for a new playlist
#[derive(Debug, Clone)]
pub struct GeneratePlaylist {
    /// Mood name; unknown names fall back to `happy`
    pub mood: String,
    pub name: Option<String>,
    pub limit: usize,
}

/// Parameters for adjusting an existing playlist
#[derive(Debug, Clone)]
pub struct ModifyPlaylist {
    pub playlist_id: String,
    /// Free-text adjustment request
    pub adjustment: String,
    pub limit: usize,
}

/// Collects fallback reasons across the steps of one request
#[derive(Default)]
struct Degradations(Vec<String>);

impl Degradations {
    fn track<T>(&mut self, step: &str, outcome: Outcome<T>) -> T {
        if let Some(reason) = outcome.fallback_reason() {
            self.0.push(format!("{step}: {reason}"));
        }
        outcome.into_value()
    }

    fn status(&self) -> CurationStatus {
        if self.0.is_empty() {
            CurationStatus::Success
        } else {
            CurationStatus::Fallback
        }
    }

    fn message(self) -> Option<String> {
        (!self.0.is_empty())
            .then(|| format!("Used fallback data due to API issues ({})", self.0.join("; ")))
    }
}

/// Orchestrates the detector, adjustment engine and catalog gateway
#[derive(Clone)]
pub struct Curator {
    taxonomy: Arc<MoodTaxonomy>,
    detector: MoodDetector,
    engine: Arc<AdjustmentEngine>,
    gateway: RecommendationGateway,
}

impl Curator {
    pub fn new(
        taxonomy: Arc<MoodTaxonomy>,
        detector: MoodDetector,
        engine: Arc<AdjustmentEngine>,
        gateway: RecommendationGateway,
    ) -> Self {
        Self {
            taxonomy,
            detector,
            engine,
            gateway,
        }
    }

    pub fn taxonomy(&self) -> &MoodTaxonomy {
        &self.taxonomy
    }

    pub fn engine(&self) -> &AdjustmentEngine {
        &self.engine
    }

    pub fn detector(&self) -> &MoodDetector {
        &self.detector
    }

    pub async fn detect_mood(&self, text: &UserText) -> MoodPrediction {
        self.detector.detect(text).await
    }

    /// Build a new playlist for a mood
    pub async fn generate_playlist(
        &self,
        token: &AccessToken,
        request: GeneratePlaylist,
    ) -> PlaylistResult {
        let mood = Mood::from_name_or_default(&request.mood);
        let limit = request.limit.clamp(1, MAX_PLAYLIST_TRACKS);

        let user_id = match self.gateway.current_user_id(token).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, %mood, "Error generating playlist");
                return PlaylistResult {
                    status: CurationStatus::Fallback,
                    mood: Some(mood),
                    adjustment: None,
                    playlist_id: None,
                    playlist_name: None,
                    tracks: self
                        .gateway
                        .fallback_catalog()
                        .tracks_for(mood)
                        .iter()
                        .map(TrackSummary::from)
                        .collect(),
                    message: Some(format!("Used fallback data due to API issues ({e})")),
                };
            }
        };

        let features = self.taxonomy.features_for(mood);
        let mut degradations = Degradations::default();

        let seeds = degradations.track(
            "top tracks",
            self.gateway.fetch_seed_tracks(token, MAX_SEED_TRACKS).await,
        );
        let tracks = degradations.track(
            "recommendations",
            self.gateway
                .fetch_recommendations(token, &seeds, &features, limit)
                .await,
        );

        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{} Mood Playlist", mood.display_name()));
        let description = format!("A {mood} mood playlist generated by AI");
        let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();

        let playlist = degradations.track(
            "playlist",
            self.gateway
                .materialize_playlist(token, &user_id, &name, &uris, &description)
                .await,
        );

        info!(
            %mood,
            playlist_id = %playlist.id,
            tracks = tracks.len(),
            "Generated playlist"
        );

        PlaylistResult {
            status: degradations.status(),
            mood: Some(mood),
            adjustment: None,
            playlist_id: Some(playlist.id),
            playlist_name: playlist.name.or(Some(name)),
            tracks: tracks.iter().map(TrackSummary::from).collect(),
            message: degradations.message(),
        }
    }

    /// Re-fill an existing playlist after applying a free-text adjustment
    /// to the mood inferred from its description.
    pub async fn modify_playlist(
        &self,
        token: &AccessToken,
        request: ModifyPlaylist,
    ) -> PlaylistResult {
        let limit = request.limit.clamp(1, MAX_PLAYLIST_TRACKS);

        let current = match self.gateway.fetch_playlist(token, &request.playlist_id).await {
            Ok(playlist) => playlist,
            Err(e) => {
                error!(error = %e, playlist_id = %request.playlist_id, "Error modifying playlist");
                return PlaylistResult::error(format!("Failed to modify playlist: {e}"));
            }
        };

        let base_mood = current
            .description
            .as_deref()
            .and_then(|d| self.taxonomy.mood_mentioned_in(d))
            .unwrap_or(Mood::Happy);
        let adjustment = self.engine.resolve(&request.adjustment);
        let features = self
            .engine
            .apply(&self.taxonomy.features_for(base_mood), adjustment);

        let seeds: Vec<String> = current
            .track_ids
            .iter()
            .take(MODIFY_SEED_TRACKS)
            .cloned()
            .collect();

        let mut degradations = Degradations::default();
        let tracks = degradations.track(
            "recommendations",
            self.gateway
                .fetch_recommendations(token, &seeds, &features, limit)
                .await,
        );
        let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();

        let updated = degradations.track(
            "playlist",
            self.gateway
                .replace_playlist_tracks(token, &request.playlist_id, &uris)
                .await,
        );

        info!(
            %base_mood,
            %adjustment,
            playlist_id = %updated.id,
            "Modified playlist"
        );

        PlaylistResult {
            status: degradations.status(),
            mood: Some(base_mood),
            adjustment: Some(adjustment),
            playlist_id: Some(updated.id),
            playlist_name: updated.name.or(current.name),
            tracks: tracks.iter().map(TrackSummary::from).collect(),
            message: degradations.message(),
        }
    }
}
