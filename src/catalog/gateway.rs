//! Recommendation gateway: retried catalog calls with deterministic fallbacks.

use std::sync::Arc;

use tracing::{error, warn};

use super::{
    fallback::mood_for_features, track_id_from_uri, AccessToken, CatalogApi, CatalogError,
    FallbackCatalog, PlaylistRecord, RetryPolicy, TrackRecord,
};
use crate::features::AudioFeatures;
use crate::mood::Mood;

/// The catalog accepts at most this many seed tracks per request
pub const MAX_SEED_TRACKS: usize = 5;

/// Seeds taken from a fallback mood when the caller supplies none
const FALLBACK_SEED_COUNT: usize = 2;

/// Id reported for a playlist that could not be created
const FALLBACK_PLAYLIST_ID: &str = "fallback_playlist";

/// Result of a gateway operation, tagged with where the data came from
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Answered by the remote catalog
    Live(T),
    /// Substituted after the remote call failed
    Fallback { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Live(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Live(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Self::Live(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Catalog front door used by the rest of the service.
///
/// Every operation retries transient failures under the configured policy.
/// The four playlist-building operations never fail: once retries are spent
/// they answer from the fallback catalog.
#[derive(Clone)]
pub struct RecommendationGateway {
    catalog: Arc<dyn CatalogApi>,
    retry: RetryPolicy,
    fallback: Arc<FallbackCatalog>,
}

impl RecommendationGateway {
    pub fn new(catalog: Arc<dyn CatalogApi>, retry: RetryPolicy, fallback: Arc<FallbackCatalog>) -> Self {
        Self {
            catalog,
            retry,
            fallback,
        }
    }

    pub fn fallback_catalog(&self) -> &FallbackCatalog {
        &self.fallback
    }

    /// User's top track ids, used as recommendation seeds
    pub async fn fetch_seed_tracks(&self, token: &AccessToken, limit: usize) -> Outcome<Vec<String>> {
        let result = self
            .retry
            .run("top_tracks", || self.catalog.top_tracks(token, limit))
            .await;

        match result {
            Ok(ids) => Outcome::Live(ids),
            Err(e) => {
                let mood = Mood::random();
                error!(error = %e, %mood, "Error getting top tracks, using fallback seeds");
                Outcome::Fallback {
                    value: self.fallback.track_ids_for(mood),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Recommended tracks for `features`. Seeds beyond [`MAX_SEED_TRACKS`]
    /// are dropped; an empty seed list is filled from a random fallback mood.
    pub async fn fetch_recommendations(
        &self,
        token: &AccessToken,
        seeds: &[String],
        features: &AudioFeatures,
        limit: usize,
    ) -> Outcome<Vec<TrackRecord>> {
        let seeds: Vec<String> = if seeds.is_empty() {
            warn!("No seed tracks available, using fallback seeds");
            let mut ids = self.fallback.track_ids_for(Mood::random());
            ids.truncate(FALLBACK_SEED_COUNT);
            ids
        } else {
            seeds.iter().take(MAX_SEED_TRACKS).cloned().collect()
        };

        let result = self
            .retry
            .run("recommendations", || {
                self.catalog.recommendations(token, &seeds, features, limit)
            })
            .await;

        match result {
            Ok(tracks) => Outcome::Live(tracks),
            Err(e) => {
                let mood = mood_for_features(features);
                error!(error = %e, %mood, "Error getting recommendations, using fallback tracks");
                Outcome::Fallback {
                    value: self.fallback.tracks_for(mood).to_vec(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Create a private playlist holding `uris`
    pub async fn materialize_playlist(
        &self,
        token: &AccessToken,
        user_id: &str,
        name: &str,
        uris: &[String],
        description: &str,
    ) -> Outcome<PlaylistRecord> {
        let created = self
            .retry
            .run("create_playlist", || {
                self.catalog.create_playlist(token, user_id, name, description)
            })
            .await;

        let track_ids: Vec<String> = uris
            .iter()
            .map(|u| track_id_from_uri(u).to_string())
            .collect();

        // A playlist that was created but not filled keeps its real id
        let (playlist_id, e) = match created {
            Ok(playlist) => {
                let added = self
                    .retry
                    .run("add_tracks", || self.catalog.add_tracks(token, &playlist.id, uris))
                    .await;
                match added {
                    Ok(()) => {
                        return Outcome::Live(PlaylistRecord {
                            name: playlist.name.or_else(|| Some(name.to_string())),
                            description: playlist
                                .description
                                .or_else(|| Some(description.to_string())),
                            track_ids,
                            ..playlist
                        })
                    }
                    Err(e) => (playlist.id, e),
                }
            }
            Err(e) => (FALLBACK_PLAYLIST_ID.to_string(), e),
        };

        error!(error = %e, playlist_id = %playlist_id, "Error creating playlist");
        Outcome::Fallback {
            value: PlaylistRecord {
                id: playlist_id,
                name: Some(name.to_string()),
                description: Some(description.to_string()),
                track_ids,
                error: Some(e.to_string()),
            },
            reason: e.to_string(),
        }
    }

    /// Replace the items of `playlist_id` and return the refreshed playlist
    pub async fn replace_playlist_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[String],
    ) -> Outcome<PlaylistRecord> {
        let replaced = self
            .retry
            .run("replace_tracks", || {
                self.catalog.replace_tracks(token, playlist_id, uris)
            })
            .await;

        let result = match replaced {
            Ok(()) => self.fetch_playlist(token, playlist_id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(playlist) => Outcome::Live(playlist),
            Err(e) => {
                error!(error = %e, playlist_id, "Error modifying playlist");
                Outcome::Fallback {
                    value: PlaylistRecord {
                        id: playlist_id.to_string(),
                        name: None,
                        description: None,
                        track_ids: uris.iter().map(|u| track_id_from_uri(u).to_string()).collect(),
                        error: Some(e.to_string()),
                    },
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Id of the user owning `token`
    pub async fn current_user_id(&self, token: &AccessToken) -> Result<String, CatalogError> {
        self.retry
            .run("current_user", || self.catalog.current_user_id(token))
            .await
    }

    pub async fn fetch_playlist(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<PlaylistRecord, CatalogError> {
        self.retry
            .run("playlist", || self.catalog.playlist(token, playlist_id))
            .await
    }
}
