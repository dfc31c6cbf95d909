//! Music catalog access.
//!
//! This module provides the catalog abstraction used to turn audio feature
//! targets into tracks and playlists, with:
//! - a Spotify Web API implementation
//! - a bounded retry policy for transient failures
//! - a static fallback catalog used when the remote service cannot answer

mod fallback;
mod gateway;
mod retry;
mod spotify;

#[cfg(test)]
pub(crate) mod fake;

pub use fallback::{mood_for_features, FallbackCatalog};
pub use gateway::{Outcome, RecommendationGateway, MAX_SEED_TRACKS};
pub use retry::RetryPolicy;
pub use spotify::SpotifyCatalog;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::AudioFeatures;

/// URI prefix for catalog tracks
pub const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Error type for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Network(String),

    #[error("Catalog returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to decode catalog response: {0}")]
    Decode(String),

    #[error("Invalid catalog request: {0}")]
    InvalidRequest(String),
}

impl CatalogError {
    /// Whether the failure is worth retrying. Only transport failures and
    /// errors reported by the upstream service qualify.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Upstream { .. })
    }
}

/// Opaque access credential forwarded to the catalog
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// A track as returned by recommendations or the fallback catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    /// Primary artist
    pub artist: String,
    pub uri: String,
}

impl TrackRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, artist: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            uri: format!("{TRACK_URI_PREFIX}{id}"),
            id,
            name: name.into(),
            artist: artist.into(),
        }
    }
}

/// Playlist state as known to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub track_ids: Vec<String>,
    /// Set on synthetic records produced after a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Strip the catalog URI prefix, if present
pub fn track_id_from_uri(uri: &str) -> &str {
    uri.strip_prefix(TRACK_URI_PREFIX).unwrap_or(uri)
}

/// Remote catalog operations. Implementations perform a single attempt;
/// retries and fallbacks live in [`RecommendationGateway`].
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Id of the user owning `token`
    async fn current_user_id(&self, token: &AccessToken) -> Result<String, CatalogError>;

    /// Ids of the user's top tracks
    async fn top_tracks(&self, token: &AccessToken, limit: usize)
        -> Result<Vec<String>, CatalogError>;

    /// Tracks recommended from `seeds`, steered by `features`
    async fn recommendations(
        &self,
        token: &AccessToken,
        seeds: &[String],
        features: &AudioFeatures,
        limit: usize,
    ) -> Result<Vec<TrackRecord>, CatalogError>;

    /// Create an empty private playlist
    async fn create_playlist(
        &self,
        token: &AccessToken,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<PlaylistRecord, CatalogError>;

    async fn add_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError>;

    /// Replace every item of a playlist with `uris`
    async fn replace_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError>;

    async fn playlist(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<PlaylistRecord, CatalogError>;
}
