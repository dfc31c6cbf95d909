//! Spotify Web API implementation of [`CatalogApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AccessToken, CatalogApi, CatalogError, PlaylistRecord, TrackRecord};
use crate::features::AudioFeatures;

const UNKNOWN_ARTIST: &str = "Unknown Artist";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct UserProfile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TrackRef {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FullTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    uri: Option<String>,
}

impl From<FullTrack> for TrackRecord {
    fn from(track: FullTrack) -> Self {
        let artist = track
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let mut record = TrackRecord::new(track.id, track.name, artist);
        if let Some(uri) = track.uri {
            record.uri = uri;
        }
        record
    }
}

#[derive(Debug, Deserialize)]
struct RecommendationsBody {
    #[serde(default)]
    tracks: Vec<FullTrack>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<TrackRef>,
}

#[derive(Debug, Deserialize)]
struct PlaylistBody {
    id: String,
    name: Option<String>,
    description: Option<String>,
    tracks: Option<Paging<PlaylistItem>>,
}

impl From<PlaylistBody> for PlaylistRecord {
    fn from(body: PlaylistBody) -> Self {
        let track_ids = body
            .tracks
            .map(|page| {
                page.items
                    .into_iter()
                    .filter_map(|item| item.track.and_then(|t| t.id))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: body.id,
            name: body.name,
            description: body.description,
            track_ids,
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreatePlaylistBody<'a> {
    name: &'a str,
    public: bool,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct UrisBody<'a> {
    uris: &'a [String],
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the Spotify Web API. Each call is a single attempt.
#[derive(Debug, Clone)]
pub struct SpotifyCatalog {
    client: Client,
    base_url: Url,
}

impl SpotifyCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::InvalidRequest(format!("invalid base url {base_url}: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidRequest(format!(
                "base url cannot carry a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("moodlist/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, token: &AccessToken, segments: &[&str]) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(segments))
            .bearer_auth(token.secret())
    }

    async fn send(request: RequestBuilder) -> Result<Response, CatalogError> {
        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(CatalogError::Upstream {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, CatalogError> {
        Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CatalogApi for SpotifyCatalog {
    async fn current_user_id(&self, token: &AccessToken) -> Result<String, CatalogError> {
        let profile: UserProfile =
            Self::send_json(self.request(Method::GET, token, &["me"])).await?;
        Ok(profile.id)
    }

    async fn top_tracks(
        &self,
        token: &AccessToken,
        limit: usize,
    ) -> Result<Vec<String>, CatalogError> {
        let request = self
            .request(Method::GET, token, &["me", "top", "tracks"])
            .query(&[("limit", limit.to_string()), ("time_range", "medium_term".to_string())]);

        let page: Paging<TrackRef> = Self::send_json(request).await?;
        Ok(page.items.into_iter().filter_map(|t| t.id).collect())
    }

    async fn recommendations(
        &self,
        token: &AccessToken,
        seeds: &[String],
        features: &AudioFeatures,
        limit: usize,
    ) -> Result<Vec<TrackRecord>, CatalogError> {
        if seeds.is_empty() {
            return Err(CatalogError::InvalidRequest(
                "at least one seed track is required".to_string(),
            ));
        }

        let mut params = vec![
            ("seed_tracks".to_string(), seeds.join(",")),
            ("limit".to_string(), limit.to_string()),
        ];
        params.extend(features.to_query_pairs());

        let request = self
            .request(Method::GET, token, &["recommendations"])
            .query(&params);

        let body: RecommendationsBody = Self::send_json(request).await?;
        debug!(count = body.tracks.len(), "Recommendations received");
        Ok(body.tracks.into_iter().map(TrackRecord::from).collect())
    }

    async fn create_playlist(
        &self,
        token: &AccessToken,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<PlaylistRecord, CatalogError> {
        let request = self
            .request(Method::POST, token, &["users", user_id, "playlists"])
            .json(&CreatePlaylistBody {
                name,
                public: false,
                description,
            });

        let body: PlaylistBody = Self::send_json(request).await?;
        Ok(body.into())
    }

    async fn add_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        let request = self
            .request(Method::POST, token, &["playlists", playlist_id, "tracks"])
            .json(&UrisBody { uris });
        Self::send(request).await.map(drop)
    }

    async fn replace_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        let request = self
            .request(Method::PUT, token, &["playlists", playlist_id, "tracks"])
            .json(&UrisBody { uris });
        Self::send(request).await.map(drop)
    }

    async fn playlist(
        &self,
        token: &AccessToken,
        playlist_id: &str,
    ) -> Result<PlaylistRecord, CatalogError> {
        let body: PlaylistBody =
            Self::send_json(self.request(Method::GET, token, &["playlists", playlist_id])).await?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Feature, FeatureKey};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn catalog(server: &MockServer) -> SpotifyCatalog {
        SpotifyCatalog::new(&format!("{}/v1", server.uri()), Duration::from_secs(5)).unwrap()
    }

    fn token() -> AccessToken {
        AccessToken::new("user-token")
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = SpotifyCatalog::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_current_user_id_reads_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alice" })))
            .mount(&server)
            .await;

        let id = catalog(&server).await.current_user_id(&token()).await.unwrap();
        assert_eq!(id, "alice");
    }

    #[tokio::test]
    async fn test_top_tracks_sends_limit_and_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/top/tracks"))
            .and(query_param("limit", "5"))
            .and(query_param("time_range", "medium_term"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "id": "a" }, { "id": "b" }]
            })))
            .mount(&server)
            .await;

        let ids = catalog(&server).await.top_tracks(&token(), 5).await.unwrap();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_recommendations_forward_seeds_and_features() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/recommendations"))
            .and(query_param("seed_tracks", "s1,s2"))
            .and(query_param("limit", "2"))
            .and(query_param("target_energy", "0.9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tracks": [
                    {
                        "id": "t1",
                        "name": "Loud",
                        "uri": "spotify:track:t1",
                        "artists": [{ "name": "Band" }, { "name": "Guest" }]
                    },
                    { "id": "t2", "name": "Nobody", "artists": [] }
                ]
            })))
            .mount(&server)
            .await;

        let features = AudioFeatures::new().with(FeatureKey::target(Feature::Energy), 0.9);
        let seeds = vec!["s1".to_string(), "s2".to_string()];
        let tracks = catalog(&server)
            .await
            .recommendations(&token(), &seeds, &features, 2)
            .await
            .unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist, "Band");
        assert_eq!(tracks[1].artist, "Unknown Artist");
        assert_eq!(tracks[1].uri, "spotify:track:t2");
    }

    #[tokio::test]
    async fn test_recommendations_require_seeds() {
        let server = MockServer::start().await;
        let err = catalog(&server)
            .await
            .recommendations(&token(), &[], &AudioFeatures::new(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_create_playlist_is_private() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/users/alice/playlists"))
            .and(body_json(json!({
                "name": "Calm Mood Playlist",
                "public": false,
                "description": "A calm mood playlist generated by AI"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "pl1",
                "name": "Calm Mood Playlist",
                "description": "A calm mood playlist generated by AI"
            })))
            .mount(&server)
            .await;

        let playlist = catalog(&server)
            .await
            .create_playlist(
                &token(),
                "alice",
                "Calm Mood Playlist",
                "A calm mood playlist generated by AI",
            )
            .await
            .unwrap();

        assert_eq!(playlist.id, "pl1");
        assert!(playlist.track_ids.is_empty());
    }

    #[tokio::test]
    async fn test_replace_tracks_puts_uris() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/playlists/pl1/tracks"))
            .and(body_json(json!({ "uris": ["spotify:track:x"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "snapshot_id": "s" })))
            .expect(1)
            .mount(&server)
            .await;

        catalog(&server)
            .await
            .replace_tracks(&token(), "pl1", &["spotify:track:x".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_playlist_skips_missing_tracks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/playlists/pl1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pl1",
                "name": "Mix",
                "description": "A sad mood playlist generated by AI",
                "tracks": { "items": [
                    { "track": { "id": "a" } },
                    { "track": null },
                    { "track": { "id": "b" } }
                ]}
            })))
            .mount(&server)
            .await;

        let playlist = catalog(&server).await.playlist(&token(), "pl1").await.unwrap();
        assert_eq!(playlist.track_ids, vec!["a", "b"]);
        assert_eq!(playlist.description.as_deref(), Some("A sad mood playlist generated by AI"));
    }

    #[tokio::test]
    async fn test_upstream_errors_are_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = catalog(&server).await.current_user_id(&token()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Upstream { status: 429, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = catalog(&server).await.current_user_id(&token()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }
}
