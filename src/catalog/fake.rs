//! In-memory catalog used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AccessToken, CatalogApi, CatalogError, PlaylistRecord, TrackRecord};
use crate::features::AudioFeatures;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CurrentUser,
    TopTracks,
    Recommendations,
    CreatePlaylist,
    AddTracks,
    ReplaceTracks,
    Playlist,
}

#[derive(Debug, Clone, Copy)]
struct Failure {
    transient: bool,
    remaining: usize,
}

#[derive(Default)]
struct Inner {
    calls: HashMap<Op, usize>,
    failures: HashMap<Op, Failure>,
    last_seeds: Vec<String>,
    last_features: Option<AudioFeatures>,
    last_uris: Vec<String>,
}

/// Catalog with canned answers, call counters and injectable failures
pub struct FakeCatalog {
    inner: Mutex<Inner>,
    playlist_description: Option<String>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            playlist_description: Some("A calm mood playlist generated by AI".to_string()),
        }
    }

    /// Fail the next `remaining` calls of `op`. Transient failures surface
    /// as network errors, the rest as decode errors.
    pub fn failing(self, op: Op, transient: bool, remaining: usize) -> Self {
        self.inner
            .lock()
            .unwrap()
            .failures
            .insert(op, Failure { transient, remaining });
        self
    }

    pub fn with_playlist_description(mut self, description: Option<&str>) -> Self {
        self.playlist_description = description.map(str::to_string);
        self
    }

    pub fn calls(&self, op: Op) -> usize {
        self.inner.lock().unwrap().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn last_seeds(&self) -> Vec<String> {
        self.inner.lock().unwrap().last_seeds.clone()
    }

    pub fn last_features(&self) -> Option<AudioFeatures> {
        self.inner.lock().unwrap().last_features.clone()
    }

    pub fn last_uris(&self) -> Vec<String> {
        self.inner.lock().unwrap().last_uris.clone()
    }

    fn enter(&self, op: Op) -> Result<(), CatalogError> {
        let mut inner = self.inner.lock().unwrap();
        *inner.calls.entry(op).or_insert(0) += 1;

        match inner.failures.get_mut(&op) {
            Some(failure) if failure.remaining > 0 => {
                failure.remaining -= 1;
                if failure.transient {
                    Err(CatalogError::Network(format!("{op:?} unavailable")))
                } else {
                    Err(CatalogError::Decode(format!("{op:?} returned garbage")))
                }
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn current_user_id(&self, _token: &AccessToken) -> Result<String, CatalogError> {
        self.enter(Op::CurrentUser)?;
        Ok("user-1".to_string())
    }

    async fn top_tracks(
        &self,
        _token: &AccessToken,
        limit: usize,
    ) -> Result<Vec<String>, CatalogError> {
        self.enter(Op::TopTracks)?;
        Ok((1..=7).map(|i| format!("seed{i}")).take(limit).collect())
    }

    async fn recommendations(
        &self,
        _token: &AccessToken,
        seeds: &[String],
        features: &AudioFeatures,
        limit: usize,
    ) -> Result<Vec<TrackRecord>, CatalogError> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.last_seeds = seeds.to_vec();
            inner.last_features = Some(features.clone());
        }
        self.enter(Op::Recommendations)?;

        Ok((1..=limit)
            .map(|i| TrackRecord::new(format!("rec{i}"), format!("Track {i}"), "Live Artist"))
            .collect())
    }

    async fn create_playlist(
        &self,
        _token: &AccessToken,
        _user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<PlaylistRecord, CatalogError> {
        self.enter(Op::CreatePlaylist)?;
        Ok(PlaylistRecord {
            id: "pl-new".to_string(),
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            track_ids: Vec::new(),
            error: None,
        })
    }

    async fn add_tracks(
        &self,
        _token: &AccessToken,
        _playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        self.enter(Op::AddTracks)?;
        self.inner.lock().unwrap().last_uris = uris.to_vec();
        Ok(())
    }

    async fn replace_tracks(
        &self,
        _token: &AccessToken,
        _playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        self.enter(Op::ReplaceTracks)?;
        self.inner.lock().unwrap().last_uris = uris.to_vec();
        Ok(())
    }

    async fn playlist(
        &self,
        _token: &AccessToken,
        playlist_id: &str,
    ) -> Result<PlaylistRecord, CatalogError> {
        self.enter(Op::Playlist)?;
        Ok(PlaylistRecord {
            id: playlist_id.to_string(),
            name: Some("My Mix".to_string()),
            description: self.playlist_description.clone(),
            track_ids: (1..=4).map(|i| format!("t{i}")).collect(),
            error: None,
        })
    }
}
