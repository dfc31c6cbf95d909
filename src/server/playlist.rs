//! Playlist and adjustment route handlers.

use axum::extract::State;
use tracing::debug;

use crate::curator::{GeneratePlaylist, ModifyPlaylist};
use crate::error::AppError;
use crate::types::{
    AdjustmentInfo, GeneratePlaylistRequest, ListAdjustmentsResponse, ModifyPlaylistRequest,
    PlaylistResponse, ResolveAdjustmentRequest,
};

use super::extractors::{BearerToken, MsgPackOrJson};
use super::routes::MsgPack;
use super::AppState;

/// GET /api/v1/adjustments
pub async fn list_adjustments(State(state): State<AppState>) -> MsgPack<ListAdjustmentsResponse> {
    let adjustments = state
        .curator
        .engine()
        .entries()
        .map(|(adjustment, delta)| AdjustmentInfo::new(*adjustment, delta))
        .collect();

    MsgPack(ListAdjustmentsResponse { adjustments })
}

/// POST /api/v1/adjustments/resolve
///
/// Resolve free text to a named adjustment. Always answers; unmatched text
/// resolves to the default adjustment.
pub async fn resolve_adjustment(
    State(state): State<AppState>,
    MsgPackOrJson(req): MsgPackOrJson<ResolveAdjustmentRequest>,
) -> Result<MsgPack<AdjustmentInfo>, AppError> {
    let engine = state.curator.engine();
    let adjustment = engine.resolve(&req.text);
    debug!(text = %req.text, %adjustment, "Resolved adjustment");

    let delta = engine
        .delta_for(adjustment)
        .ok_or_else(|| AppError::Internal(format!("No delta configured for {adjustment}")))?;

    Ok(MsgPack(AdjustmentInfo::new(adjustment, delta)))
}

/// POST /api/v1/playlists/generate
///
/// Build a new playlist for a mood. Catalog failures are reported through
/// the `status` field, not the HTTP status.
pub async fn generate_playlist(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    MsgPackOrJson(req): MsgPackOrJson<GeneratePlaylistRequest>,
) -> MsgPack<PlaylistResponse> {
    let request = GeneratePlaylist {
        mood: req.mood,
        name: req.name,
        limit: req.limit.unwrap_or(state.config.playlist.default_limit),
    };

    MsgPack(state.curator.generate_playlist(&token, request).await)
}

/// POST /api/v1/playlists/modify
pub async fn modify_playlist(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    MsgPackOrJson(req): MsgPackOrJson<ModifyPlaylistRequest>,
) -> Result<MsgPack<PlaylistResponse>, AppError> {
    if req.playlist_id.trim().is_empty() {
        return Err(AppError::BadRequest("playlist_id cannot be empty".to_string()));
    }

    let request = ModifyPlaylist {
        playlist_id: req.playlist_id,
        adjustment: req.adjustment,
        limit: req.limit.unwrap_or(state.config.playlist.default_limit),
    };

    Ok(MsgPack(state.curator.modify_playlist(&token, request).await))
}
