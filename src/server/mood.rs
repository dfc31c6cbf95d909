//! Mood API route handlers.

use axum::extract::{Path, State};

use crate::error::AppError;
use crate::mood::{Mood, UserText};
use crate::types::{DetectMoodRequest, DetectMoodResponse, ListMoodsResponse, MoodInfo};

use super::extractors::MsgPackOrJson;
use super::routes::MsgPack;
use super::AppState;

fn mood_info(state: &AppState, mood: Mood) -> MoodInfo {
    MoodInfo {
        mood,
        name: mood.display_name().to_string(),
        features: state.curator.taxonomy().features_for(mood),
    }
}

/// POST /api/v1/mood/detect
///
/// Detect the mood expressed by free text. Blank text is rejected with 400;
/// classifier problems never fail the request.
pub async fn detect_mood(
    State(state): State<AppState>,
    MsgPackOrJson(req): MsgPackOrJson<DetectMoodRequest>,
) -> Result<MsgPack<DetectMoodResponse>, AppError> {
    let text = UserText::parse(&req.text)?;
    let prediction = state.curator.detect_mood(&text).await;
    Ok(MsgPack(prediction.into()))
}

/// GET /api/v1/moods
pub async fn list_moods(State(state): State<AppState>) -> MsgPack<ListMoodsResponse> {
    let moods: Vec<MoodInfo> = Mood::ALL.into_iter().map(|m| mood_info(&state, m)).collect();
    let total = moods.len();
    MsgPack(ListMoodsResponse { moods, total })
}

/// GET /api/v1/moods/:mood
pub async fn get_mood(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<MsgPack<MoodInfo>, AppError> {
    let mood: Mood = name
        .parse()
        .map_err(|e| AppError::NotFound(format!("{e}")))?;
    Ok(MsgPack(mood_info(&state, mood)))
}
