//! Playback / Quota Handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::{ActionOutcome, CharacterQuota, GetQuota, TogglePlaybackCommand};
use crate::domain::session::PlaybackTarget;
use crate::infrastructure::http::dto::{parse_session_id, ApiResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TogglePlaybackRequest {
    pub session_id: String,
    pub target: PlaybackTarget,
}

/// 播放/暂停（样本预览、试听、祝福语音频）
pub async fn toggle_playback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TogglePlaybackRequest>,
) -> Result<Json<ApiResponse<ActionOutcome>>, ApiError> {
    let cmd = TogglePlaybackCommand {
        session_id: parse_session_id(&req.session_id)?,
        target: req.target,
    };
    let outcome = state.toggle_playback_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// 语音合成字符额度
pub async fn get_quota(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CharacterQuota>>, ApiError> {
    let quota = state.get_quota_handler.handle(GetQuota).await?;
    Ok(Json(ApiResponse::success(quota)))
}
