//! Blessing Handlers - 祝福语风格、编辑、AI 扩写、合成

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::{
    ActionOutcome, EditTextCommand, ExpandTextCommand, SetStyleCommand, SynthesizeBlessingCommand,
};
use crate::domain::session::BlessingStyle;
use crate::infrastructure::http::dto::{parse_session_id, ApiResponse, SessionRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StyleRequest {
    pub session_id: String,
    pub style: BlessingStyle,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub session_id: String,
    pub content: String,
}

pub async fn set_style(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StyleRequest>,
) -> Result<Json<ApiResponse<ActionOutcome>>, ApiError> {
    let cmd = SetStyleCommand {
        session_id: parse_session_id(&req.session_id)?,
        style: req.style,
    };
    let outcome = state.set_style_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// 手动编辑（超出 200 字截断）
pub async fn edit_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TextRequest>,
) -> Result<Json<ApiResponse<ActionOutcome>>, ApiError> {
    let cmd = EditTextCommand {
        session_id: parse_session_id(&req.session_id)?,
        content: req.content,
    };
    let outcome = state.edit_text_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn expand_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<ActionOutcome>>, ApiError> {
    let cmd = ExpandTextCommand {
        session_id: req.session_id()?,
    };
    let outcome = state.expand_text_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn synthesize_blessing(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<ActionOutcome>>, ApiError> {
    let cmd = SynthesizeBlessingCommand {
        session_id: req.session_id()?,
    };
    let outcome = state.synthesize_blessing_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
