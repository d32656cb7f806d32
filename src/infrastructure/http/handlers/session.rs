//! Session Handlers - 会话生命周期与导航

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::{
    CloseSessionCommand, CloseSessionResponse, GetSession, NavigateCommand, NavigateResponse,
    NavigationDirection, SessionView, StartSessionCommand,
};
use crate::infrastructure::http::dto::{parse_session_id, ApiResponse, SessionRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Start / Get
// ============================================================================

/// 从入口页进入，创建新会话
pub async fn start_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let view = state
        .start_session_handler
        .handle(StartSessionCommand)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let query = GetSession {
        session_id: req.session_id()?,
    };
    let view = state.get_session_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(view)))
}

// ============================================================================
// Navigate
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub session_id: String,
    pub direction: NavigationDirection,
}

pub async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<ApiResponse<NavigateResponse>>, ApiError> {
    let cmd = NavigateCommand {
        session_id: parse_session_id(&req.session_id)?,
        direction: req.direction,
    };
    let result = state.navigate_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(result)))
}

// ============================================================================
// Close Session
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CloseSessionRequest {
    pub session_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// 回到入口页
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CloseSessionRequest>,
) -> Result<Json<ApiResponse<CloseSessionResponse>>, ApiError> {
    let cmd = CloseSessionCommand {
        session_id: parse_session_id(&req.session_id)?,
        reason: req.reason.unwrap_or_else(|| "client_close".to_string()),
    };
    let result = state.close_session_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(result)))
}
