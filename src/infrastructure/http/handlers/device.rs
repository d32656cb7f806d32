//! Device Handlers - 设备配对

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::{ActionOutcome, RefreshDevicesCommand, ToggleDeviceCommand};
use crate::domain::session::DeviceId;
use crate::infrastructure::http::dto::{parse_session_id, ApiResponse, SessionRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleDeviceRequest {
    pub session_id: String,
    pub device_id: String,
}

/// 连接/断开设备
pub async fn toggle_device(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ToggleDeviceRequest>,
) -> Result<Json<ApiResponse<ActionOutcome>>, ApiError> {
    let cmd = ToggleDeviceCommand {
        session_id: parse_session_id(&req.session_id)?,
        device_id: DeviceId::new(req.device_id),
    };
    let outcome = state.toggle_device_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn refresh_devices(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<ActionOutcome>>, ApiError> {
    let cmd = RefreshDevicesCommand {
        session_id: req.session_id()?,
    };
    let outcome = state.refresh_devices_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
