//! Clone Handlers - 样本上传/录制、复刻、试听

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::{
    ActionOutcome, CancelRecordingCommand, DeleteSampleCommand, DownloadSample,
    FinishRecordingCommand, SetAgreementCommand, SetTestTextCommand, StartCloningCommand,
    StartRecordingCommand, SynthesizeTestCommand, UploadSampleCommand,
};
use crate::domain::session::SessionId;
use crate::infrastructure::http::dto::{parse_session_id, ApiResponse, SessionRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

type ActionResult = Result<Json<ApiResponse<ActionOutcome>>, ApiError>;

// ============================================================================
// Multipart
// ============================================================================

/// 上传/录音表单: session_id, file, 可选 duration_secs
struct SampleForm {
    session_id: SessionId,
    file_name: Option<String>,
    bytes: Option<Vec<u8>>,
    duration_secs: Option<u32>,
}

async fn read_sample_form(mut multipart: Multipart) -> Result<SampleForm, ApiError> {
    let mut session_id: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;
    let mut duration_secs: Option<u32> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "session_id" => {
                session_id = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read session_id: {}", e))
                })?);
            }
            "duration_secs" => {
                let raw = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read duration_secs: {}", e))
                })?;
                duration_secs = Some(raw.trim().parse().map_err(|_| {
                    ApiError::BadRequest(format!("Invalid duration_secs: {}", raw))
                })?);
            }
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let session_id =
        session_id.ok_or_else(|| ApiError::BadRequest("session_id is required".to_string()))?;

    Ok(SampleForm {
        session_id: parse_session_id(&session_id)?,
        file_name,
        bytes,
        duration_secs,
    })
}

// ============================================================================
// Sample acquisition
// ============================================================================

/// 上传样本（wav/mp3/m4a）
pub async fn upload_sample(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ActionResult {
    let form = read_sample_form(multipart).await?;
    let bytes = form
        .bytes
        .ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;

    let cmd = UploadSampleCommand {
        session_id: form.session_id,
        file_name: form.file_name.unwrap_or_default(),
        bytes,
        duration_secs: form.duration_secs,
    };
    let outcome = state.upload_sample_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn start_recording(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> ActionResult {
    let cmd = StartRecordingCommand {
        session_id: req.session_id()?,
    };
    let outcome = state.start_recording_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// 提交录音（multipart，与上传同一表单）
pub async fn finish_recording(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ActionResult {
    let form = read_sample_form(multipart).await?;
    let cmd = FinishRecordingCommand {
        session_id: form.session_id,
        file_name: form.file_name,
        bytes: form.bytes.unwrap_or_default(),
        duration_secs: form.duration_secs,
    };
    let outcome = state.finish_recording_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn cancel_recording(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> ActionResult {
    let cmd = CancelRecordingCommand {
        session_id: req.session_id()?,
    };
    let outcome = state.cancel_recording_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

// ============================================================================
// Cloning
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AgreementRequest {
    pub session_id: String,
    pub accepted: bool,
}

pub async fn set_agreement(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AgreementRequest>,
) -> ActionResult {
    let cmd = SetAgreementCommand {
        session_id: parse_session_id(&req.session_id)?,
        accepted: req.accepted,
    };
    let outcome = state.set_agreement_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn start_cloning(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> ActionResult {
    let cmd = StartCloningCommand {
        session_id: req.session_id()?,
    };
    let outcome = state.start_cloning_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn delete_sample(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> ActionResult {
    let cmd = DeleteSampleCommand {
        session_id: req.session_id()?,
    };
    let outcome = state.delete_sample_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// 下载当前样本
pub async fn download_sample(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let query = DownloadSample {
        session_id: parse_session_id(&session_id)?,
    };
    let sample = state.download_sample_handler.handle(query).await?;
    let length = sample.bytes.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, sample.format.mime_type())
        .header(header::CONTENT_LENGTH, length)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", sample.file_name),
        )
        .body(Body::from(sample.bytes.as_ref().clone()))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

// ============================================================================
// Test synthesis
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TestTextRequest {
    pub session_id: String,
    pub text: String,
}

pub async fn set_test_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TestTextRequest>,
) -> ActionResult {
    let cmd = SetTestTextCommand {
        session_id: parse_session_id(&req.session_id)?,
        text: req.text,
    };
    let outcome = state.set_test_text_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn synthesize_test(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> ActionResult {
    let cmd = SynthesizeTestCommand {
        session_id: req.session_id()?,
    };
    let outcome = state.synthesize_test_handler.handle(cmd).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
