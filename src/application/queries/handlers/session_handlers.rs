//! Session Query Handlers

use std::sync::Arc;

use crate::application::context::SessionContext;
use crate::application::error::ApplicationError;
use crate::application::ports::{CharacterQuota, SpeechSynthesisPort};
use crate::application::queries::{DownloadSample, GetQuota, GetSession, SessionView};
use crate::domain::session::SampleFormat;

// ============================================================================
// Response DTOs
// ============================================================================

/// 样本下载响应
#[derive(Debug, Clone)]
pub struct SampleDownloadResponse {
    pub file_name: String,
    pub format: SampleFormat,
    pub bytes: Arc<Vec<u8>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetSession Handler
pub struct GetSessionHandler {
    ctx: SessionContext,
}

impl GetSessionHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, query: GetSession) -> Result<SessionView, ApplicationError> {
        self.ctx.store.touch(&query.session_id);
        self.ctx.view(&query.session_id)
    }
}

/// DownloadSample Handler
pub struct DownloadSampleHandler {
    ctx: SessionContext,
}

impl DownloadSampleHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(
        &self,
        query: DownloadSample,
    ) -> Result<SampleDownloadResponse, ApplicationError> {
        let session = self.ctx.store.get(&query.session_id)?;
        let sample = session
            .clone_stage()
            .sample()
            .ok_or_else(|| ApplicationError::not_found("Sample", &query.session_id))?;

        let bytes = self
            .ctx
            .media
            .get(sample.media())
            .ok_or_else(|| ApplicationError::not_found("Media", sample.media()))?;

        Ok(SampleDownloadResponse {
            file_name: sample.display_name().to_string(),
            format: sample.format(),
            bytes,
        })
    }
}

/// GetQuota Handler
pub struct GetQuotaHandler {
    synthesizer: Arc<dyn SpeechSynthesisPort>,
}

impl GetQuotaHandler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesisPort>) -> Self {
        Self { synthesizer }
    }

    pub async fn handle(&self, _query: GetQuota) -> Result<CharacterQuota, ApplicationError> {
        Ok(self.synthesizer.quota())
    }
}
