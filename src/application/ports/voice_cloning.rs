//! Voice Cloning Port - 声音复刻服务抽象

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::session::{ClonedVoiceId, SampleFormat};

/// 声音复刻错误
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("Sample rejected: {0}")]
    SampleRejected(String),

    #[error("Voice cloning service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// 声音复刻请求
#[derive(Debug, Clone)]
pub struct CloneRequest {
    /// 样本显示名称（用于日志）
    pub sample_name: String,
    pub format: SampleFormat,
    /// 样本音频字节
    pub audio: Arc<Vec<u8>>,
}

/// Voice Cloning Port
#[async_trait]
pub trait VoiceCloningPort: Send + Sync {
    /// 用样本复刻声音，返回服务分配的声音 ID
    async fn clone_voice(&self, request: CloneRequest) -> Result<ClonedVoiceId, CloneError>;
}
