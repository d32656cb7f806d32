//! Speech Synthesis Port - 语音合成服务抽象
//!
//! 合成按字符计费：单次请求与总量都有上限

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::session::{AudioArtifact, ClonedVoiceId};

/// 语音合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Character quota exceeded: requested {requested}, remaining {remaining}")]
    CharacterQuotaExceeded { requested: usize, remaining: usize },

    #[error("Speech synthesis service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: ClonedVoiceId,
}

/// 字符额度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterQuota {
    /// 单次请求上限
    pub per_request: usize,
    /// 总额度
    pub total: usize,
    /// 已使用
    pub used: usize,
}

impl CharacterQuota {
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.used)
    }

    /// 本次请求允许的字符数
    pub fn allowance(&self) -> usize {
        self.per_request.min(self.remaining())
    }
}

/// Speech Synthesis Port
#[async_trait]
pub trait SpeechSynthesisPort: Send + Sync {
    /// 用复刻声音合成文本
    async fn synthesize(&self, request: SynthesisRequest) -> Result<AudioArtifact, SynthesisError>;

    /// 当前额度
    fn quota(&self) -> CharacterQuota;
}
