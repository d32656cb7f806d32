//! Text Expansion Port - AI 祝福语扩写

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::session::BlessingStyle;

#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("Text expansion quota exceeded")]
    QuotaExceeded,

    #[error("Text expansion service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Text Expansion Port
#[async_trait]
pub trait TextExpansionPort: Send + Sync {
    /// 按风格扩写种子文本
    async fn expand(&self, seed: &str, style: BlessingStyle) -> Result<String, ExpansionError>;
}
