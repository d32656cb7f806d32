//! Composition Commands - 祝福语编辑与合成

use crate::domain::session::{BlessingStyle, SessionId};

#[derive(Debug, Clone)]
pub struct SetStyleCommand {
    pub session_id: SessionId,
    pub style: BlessingStyle,
}

/// 手动编辑祝福语（超过 200 字截断）
#[derive(Debug, Clone)]
pub struct EditTextCommand {
    pub session_id: SessionId,
    pub content: String,
}

/// AI 扩写
#[derive(Debug, Clone)]
pub struct ExpandTextCommand {
    pub session_id: SessionId,
}

/// 用复刻声音合成祝福语
#[derive(Debug, Clone)]
pub struct SynthesizeBlessingCommand {
    pub session_id: SessionId,
}
