//! Async Operation - start → pending → settle
//!
//! 每个控制器用一个 `AsyncOperation` 同时表示"忙碌标志"和结果。
//! 同一控制器的操作串行：Pending 期间再次 begin 是空操作（不排队）。

use serde::{Deserialize, Serialize};

use super::OperationId;

/// 模拟长耗时操作的状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum AsyncOperation<T> {
    Idle,
    Pending(OperationId),
    Settled(T),
    Failed { reason: String },
}

impl<T> Default for AsyncOperation<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> AsyncOperation<T> {
    /// 忙碌标志
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// 开始新操作，已有操作 pending 时返回 None
    pub fn begin(&mut self) -> Option<OperationId> {
        if self.is_busy() {
            return None;
        }
        let id = OperationId::new();
        *self = Self::Pending(id);
        Some(id)
    }

    /// 完成操作；id 不是当前 pending 的操作时不做任何修改
    pub fn settle(&mut self, id: &OperationId, value: T) -> bool {
        if !self.is_pending(id) {
            return false;
        }
        *self = Self::Settled(value);
        true
    }

    /// 操作失败，忙碌标志清除，可重试
    pub fn fail(&mut self, id: &OperationId, reason: impl Into<String>) -> bool {
        if !self.is_pending(id) {
            return false;
        }
        *self = Self::Failed {
            reason: reason.into(),
        };
        true
    }

    /// 回到 Idle；pending 中的操作随之作废
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_pending(&self, id: &OperationId) -> bool {
        matches!(self, Self::Pending(current) if current == id)
    }

    pub fn pending_id(&self) -> Option<OperationId> {
        match self {
            Self::Pending(id) => Some(*id),
            _ => None,
        }
    }

    pub fn settled(&self) -> Option<&T> {
        match self {
            Self::Settled(value) => Some(value),
            _ => None,
        }
    }

    pub fn settled_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Settled(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason.as_str()),
            _ => None,
        }
    }
}
