//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::domain::session::{
    Device, DeviceId, OperationId, OperationKind, PlaybackState, PlaybackTarget, SessionId, Stage,
};

/// 会话事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum SessionEvent {
    /// 阶段切换
    StageChanged {
        session_id: String,
        from: Stage,
        to: Stage,
    },
    /// 长耗时操作开始
    OperationStarted {
        session_id: String,
        operation: OperationKind,
        operation_id: String,
    },
    /// 操作成功完成
    OperationSettled {
        session_id: String,
        operation: OperationKind,
        operation_id: String,
    },
    /// 操作失败（可重试）
    OperationFailed {
        session_id: String,
        operation: OperationKind,
        operation_id: String,
        error: String,
    },
    /// 操作被取消（离开阶段 / 会话关闭 / 状态重置）
    OperationCancelled {
        session_id: String,
        operation: OperationKind,
        operation_id: String,
    },
    /// 播放进度
    PlaybackProgress {
        session_id: String,
        target: PlaybackTarget,
        position_ms: u64,
        duration_ms: u64,
        progress: f32,
        is_playing: bool,
    },
    /// 录音计时
    RecordingClock {
        session_id: String,
        elapsed_secs: u32,
        max_secs: u32,
    },
    /// 设备列表或连接状态变更
    DevicesChanged {
        session_id: String,
        devices: Vec<Device>,
        #[serde(skip_serializing_if = "Option::is_none")]
        connected: Option<DeviceId>,
    },
    /// 会话关闭
    SessionClosed { session_id: String, reason: String },
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<SessionId, broadcast::Sender<SessionEvent>>,
    capacity: usize,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            session_channels: DashMap::new(),
            capacity,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 注册会话的事件通道
    pub fn register_session(&self, session_id: &SessionId) -> broadcast::Receiver<SessionEvent> {
        self.session_channels
            .entry(session_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &SessionId) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &SessionId) -> Option<broadcast::Receiver<SessionEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    pub fn publish_stage_changed(&self, session_id: &SessionId, from: Stage, to: Stage) {
        self.publish_to_session(
            session_id,
            SessionEvent::StageChanged {
                session_id: session_id.to_string(),
                from,
                to,
            },
        );
    }

    pub fn publish_operation_started(
        &self,
        session_id: &SessionId,
        operation: OperationKind,
        operation_id: &OperationId,
    ) {
        self.publish_to_session(
            session_id,
            SessionEvent::OperationStarted {
                session_id: session_id.to_string(),
                operation,
                operation_id: operation_id.to_string(),
            },
        );
    }

    pub fn publish_operation_settled(
        &self,
        session_id: &SessionId,
        operation: OperationKind,
        operation_id: &OperationId,
    ) {
        self.publish_to_session(
            session_id,
            SessionEvent::OperationSettled {
                session_id: session_id.to_string(),
                operation,
                operation_id: operation_id.to_string(),
            },
        );
    }

    pub fn publish_operation_failed(
        &self,
        session_id: &SessionId,
        operation: OperationKind,
        operation_id: &OperationId,
        error: &str,
    ) {
        self.publish_to_session(
            session_id,
            SessionEvent::OperationFailed {
                session_id: session_id.to_string(),
                operation,
                operation_id: operation_id.to_string(),
                error: error.to_string(),
            },
        );
    }

    pub fn publish_operation_cancelled(
        &self,
        session_id: &SessionId,
        operation: OperationKind,
        operation_id: &OperationId,
    ) {
        self.publish_to_session(
            session_id,
            SessionEvent::OperationCancelled {
                session_id: session_id.to_string(),
                operation,
                operation_id: operation_id.to_string(),
            },
        );
    }

    /// 发布播放进度事件
    pub fn publish_playback_progress(
        &self,
        session_id: &SessionId,
        target: PlaybackTarget,
        playback: &PlaybackState,
    ) {
        self.publish_to_session(
            session_id,
            SessionEvent::PlaybackProgress {
                session_id: session_id.to_string(),
                target,
                position_ms: playback.position_ms(),
                duration_ms: playback.duration_ms(),
                progress: playback.progress_percent(),
                is_playing: playback.is_playing(),
            },
        );
    }

    pub fn publish_recording_clock(&self, session_id: &SessionId, elapsed_secs: u32, max_secs: u32) {
        self.publish_to_session(
            session_id,
            SessionEvent::RecordingClock {
                session_id: session_id.to_string(),
                elapsed_secs,
                max_secs,
            },
        );
    }

    pub fn publish_devices_changed(&self, session_id: &SessionId, devices: &[Device]) {
        self.publish_to_session(
            session_id,
            SessionEvent::DevicesChanged {
                session_id: session_id.to_string(),
                devices: devices.to_vec(),
                connected: devices.iter().find(|d| d.connected).map(|d| d.id.clone()),
            },
        );
    }

    /// 发布会话关闭事件
    pub fn publish_session_closed(&self, session_id: &SessionId, reason: &str) {
        self.publish_to_session(
            session_id,
            SessionEvent::SessionClosed {
                session_id: session_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }

    /// 发布事件到指定会话
    fn publish_to_session(&self, session_id: &SessionId, event: SessionEvent) {
        if let Some(sender) = self.session_channels.get(session_id) {
            if let Err(e) = sender.send(event) {
                tracing::trace!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_session_receives_events() {
        let publisher = EventPublisher::new();
        let id = SessionId::new();
        let mut rx = publisher.register_session(&id);

        publisher.publish_stage_changed(&id, Stage::Clone, Stage::Connect);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            SessionEvent::StageChanged {
                session_id: id.to_string(),
                from: Stage::Clone,
                to: Stage::Connect,
            }
        );
    }

    #[test]
    fn test_unregistered_session_is_ignored() {
        let publisher = EventPublisher::new();
        let id = SessionId::new();
        publisher.publish_session_closed(&id, "client_close");
        assert!(publisher.subscribe(&id).is_none());
    }

    #[test]
    fn test_event_wire_format() {
        let event = SessionEvent::RecordingClock {
            session_id: "s1".to_string(),
            elapsed_secs: 3,
            max_secs: 60,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "RecordingClock");
        assert_eq!(json["data"]["elapsed_secs"], 3);
    }
}
