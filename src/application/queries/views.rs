//! Session Views - 会话只读视图
//!
//! 所有可用性标志都由领域守卫推导，视图本身不保存状态

use serde::Serialize;

use crate::application::ports::CharacterQuota;
use crate::domain::session::{
    AsyncOperation, BlessingStyle, CloneStage, CloneStatus, Device, DeviceId, PlaybackState,
    SampleFormat, SampleSource, Session, Stage, SynthesisStatus, MAX_BLESSING_CHARS,
};

/// 操作状态（不含结果）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Idle,
    Pending,
    Settled,
    Failed,
}

impl<T> From<&AsyncOperation<T>> for OperationStatus {
    fn from(op: &AsyncOperation<T>) -> Self {
        match op {
            AsyncOperation::Idle => Self::Idle,
            AsyncOperation::Pending(_) => Self::Pending,
            AsyncOperation::Settled(_) => Self::Settled,
            AsyncOperation::Failed { .. } => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackView {
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub progress: f32,
}

impl From<&PlaybackState> for PlaybackView {
    fn from(state: &PlaybackState) -> Self {
        Self {
            is_playing: state.is_playing(),
            position_ms: state.position_ms(),
            duration_ms: state.duration_ms(),
            progress: state.progress_percent(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleView {
    pub source: SampleSource,
    pub display_name: String,
    pub format: SampleFormat,
    pub size_bytes: u64,
    pub duration_secs: Option<u32>,
    pub preview: PlaybackView,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSynthesisView {
    pub text: String,
    pub status: OperationStatus,
    pub error: Option<String>,
    pub can_synthesize: bool,
    pub audio: Option<PlaybackView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CloneView {
    pub stage: CloneStage,
    pub status: CloneStatus,
    pub sample: Option<SampleView>,
    pub agreement_accepted: bool,
    pub can_start_cloning: bool,
    pub cloned_voice: Option<String>,
    pub cloning_error: Option<String>,
    pub test: TestSynthesisView,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlessingView {
    pub content: String,
    pub style: BlessingStyle,
    pub char_count: usize,
    pub max_chars: usize,
    pub is_expanding: bool,
    pub expansion_error: Option<String>,
    pub synthesis_status: SynthesisStatus,
    pub synthesis_error: Option<String>,
    pub can_synthesize: bool,
    pub audio: Option<PlaybackView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DevicesView {
    pub devices: Vec<Device>,
    pub is_connected: bool,
    pub connected: Option<DeviceId>,
    pub is_busy: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotaView {
    pub per_request: usize,
    pub total: usize,
    pub used: usize,
    pub remaining: usize,
}

impl From<CharacterQuota> for QuotaView {
    fn from(quota: CharacterQuota) -> Self {
        Self {
            per_request: quota.per_request,
            total: quota.total,
            used: quota.used,
            remaining: quota.remaining(),
        }
    }
}

/// 会话视图
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub stage: Stage,
    pub can_advance: bool,
    pub clone: CloneView,
    pub blessing: BlessingView,
    pub devices: DevicesView,
    pub quota: QuotaView,
    pub created_at: String,
    pub last_activity: String,
}

impl SessionView {
    pub fn build(session: &Session, quota: CharacterQuota) -> Self {
        let clone = session.clone_stage();
        let composition = session.composition();
        let pairing = session.pairing();
        let voice = clone.cloned_voice();

        Self {
            session_id: session.id().to_string(),
            stage: session.stage(),
            can_advance: session.can_advance(),
            clone: CloneView {
                stage: clone.stage().clone(),
                status: clone.status(),
                sample: clone.sample().map(|sample| SampleView {
                    source: sample.source(),
                    display_name: sample.display_name().to_string(),
                    format: sample.format(),
                    size_bytes: sample.size_bytes(),
                    duration_secs: sample.duration_secs(),
                    preview: PlaybackView::from(sample.preview()),
                }),
                agreement_accepted: clone.agreement_accepted(),
                can_start_cloning: clone.can_start_cloning(),
                cloned_voice: voice.map(|v| v.to_string()),
                cloning_error: clone.cloning().failure().map(str::to_string),
                test: TestSynthesisView {
                    text: clone.test().text().to_string(),
                    status: OperationStatus::from(clone.test().operation()),
                    error: clone.test().operation().failure().map(str::to_string),
                    can_synthesize: clone.can_synthesize_test(),
                    audio: clone.test().audio().map(|a| PlaybackView::from(&a.playback)),
                },
            },
            blessing: BlessingView {
                content: composition.text().content().to_string(),
                style: composition.text().style(),
                char_count: composition.text().char_count(),
                max_chars: MAX_BLESSING_CHARS,
                is_expanding: composition.is_expanding(),
                expansion_error: composition.expansion().failure().map(str::to_string),
                synthesis_status: composition.synthesis_status(),
                synthesis_error: composition.synthesis().failure().map(str::to_string),
                can_synthesize: composition.can_synthesize(voice),
                audio: composition.audio().map(|a| PlaybackView::from(&a.playback)),
            },
            devices: DevicesView {
                devices: pairing.registry().devices().to_vec(),
                is_connected: pairing.is_connected(),
                connected: pairing.registry().connected().map(|d| d.id.clone()),
                is_busy: pairing.operation().is_busy(),
                error: pairing.operation().failure().map(str::to_string),
            },
            quota: QuotaView::from(quota),
            created_at: session.created_at().to_rfc3339(),
            last_activity: session.last_activity().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota() -> CharacterQuota {
        CharacterQuota {
            per_request: 300,
            total: 20_000,
            used: 0,
        }
    }

    #[test]
    fn test_fresh_session_view() {
        let session = Session::new(vec![Device::new("1", "智能音响-001")]);
        let view = SessionView::build(&session, quota());

        assert_eq!(view.stage, Stage::Clone);
        assert!(!view.can_advance);
        assert_eq!(view.clone.status, CloneStatus::Absent);
        assert!(!view.clone.can_start_cloning);
        assert_eq!(view.blessing.synthesis_status, SynthesisStatus::NotSynthesized);
        assert!(!view.blessing.can_synthesize);
        assert_eq!(view.devices.devices.len(), 1);
        assert!(!view.devices.is_connected);
        assert_eq!(view.quota.remaining, 20_000);
    }

    #[test]
    fn test_view_serializes_snake_case() {
        let session = Session::new(Vec::new());
        let json = serde_json::to_value(SessionView::build(&session, quota())).unwrap();
        assert_eq!(json["stage"], "clone");
        assert_eq!(json["clone"]["stage"]["state"], "initial");
        assert_eq!(json["blessing"]["style"], "humor");
        assert_eq!(json["blessing"]["max_chars"], 200);
    }
}
