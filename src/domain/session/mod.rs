//! Session Context - 祝福会话上下文
//!
//! 一个会话按 Clone → Connect → Play 三个阶段推进:
//! - Clone: 样本获取、声音复刻、试听、祝福语编辑与合成
//! - Connect: 设备配对（最多一个设备连接）
//! - Play: 在已连接设备上播放祝福语

mod aggregate;
mod composition;
mod devices;
mod errors;
mod operation;
mod playback;
mod sample;
mod value_objects;

pub use aggregate::{Navigation, Session};
pub use composition::{
    clamp_blessing, BlessingAudio, BlessingText, CompositionController, SynthesisStatus,
    MAX_BLESSING_CHARS,
};
pub use devices::{Device, DeviceRegistry, PairingAction, PairingController};
pub use errors::SampleError;
pub use operation::AsyncOperation;
pub use playback::PlaybackState;
pub use sample::{
    CloneController, CloneStage, CloneStatus, SampleAcceptance, SamplePolicy, TestAudio,
    TestSynthesis, VoiceSample,
};
pub use value_objects::{
    AudioArtifact, BlessingStyle, ClonedVoiceId, DeviceId, MediaHandle, OperationId,
    OperationKind, PlaybackTarget, SampleFormat, SampleSource, SessionId, Stage,
};
