//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SessionStore、MediaStore、复刻/扩写/合成/设备传输）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询、会话视图及处理器
//! - runtime: 异步操作与周期计时器
//! - context: 处理器共享依赖
//! - error: 应用层错误定义

pub mod commands;
pub mod context;
pub mod error;
pub mod ports;
pub mod queries;
pub mod runtime;

// Re-exports
pub use commands::{
    // Session commands
    CloseSessionCommand,
    CloseSessionResponse,
    NavigateCommand,
    NavigateResponse,
    NavigationDirection,
    StartSessionCommand,
    // Clone commands
    CancelRecordingCommand,
    DeleteSampleCommand,
    FinishRecordingCommand,
    SetAgreementCommand,
    SetTestTextCommand,
    StartCloningCommand,
    StartRecordingCommand,
    SynthesizeTestCommand,
    UploadSampleCommand,
    // Composition commands
    EditTextCommand,
    ExpandTextCommand,
    SetStyleCommand,
    SynthesizeBlessingCommand,
    // Device / playback commands
    RefreshDevicesCommand,
    ToggleDeviceCommand,
    TogglePlaybackCommand,
    // Handlers
    handlers::{
        CancelRecordingHandler, CloseSessionHandler, DeleteSampleHandler, EditTextHandler,
        ExpandTextHandler, FinishRecordingHandler, NavigateHandler, RefreshDevicesHandler,
        SetAgreementHandler, SetStyleHandler, SetTestTextHandler, StartCloningHandler,
        StartRecordingHandler, StartSessionHandler, SynthesizeBlessingHandler,
        SynthesizeTestHandler, ToggleDeviceHandler, TogglePlaybackHandler, UploadSampleHandler,
    },
};

pub use context::{ActionOutcome, SessionContext};
pub use error::ApplicationError;

pub use ports::{
    CharacterQuota, CloneError, CloneRequest, DeviceTransportPort, ExpansionError,
    MediaStorePort, SessionError, SessionStoreExt, SessionStorePort, SpeechSynthesisPort,
    SynthesisError, SynthesisRequest, TextExpansionPort, TransportError, VoiceCloningPort,
};

pub use queries::{
    DownloadSample, GetQuota, GetSession, SessionView,
    // Handlers
    handlers::{DownloadSampleHandler, GetQuotaHandler, GetSessionHandler, SampleDownloadResponse},
};

pub use runtime::{RuntimeConfig, SessionRuntime};
