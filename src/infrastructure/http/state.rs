//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CancelRecordingHandler, CloseSessionHandler, DeleteSampleHandler, EditTextHandler,
    ExpandTextHandler, FinishRecordingHandler, NavigateHandler, RefreshDevicesHandler,
    SetAgreementHandler, SetStyleHandler, SetTestTextHandler, StartCloningHandler,
    StartRecordingHandler, StartSessionHandler, SynthesizeBlessingHandler, SynthesizeTestHandler,
    ToggleDeviceHandler, TogglePlaybackHandler, UploadSampleHandler,
    // Query handlers
    DownloadSampleHandler, GetQuotaHandler, GetSessionHandler,
    // Ports
    DeviceTransportPort, SessionContext, TextExpansionPort, VoiceCloningPort,
};
use crate::domain::session::SamplePolicy;
use crate::infrastructure::events::EventPublisher;

/// 外部协作方
pub struct Collaborators {
    pub cloner: Arc<dyn VoiceCloningPort>,
    pub expander: Arc<dyn TextExpansionPort>,
    pub transport: Arc<dyn DeviceTransportPort>,
}

/// 应用状态
///
/// 会话、媒体与运行时都在内存中，语音合成服务随 `SessionContext` 共享
pub struct AppState {
    // ========== Shared ==========
    pub ctx: SessionContext,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub start_session_handler: StartSessionHandler,
    pub navigate_handler: NavigateHandler,
    pub close_session_handler: CloseSessionHandler,
    pub upload_sample_handler: UploadSampleHandler,
    pub start_recording_handler: StartRecordingHandler,
    pub finish_recording_handler: FinishRecordingHandler,
    pub cancel_recording_handler: CancelRecordingHandler,
    pub set_agreement_handler: SetAgreementHandler,
    pub start_cloning_handler: StartCloningHandler,
    pub delete_sample_handler: DeleteSampleHandler,
    pub set_test_text_handler: SetTestTextHandler,
    pub synthesize_test_handler: SynthesizeTestHandler,
    pub set_style_handler: SetStyleHandler,
    pub edit_text_handler: EditTextHandler,
    pub expand_text_handler: ExpandTextHandler,
    pub synthesize_blessing_handler: SynthesizeBlessingHandler,
    pub toggle_device_handler: ToggleDeviceHandler,
    pub refresh_devices_handler: RefreshDevicesHandler,
    pub toggle_playback_handler: TogglePlaybackHandler,

    // ========== Query Handlers ==========
    pub get_session_handler: GetSessionHandler,
    pub download_sample_handler: DownloadSampleHandler,
    pub get_quota_handler: GetQuotaHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(ctx: SessionContext, collaborators: Collaborators, policy: SamplePolicy) -> Self {
        let Collaborators {
            cloner,
            expander,
            transport,
        } = collaborators;
        let synthesizer = ctx.synthesizer.clone();

        Self {
            event_publisher: ctx.runtime.events().clone(),

            // Command handlers
            start_session_handler: StartSessionHandler::new(ctx.clone(), transport.clone()),
            navigate_handler: NavigateHandler::new(ctx.clone()),
            close_session_handler: CloseSessionHandler::new(ctx.clone()),
            upload_sample_handler: UploadSampleHandler::new(ctx.clone(), policy.clone()),
            start_recording_handler: StartRecordingHandler::new(ctx.clone()),
            finish_recording_handler: FinishRecordingHandler::new(ctx.clone(), policy),
            cancel_recording_handler: CancelRecordingHandler::new(ctx.clone()),
            set_agreement_handler: SetAgreementHandler::new(ctx.clone()),
            start_cloning_handler: StartCloningHandler::new(ctx.clone(), cloner),
            delete_sample_handler: DeleteSampleHandler::new(ctx.clone()),
            set_test_text_handler: SetTestTextHandler::new(ctx.clone()),
            synthesize_test_handler: SynthesizeTestHandler::new(ctx.clone(), synthesizer.clone()),
            set_style_handler: SetStyleHandler::new(ctx.clone()),
            edit_text_handler: EditTextHandler::new(ctx.clone()),
            expand_text_handler: ExpandTextHandler::new(ctx.clone(), expander),
            synthesize_blessing_handler: SynthesizeBlessingHandler::new(
                ctx.clone(),
                synthesizer.clone(),
            ),
            toggle_device_handler: ToggleDeviceHandler::new(ctx.clone(), transport.clone()),
            refresh_devices_handler: RefreshDevicesHandler::new(ctx.clone(), transport),
            toggle_playback_handler: TogglePlaybackHandler::new(ctx.clone()),

            // Query handlers
            get_session_handler: GetSessionHandler::new(ctx.clone()),
            download_sample_handler: DownloadSampleHandler::new(ctx.clone()),
            get_quota_handler: GetQuotaHandler::new(synthesizer),

            ctx,
        }
    }
}
