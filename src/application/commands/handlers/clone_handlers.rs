//! Clone Command Handlers - 样本获取、声音复刻、试听合成

use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::clone_commands::*;
use crate::application::context::{ActionOutcome, SessionContext};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    CloneRequest, SessionStoreExt, SpeechSynthesisPort, SynthesisRequest, VoiceCloningPort,
};
use crate::domain::session::{
    CloneStage, OperationKind, SampleAcceptance, SamplePolicy, SampleSource, SessionId,
    VoiceSample,
};

/// 校验样本、存入媒体并交给复刻阶段
///
/// 被守卫拒绝时新存入的字节立即释放；替换旧样本时释放旧句柄
fn store_sample(
    ctx: &SessionContext,
    policy: &SamplePolicy,
    session_id: &SessionId,
    source: SampleSource,
    file_name: String,
    bytes: Vec<u8>,
    duration_secs: Option<u32>,
) -> Result<ActionOutcome, ApplicationError> {
    let size_bytes = bytes.len() as u64;
    let format = policy.validate(&file_name, size_bytes, duration_secs)?;

    let handle = ctx.media.put(bytes);
    let sample = VoiceSample::new(
        source,
        file_name,
        handle.clone(),
        format,
        size_bytes,
        duration_secs,
    );

    let acceptance = match ctx.store.with_session(session_id, |session| {
        let acceptance = session.clone_stage_mut().accept_sample(sample);
        if matches!(acceptance, SampleAcceptance::Accepted { .. }) {
            session.touch();
        }
        acceptance
    }) {
        Ok(acceptance) => acceptance,
        Err(e) => {
            ctx.media.release(&handle);
            return Err(e.into());
        }
    };

    let accepted = match acceptance {
        SampleAcceptance::Accepted { replaced } => {
            if let Some(old) = replaced {
                ctx.media.release(&old);
            }
            tracing::info!(
                session_id = %session_id,
                source = ?source,
                format = format.extension(),
                size_bytes = size_bytes,
                "Voice sample accepted"
            );
            true
        }
        SampleAcceptance::Rejected(sample) => {
            ctx.media.release(sample.media());
            false
        }
    };
    ctx.outcome(session_id, "accept_sample", accepted)
}

/// UploadSample Handler
pub struct UploadSampleHandler {
    ctx: SessionContext,
    policy: SamplePolicy,
}

impl UploadSampleHandler {
    pub fn new(ctx: SessionContext, policy: SamplePolicy) -> Self {
        Self { ctx, policy }
    }

    pub async fn handle(&self, cmd: UploadSampleCommand) -> Result<ActionOutcome, ApplicationError> {
        store_sample(
            &self.ctx,
            &self.policy,
            &cmd.session_id,
            SampleSource::Uploaded,
            cmd.file_name,
            cmd.bytes,
            cmd.duration_secs,
        )
    }
}

/// StartRecording Handler
pub struct StartRecordingHandler {
    ctx: SessionContext,
}

impl StartRecordingHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(
        &self,
        cmd: StartRecordingCommand,
    ) -> Result<ActionOutcome, ApplicationError> {
        self.ctx.act(&cmd.session_id, "start_recording", |session| {
            session.clone_stage_mut().begin_recording(Utc::now())
        })
    }
}

/// FinishRecording Handler - 提交录音作为样本
pub struct FinishRecordingHandler {
    ctx: SessionContext,
    policy: SamplePolicy,
}

impl FinishRecordingHandler {
    pub fn new(ctx: SessionContext, policy: SamplePolicy) -> Self {
        Self { ctx, policy }
    }

    pub async fn handle(
        &self,
        cmd: FinishRecordingCommand,
    ) -> Result<ActionOutcome, ApplicationError> {
        let session = self.ctx.store.get(&cmd.session_id)?;
        let CloneStage::Recording {
            started_at,
            elapsed_secs,
        } = session.clone_stage().stage().clone()
        else {
            return self.ctx.outcome(&cmd.session_id, "finish_recording", false);
        };

        let file_name = cmd
            .file_name
            .unwrap_or_else(|| format!("recording-{}.wav", started_at.format("%Y%m%d%H%M%S")));
        let duration_secs = cmd.duration_secs.or(Some(elapsed_secs));

        store_sample(
            &self.ctx,
            &self.policy,
            &cmd.session_id,
            SampleSource::Recorded,
            file_name,
            cmd.bytes,
            duration_secs,
        )
    }
}

/// CancelRecording Handler
pub struct CancelRecordingHandler {
    ctx: SessionContext,
}

impl CancelRecordingHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(
        &self,
        cmd: CancelRecordingCommand,
    ) -> Result<ActionOutcome, ApplicationError> {
        self.ctx.act(&cmd.session_id, "cancel_recording", |session| {
            session.clone_stage_mut().cancel_recording()
        })
    }
}

/// SetAgreement Handler
pub struct SetAgreementHandler {
    ctx: SessionContext,
}

impl SetAgreementHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, cmd: SetAgreementCommand) -> Result<ActionOutcome, ApplicationError> {
        self.ctx.act(&cmd.session_id, "set_agreement", |session| {
            session.clone_stage_mut().set_agreement(cmd.accepted);
            true
        })
    }
}

/// StartCloning Handler - 调用复刻服务
pub struct StartCloningHandler {
    ctx: SessionContext,
    cloner: Arc<dyn VoiceCloningPort>,
}

impl StartCloningHandler {
    pub fn new(ctx: SessionContext, cloner: Arc<dyn VoiceCloningPort>) -> Self {
        Self { ctx, cloner }
    }

    pub async fn handle(&self, cmd: StartCloningCommand) -> Result<ActionOutcome, ApplicationError> {
        let started = self.ctx.store.with_session(&cmd.session_id, |session| {
            let (op, media) = session.clone_stage_mut().begin_cloning()?;
            let sample = session.clone_stage().sample()?;
            let request = (sample.display_name().to_string(), sample.format());
            session.touch();
            Some((op, media, request))
        })?;

        let Some((op, media, (sample_name, format))) = started else {
            return self.ctx.outcome(&cmd.session_id, "start_cloning", false);
        };

        let audio = self.ctx.media.get(&media);
        let cloner = Arc::clone(&self.cloner);
        self.ctx.runtime.spawn_operation(
            &cmd.session_id,
            OperationKind::Cloning,
            op,
            async move {
                let Some(audio) = audio else {
                    return Err("sample media released".to_string());
                };
                cloner
                    .clone_voice(CloneRequest {
                        sample_name,
                        format,
                        audio,
                    })
                    .await
                    .map_err(|e| e.to_string())
            },
            move |session, result| session.clone_stage_mut().settle_cloning(&op, result),
        );

        self.ctx.outcome(&cmd.session_id, "start_cloning", true)
    }
}

/// DeleteSample Handler - 删除样本并级联重置
pub struct DeleteSampleHandler {
    ctx: SessionContext,
}

impl DeleteSampleHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, cmd: DeleteSampleCommand) -> Result<ActionOutcome, ApplicationError> {
        let released = self.ctx.store.with_session(&cmd.session_id, |session| {
            let released = session.delete_sample();
            if released.is_some() {
                session.touch();
            }
            released
        })?;

        let accepted = match released {
            Some(handle) => {
                self.ctx.media.release(&handle);
                tracing::info!(session_id = %cmd.session_id, "Voice sample deleted");
                true
            }
            None => false,
        };
        // reconcile 会取消被重置的复刻/试听/合成操作
        self.ctx.outcome(&cmd.session_id, "delete_sample", accepted)
    }
}

/// SetTestText Handler
pub struct SetTestTextHandler {
    ctx: SessionContext,
}

impl SetTestTextHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, cmd: SetTestTextCommand) -> Result<ActionOutcome, ApplicationError> {
        self.ctx.act(&cmd.session_id, "set_test_text", |session| {
            session.clone_stage_mut().set_test_text(cmd.text)
        })
    }
}

/// SynthesizeTest Handler - 用复刻声音合成试听文本
pub struct SynthesizeTestHandler {
    ctx: SessionContext,
    synthesizer: Arc<dyn SpeechSynthesisPort>,
}

impl SynthesizeTestHandler {
    pub fn new(ctx: SessionContext, synthesizer: Arc<dyn SpeechSynthesisPort>) -> Self {
        Self { ctx, synthesizer }
    }

    pub async fn handle(
        &self,
        cmd: SynthesizeTestCommand,
    ) -> Result<ActionOutcome, ApplicationError> {
        let started = self.ctx.store.with_session(&cmd.session_id, |session| {
            let started = session.clone_stage_mut().begin_test_synthesis();
            if started.is_some() {
                session.touch();
            }
            started
        })?;

        let Some((op, text, voice_id)) = started else {
            return self.ctx.outcome(&cmd.session_id, "synthesize_test", false);
        };

        let synthesizer = Arc::clone(&self.synthesizer);
        self.ctx.runtime.spawn_operation(
            &cmd.session_id,
            OperationKind::TestSynthesis,
            op,
            async move {
                synthesizer
                    .synthesize(SynthesisRequest { text, voice_id })
                    .await
                    .map_err(|e| e.to_string())
            },
            move |session, result| session.clone_stage_mut().settle_test_synthesis(&op, result),
        );

        self.ctx.outcome(&cmd.session_id, "synthesize_test", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::test_support::Harness;
    use crate::application::queries::OperationStatus;
    use crate::domain::session::{CloneStage, CloneStatus};
    use std::time::Duration;

    #[tokio::test]
    async fn test_upload_rejects_unsupported_format() {
        let h = Harness::new();
        let id = h.session();
        let err = UploadSampleHandler::new(h.ctx.clone(), SamplePolicy::default())
            .handle(UploadSampleCommand {
                session_id: id,
                file_name: "voice.ogg".to_string(),
                bytes: vec![1; 16],
                duration_secs: Some(10),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert!(h.media.is_empty());
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_sample() {
        let h = Harness::new();
        let id = h.session();
        h.upload_sample(&id).await;
        let outcome = h.upload_sample(&id).await;

        assert!(outcome.accepted);
        assert_eq!(h.media.len(), 1);
        assert_eq!(outcome.session.clone.status, CloneStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clone_requires_agreement_then_settles() {
        let h = Harness::new();
        let id = h.session();
        h.upload_sample(&id).await;

        let start = StartCloningHandler::new(h.ctx.clone(), h.cloner.clone());
        let rejected = start
            .handle(StartCloningCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(!rejected.accepted);

        SetAgreementHandler::new(h.ctx.clone())
            .handle(SetAgreementCommand {
                session_id: id.clone(),
                accepted: true,
            })
            .await
            .unwrap();
        let outcome = start
            .handle(StartCloningCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.session.clone.status, CloneStatus::Cloning);

        // 进行中再次启动是 no-op
        let busy = start
            .handle(StartCloningCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(!busy.accepted);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.clone.status, CloneStatus::Cloned);
        assert!(view.clone.cloned_voice.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clone_failure_is_retryable() {
        let h = Harness::new();
        let id = h.session();
        h.upload_sample(&id).await;
        h.ctx
            .store
            .with_session(&id, |s| s.clone_stage_mut().set_agreement(true))
            .unwrap();

        h.cloner.set_available(false);
        let start = StartCloningHandler::new(h.ctx.clone(), h.cloner.clone());
        start
            .handle(StartCloningCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(3100)).await;

        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.clone.status, CloneStatus::Ready);
        assert!(view.clone.cloning_error.is_some());

        h.cloner.set_available(true);
        let retry = start
            .handle(StartCloningCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(retry.accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_while_cloning_cancels_operation() {
        let h = Harness::new();
        let id = h.session();
        h.upload_sample(&id).await;
        h.ctx
            .store
            .with_session(&id, |s| s.clone_stage_mut().set_agreement(true))
            .unwrap();
        StartCloningHandler::new(h.ctx.clone(), h.cloner.clone())
            .handle(StartCloningCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(h.ctx.runtime.pending_operations(&id), 1);

        let outcome = DeleteSampleHandler::new(h.ctx.clone())
            .handle(DeleteSampleCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(h.ctx.runtime.pending_operations(&id), 0);
        assert!(h.media.is_empty());

        tokio::time::sleep(Duration::from_millis(3100)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.clone.status, CloneStatus::Absent);
        assert!(!view.clone.agreement_accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_cloned_sample_resets_stage() {
        let h = Harness::new();
        let id = h.session();
        h.cloned_session(&id).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.clone.status, CloneStatus::Cloned);
        assert!(view.clone.agreement_accepted);

        let outcome = DeleteSampleHandler::new(h.ctx.clone())
            .handle(DeleteSampleCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert!(h.media.is_empty());

        let clone = outcome.session.clone;
        assert_eq!(clone.stage, CloneStage::Initial);
        assert_eq!(clone.status, CloneStatus::Absent);
        assert!(!clone.agreement_accepted);
        assert!(clone.cloned_voice.is_none());
        assert!(clone.sample.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recording_flow() {
        let h = Harness::new();
        let id = h.session();
        let outcome = StartRecordingHandler::new(h.ctx.clone())
            .handle(StartRecordingCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(h.ctx.runtime.active_timers(&id), 1);

        tokio::time::sleep(Duration::from_millis(5500)).await;

        let outcome = FinishRecordingHandler::new(h.ctx.clone(), SamplePolicy::default())
            .handle(FinishRecordingCommand {
                session_id: id.clone(),
                file_name: None,
                bytes: vec![7; 64],
                duration_secs: None,
            })
            .await
            .unwrap();
        assert!(outcome.accepted);

        let sample = outcome.session.clone.sample.unwrap();
        assert_eq!(sample.source, SampleSource::Recorded);
        assert_eq!(sample.duration_secs, Some(5));
        assert!(sample.display_name.starts_with("recording-"));
        assert_eq!(h.ctx.runtime.active_timers(&id), 0);
    }

    #[tokio::test]
    async fn test_finish_without_recording_is_rejected() {
        let h = Harness::new();
        let id = h.session();
        let outcome = FinishRecordingHandler::new(h.ctx.clone(), SamplePolicy::default())
            .handle(FinishRecordingCommand {
                session_id: id,
                file_name: Some("a.wav".to_string()),
                bytes: vec![1; 8],
                duration_secs: Some(5),
            })
            .await
            .unwrap();
        assert!(!outcome.accepted);
        assert!(h.media.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesize_test_text() {
        let h = Harness::new();
        let id = h.session();
        h.cloned_session(&id).await;

        let synth = SynthesizeTestHandler::new(h.ctx.clone(), h.synthesizer.clone());
        let blank = synth
            .handle(SynthesizeTestCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(!blank.accepted);

        SetTestTextHandler::new(h.ctx.clone())
            .handle(SetTestTextCommand {
                session_id: id.clone(),
                text: "你好".to_string(),
            })
            .await
            .unwrap();
        let outcome = synth
            .handle(SynthesizeTestCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.session.clone.test.status, OperationStatus::Pending);

        tokio::time::sleep(Duration::from_millis(2050)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.clone.test.status, OperationStatus::Settled);
        assert!(view.clone.test.audio.unwrap().is_playing);
        assert_eq!(view.quota.used, 2);
    }
}
