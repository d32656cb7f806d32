//! Composition Command Handlers - 祝福语风格、编辑、扩写与合成

use std::sync::Arc;

use crate::application::commands::composition_commands::*;
use crate::application::context::{ActionOutcome, SessionContext};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    SessionStoreExt, SpeechSynthesisPort, SynthesisRequest, TextExpansionPort,
};
use crate::domain::session::OperationKind;

/// SetStyle Handler
pub struct SetStyleHandler {
    ctx: SessionContext,
}

impl SetStyleHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, cmd: SetStyleCommand) -> Result<ActionOutcome, ApplicationError> {
        self.ctx.act(&cmd.session_id, "set_style", |session| {
            session.composition_mut().set_style(cmd.style);
            true
        })
    }
}

/// EditText Handler - 编辑会使已合成音频失效
pub struct EditTextHandler {
    ctx: SessionContext,
}

impl EditTextHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, cmd: EditTextCommand) -> Result<ActionOutcome, ApplicationError> {
        self.ctx.act(&cmd.session_id, "edit_text", |session| {
            session.composition_mut().edit_text(&cmd.content);
            true
        })
    }
}

/// ExpandText Handler - AI 扩写
pub struct ExpandTextHandler {
    ctx: SessionContext,
    expander: Arc<dyn TextExpansionPort>,
}

impl ExpandTextHandler {
    pub fn new(ctx: SessionContext, expander: Arc<dyn TextExpansionPort>) -> Self {
        Self { ctx, expander }
    }

    pub async fn handle(&self, cmd: ExpandTextCommand) -> Result<ActionOutcome, ApplicationError> {
        let started = self.ctx.store.with_session(&cmd.session_id, |session| {
            let started = session.composition_mut().begin_expansion();
            if started.is_some() {
                session.touch();
            }
            started
        })?;

        let Some((op, seed, style)) = started else {
            return self.ctx.outcome(&cmd.session_id, "expand_text", false);
        };

        let expander = Arc::clone(&self.expander);
        self.ctx.runtime.spawn_operation(
            &cmd.session_id,
            OperationKind::Expansion,
            op,
            async move {
                expander
                    .expand(&seed, style)
                    .await
                    .map_err(|e| e.to_string())
            },
            move |session, result| session.composition_mut().settle_expansion(&op, result),
        );

        self.ctx.outcome(&cmd.session_id, "expand_text", true)
    }
}

/// SynthesizeBlessing Handler - 用复刻声音合成祝福语
pub struct SynthesizeBlessingHandler {
    ctx: SessionContext,
    synthesizer: Arc<dyn SpeechSynthesisPort>,
}

impl SynthesizeBlessingHandler {
    pub fn new(ctx: SessionContext, synthesizer: Arc<dyn SpeechSynthesisPort>) -> Self {
        Self { ctx, synthesizer }
    }

    pub async fn handle(
        &self,
        cmd: SynthesizeBlessingCommand,
    ) -> Result<ActionOutcome, ApplicationError> {
        let started = self.ctx.store.with_session(&cmd.session_id, |session| {
            let voice = session.clone_stage().cloned_voice().cloned();
            let (op, text) = session.composition_mut().begin_synthesis(voice.as_ref())?;
            session.touch();
            Some((op, text, voice?))
        })?;

        let Some((op, text, voice_id)) = started else {
            return self.ctx.outcome(&cmd.session_id, "synthesize_blessing", false);
        };

        let synthesizer = Arc::clone(&self.synthesizer);
        self.ctx.runtime.spawn_operation(
            &cmd.session_id,
            OperationKind::BlessingSynthesis,
            op,
            async move {
                synthesizer
                    .synthesize(SynthesisRequest { text, voice_id })
                    .await
                    .map_err(|e| e.to_string())
            },
            move |session, result| session.composition_mut().settle_synthesis(&op, result),
        );

        self.ctx.outcome(&cmd.session_id, "synthesize_blessing", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::test_support::Harness;
    use crate::domain::session::{BlessingStyle, SessionId, SynthesisStatus};
    use crate::infrastructure::adapters::template_for;
    use std::time::Duration;

    async fn edit(h: &Harness, id: &SessionId, content: &str) -> ActionOutcome {
        EditTextHandler::new(h.ctx.clone())
            .handle(EditTextCommand {
                session_id: id.clone(),
                content: content.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_edit_clamps_to_limit() {
        let h = Harness::new();
        let id = h.session();
        let outcome = edit(&h, &id, &"福".repeat(250)).await;
        assert_eq!(outcome.session.blessing.char_count, 200);
    }

    #[tokio::test]
    async fn test_synthesize_without_voice_is_rejected() {
        let h = Harness::new();
        let id = h.session();
        edit(&h, &id, "新年快乐").await;

        let outcome = SynthesizeBlessingHandler::new(h.ctx.clone(), h.synthesizer.clone())
            .handle(SynthesizeBlessingCommand { session_id: id })
            .await
            .unwrap();
        assert!(!outcome.accepted);
        assert_eq!(
            outcome.session.blessing.synthesis_status,
            SynthesisStatus::NotSynthesized
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_humor_expand_then_synthesize() {
        let h = Harness::new();
        let id = h.session();
        h.cloned_session(&id).await;

        let outcome = ExpandTextHandler::new(h.ctx.clone(), h.expander.clone())
            .handle(ExpandTextCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert!(outcome.session.blessing.is_expanding);

        tokio::time::sleep(Duration::from_millis(2100)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.blessing.content, template_for(BlessingStyle::Humor));
        assert_eq!(view.blessing.synthesis_status, SynthesisStatus::NotSynthesized);

        let outcome = SynthesizeBlessingHandler::new(h.ctx.clone(), h.synthesizer.clone())
            .handle(SynthesizeBlessingCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(
            outcome.session.blessing.synthesis_status,
            SynthesisStatus::Synthesizing
        );

        tokio::time::sleep(Duration::from_millis(2050)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.blessing.synthesis_status, SynthesisStatus::Synthesized);
        let audio = view.blessing.audio.unwrap();
        assert!(audio.is_playing);
        assert_eq!(audio.position_ms, 0);
        assert!(view.can_advance);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_synthesis_discards_result() {
        let h = Harness::new();
        let id = h.session();
        h.cloned_session(&id).await;
        edit(&h, &id, "生日快乐").await;

        SynthesizeBlessingHandler::new(h.ctx.clone(), h.synthesizer.clone())
            .handle(SynthesizeBlessingCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        let outcome = edit(&h, &id, "生日快乐！").await;
        assert_eq!(
            outcome.session.blessing.synthesis_status,
            SynthesisStatus::NotSynthesized
        );
        assert_eq!(h.ctx.runtime.pending_operations(&id), 0);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.blessing.synthesis_status, SynthesisStatus::NotSynthesized);
        assert_eq!(view.quota.used, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_exhaustion_surfaces_failure() {
        let h = Harness::with_quota(300, 3);
        let id = h.session();
        h.cloned_session(&id).await;
        edit(&h, &id, "恭喜发财").await;

        SynthesizeBlessingHandler::new(h.ctx.clone(), h.synthesizer.clone())
            .handle(SynthesizeBlessingCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2100)).await;

        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.blessing.synthesis_status, SynthesisStatus::NotSynthesized);
        assert!(view.blessing.synthesis_error.is_some());
        assert!(view.blessing.can_synthesize);
        assert_eq!(view.quota.used, 0);
    }
}
