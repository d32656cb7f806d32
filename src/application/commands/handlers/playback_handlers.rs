//! Playback Command Handlers

use crate::application::commands::playback_commands::*;
use crate::application::context::{ActionOutcome, SessionContext};
use crate::application::error::ApplicationError;

/// TogglePlayback Handler - 播放/暂停，计时器由 reconcile 启停
pub struct TogglePlaybackHandler {
    ctx: SessionContext,
}

impl TogglePlaybackHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(
        &self,
        cmd: TogglePlaybackCommand,
    ) -> Result<ActionOutcome, ApplicationError> {
        self.ctx.act(&cmd.session_id, "toggle_playback", |session| {
            session.toggle_playback(cmd.target)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::test_support::Harness;
    use crate::domain::session::PlaybackTarget;
    use std::time::Duration;

    #[tokio::test]
    async fn test_toggle_without_audio_is_rejected() {
        let h = Harness::new();
        let id = h.session();
        let outcome = TogglePlaybackHandler::new(h.ctx.clone())
            .handle(TogglePlaybackCommand {
                session_id: id,
                target: PlaybackTarget::BlessingAudio,
            })
            .await
            .unwrap();
        assert!(!outcome.accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_play_and_pause() {
        let h = Harness::new();
        let id = h.session();
        h.upload_sample(&id).await;

        let handler = TogglePlaybackHandler::new(h.ctx.clone());
        let outcome = handler
            .handle(TogglePlaybackCommand {
                session_id: id.clone(),
                target: PlaybackTarget::SamplePreview,
            })
            .await
            .unwrap();
        assert!(outcome.accepted);
        assert_eq!(h.ctx.runtime.active_timers(&id), 1);

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let outcome = handler
            .handle(TogglePlaybackCommand {
                session_id: id.clone(),
                target: PlaybackTarget::SamplePreview,
            })
            .await
            .unwrap();
        let preview = outcome.session.clone.sample.unwrap().preview;
        assert!(!preview.is_playing);
        assert_eq!(preview.position_ms, 1000);
        assert_eq!(h.ctx.runtime.active_timers(&id), 0);
    }
}
