//! Playback Commands

use crate::domain::session::{PlaybackTarget, SessionId};

/// 播放/暂停
#[derive(Debug, Clone)]
pub struct TogglePlaybackCommand {
    pub session_id: SessionId,
    pub target: PlaybackTarget,
}
