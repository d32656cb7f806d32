//! Playback State - 播放进度

use serde::{Deserialize, Serialize};

/// 播放状态（样本预览、试听合成、祝福语音频共用）
///
/// 不变量:
/// - 进度只在 is_playing 时前进
/// - 到达结尾时进度归零并停止播放
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    is_playing: bool,
    position_ms: u64,
    duration_ms: u64,
}

impl PlaybackState {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            is_playing: false,
            position_ms: 0,
            duration_ms,
        }
    }

    /// 创建并立即开始播放（合成完成后自动播放）
    pub fn autoplay(duration_ms: u64) -> Self {
        let mut state = Self::new(duration_ms);
        state.is_playing = true;
        state
    }

    pub fn toggle(&mut self) {
        self.is_playing = !self.is_playing;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// 推进播放进度，返回 tick 之后是否仍在播放
    pub fn tick(&mut self, elapsed_ms: u64) -> bool {
        if !self.is_playing {
            return false;
        }
        self.position_ms = self.position_ms.saturating_add(elapsed_ms);
        if self.position_ms >= self.duration_ms {
            self.position_ms = 0;
            self.is_playing = false;
        }
        self.is_playing
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_ms / 1000
    }

    /// 0..=100
    pub fn progress_percent(&self) -> f32 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 * 100.0 / self.duration_ms as f64).min(100.0) as f32
    }
}
