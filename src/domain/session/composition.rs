//! Blessing Composition - 祝福语编辑、AI 扩写、语音合成

use serde::{Deserialize, Serialize};

use super::{
    AsyncOperation, AudioArtifact, BlessingStyle, ClonedVoiceId, OperationId, OperationKind,
    PlaybackState,
};

/// 祝福语最大字符数
pub const MAX_BLESSING_CHARS: usize = 200;

/// 按字符（而非字节）截断到上限
pub fn clamp_blessing(text: &str) -> String {
    text.chars().take(MAX_BLESSING_CHARS).collect()
}

/// 祝福语文本
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlessingText {
    content: String,
    style: BlessingStyle,
}

impl BlessingText {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn style(&self) -> BlessingStyle {
        self.style
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// 祝福语音频 - content 的派生缓存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlessingAudio {
    pub artifact: AudioArtifact,
    /// 合成时使用的文本
    pub source_text: String,
    pub playback: PlaybackState,
}

/// 合成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStatus {
    NotSynthesized,
    Synthesizing,
    Synthesized,
}

/// 祝福语编辑控制器
///
/// 不变量:
/// - 任何文本修改（手动编辑或 AI 扩写）都会使已合成音频失效
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositionController {
    text: BlessingText,
    expansion: AsyncOperation<()>,
    synthesis: AsyncOperation<BlessingAudio>,
}

impl CompositionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_style(&mut self, style: BlessingStyle) {
        self.text.style = style;
    }

    /// 手动编辑，超出部分截断
    pub fn edit_text(&mut self, content: &str) {
        self.replace_content(clamp_blessing(content));
    }

    // ========== AI expansion ==========

    /// 开始 AI 扩写，返回操作 id、种子文本和风格
    pub fn begin_expansion(&mut self) -> Option<(OperationId, String, BlessingStyle)> {
        let id = self.expansion.begin()?;
        Some((id, self.text.content.clone(), self.text.style))
    }

    pub fn settle_expansion(&mut self, id: &OperationId, result: Result<String, String>) -> bool {
        match result {
            Ok(expanded) => {
                if !self.expansion.settle(id, ()) {
                    return false;
                }
                self.replace_content(clamp_blessing(&expanded));
                true
            }
            Err(reason) => self.expansion.fail(id, reason),
        }
    }

    // ========== Synthesis ==========

    /// 合成条件：文本非空、没有合成/扩写进行中、已有复刻声音
    pub fn can_synthesize(&self, voice: Option<&ClonedVoiceId>) -> bool {
        !self.text.is_blank()
            && !self.synthesis.is_busy()
            && !self.expansion.is_busy()
            && voice.is_some()
    }

    /// 开始合成，返回操作 id 和要合成的文本
    pub fn begin_synthesis(&mut self, voice: Option<&ClonedVoiceId>) -> Option<(OperationId, String)> {
        if !self.can_synthesize(voice) {
            return None;
        }
        let id = self.synthesis.begin()?;
        Some((id, self.text.content.clone()))
    }

    /// 合成完成，音频自动从 0 开始播放
    ///
    /// 文本在合成期间被修改时 id 已过期，结果被丢弃
    pub fn settle_synthesis(
        &mut self,
        id: &OperationId,
        result: Result<AudioArtifact, String>,
    ) -> bool {
        match result {
            Ok(artifact) => {
                let audio = BlessingAudio {
                    playback: PlaybackState::autoplay(artifact.duration_ms),
                    source_text: self.text.content.clone(),
                    artifact,
                };
                self.synthesis.settle(id, audio)
            }
            Err(reason) => self.synthesis.fail(id, reason),
        }
    }

    /// 已合成音频失效（同时停止播放）
    pub fn invalidate_audio(&mut self) {
        self.synthesis.reset();
    }

    /// 仅在已合成时可切换播放
    pub fn toggle_playback(&mut self) -> bool {
        match self.playback_mut() {
            Some(playback) => {
                playback.toggle();
                true
            }
            None => false,
        }
    }

    pub fn playback_mut(&mut self) -> Option<&mut PlaybackState> {
        self.synthesis.settled_mut().map(|a| &mut a.playback)
    }

    pub fn pause_playback(&mut self) {
        if let Some(playback) = self.playback_mut() {
            playback.pause();
        }
    }

    pub fn abandon_pending(&mut self) -> Vec<OperationKind> {
        let mut abandoned = Vec::new();
        if self.expansion.is_busy() {
            self.expansion.reset();
            abandoned.push(OperationKind::Expansion);
        }
        if self.synthesis.is_busy() {
            self.synthesis.reset();
            abandoned.push(OperationKind::BlessingSynthesis);
        }
        abandoned
    }

    fn replace_content(&mut self, content: String) {
        self.text.content = content;
        self.invalidate_audio();
    }

    // Getters
    pub fn text(&self) -> &BlessingText {
        &self.text
    }

    pub fn expansion(&self) -> &AsyncOperation<()> {
        &self.expansion
    }

    pub fn synthesis(&self) -> &AsyncOperation<BlessingAudio> {
        &self.synthesis
    }

    pub fn audio(&self) -> Option<&BlessingAudio> {
        self.synthesis.settled()
    }

    pub fn is_expanding(&self) -> bool {
        self.expansion.is_busy()
    }

    pub fn synthesis_status(&self) -> SynthesisStatus {
        match &self.synthesis {
            AsyncOperation::Pending(_) => SynthesisStatus::Synthesizing,
            AsyncOperation::Settled(_) => SynthesisStatus::Synthesized,
            AsyncOperation::Idle | AsyncOperation::Failed { .. } => SynthesisStatus::NotSynthesized,
        }
    }
}
