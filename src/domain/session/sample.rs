//! Clone Stage - 声音样本获取与复刻
//!
//! 状态: Initial → (Recording | Uploaded) → Cloned → Initial（删除）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AsyncOperation, AudioArtifact, ClonedVoiceId, MediaHandle, OperationId, OperationKind,
    PlaybackState, SampleError, SampleFormat, SampleSource,
};

/// 未知时长的样本按推荐时长上限预览
const FALLBACK_PREVIEW_MS: u64 = 30_000;

/// 样本校验规则
#[derive(Debug, Clone)]
pub struct SamplePolicy {
    pub max_bytes: u64,
    pub min_duration_secs: u32,
    pub max_duration_secs: u32,
}

impl Default for SamplePolicy {
    fn default() -> Self {
        Self {
            max_bytes: 8 * 1024 * 1024,
            min_duration_secs: 3,
            max_duration_secs: 60,
        }
    }
}

impl SamplePolicy {
    /// 校验上传/录制的样本，通过后返回识别出的格式
    pub fn validate(
        &self,
        file_name: &str,
        size_bytes: u64,
        duration_secs: Option<u32>,
    ) -> Result<SampleFormat, SampleError> {
        if file_name.trim().is_empty() {
            return Err(SampleError::EmptyName);
        }
        let format = SampleFormat::from_file_name(file_name)
            .ok_or_else(|| SampleError::UnsupportedFormat(file_name.to_string()))?;
        if size_bytes == 0 {
            return Err(SampleError::EmptyContent);
        }
        if size_bytes > self.max_bytes {
            return Err(SampleError::TooLarge {
                size: size_bytes,
                max: self.max_bytes,
            });
        }
        if let Some(secs) = duration_secs {
            if secs < self.min_duration_secs {
                return Err(SampleError::TooShort {
                    secs,
                    min: self.min_duration_secs,
                });
            }
            if secs > self.max_duration_secs {
                return Err(SampleError::TooLong {
                    secs,
                    max: self.max_duration_secs,
                });
            }
        }
        Ok(format)
    }
}

/// 声音样本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSample {
    source: SampleSource,
    display_name: String,
    media: MediaHandle,
    format: SampleFormat,
    size_bytes: u64,
    duration_secs: Option<u32>,
    preview: PlaybackState,
}

impl VoiceSample {
    pub fn new(
        source: SampleSource,
        display_name: impl Into<String>,
        media: MediaHandle,
        format: SampleFormat,
        size_bytes: u64,
        duration_secs: Option<u32>,
    ) -> Self {
        let preview_ms = duration_secs
            .map(|s| u64::from(s) * 1000)
            .unwrap_or(FALLBACK_PREVIEW_MS);
        Self {
            source,
            display_name: display_name.into(),
            media,
            format,
            size_bytes,
            duration_secs,
            preview: PlaybackState::new(preview_ms),
        }
    }

    pub fn source(&self) -> SampleSource {
        self.source
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn media(&self) -> &MediaHandle {
        &self.media
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn duration_secs(&self) -> Option<u32> {
        self.duration_secs
    }

    pub fn preview(&self) -> &PlaybackState {
        &self.preview
    }
}

/// 复刻阶段状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CloneStage {
    Initial,
    Recording {
        started_at: DateTime<Utc>,
        elapsed_secs: u32,
    },
    Uploaded,
    Cloned,
}

/// 复刻状态（由样本与复刻操作推导）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneStatus {
    Absent,
    Ready,
    Cloning,
    Cloned,
}

/// 样本接收结果
#[derive(Debug)]
pub enum SampleAcceptance {
    /// 已接收，返回被替换掉的旧句柄（需要释放）
    Accepted { replaced: Option<MediaHandle> },
    /// 当前状态不允许，样本原样退回
    Rejected(VoiceSample),
}

/// 试听合成音频
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestAudio {
    pub artifact: AudioArtifact,
    pub playback: PlaybackState,
}

/// 试听合成子流程
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSynthesis {
    text: String,
    operation: AsyncOperation<TestAudio>,
}

impl TestSynthesis {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn operation(&self) -> &AsyncOperation<TestAudio> {
        &self.operation
    }

    pub fn audio(&self) -> Option<&TestAudio> {
        self.operation.settled()
    }
}

/// 复刻阶段状态机
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneController {
    stage: CloneStage,
    sample: Option<VoiceSample>,
    agreement_accepted: bool,
    cloning: AsyncOperation<ClonedVoiceId>,
    test: TestSynthesis,
}

impl Default for CloneController {
    fn default() -> Self {
        Self {
            stage: CloneStage::Initial,
            sample: None,
            agreement_accepted: false,
            cloning: AsyncOperation::Idle,
            test: TestSynthesis::default(),
        }
    }
}

impl CloneController {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Recording ==========

    /// 开始录制，仅 Initial 可用
    pub fn begin_recording(&mut self, now: DateTime<Utc>) -> bool {
        if self.stage != CloneStage::Initial {
            return false;
        }
        self.stage = CloneStage::Recording {
            started_at: now,
            elapsed_secs: 0,
        };
        true
    }

    /// 录音计时器 tick，返回计时器是否需要继续
    pub fn tick_recording(&mut self, max_secs: u32) -> bool {
        match &mut self.stage {
            CloneStage::Recording { elapsed_secs, .. } => {
                if *elapsed_secs < max_secs {
                    *elapsed_secs += 1;
                }
                *elapsed_secs < max_secs
            }
            _ => false,
        }
    }

    pub fn cancel_recording(&mut self) -> bool {
        if !self.is_recording() {
            return false;
        }
        self.stage = CloneStage::Initial;
        true
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.stage, CloneStage::Recording { .. })
    }

    // ========== Sample ==========

    /// 接收已校验的样本
    ///
    /// 上传: Initial / Uploaded（替换）；录制完成: Recording。复刻进行中拒绝。
    pub fn accept_sample(&mut self, sample: VoiceSample) -> SampleAcceptance {
        let allowed = match sample.source() {
            SampleSource::Uploaded => {
                matches!(self.stage, CloneStage::Initial | CloneStage::Uploaded)
            }
            SampleSource::Recorded => self.is_recording(),
        };
        if !allowed || self.cloning.is_busy() {
            return SampleAcceptance::Rejected(sample);
        }

        let replaced = self.sample.replace(sample).map(|old| old.media);
        self.stage = CloneStage::Uploaded;
        self.cloning.reset();
        self.test.operation.reset();
        SampleAcceptance::Accepted { replaced }
    }

    /// 删除样本并回到 Initial，返回需要释放的媒体句柄
    ///
    /// 级联重置：协议勾选、复刻操作、试听合成
    pub fn delete_sample(&mut self) -> Option<MediaHandle> {
        let sample = self.sample.take()?;
        self.stage = CloneStage::Initial;
        self.agreement_accepted = false;
        self.cloning.reset();
        self.test = TestSynthesis::default();
        Some(sample.media)
    }

    pub fn set_agreement(&mut self, accepted: bool) {
        self.agreement_accepted = accepted;
    }

    // ========== Cloning ==========

    pub fn can_start_cloning(&self) -> bool {
        self.stage == CloneStage::Uploaded
            && self.sample.is_some()
            && self.agreement_accepted
            && !self.cloning.is_busy()
    }

    /// 开始复刻，返回操作 id 和要提交的样本句柄
    pub fn begin_cloning(&mut self) -> Option<(OperationId, MediaHandle)> {
        if !self.can_start_cloning() {
            return None;
        }
        let media = self.sample.as_ref()?.media.clone();
        let id = self.cloning.begin()?;
        Some((id, media))
    }

    pub fn settle_cloning(&mut self, id: &OperationId, result: Result<ClonedVoiceId, String>) -> bool {
        match result {
            Ok(voice) => {
                if !self.cloning.settle(id, voice) {
                    return false;
                }
                self.stage = CloneStage::Cloned;
                if let Some(sample) = self.sample.as_mut() {
                    sample.preview.pause();
                }
                true
            }
            Err(reason) => self.cloning.fail(id, reason),
        }
    }

    // ========== Test synthesis ==========

    /// 试听文本，Initial/Recording 时输入框不可用
    pub fn set_test_text(&mut self, text: impl Into<String>) -> bool {
        if matches!(self.stage, CloneStage::Initial | CloneStage::Recording { .. }) {
            return false;
        }
        self.test.text = text.into();
        true
    }

    pub fn can_synthesize_test(&self) -> bool {
        self.stage == CloneStage::Cloned
            && !self.test.text.trim().is_empty()
            && !self.test.operation.is_busy()
    }

    /// 开始试听合成，返回操作 id、文本和复刻声音
    pub fn begin_test_synthesis(&mut self) -> Option<(OperationId, String, ClonedVoiceId)> {
        if !self.can_synthesize_test() {
            return None;
        }
        let voice = self.cloned_voice()?.clone();
        let text = self.test.text.clone();
        let id = self.test.operation.begin()?;
        Some((id, text, voice))
    }

    pub fn settle_test_synthesis(
        &mut self,
        id: &OperationId,
        result: Result<AudioArtifact, String>,
    ) -> bool {
        match result {
            Ok(artifact) => {
                let playback = PlaybackState::autoplay(artifact.duration_ms);
                self.test
                    .operation
                    .settle(id, TestAudio { artifact, playback })
            }
            Err(reason) => self.test.operation.fail(id, reason),
        }
    }

    // ========== Playback / lifecycle ==========

    pub fn preview_mut(&mut self) -> Option<&mut PlaybackState> {
        self.sample.as_mut().map(|s| &mut s.preview)
    }

    pub fn test_playback_mut(&mut self) -> Option<&mut PlaybackState> {
        self.test.operation.settled_mut().map(|a| &mut a.playback)
    }

    pub fn pause_playback(&mut self) {
        if let Some(preview) = self.preview_mut() {
            preview.pause();
        }
        if let Some(playback) = self.test_playback_mut() {
            playback.pause();
        }
    }

    /// 放弃所有 pending 的操作，返回被放弃的操作类型
    pub fn abandon_pending(&mut self) -> Vec<OperationKind> {
        let mut abandoned = Vec::new();
        if self.cloning.is_busy() {
            self.cloning.reset();
            abandoned.push(OperationKind::Cloning);
        }
        if self.test.operation.is_busy() {
            self.test.operation.reset();
            abandoned.push(OperationKind::TestSynthesis);
        }
        abandoned
    }

    // Getters
    pub fn stage(&self) -> &CloneStage {
        &self.stage
    }

    pub fn sample(&self) -> Option<&VoiceSample> {
        self.sample.as_ref()
    }

    pub fn agreement_accepted(&self) -> bool {
        self.agreement_accepted
    }

    pub fn cloning(&self) -> &AsyncOperation<ClonedVoiceId> {
        &self.cloning
    }

    pub fn cloned_voice(&self) -> Option<&ClonedVoiceId> {
        self.cloning.settled()
    }

    pub fn test(&self) -> &TestSynthesis {
        &self.test
    }

    pub fn status(&self) -> CloneStatus {
        match (&self.sample, &self.cloning) {
            (None, _) => CloneStatus::Absent,
            (Some(_), AsyncOperation::Pending(_)) => CloneStatus::Cloning,
            (Some(_), AsyncOperation::Settled(_)) => CloneStatus::Cloned,
            (Some(_), _) => CloneStatus::Ready,
        }
    }
}
