//! Session Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 会话唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 异步操作标识
///
/// 每次 begin 都会生成新的 id，settle 时用于识别过期的完成回调
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 媒体句柄 - 指向原始音频字节的不透明引用
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaHandle(Uuid);

impl MediaHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "media-{}", self.0)
    }
}

/// 复刻后的声音 ID（由声音复刻服务分配）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClonedVoiceId(String);

impl ClonedVoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClonedVoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 播放设备 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Clone,
    Connect,
    Play,
}

impl Stage {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Clone => Some(Self::Connect),
            Self::Connect => Some(Self::Play),
            Self::Play => None,
        }
    }

    /// 上一阶段，`None` 表示回到入口页（会话结束）
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Clone => None,
            Self::Connect => Some(Self::Clone),
            Self::Play => Some(Self::Connect),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Connect => "connect",
            Self::Play => "play",
        }
    }
}

/// 祝福语风格
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlessingStyle {
    #[default]
    Humor,
    Formal,
    Poetic,
}

impl BlessingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Humor => "humor",
            Self::Formal => "formal",
            Self::Poetic => "poetic",
        }
    }
}

/// 声音样本来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    Recorded,
    Uploaded,
}

/// 样本音频格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    Wav,
    Mp3,
    M4a,
}

impl SampleFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "m4a" => Some(Self::M4a),
            _ => None,
        }
    }

    /// 从文件名推断格式
    pub fn from_file_name(name: &str) -> Option<Self> {
        std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::M4a => "audio/mp4",
        }
    }
}

/// 播放目标 - 三处共享 PlaybackState 形状的音频
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackTarget {
    /// 已上传/录制的样本预览
    SamplePreview,
    /// 试听合成
    TestSynthesis,
    /// 祝福语音频
    BlessingAudio,
}

impl PlaybackTarget {
    pub const ALL: [PlaybackTarget; 3] = [
        PlaybackTarget::SamplePreview,
        PlaybackTarget::TestSynthesis,
        PlaybackTarget::BlessingAudio,
    ];
}

/// 长耗时操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Cloning,
    TestSynthesis,
    Expansion,
    BlessingSynthesis,
    Pairing,
}

impl OperationKind {
    /// 操作所属阶段，离开该阶段时 pending 的操作被放弃
    pub fn stage(&self) -> Stage {
        match self {
            Self::Cloning | Self::TestSynthesis | Self::Expansion | Self::BlessingSynthesis => {
                Stage::Clone
            }
            Self::Pairing => Stage::Connect,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cloning => "cloning",
            Self::TestSynthesis => "test_synthesis",
            Self::Expansion => "expansion",
            Self::BlessingSynthesis => "blessing_synthesis",
            Self::Pairing => "pairing",
        }
    }
}

/// 合成出的音频引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// 合成服务返回的音频引用
    pub reference: String,
    /// 音频时长（毫秒）
    pub duration_ms: u64,
    /// 本次消耗的字符数
    pub characters: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_sequence() {
        assert_eq!(Stage::Clone.next(), Some(Stage::Connect));
        assert_eq!(Stage::Connect.next(), Some(Stage::Play));
        assert_eq!(Stage::Play.next(), None);
        assert_eq!(Stage::Clone.previous(), None);
        assert_eq!(Stage::Play.previous(), Some(Stage::Connect));
    }

    #[test]
    fn test_sample_format_from_file_name() {
        assert_eq!(SampleFormat::from_file_name("me.M4A"), Some(SampleFormat::M4a));
        assert_eq!(SampleFormat::from_file_name("voice.wav"), Some(SampleFormat::Wav));
        assert_eq!(SampleFormat::from_file_name("voice.flac"), None);
        assert_eq!(SampleFormat::from_file_name("voice"), None);
    }

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::new();
        assert_eq!(SessionId::parse(&id.to_string()), Some(id));
        assert_eq!(SessionId::parse("not-a-uuid"), None);
    }
}
