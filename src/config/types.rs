//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::RuntimeConfig;
use crate::domain::session::{Device, SamplePolicy};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 模拟协作方配置
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 声音样本校验
    #[serde(default)]
    pub sample: SampleConfig,

    /// 语音合成字符额度
    #[serde(default)]
    pub quota: QuotaConfig,

    /// 播放配置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 录音配置
    #[serde(default)]
    pub recording: RecordingConfig,

    /// 会话生命周期
    #[serde(default)]
    pub session: SessionConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 运行时计时器配置
    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            playback_tick: Duration::from_millis(self.playback.tick_ms),
            recording_tick: Duration::from_millis(self.recording.tick_ms),
            recording_max_secs: self.recording.max_secs,
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取监听地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 模拟协作方配置（延迟单位毫秒）
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// 声音复刻延迟
    #[serde(default = "default_clone_latency")]
    pub clone_latency_ms: u64,

    /// AI 扩写延迟
    #[serde(default = "default_expansion_latency")]
    pub expansion_latency_ms: u64,

    /// 语音合成延迟
    #[serde(default = "default_synthesis_latency")]
    pub synthesis_latency_ms: u64,

    /// 设备连接/断开延迟
    #[serde(default = "default_pairing_latency")]
    pub pairing_latency_ms: u64,

    /// 合成音频时长
    #[serde(default = "default_audio_duration")]
    pub audio_duration_ms: u64,

    /// 演示设备
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceConfig>,
}

fn default_clone_latency() -> u64 {
    3000
}

fn default_expansion_latency() -> u64 {
    2000
}

fn default_synthesis_latency() -> u64 {
    2000
}

fn default_pairing_latency() -> u64 {
    600
}

fn default_audio_duration() -> u64 {
    10_000
}

fn default_devices() -> Vec<DeviceConfig> {
    vec![
        DeviceConfig::new("1", "智能音响-001", false),
        DeviceConfig::new("2", "蓝牙耳机-Pro", false),
        DeviceConfig::new("3", "语音盒子-Mini", true),
    ]
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            clone_latency_ms: default_clone_latency(),
            expansion_latency_ms: default_expansion_latency(),
            synthesis_latency_ms: default_synthesis_latency(),
            pairing_latency_ms: default_pairing_latency(),
            audio_duration_ms: default_audio_duration(),
            devices: default_devices(),
        }
    }
}

/// 演示设备
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub connected: bool,
}

impl DeviceConfig {
    pub fn new(id: &str, name: &str, connected: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            connected,
        }
    }

    pub fn to_device(&self) -> Device {
        let mut device = Device::new(self.id.clone(), self.name.clone());
        device.connected = self.connected;
        device
    }
}

/// 样本校验配置
#[derive(Debug, Clone, Deserialize)]
pub struct SampleConfig {
    /// 上传文件最大大小（字节），默认 8MB
    #[serde(default = "default_max_sample_bytes")]
    pub max_bytes: u64,

    /// 最短时长（秒）
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: u32,

    /// 最长时长（秒）
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u32,
}

fn default_max_sample_bytes() -> u64 {
    8 * 1024 * 1024
}

fn default_min_duration() -> u32 {
    3
}

fn default_max_duration() -> u32 {
    60
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_sample_bytes(),
            min_duration_secs: default_min_duration(),
            max_duration_secs: default_max_duration(),
        }
    }
}

impl SampleConfig {
    pub fn policy(&self) -> SamplePolicy {
        SamplePolicy {
            max_bytes: self.max_bytes,
            min_duration_secs: self.min_duration_secs,
            max_duration_secs: self.max_duration_secs,
        }
    }
}

/// 字符额度配置
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// 单次请求字符上限
    #[serde(default = "default_per_request")]
    pub per_request_chars: usize,

    /// 总字符额度
    #[serde(default = "default_total_chars")]
    pub total_chars: usize,
}

fn default_per_request() -> usize {
    300
}

fn default_total_chars() -> usize {
    20_000
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            per_request_chars: default_per_request(),
            total_chars: default_total_chars(),
        }
    }
}

/// 播放配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// 进度 tick 间隔（毫秒）
    #[serde(default = "default_playback_tick")]
    pub tick_ms: u64,
}

fn default_playback_tick() -> u64 {
    100
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_playback_tick(),
        }
    }
}

/// 录音配置
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    /// 录音时长上限（秒）
    #[serde(default = "default_recording_max")]
    pub max_secs: u32,

    /// 计时间隔（毫秒）
    #[serde(default = "default_recording_tick")]
    pub tick_ms: u64,
}

fn default_recording_max() -> u32 {
    60
}

fn default_recording_tick() -> u64 {
    1000
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_secs: default_recording_max(),
            tick_ms: default_recording_tick(),
        }
    }
}

/// 会话生命周期配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 空闲超时（秒）
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// 回收扫描间隔（秒）
    #[serde(default = "default_reaper_interval")]
    pub reaper_interval_secs: u64,
}

fn default_idle_timeout() -> u64 {
    1800 // 30 分钟
}

fn default_reaper_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            reaper_interval_secs: default_reaper_interval(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
