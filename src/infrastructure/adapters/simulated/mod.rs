//! Simulated Adapters - 模拟外部协作方
//!
//! 不做任何真实计算，只模拟延迟与完成；每个适配器都可以切换为不可用，
//! 用于演练失败路径。

mod device_transport;
mod speech_synthesizer;
mod text_expander;
mod voice_cloner;

pub use device_transport::{SimulatedDeviceTransport, SimulatedDeviceTransportConfig};
pub use speech_synthesizer::{SimulatedSpeechSynthesizer, SimulatedSpeechSynthesizerConfig};
pub use text_expander::{template_for, SimulatedTextExpander};
pub use voice_cloner::SimulatedVoiceCloner;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 模拟延迟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency(Duration);

impl SimulatedLatency {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    /// 等待一次延迟，不阻塞其他任务
    pub async fn wait(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}

/// 可用性开关
#[derive(Debug)]
pub struct Availability(AtomicBool);

impl Availability {
    pub fn new() -> Self {
        Self(AtomicBool::new(true))
    }

    pub fn set(&self, available: bool) {
        self.0.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new()
    }
}
