//! Simulated Voice Cloner

use async_trait::async_trait;

use super::{Availability, SimulatedLatency};
use crate::application::ports::{CloneError, CloneRequest, VoiceCloningPort};
use crate::domain::session::ClonedVoiceId;

/// 模拟声音复刻服务（默认 3000 ms）
pub struct SimulatedVoiceCloner {
    latency: SimulatedLatency,
    availability: Availability,
}

impl SimulatedVoiceCloner {
    pub fn new(latency: SimulatedLatency) -> Self {
        Self {
            latency,
            availability: Availability::new(),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.availability.set(available);
    }
}

#[async_trait]
impl VoiceCloningPort for SimulatedVoiceCloner {
    async fn clone_voice(&self, request: CloneRequest) -> Result<ClonedVoiceId, CloneError> {
        tracing::debug!(
            sample = %request.sample_name,
            format = ?request.format,
            size = request.audio.len(),
            "SimulatedVoiceCloner: cloning"
        );

        self.latency.wait().await;

        if !self.availability.is_available() {
            return Err(CloneError::ServiceUnavailable(
                "voice cloning service offline".to_string(),
            ));
        }
        if request.audio.is_empty() {
            return Err(CloneError::SampleRejected("empty audio".to_string()));
        }

        Ok(ClonedVoiceId::new(format!(
            "voice-{}",
            uuid::Uuid::new_v4().simple()
        )))
    }
}
