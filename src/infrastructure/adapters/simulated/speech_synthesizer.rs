//! Simulated Speech Synthesizer
//!
//! 按字符计费：超过单次上限或剩余总额度时拒绝，不扣减

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Availability, SimulatedLatency};
use crate::application::ports::{
    CharacterQuota, SpeechSynthesisPort, SynthesisError, SynthesisRequest,
};
use crate::domain::session::AudioArtifact;

/// 模拟语音合成配置
#[derive(Debug, Clone)]
pub struct SimulatedSpeechSynthesizerConfig {
    pub latency: SimulatedLatency,
    /// 单次请求字符上限
    pub per_request_chars: usize,
    /// 总字符额度
    pub total_chars: usize,
    /// 合成音频时长（毫秒）
    pub audio_duration_ms: u64,
}

impl Default for SimulatedSpeechSynthesizerConfig {
    fn default() -> Self {
        Self {
            latency: SimulatedLatency::from_millis(2000),
            per_request_chars: 300,
            total_chars: 20_000,
            audio_duration_ms: 10_000,
        }
    }
}

/// 模拟语音合成服务
pub struct SimulatedSpeechSynthesizer {
    config: SimulatedSpeechSynthesizerConfig,
    used: AtomicUsize,
    availability: Availability,
}

impl SimulatedSpeechSynthesizer {
    pub fn new(config: SimulatedSpeechSynthesizerConfig) -> Self {
        tracing::info!(
            per_request = config.per_request_chars,
            total = config.total_chars,
            "SimulatedSpeechSynthesizer initialized"
        );
        Self {
            config,
            used: AtomicUsize::new(0),
            availability: Availability::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SimulatedSpeechSynthesizerConfig::default())
    }

    pub fn set_available(&self, available: bool) {
        self.availability.set(available);
    }

    fn charge(&self, requested: usize) -> Result<(), SynthesisError> {
        if requested > self.config.per_request_chars {
            return Err(SynthesisError::CharacterQuotaExceeded {
                requested,
                remaining: self.quota().allowance(),
            });
        }
        let total = self.config.total_chars;
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (requested <= total.saturating_sub(used)).then_some(used + requested)
            })
            .map(|_| ())
            .map_err(|used| SynthesisError::CharacterQuotaExceeded {
                requested,
                remaining: total.saturating_sub(used),
            })
    }
}

#[async_trait]
impl SpeechSynthesisPort for SimulatedSpeechSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<AudioArtifact, SynthesisError> {
        let characters = request.text.chars().count();
        tracing::debug!(
            characters = characters,
            voice_id = %request.voice_id,
            "SimulatedSpeechSynthesizer: synthesizing"
        );

        self.config.latency.wait().await;

        if !self.availability.is_available() {
            return Err(SynthesisError::ServiceUnavailable(
                "speech synthesis service offline".to_string(),
            ));
        }
        self.charge(characters)?;

        Ok(AudioArtifact {
            reference: format!("tts-{}", uuid::Uuid::new_v4().simple()),
            duration_ms: self.config.audio_duration_ms,
            characters,
        })
    }

    fn quota(&self) -> CharacterQuota {
        CharacterQuota {
            per_request: self.config.per_request_chars,
            total: self.config.total_chars,
            used: self.used.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::ClonedVoiceId;

    fn synthesizer(per_request: usize, total: usize) -> SimulatedSpeechSynthesizer {
        SimulatedSpeechSynthesizer::new(SimulatedSpeechSynthesizerConfig {
            latency: SimulatedLatency::from_millis(0),
            per_request_chars: per_request,
            total_chars: total,
            audio_duration_ms: 10_000,
        })
    }

    fn request(text: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            voice_id: ClonedVoiceId::new("voice-1"),
        }
    }

    #[tokio::test]
    async fn test_synthesis_charges_characters() {
        let tts = synthesizer(300, 20_000);
        let artifact = tts.synthesize(request("生日快乐")).await.unwrap();

        assert_eq!(artifact.characters, 4);
        assert_eq!(artifact.duration_ms, 10_000);
        assert_eq!(tts.quota().used, 4);
        assert_eq!(tts.quota().remaining(), 19_996);
    }

    #[tokio::test]
    async fn test_per_request_limit() {
        let tts = synthesizer(3, 100);
        let err = tts.synthesize(request("生日快乐")).await.unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::CharacterQuotaExceeded { requested: 4, remaining: 3 }
        ));
        assert_eq!(tts.quota().used, 0);
    }

    #[tokio::test]
    async fn test_total_quota_exhaustion() {
        let tts = synthesizer(300, 6);
        tts.synthesize(request("生日快乐")).await.unwrap();

        let err = tts.synthesize(request("生日快乐")).await.unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::CharacterQuotaExceeded { requested: 4, remaining: 2 }
        ));
        assert_eq!(tts.quota().used, 4);
    }

    #[tokio::test]
    async fn test_unavailable_does_not_charge() {
        let tts = synthesizer(300, 100);
        tts.set_available(false);
        assert!(matches!(
            tts.synthesize(request("你好")).await,
            Err(SynthesisError::ServiceUnavailable(_))
        ));
        assert_eq!(tts.quota().used, 0);
    }
}
