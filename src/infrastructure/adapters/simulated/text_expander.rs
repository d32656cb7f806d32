//! Simulated Text Expander
//!
//! 每种风格返回一条固定模板，种子文本只用于日志

use async_trait::async_trait;

use super::{Availability, SimulatedLatency};
use crate::application::ports::{ExpansionError, TextExpansionPort};
use crate::domain::session::BlessingStyle;

/// 风格对应的祝福语模板
pub fn template_for(style: BlessingStyle) -> &'static str {
    match style {
        BlessingStyle::Humor => {
            "哈哈，生日快乐！愿你的年龄只是个数字，但银行卡余额是个天文数字！🎂"
        }
        BlessingStyle::Formal => {
            "在这个特殊的日子里，谨致以最诚挚的祝福。愿您身体健康，工作顺利，阖家幸福。"
        }
        BlessingStyle::Poetic => "岁月如歌声悠扬，生辰如花香满堂。愿君此日心欢畅，来年更比今年强。",
    }
}

/// 模拟 AI 扩写（默认 2000 ms）
pub struct SimulatedTextExpander {
    latency: SimulatedLatency,
    availability: Availability,
}

impl SimulatedTextExpander {
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
impl TextExpansionPort for SimulatedTextExpander {
    async fn expand(&self, seed: &str, style: BlessingStyle) -> Result<String, ExpansionError> {
        tracing::debug!(
            seed_chars = seed.chars().count(),
            style = style.as_str(),
            "SimulatedTextExpander: expanding"
        );

        self.latency.wait().await;

        if !self.availability.is_available() {
            return Err(ExpansionError::ServiceUnavailable(
                "text expansion service offline".to_string(),
            ));
        }
        Ok(template_for(style).to_string())
    }
}
