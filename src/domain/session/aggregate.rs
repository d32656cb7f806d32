//! Session Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    CloneController, CompositionController, Device, MediaHandle, OperationId, OperationKind,
    PairingController, PlaybackState, PlaybackTarget, SessionId, Stage, SynthesisStatus,
};

/// 导航结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// 阶段已切换，附带被放弃的 pending 操作
    Moved {
        from: Stage,
        to: Stage,
        abandoned: Vec<OperationKind>,
    },
    /// 前进条件不满足
    Blocked,
    /// 回到入口页，会话生命周期结束
    Exited,
}

/// Session 聚合根
///
/// 每个控制器独占自己的字段；跨控制器的级联规则只在这里维护:
/// - 删除样本 → 复刻阶段重置 + 祝福语音频失效
/// - 切换阶段 → 所有播放暂停，离开阶段的 pending 操作被放弃
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    stage: Stage,
    clone: CloneController,
    composition: CompositionController,
    pairing: PairingController,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl Session {
    /// 从入口页进入，创建新会话
    pub fn new(devices: Vec<Device>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            stage: Stage::Clone,
            clone: CloneController::new(),
            composition: CompositionController::new(),
            pairing: PairingController::new(devices),
            created_at: now,
            last_activity: now,
        }
    }

    // ========== Navigator ==========

    /// 当前阶段的前进条件
    pub fn can_advance(&self) -> bool {
        match self.stage {
            Stage::Clone => {
                !self.composition.text().is_blank()
                    && self.composition.synthesis_status() == SynthesisStatus::Synthesized
            }
            Stage::Connect => self.pairing.is_connected(),
            Stage::Play => false,
        }
    }

    pub fn advance(&mut self) -> Navigation {
        match self.stage.next() {
            Some(to) if self.can_advance() => self.enter(to),
            _ => Navigation::Blocked,
        }
    }

    /// 后退总是允许；在 Clone 阶段后退即回到入口页
    pub fn retreat(&mut self) -> Navigation {
        match self.stage.previous() {
            Some(to) => self.enter(to),
            None => Navigation::Exited,
        }
    }

    /// 播放阶段完成，回到入口页
    pub fn finish(&self) -> Navigation {
        match self.stage {
            Stage::Play => Navigation::Exited,
            _ => Navigation::Blocked,
        }
    }

    fn enter(&mut self, to: Stage) -> Navigation {
        let from = self.stage;
        let abandoned = self.on_stage_left(from);
        self.stage = to;
        Navigation::Moved {
            from,
            to,
            abandoned,
        }
    }

    /// 离开阶段时的维护：暂停所有播放，放弃该阶段的 pending 操作
    pub fn on_stage_left(&mut self, stage: Stage) -> Vec<OperationKind> {
        self.pause_all_playback();
        self.abandon_pending_in(stage)
    }

    /// 放弃某阶段所属的 pending 操作
    pub fn abandon_pending_in(&mut self, stage: Stage) -> Vec<OperationKind> {
        match stage {
            Stage::Clone => {
                let mut abandoned = self.clone.abandon_pending();
                abandoned.extend(self.composition.abandon_pending());
                abandoned
            }
            Stage::Connect => self.pairing.abandon_pending(),
            Stage::Play => Vec::new(),
        }
    }

    /// 某类操作当前 pending 的 id
    pub fn pending_operation(&self, kind: OperationKind) -> Option<OperationId> {
        match kind {
            OperationKind::Cloning => self.clone.cloning().pending_id(),
            OperationKind::TestSynthesis => self.clone.test().operation().pending_id(),
            OperationKind::Expansion => self.composition.expansion().pending_id(),
            OperationKind::BlessingSynthesis => self.composition.synthesis().pending_id(),
            OperationKind::Pairing => self.pairing.operation().pending_id(),
        }
    }

    // ========== Cascades ==========

    /// 删除样本，返回需要释放的媒体句柄
    pub fn delete_sample(&mut self) -> Option<MediaHandle> {
        let released = self.clone.delete_sample()?;
        // 复刻声音已不存在，基于它合成的音频一并失效
        self.composition.invalidate_audio();
        Some(released)
    }

    // ========== Playback ==========

    pub fn playback(&self, target: PlaybackTarget) -> Option<&PlaybackState> {
        match target {
            PlaybackTarget::SamplePreview => self.clone.sample().map(|s| s.preview()),
            PlaybackTarget::TestSynthesis => self.clone.test().audio().map(|a| &a.playback),
            PlaybackTarget::BlessingAudio => self.composition.audio().map(|a| &a.playback),
        }
    }

    fn playback_mut(&mut self, target: PlaybackTarget) -> Option<&mut PlaybackState> {
        match target {
            PlaybackTarget::SamplePreview => self.clone.preview_mut(),
            PlaybackTarget::TestSynthesis => self.clone.test_playback_mut(),
            PlaybackTarget::BlessingAudio => self.composition.playback_mut(),
        }
    }

    /// 播放/暂停，目标音频不存在时拒绝
    pub fn toggle_playback(&mut self, target: PlaybackTarget) -> bool {
        match self.playback_mut(target) {
            Some(playback) => {
                playback.toggle();
                true
            }
            None => false,
        }
    }

    /// 播放计时器 tick，返回是否仍在播放
    pub fn tick_playback(&mut self, target: PlaybackTarget, elapsed_ms: u64) -> bool {
        self.playback_mut(target)
            .map(|p| p.tick(elapsed_ms))
            .unwrap_or(false)
    }

    pub fn is_playing(&self, target: PlaybackTarget) -> bool {
        self.playback(target).is_some_and(|p| p.is_playing())
    }

    pub fn pause_all_playback(&mut self) {
        self.clone.pause_playback();
        self.composition.pause_playback();
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    // Getters
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn clone_stage(&self) -> &CloneController {
        &self.clone
    }

    pub fn clone_stage_mut(&mut self) -> &mut CloneController {
        &mut self.clone
    }

    pub fn composition(&self) -> &CompositionController {
        &self.composition
    }

    pub fn composition_mut(&mut self) -> &mut CompositionController {
        &mut self.composition
    }

    pub fn pairing(&self) -> &PairingController {
        &self.pairing
    }

    pub fn pairing_mut(&mut self) -> &mut PairingController {
        &mut self.pairing
    }

    pub fn is_connected(&self) -> bool {
        self.pairing.is_connected()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }
}
