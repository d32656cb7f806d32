//! Session Runtime - 异步操作与周期计时器
//!
//! 命令处理器只做同步的领域决策；需要外部协作方的操作交给 runtime:
//! - `spawn_operation`: 在 tokio 上运行协作方调用，完成后重新进入会话执行 settle
//! - `reconcile`: 每次命令与 settle 之后，让操作与计时器和会话状态保持一致
//!
//! 每个会话有一个根 `CancellationToken`，操作与计时器都是它的子 token，
//! 关闭会话时全部取消。

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::application::ports::{SessionStoreExt, SessionStorePort};
use crate::domain::session::{
    CloneStage, OperationId, OperationKind, PlaybackTarget, Session, SessionId,
};
use crate::infrastructure::events::EventPublisher;

/// Runtime 配置
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// 播放进度 tick 间隔
    pub playback_tick: Duration,
    /// 录音计时间隔
    pub recording_tick: Duration,
    /// 录音时长上限（秒）
    pub recording_max_secs: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            playback_tick: Duration::from_millis(100),
            recording_tick: Duration::from_secs(1),
            recording_max_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TimerKind {
    Playback(PlaybackTarget),
    RecordingClock,
}

struct TimerHandle {
    generation: u64,
    _guard: DropGuard,
}

struct PendingOperation {
    id: OperationId,
    token: CancellationToken,
}

/// 单个会话的取消范围
struct SessionScope {
    root: CancellationToken,
    operations: HashMap<OperationKind, PendingOperation>,
    timers: HashMap<TimerKind, TimerHandle>,
}

impl SessionScope {
    fn new() -> Self {
        Self {
            root: CancellationToken::new(),
            operations: HashMap::new(),
            timers: HashMap::new(),
        }
    }
}

/// 会话运行时
pub struct SessionRuntime {
    store: Arc<dyn SessionStorePort>,
    events: Arc<EventPublisher>,
    config: RuntimeConfig,
    scopes: DashMap<SessionId, SessionScope>,
    timer_generation: AtomicU64,
}

impl SessionRuntime {
    pub fn new(
        store: Arc<dyn SessionStorePort>,
        events: Arc<EventPublisher>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            store,
            events,
            config,
            scopes: DashMap::new(),
            timer_generation: AtomicU64::new(0),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventPublisher> {
        &self.events
    }

    /// 为新会话建立取消范围与事件通道
    pub fn open(&self, id: &SessionId) {
        self.scopes.insert(id.clone(), SessionScope::new());
        self.events.register_session(id);
    }

    /// 取消会话的全部操作与计时器
    pub fn close(&self, id: &SessionId, reason: &str) {
        if let Some((_, scope)) = self.scopes.remove(id) {
            scope.root.cancel();
            tracing::debug!(
                session_id = %id,
                operations = scope.operations.len(),
                timers = scope.timers.len(),
                "Session scope cancelled"
            );
        }
        self.events.publish_session_closed(id, reason);
        self.events.unregister_session(id);
    }

    pub fn is_open(&self, id: &SessionId) -> bool {
        self.scopes.contains_key(id)
    }

    /// 正在运行的操作数
    pub fn pending_operations(&self, id: &SessionId) -> usize {
        self.scopes
            .get(id)
            .map(|scope| scope.operations.len())
            .unwrap_or(0)
    }

    /// 正在运行的计时器数
    pub fn active_timers(&self, id: &SessionId) -> usize {
        self.scopes
            .get(id)
            .map(|scope| scope.timers.len())
            .unwrap_or(0)
    }

    // ========== Operations ==========

    /// 启动协作方调用
    ///
    /// `on_settle` 在会话条目锁内执行，返回 false 表示结果已过期被忽略。
    pub fn spawn_operation<T, F, S>(
        self: &Arc<Self>,
        session_id: &SessionId,
        kind: OperationKind,
        op_id: OperationId,
        call: F,
        on_settle: S,
    ) where
        T: Send + 'static,
        F: Future<Output = Result<T, String>> + Send + 'static,
        S: FnOnce(&mut Session, Result<T, String>) -> bool + Send + 'static,
    {
        let token = {
            let Some(mut scope) = self.scopes.get_mut(session_id) else {
                tracing::debug!(session_id = %session_id, operation = ?kind, "Session scope missing, operation dropped");
                return;
            };
            let token = scope.root.child_token();
            if let Some(previous) = scope.operations.insert(
                kind,
                PendingOperation {
                    id: op_id,
                    token: token.clone(),
                },
            ) {
                previous.token.cancel();
            }
            token
        };

        self.events.publish_operation_started(session_id, kind, &op_id);
        tracing::debug!(session_id = %session_id, operation = ?kind, operation_id = %op_id, "Operation started");

        let runtime = Arc::clone(self);
        let session_id = session_id.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(session_id = %session_id, operation = ?kind, operation_id = %op_id, "Operation cancelled");
                    runtime.events.publish_operation_cancelled(&session_id, kind, &op_id);
                    return;
                }
                result = call => result,
            };
            runtime.settle(&session_id, kind, op_id, result, on_settle);
        });
    }

    fn settle<T, S>(
        self: &Arc<Self>,
        session_id: &SessionId,
        kind: OperationKind,
        op_id: OperationId,
        result: Result<T, String>,
        on_settle: S,
    ) where
        S: FnOnce(&mut Session, Result<T, String>) -> bool,
    {
        self.forget_operation(session_id, kind, &op_id);

        let failure = result.as_ref().err().cloned();
        let applied = self.store.with_session(session_id, |session| {
            let applied = on_settle(session, result);
            if applied {
                session.touch();
            }
            applied
        });

        match applied {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(session_id = %session_id, operation = ?kind, operation_id = %op_id, "Stale settle ignored");
                return;
            }
            Err(_) => {
                tracing::debug!(session_id = %session_id, operation = ?kind, "Session gone before settle");
                return;
            }
        }

        match failure {
            Some(reason) => {
                tracing::warn!(session_id = %session_id, operation = ?kind, error = %reason, "Operation failed");
                self.events
                    .publish_operation_failed(session_id, kind, &op_id, &reason);
            }
            None => {
                tracing::info!(session_id = %session_id, operation = ?kind, "Operation settled");
                self.events
                    .publish_operation_settled(session_id, kind, &op_id);
                if kind == OperationKind::Pairing {
                    if let Ok(session) = self.store.get(session_id) {
                        self.events
                            .publish_devices_changed(session_id, session.pairing().registry().devices());
                    }
                }
            }
        }

        self.reconcile(session_id);
    }

    fn forget_operation(&self, session_id: &SessionId, kind: OperationKind, op_id: &OperationId) {
        if let Some(mut scope) = self.scopes.get_mut(session_id) {
            if scope.operations.get(&kind).is_some_and(|op| &op.id == op_id) {
                scope.operations.remove(&kind);
            }
        }
    }

    // ========== Reconcile ==========

    /// 让运行时资源与会话状态一致
    ///
    /// - 领域中已不再 pending 的操作被取消（删除样本、编辑文本、离开阶段等）
    /// - 播放中的目标有 tick，录音未到上限有时钟，其余计时器释放
    pub fn reconcile(self: &Arc<Self>, session_id: &SessionId) {
        let Ok(session) = self.store.get(session_id) else {
            return;
        };
        let wanted = self.wanted_timers(&session);

        let Some(mut scope) = self.scopes.get_mut(session_id) else {
            return;
        };

        scope.operations.retain(|kind, op| {
            let live = session.pending_operation(*kind) == Some(op.id);
            if !live {
                op.token.cancel();
            }
            live
        });

        scope.timers.retain(|kind, _| wanted.contains(kind));
        for kind in wanted {
            if scope.timers.contains_key(&kind) {
                continue;
            }
            let token = scope.root.child_token();
            let generation = self.timer_generation.fetch_add(1, Ordering::Relaxed);
            self.start_timer(session_id.clone(), kind, generation, token.clone());
            scope.timers.insert(
                kind,
                TimerHandle {
                    generation,
                    _guard: token.drop_guard(),
                },
            );
        }
    }

    fn wanted_timers(&self, session: &Session) -> Vec<TimerKind> {
        let mut wanted: Vec<TimerKind> = PlaybackTarget::ALL
            .into_iter()
            .filter(|target| session.is_playing(*target))
            .map(TimerKind::Playback)
            .collect();
        if let CloneStage::Recording { elapsed_secs, .. } = session.clone_stage().stage() {
            if *elapsed_secs < self.config.recording_max_secs {
                wanted.push(TimerKind::RecordingClock);
            }
        }
        wanted
    }

    fn start_timer(
        self: &Arc<Self>,
        session_id: SessionId,
        kind: TimerKind,
        generation: u64,
        token: CancellationToken,
    ) {
        let period = match kind {
            TimerKind::Playback(_) => self.config.playback_tick,
            TimerKind::RecordingClock => self.config.recording_tick,
        };
        let runtime = Arc::clone(self);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // 第一次 tick 立即完成
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = interval.tick() => {
                        if !runtime.on_tick(&session_id, kind, period) {
                            break;
                        }
                    }
                }
            }
            runtime.finish_timer(&session_id, kind, generation);
        });
    }

    /// 执行一次 tick，返回计时器是否继续
    fn on_tick(&self, session_id: &SessionId, kind: TimerKind, period: Duration) -> bool {
        match kind {
            TimerKind::Playback(target) => {
                let elapsed_ms = period.as_millis() as u64;
                let snapshot = self.store.with_session(session_id, |session| {
                    let playing = session.tick_playback(target, elapsed_ms);
                    (playing, session.playback(target).cloned())
                });
                match snapshot {
                    Ok((playing, Some(playback))) => {
                        self.events
                            .publish_playback_progress(session_id, target, &playback);
                        if !playing {
                            tracing::debug!(session_id = %session_id, target = ?target, "Playback stopped");
                        }
                        playing
                    }
                    _ => false,
                }
            }
            TimerKind::RecordingClock => {
                let max_secs = self.config.recording_max_secs;
                let ticked = self.store.with_session(session_id, |session| {
                    let running = session.clone_stage_mut().tick_recording(max_secs);
                    let elapsed = match session.clone_stage().stage() {
                        CloneStage::Recording { elapsed_secs, .. } => Some(*elapsed_secs),
                        _ => None,
                    };
                    (running, elapsed)
                });
                match ticked {
                    Ok((running, Some(elapsed))) => {
                        self.events
                            .publish_recording_clock(session_id, elapsed, max_secs);
                        running
                    }
                    _ => false,
                }
            }
        }
    }

    /// 计时器自行结束：移除登记后重新协调
    ///
    /// 结束与移除之间状态可能又变为播放中，此时需要新的计时器
    fn finish_timer(self: &Arc<Self>, session_id: &SessionId, kind: TimerKind, generation: u64) {
        self.release_timer(session_id, kind, generation);
        self.reconcile(session_id);
    }

    /// 移除登记，已被替换的不动
    fn release_timer(&self, session_id: &SessionId, kind: TimerKind, generation: u64) {
        if let Some(mut scope) = self.scopes.get_mut(session_id) {
            if scope
                .timers
                .get(&kind)
                .is_some_and(|timer| timer.generation == generation)
            {
                scope.timers.remove(&kind);
            }
        }
    }
}
