//! Session Reaper - 关闭空闲过期的会话

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::SessionContext;

/// Reaper 配置
#[derive(Debug, Clone)]
pub struct SessionReaperConfig {
    /// 空闲超时（秒）
    pub idle_timeout_secs: u64,
    /// 扫描间隔
    pub interval: Duration,
}

impl Default for SessionReaperConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 1800,
            interval: Duration::from_secs(60),
        }
    }
}

/// 会话回收 Worker
///
/// 定期扫描空闲超时的会话并完整关闭（取消操作、停止计时器、释放媒体）
pub struct SessionReaper {
    config: SessionReaperConfig,
    ctx: SessionContext,
}

impl SessionReaper {
    pub fn new(config: SessionReaperConfig, ctx: SessionContext) -> Self {
        Self { config, ctx }
    }

    /// 启动 Worker，直到 shutdown 被取消
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            idle_timeout_secs = self.config.idle_timeout_secs,
            interval_secs = self.config.interval.as_secs(),
            "SessionReaper started"
        );

        let mut interval = tokio::time::interval(self.config.interval);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    self.sweep();
                }
            }
        }

        tracing::info!("SessionReaper stopped");
    }

    /// 执行一次扫描，返回关闭的会话数
    pub fn sweep(&self) -> usize {
        let expired = self
            .ctx
            .store
            .get_expired_sessions(self.config.idle_timeout_secs);

        let mut closed = 0;
        for session_id in expired {
            match self.ctx.teardown(&session_id, "idle_timeout") {
                Ok(_) => closed += 1,
                // 扫描与关闭之间已被客户端关闭
                Err(e) => tracing::debug!(session_id = %session_id, error = %e, "Expired session already gone"),
            }
        }

        if closed > 0 {
            tracing::info!(closed = closed, "Idle sessions reaped");
        }
        closed
    }
}
