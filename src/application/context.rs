//! Session Context - 命令/查询处理器共享的依赖
//!
//! 同步动作的固定流程：条目锁内执行守卫与修改 → 协调运行时资源 → 返回视图

use serde::Serialize;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    MediaStorePort, SessionStoreExt, SessionStorePort, SpeechSynthesisPort,
};
use crate::application::queries::SessionView;
use crate::application::runtime::SessionRuntime;
use crate::domain::session::{Session, SessionId};

/// 动作结果
///
/// 守卫拒绝返回 `accepted = false`，不是错误
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub accepted: bool,
    pub session: SessionView,
}

/// 共享依赖
#[derive(Clone)]
pub struct SessionContext {
    pub store: Arc<dyn SessionStorePort>,
    pub media: Arc<dyn MediaStorePort>,
    pub runtime: Arc<SessionRuntime>,
    pub synthesizer: Arc<dyn SpeechSynthesisPort>,
}

impl SessionContext {
    pub fn new(
        store: Arc<dyn SessionStorePort>,
        media: Arc<dyn MediaStorePort>,
        runtime: Arc<SessionRuntime>,
        synthesizer: Arc<dyn SpeechSynthesisPort>,
    ) -> Self {
        Self {
            store,
            media,
            runtime,
            synthesizer,
        }
    }

    /// 当前会话视图
    pub fn view(&self, id: &SessionId) -> Result<SessionView, ApplicationError> {
        let session = self.store.get(id)?;
        Ok(SessionView::build(&session, self.synthesizer.quota()))
    }

    /// 执行同步动作，`f` 返回守卫是否通过
    pub fn act(
        &self,
        id: &SessionId,
        action: &'static str,
        f: impl FnOnce(&mut Session) -> bool,
    ) -> Result<ActionOutcome, ApplicationError> {
        let accepted = self.store.with_session(id, |session| {
            let accepted = f(session);
            if accepted {
                session.touch();
            }
            accepted
        })?;
        self.outcome(id, action, accepted)
    }

    /// 在修改之后协调资源并构造结果
    pub fn outcome(
        &self,
        id: &SessionId,
        action: &'static str,
        accepted: bool,
    ) -> Result<ActionOutcome, ApplicationError> {
        if accepted {
            self.runtime.reconcile(id);
        } else {
            tracing::debug!(session_id = %id, action = action, "Action rejected by guard");
        }
        Ok(ActionOutcome {
            accepted,
            session: self.view(id)?,
        })
    }

    /// 关闭会话：取消所有操作与计时器，释放媒体，返回释放的句柄数
    pub fn teardown(&self, id: &SessionId, reason: &str) -> Result<usize, ApplicationError> {
        let session = self.store.close(id)?;
        self.runtime.close(id, reason);

        let released = session
            .clone_stage()
            .sample()
            .map(|sample| self.media.release(sample.media()))
            .into_iter()
            .filter(|released| *released)
            .count();

        tracing::info!(
            session_id = %id,
            reason = reason,
            released_media = released,
            "Session torn down"
        );
        Ok(released)
    }
}
