//! Session Store Port - 会话生命周期管理
//!
//! 定义会话存储的抽象接口，具体实现在 infrastructure/memory 层

use thiserror::Error;

use crate::domain::session::{Session, SessionId};

/// Session Store 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),
}

/// Session Store Port
///
/// 所有会话状态存储在内存中。修改通过闭包在条目锁内完成，
/// 闭包内不能 await，也不能再次访问同一个 store。
pub trait SessionStorePort: Send + Sync {
    /// 创建新会话
    fn create(&self, session: Session) -> Result<SessionId, SessionError>;

    /// 获取会话快照
    fn get(&self, id: &SessionId) -> Result<Session, SessionError>;

    /// 原地修改会话
    fn modify(&self, id: &SessionId, f: &mut dyn FnMut(&mut Session)) -> Result<(), SessionError>;

    /// 检查会话是否存在
    fn is_valid(&self, id: &SessionId) -> bool;

    /// 关闭会话，返回最终状态
    fn close(&self, id: &SessionId) -> Result<Session, SessionError>;

    /// 更新最后活动时间
    fn touch(&self, id: &SessionId);

    /// 获取所有过期会话的 ID
    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<SessionId>;

    /// 获取所有会话 ID
    fn list_all(&self) -> Vec<SessionId>;
}

/// 带返回值的会话修改
pub trait SessionStoreExt {
    fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, SessionError>;
}

impl<S: SessionStorePort + ?Sized> SessionStoreExt for S {
    fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, SessionError> {
        let mut f = Some(f);
        let mut out = None;
        self.modify(id, &mut |session| {
            if let Some(f) = f.take() {
                out = Some(f(session));
            }
        })?;
        out.ok_or_else(|| SessionError::NotFound(id.clone()))
    }
}
