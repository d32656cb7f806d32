//! Session Commands - 会话生命周期与导航

use serde::{Deserialize, Serialize};

use crate::application::queries::SessionView;
use crate::domain::session::SessionId;

/// 从入口页进入，创建新会话
#[derive(Debug, Clone)]
pub struct StartSessionCommand;

/// 导航方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDirection {
    Forward,
    Back,
    /// 播放阶段完成
    Finish,
}

/// 导航命令
#[derive(Debug, Clone)]
pub struct NavigateCommand {
    pub session_id: SessionId,
    pub direction: NavigationDirection,
}

/// 导航响应；回到入口页时会话已关闭，没有视图
#[derive(Debug, Clone, Serialize)]
pub struct NavigateResponse {
    pub accepted: bool,
    pub exited: bool,
    pub session: Option<SessionView>,
}

/// 关闭会话命令
#[derive(Debug, Clone)]
pub struct CloseSessionCommand {
    pub session_id: SessionId,
    pub reason: String,
}

/// 关闭会话响应
#[derive(Debug, Clone, Serialize)]
pub struct CloseSessionResponse {
    pub session_id: String,
    pub released_media: usize,
}
