//! Session Queries

use crate::domain::session::SessionId;

/// 获取会话视图
#[derive(Debug, Clone)]
pub struct GetSession {
    pub session_id: SessionId,
}

/// 下载当前声音样本
#[derive(Debug, Clone)]
pub struct DownloadSample {
    pub session_id: SessionId,
}

/// 查询语音合成字符额度
#[derive(Debug, Clone)]
pub struct GetQuota;
