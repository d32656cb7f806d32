//! Clone Commands - 样本获取、复刻、试听

use crate::domain::session::SessionId;

/// 上传样本
#[derive(Debug, Clone)]
pub struct UploadSampleCommand {
    pub session_id: SessionId,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// 客户端解析出的时长（秒），未知时为 None
    pub duration_secs: Option<u32>,
}

/// 开始录音
#[derive(Debug, Clone)]
pub struct StartRecordingCommand {
    pub session_id: SessionId,
}

/// 完成录音并提交录到的音频
#[derive(Debug, Clone)]
pub struct FinishRecordingCommand {
    pub session_id: SessionId,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
    /// 未提供时使用录音计时
    pub duration_secs: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CancelRecordingCommand {
    pub session_id: SessionId,
}

/// 勾选/取消声音复刻服务协议
#[derive(Debug, Clone)]
pub struct SetAgreementCommand {
    pub session_id: SessionId,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct StartCloningCommand {
    pub session_id: SessionId,
}

/// 删除样本（级联重置）
#[derive(Debug, Clone)]
pub struct DeleteSampleCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct SetTestTextCommand {
    pub session_id: SessionId,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SynthesizeTestCommand {
    pub session_id: SessionId,
}
