//! Device Commands - 设备配对

use crate::domain::session::{DeviceId, SessionId};

/// 切换设备连接（连接时断开其他设备）
#[derive(Debug, Clone)]
pub struct ToggleDeviceCommand {
    pub session_id: SessionId,
    pub device_id: DeviceId,
}

#[derive(Debug, Clone)]
pub struct RefreshDevicesCommand {
    pub session_id: SessionId,
}
