//! Device Transport Port - 播放设备连接

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::session::{Device, DeviceId};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(DeviceId),
}

/// Device Transport Port
#[async_trait]
pub trait DeviceTransportPort: Send + Sync {
    /// 扫描可用设备
    async fn list_devices(&self) -> Result<Vec<Device>, TransportError>;

    async fn connect(&self, id: &DeviceId) -> Result<(), TransportError>;

    async fn disconnect(&self, id: &DeviceId) -> Result<(), TransportError>;
}
