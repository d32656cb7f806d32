//! Simulated Device Transport
//!
//! 三个演示设备，维护独占连接状态，扫描返回当前状态

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Availability, SimulatedLatency};
use crate::application::ports::{DeviceTransportPort, TransportError};
use crate::domain::session::{Device, DeviceId};

/// 模拟设备传输配置
#[derive(Debug, Clone)]
pub struct SimulatedDeviceTransportConfig {
    pub latency: SimulatedLatency,
    /// 扫描返回的设备
    pub devices: Vec<Device>,
}

impl Default for SimulatedDeviceTransportConfig {
    fn default() -> Self {
        let mut mini = Device::new("3", "语音盒子-Mini");
        mini.connected = true;
        Self {
            latency: SimulatedLatency::from_millis(600),
            devices: vec![
                Device::new("1", "智能音响-001"),
                Device::new("2", "蓝牙耳机-Pro"),
                mini,
            ],
        }
    }
}

/// 模拟蓝牙传输
pub struct SimulatedDeviceTransport {
    config: SimulatedDeviceTransportConfig,
    availability: Availability,
    devices: Mutex<Vec<Device>>,
}

impl SimulatedDeviceTransport {
    pub fn new(config: SimulatedDeviceTransportConfig) -> Self {
        let devices = Mutex::new(config.devices.clone());
        Self {
            config,
            availability: Availability::new(),
            devices,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SimulatedDeviceTransportConfig::default())
    }

    pub fn set_available(&self, available: bool) {
        self.availability.set(available);
    }

    /// 扫描结果的初始快照（不模拟延迟）
    pub fn initial_devices(&self) -> Vec<Device> {
        self.config.devices.clone()
    }

    fn devices(&self) -> MutexGuard<'_, Vec<Device>> {
        self.devices.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_known(devices: &[Device], id: &DeviceId) -> Result<(), TransportError> {
        if devices.iter().any(|d| &d.id == id) {
            Ok(())
        } else {
            Err(TransportError::DeviceNotFound(id.clone()))
        }
    }

    fn ensure_available(&self) -> Result<(), TransportError> {
        if self.availability.is_available() {
            Ok(())
        } else {
            Err(TransportError::ConnectionLost(
                "bluetooth link dropped".to_string(),
            ))
        }
    }
}

#[async_trait]
impl DeviceTransportPort for SimulatedDeviceTransport {
    async fn list_devices(&self) -> Result<Vec<Device>, TransportError> {
        self.config.latency.wait().await;
        self.ensure_available()?;
        Ok(self.devices().clone())
    }

    async fn connect(&self, id: &DeviceId) -> Result<(), TransportError> {
        tracing::debug!(device_id = %id, "SimulatedDeviceTransport: connecting");
        self.config.latency.wait().await;
        self.ensure_available()?;
        let mut devices = self.devices();
        Self::ensure_known(&devices, id)?;
        // 独占连接：目标连上，其余全部断开
        for device in devices.iter_mut() {
            device.connected = &device.id == id;
        }
        Ok(())
    }

    async fn disconnect(&self, id: &DeviceId) -> Result<(), TransportError> {
        tracing::debug!(device_id = %id, "SimulatedDeviceTransport: disconnecting");
        self.config.latency.wait().await;
        self.ensure_available()?;
        let mut devices = self.devices();
        Self::ensure_known(&devices, id)?;
        if let Some(device) = devices.iter_mut().find(|d| &d.id == id) {
            device.connected = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_demo_devices() {
        let transport = SimulatedDeviceTransport::with_defaults();
        let devices = transport.list_devices().await.unwrap();
        assert_eq!(devices.len(), 3);
        assert_eq!(devices.iter().filter(|d| d.connected).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listing_reflects_pairing() {
        let transport = SimulatedDeviceTransport::with_defaults();
        transport.connect(&DeviceId::new("1")).await.unwrap();

        let devices = transport.list_devices().await.unwrap();
        let connected: Vec<_> = devices.iter().filter(|d| d.connected).collect();
        assert_eq!(connected.len(), 1);
        assert_eq!(connected[0].id, DeviceId::new("1"));

        transport.disconnect(&DeviceId::new("1")).await.unwrap();
        let devices = transport.list_devices().await.unwrap();
        assert!(devices.iter().all(|d| !d.connected));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_unknown_and_connection_lost() {
        let transport = SimulatedDeviceTransport::with_defaults();
        assert!(transport.connect(&DeviceId::new("1")).await.is_ok());
        assert!(matches!(
            transport.connect(&DeviceId::new("9")).await,
            Err(TransportError::DeviceNotFound(_))
        ));

        transport.set_available(false);
        assert!(matches!(
            transport.disconnect(&DeviceId::new("1")).await,
            Err(TransportError::ConnectionLost(_))
        ));
    }
}
