//! Device Pairing - 设备列表与独占连接

use serde::{Deserialize, Serialize};

use super::{AsyncOperation, DeviceId, OperationId, OperationKind};

/// 播放设备
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub connected: bool,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: DeviceId::new(id),
            name: name.into(),
            connected: false,
        }
    }
}

/// 配对动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingAction {
    /// 连接目标设备，同时断开 previous
    Connect {
        target: DeviceId,
        previous: Option<DeviceId>,
    },
    Disconnect(DeviceId),
}

/// 设备注册表
///
/// 不变量: 任意时刻最多一个设备 connected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    /// 用扫描结果替换列表，多个 connected 时只保留第一个
    pub fn replace_all(&mut self, devices: Vec<Device>) {
        let mut seen_connected = false;
        self.devices = devices
            .into_iter()
            .map(|mut device| {
                if device.connected {
                    device.connected = !seen_connected;
                    seen_connected = true;
                }
                device
            })
            .collect();
    }

    /// 计算切换某设备需要执行的动作，未知设备返回 None
    pub fn plan_toggle(&self, id: &DeviceId) -> Option<PairingAction> {
        let target = self.find(id)?;
        if target.connected {
            return Some(PairingAction::Disconnect(id.clone()));
        }
        Some(PairingAction::Connect {
            target: id.clone(),
            previous: self.connected().map(|d| d.id.clone()),
        })
    }

    /// 切换设备连接状态
    ///
    /// 整个列表一次性替换，不存在两个设备同时 connected 的中间状态
    pub fn toggle(&mut self, id: &DeviceId) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.devices = self
            .devices
            .iter()
            .map(|device| Device {
                connected: if &device.id == id {
                    !device.connected
                } else {
                    false
                },
                ..device.clone()
            })
            .collect();
        true
    }

    /// 应用配对动作的结果
    pub fn apply(&mut self, action: &PairingAction) {
        let target = match action {
            PairingAction::Connect { target, .. } => target,
            PairingAction::Disconnect(target) => target,
        };
        let should_connect = matches!(action, PairingAction::Connect { .. });
        let currently = self.find(target).map(|d| d.connected);
        if currently.is_some_and(|c| c != should_connect) {
            self.toggle(target);
        }
    }

    pub fn find(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    pub fn connected(&self) -> Option<&Device> {
        self.devices.iter().find(|d| d.connected)
    }

    pub fn is_connected(&self) -> bool {
        self.connected().is_some()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }
}

/// 设备配对控制器
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairingController {
    registry: DeviceRegistry,
    operation: AsyncOperation<()>,
}

impl PairingController {
    pub fn new(devices: Vec<Device>) -> Self {
        let mut registry = DeviceRegistry::default();
        registry.replace_all(devices);
        Self {
            registry,
            operation: AsyncOperation::Idle,
        }
    }

    /// 开始切换连接，返回操作 id 和需要传输层执行的动作
    pub fn begin_toggle(&mut self, id: &DeviceId) -> Option<(OperationId, PairingAction)> {
        if self.operation.is_busy() {
            return None;
        }
        let action = self.registry.plan_toggle(id)?;
        let op = self.operation.begin()?;
        Some((op, action))
    }

    pub fn settle_toggle(
        &mut self,
        id: &OperationId,
        action: &PairingAction,
        result: Result<(), String>,
    ) -> bool {
        match result {
            Ok(()) => {
                if !self.operation.settle(id, ()) {
                    return false;
                }
                self.registry.apply(action);
                true
            }
            Err(reason) => self.operation.fail(id, reason),
        }
    }

    /// 开始刷新设备列表
    pub fn begin_refresh(&mut self) -> Option<OperationId> {
        self.operation.begin()
    }

    pub fn settle_refresh(&mut self, id: &OperationId, result: Result<Vec<Device>, String>) -> bool {
        match result {
            Ok(devices) => {
                if !self.operation.settle(id, ()) {
                    return false;
                }
                self.registry.replace_all(devices);
                true
            }
            Err(reason) => self.operation.fail(id, reason),
        }
    }

    pub fn abandon_pending(&mut self) -> Vec<OperationKind> {
        if self.operation.is_busy() {
            self.operation.reset();
            return vec![OperationKind::Pairing];
        }
        Vec::new()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn operation(&self) -> &AsyncOperation<()> {
        &self.operation
    }

    pub fn is_connected(&self) -> bool {
        self.registry.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DeviceRegistry {
        let mut registry = DeviceRegistry::default();
        registry.replace_all(vec![
            Device::new("A", "智能音响-001"),
            Device::new("B", "蓝牙耳机-Pro"),
            Device::new("C", "语音盒子-Mini"),
        ]);
        registry
    }

    fn connected_count(registry: &DeviceRegistry) -> usize {
        registry.devices().iter().filter(|d| d.connected).count()
    }

    #[test]
    fn test_connect_a_then_b() {
        let mut registry = registry();
        let a = DeviceId::new("A");
        let b = DeviceId::new("B");

        assert!(registry.toggle(&a));
        assert!(registry.toggle(&b));

        assert!(!registry.find(&a).unwrap().connected);
        assert!(registry.find(&b).unwrap().connected);
        assert!(registry.is_connected());
    }

    #[test]
    fn test_at_most_one_connected_for_any_sequence() {
        let mut registry = registry();
        let ids = ["A", "B", "A", "A", "C", "B", "C", "C", "X"];
        for id in ids {
            registry.toggle(&DeviceId::new(id));
            assert!(connected_count(&registry) <= 1);
        }
    }

    #[test]
    fn test_toggle_connected_device_disconnects() {
        let mut registry = registry();
        let a = DeviceId::new("A");
        registry.toggle(&a);
        registry.toggle(&a);
        assert!(!registry.is_connected());
    }

    #[test]
    fn test_replace_all_keeps_single_connection() {
        let mut registry = DeviceRegistry::default();
        let mut first = Device::new("A", "a");
        first.connected = true;
        let mut second = Device::new("B", "b");
        second.connected = true;
        registry.replace_all(vec![first, second]);
        assert_eq!(connected_count(&registry), 1);
        assert_eq!(registry.connected().unwrap().id, DeviceId::new("A"));
    }

    #[test]
    fn test_pairing_plans_connect_with_previous() {
        let mut pairing = PairingController::new(registry().devices().to_vec());
        let (op, action) = pairing.begin_toggle(&DeviceId::new("A")).unwrap();
        assert!(pairing.begin_toggle(&DeviceId::new("B")).is_none());
        assert!(pairing.settle_toggle(&op, &action, Ok(())));

        let (_, action) = pairing.begin_toggle(&DeviceId::new("B")).unwrap();
        assert_eq!(
            action,
            PairingAction::Connect {
                target: DeviceId::new("B"),
                previous: Some(DeviceId::new("A")),
            }
        );
    }

    #[test]
    fn test_pairing_failure_leaves_registry_unchanged() {
        let mut pairing = PairingController::new(registry().devices().to_vec());
        let (op, action) = pairing.begin_toggle(&DeviceId::new("A")).unwrap();
        assert!(pairing.settle_toggle(&op, &action, Err("connection lost".to_string())));
        assert!(!pairing.is_connected());
        assert_eq!(pairing.operation().failure(), Some("connection lost"));
    }

    #[test]
    fn test_unknown_device_is_rejected() {
        let mut pairing = PairingController::new(registry().devices().to_vec());
        assert!(pairing.begin_toggle(&DeviceId::new("missing")).is_none());
        assert!(!pairing.operation().is_busy());
    }
}
