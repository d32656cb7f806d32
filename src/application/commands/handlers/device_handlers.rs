//! Device Command Handlers - 设备配对

use std::sync::Arc;

use crate::application::commands::device_commands::*;
use crate::application::commands::handlers::session_handlers::refresh_devices;
use crate::application::context::{ActionOutcome, SessionContext};
use crate::application::error::ApplicationError;
use crate::application::ports::{DeviceTransportPort, SessionStoreExt, TransportError};
use crate::domain::session::{OperationKind, PairingAction};

/// 通过传输层执行配对动作；连接新设备前先断开旧设备
async fn execute_pairing(
    transport: Arc<dyn DeviceTransportPort>,
    action: PairingAction,
) -> Result<(), TransportError> {
    match action {
        PairingAction::Connect { target, previous } => {
            if let Some(previous) = previous {
                transport.disconnect(&previous).await?;
            }
            transport.connect(&target).await
        }
        PairingAction::Disconnect(id) => transport.disconnect(&id).await,
    }
}

/// ToggleDevice Handler
pub struct ToggleDeviceHandler {
    ctx: SessionContext,
    transport: Arc<dyn DeviceTransportPort>,
}

impl ToggleDeviceHandler {
    pub fn new(ctx: SessionContext, transport: Arc<dyn DeviceTransportPort>) -> Self {
        Self { ctx, transport }
    }

    pub async fn handle(&self, cmd: ToggleDeviceCommand) -> Result<ActionOutcome, ApplicationError> {
        let started = self.ctx.store.with_session(&cmd.session_id, |session| {
            let started = session.pairing_mut().begin_toggle(&cmd.device_id);
            if started.is_some() {
                session.touch();
            }
            started
        })?;

        let Some((op, action)) = started else {
            return self.ctx.outcome(&cmd.session_id, "toggle_device", false);
        };

        tracing::info!(
            session_id = %cmd.session_id,
            device_id = %cmd.device_id,
            action = ?action,
            "Device pairing started"
        );

        let transport = Arc::clone(&self.transport);
        let planned = action.clone();
        self.ctx.runtime.spawn_operation(
            &cmd.session_id,
            OperationKind::Pairing,
            op,
            async move {
                execute_pairing(transport, planned)
                    .await
                    .map_err(|e| e.to_string())
            },
            move |session, result| session.pairing_mut().settle_toggle(&op, &action, result),
        );

        self.ctx.outcome(&cmd.session_id, "toggle_device", true)
    }
}

/// RefreshDevices Handler
pub struct RefreshDevicesHandler {
    ctx: SessionContext,
    transport: Arc<dyn DeviceTransportPort>,
}

impl RefreshDevicesHandler {
    pub fn new(ctx: SessionContext, transport: Arc<dyn DeviceTransportPort>) -> Self {
        Self { ctx, transport }
    }

    pub async fn handle(
        &self,
        cmd: RefreshDevicesCommand,
    ) -> Result<ActionOutcome, ApplicationError> {
        let accepted = refresh_devices(&self.ctx, &self.transport, &cmd.session_id)?;
        self.ctx.outcome(&cmd.session_id, "refresh_devices", accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::test_support::Harness;
    use crate::domain::session::{DeviceId, SessionId};
    use std::time::Duration;

    async fn toggle(h: &Harness, id: &SessionId, device: &str) -> ActionOutcome {
        ToggleDeviceHandler::new(h.ctx.clone(), h.transport.clone())
            .handle(ToggleDeviceCommand {
                session_id: id.clone(),
                device_id: DeviceId::new(device),
            })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_a_then_b() {
        let h = Harness::new();
        let id = h.session();

        let outcome = toggle(&h, &id, "1").await;
        assert!(outcome.accepted);
        assert!(outcome.session.devices.is_busy);

        // 配对进行中拒绝其他切换
        assert!(!toggle(&h, &id, "2").await.accepted);

        tokio::time::sleep(Duration::from_millis(1300)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.devices.connected, Some(DeviceId::new("1")));

        toggle(&h, &id, "2").await;
        tokio::time::sleep(Duration::from_millis(1300)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.devices.connected, Some(DeviceId::new("2")));
        assert!(view.devices.is_connected);
        assert_eq!(
            view.devices.devices.iter().filter(|d| d.connected).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_connected_device() {
        let h = Harness::new();
        let id = h.session();
        toggle(&h, &id, "3").await;
        tokio::time::sleep(Duration::from_millis(700)).await;

        let view = h.ctx.view(&id).unwrap();
        assert!(!view.devices.is_connected);
        assert_eq!(view.devices.connected, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_lost_keeps_registry() {
        let h = Harness::new();
        let id = h.session();
        h.transport.set_available(false);
        toggle(&h, &id, "1").await;
        tokio::time::sleep(Duration::from_millis(1300)).await;

        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.devices.connected, Some(DeviceId::new("3")));
        assert!(view.devices.error.is_some());
        assert!(!view.devices.is_busy);
    }

    #[tokio::test]
    async fn test_unknown_device_is_rejected() {
        let h = Harness::new();
        let id = h.session();
        assert!(!toggle(&h, &id, "42").await.accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_devices() {
        let h = Harness::new();
        let id = h.session();
        let outcome = RefreshDevicesHandler::new(h.ctx.clone(), h.transport.clone())
            .handle(RefreshDevicesCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        assert!(outcome.accepted);

        tokio::time::sleep(Duration::from_millis(700)).await;
        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.devices.devices.len(), 3);
        assert!(!view.devices.is_busy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_keeps_paired_device() {
        let h = Harness::new();
        let id = h.session();
        toggle(&h, &id, "1").await;
        tokio::time::sleep(Duration::from_millis(1300)).await;
        assert_eq!(
            h.ctx.view(&id).unwrap().devices.connected,
            Some(DeviceId::new("1"))
        );

        RefreshDevicesHandler::new(h.ctx.clone(), h.transport.clone())
            .handle(RefreshDevicesCommand {
                session_id: id.clone(),
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(700)).await;

        let view = h.ctx.view(&id).unwrap();
        assert_eq!(view.devices.connected, Some(DeviceId::new("1")));
        assert_eq!(
            view.devices.devices.iter().filter(|d| d.connected).count(),
            1
        );
    }
}
