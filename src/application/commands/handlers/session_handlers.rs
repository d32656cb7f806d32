//! Session Command Handlers

use std::sync::Arc;

use crate::application::commands::session_commands::*;
use crate::application::context::SessionContext;
use crate::application::error::ApplicationError;
use crate::application::ports::{DeviceTransportPort, SessionStoreExt};
use crate::application::queries::SessionView;
use crate::domain::session::{Navigation, OperationKind, Session, SessionId};

/// StartSession Handler - 创建会话并在后台刷新设备列表
pub struct StartSessionHandler {
    ctx: SessionContext,
    transport: Arc<dyn DeviceTransportPort>,
}

impl StartSessionHandler {
    pub fn new(ctx: SessionContext, transport: Arc<dyn DeviceTransportPort>) -> Self {
        Self { ctx, transport }
    }

    pub async fn handle(&self, _cmd: StartSessionCommand) -> Result<SessionView, ApplicationError> {
        let session_id = self.ctx.store.create(Session::new(Vec::new()))?;
        self.ctx.runtime.open(&session_id);

        refresh_devices(&self.ctx, &self.transport, &session_id)?;

        tracing::info!(session_id = %session_id, "Blessing session started");
        self.ctx.view(&session_id)
    }
}

/// 启动设备刷新操作，返回是否被接受
pub(crate) fn refresh_devices(
    ctx: &SessionContext,
    transport: &Arc<dyn DeviceTransportPort>,
    session_id: &SessionId,
) -> Result<bool, ApplicationError> {
    let Some(op) = ctx
        .store
        .with_session(session_id, |s| s.pairing_mut().begin_refresh())?
    else {
        return Ok(false);
    };

    let transport = Arc::clone(transport);
    ctx.runtime.spawn_operation(
        session_id,
        OperationKind::Pairing,
        op,
        async move { transport.list_devices().await.map_err(|e| e.to_string()) },
        move |session, result| session.pairing_mut().settle_refresh(&op, result),
    );
    Ok(true)
}

/// Navigate Handler - 前进/后退/完成
pub struct NavigateHandler {
    ctx: SessionContext,
}

impl NavigateHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(&self, cmd: NavigateCommand) -> Result<NavigateResponse, ApplicationError> {
        let navigation = self.ctx.store.with_session(&cmd.session_id, |session| {
            let navigation = match cmd.direction {
                NavigationDirection::Forward => session.advance(),
                NavigationDirection::Back => session.retreat(),
                NavigationDirection::Finish => session.finish(),
            };
            if matches!(navigation, Navigation::Moved { .. }) {
                session.touch();
            }
            navigation
        })?;

        match navigation {
            Navigation::Moved {
                from,
                to,
                abandoned,
            } => {
                self.ctx
                    .runtime
                    .events()
                    .publish_stage_changed(&cmd.session_id, from, to);
                tracing::info!(
                    session_id = %cmd.session_id,
                    from = from.as_str(),
                    to = to.as_str(),
                    abandoned = abandoned.len(),
                    "Stage changed"
                );
                let outcome = self.ctx.outcome(&cmd.session_id, "navigate", true)?;
                Ok(NavigateResponse {
                    accepted: true,
                    exited: false,
                    session: Some(outcome.session),
                })
            }
            Navigation::Blocked => {
                let outcome = self.ctx.outcome(&cmd.session_id, "navigate", false)?;
                Ok(NavigateResponse {
                    accepted: false,
                    exited: false,
                    session: Some(outcome.session),
                })
            }
            Navigation::Exited => {
                self.ctx.teardown(&cmd.session_id, "navigate_exit")?;
                Ok(NavigateResponse {
                    accepted: true,
                    exited: true,
                    session: None,
                })
            }
        }
    }
}

/// CloseSession Handler - 关闭会话并释放全部资源
pub struct CloseSessionHandler {
    ctx: SessionContext,
}

impl CloseSessionHandler {
    pub fn new(ctx: SessionContext) -> Self {
        Self { ctx }
    }

    pub async fn handle(
        &self,
        cmd: CloseSessionCommand,
    ) -> Result<CloseSessionResponse, ApplicationError> {
        let released_media = self.ctx.teardown(&cmd.session_id, &cmd.reason)?;
        Ok(CloseSessionResponse {
            session_id: cmd.session_id.to_string(),
            released_media,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::handlers::test_support::Harness;
    use crate::application::ports::SessionStorePort;
    use crate::domain::session::{DeviceId, Stage};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_start_session_refreshes_devices() {
        let h = Harness::new();
        let view = StartSessionHandler::new(h.ctx.clone(), h.transport.clone())
            .handle(StartSessionCommand)
            .await
            .unwrap();

        assert_eq!(view.stage, Stage::Clone);
        assert!(view.devices.is_busy);
        assert!(view.devices.devices.is_empty());

        tokio::time::sleep(Duration::from_millis(700)).await;
        let id = SessionId::parse(&view.session_id).unwrap();
        let view = h.ctx.view(&id).unwrap();
        assert!(!view.devices.is_busy);
        assert_eq!(view.devices.devices.len(), 3);
        assert_eq!(view.devices.connected, Some(DeviceId::new("3")));
    }

    #[tokio::test]
    async fn test_navigate_forward_blocked_without_audio() {
        let h = Harness::new();
        let id = h.session();
        let response = NavigateHandler::new(h.ctx.clone())
            .handle(NavigateCommand {
                session_id: id.clone(),
                direction: NavigationDirection::Forward,
            })
            .await
            .unwrap();

        assert!(!response.accepted);
        assert!(!response.exited);
        assert_eq!(response.session.unwrap().stage, Stage::Clone);
    }

    #[tokio::test]
    async fn test_navigate_back_from_clone_closes_session() {
        let h = Harness::new();
        let id = h.session();
        let response = NavigateHandler::new(h.ctx.clone())
            .handle(NavigateCommand {
                session_id: id.clone(),
                direction: NavigationDirection::Back,
            })
            .await
            .unwrap();

        assert!(response.accepted);
        assert!(response.exited);
        assert!(response.session.is_none());
        assert!(!h.ctx.store.is_valid(&id));
        assert!(!h.ctx.runtime.is_open(&id));
    }

    #[tokio::test]
    async fn test_close_session_releases_sample() {
        let h = Harness::new();
        let id = h.session();
        h.upload_sample(&id).await;
        assert_eq!(h.media.len(), 1);

        let response = CloseSessionHandler::new(h.ctx.clone())
            .handle(CloseSessionCommand {
                session_id: id.clone(),
                reason: "client_close".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.released_media, 1);
        assert!(h.media.is_empty());

        let err = CloseSessionHandler::new(h.ctx.clone())
            .handle(CloseSessionCommand {
                session_id: id,
                reason: "client_close".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }
}
