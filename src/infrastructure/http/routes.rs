//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                    GET   健康检查
//! - /api/session/start           POST  从入口页进入（创建会话）
//! - /api/session/get             POST  会话视图
//! - /api/session/navigate        POST  前进/后退/完成
//! - /api/session/close           POST  回到入口页
//! - /api/clone/upload            POST  上传样本（multipart）
//! - /api/clone/record/start      POST  开始录音
//! - /api/clone/record/finish     POST  提交录音（multipart）
//! - /api/clone/record/cancel     POST  取消录音
//! - /api/clone/agreement         POST  服务协议
//! - /api/clone/start             POST  开始复刻
//! - /api/clone/delete            POST  删除样本
//! - /api/clone/sample/{id}       GET   下载样本
//! - /api/clone/test/text         POST  试听文本
//! - /api/clone/test/synthesize   POST  试听合成
//! - /api/blessing/style          POST  祝福语风格
//! - /api/blessing/text           POST  编辑祝福语
//! - /api/blessing/expand         POST  AI 扩写
//! - /api/blessing/synthesize     POST  合成祝福语
//! - /api/device/toggle           POST  连接/断开设备
//! - /api/device/refresh          POST  刷新设备列表
//! - /api/playback/toggle         POST  播放/暂停
//! - /api/quota                   GET   字符额度
//! - /ws/session/{id}             WS    会话事件流

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/session/:session_id", get(handlers::websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/session", session_routes())
        .nest("/clone", clone_routes())
        .nest("/blessing", blessing_routes())
        .nest("/device", device_routes())
        .route("/playback/toggle", post(handlers::toggle_playback))
        .route("/quota", get(handlers::get_quota))
}

/// Session 路由
fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(handlers::start_session))
        .route("/get", post(handlers::get_session))
        .route("/navigate", post(handlers::navigate))
        .route("/close", post(handlers::close_session))
}

/// Clone 路由
fn clone_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::upload_sample))
        .route("/record/start", post(handlers::start_recording))
        .route("/record/finish", post(handlers::finish_recording))
        .route("/record/cancel", post(handlers::cancel_recording))
        .route("/agreement", post(handlers::set_agreement))
        .route("/start", post(handlers::start_cloning))
        .route("/delete", post(handlers::delete_sample))
        .route("/sample/:session_id", get(handlers::download_sample))
        .route("/test/text", post(handlers::set_test_text))
        .route("/test/synthesize", post(handlers::synthesize_test))
}

/// Blessing 路由
fn blessing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/style", post(handlers::set_style))
        .route("/text", post(handlers::edit_text))
        .route("/expand", post(handlers::expand_text))
        .route("/synthesize", post(handlers::synthesize_blessing))
}

/// Device 路由
fn device_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/toggle", post(handlers::toggle_device))
        .route("/refresh", post(handlers::refresh_devices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use crate::application::{RuntimeConfig, SessionContext, SessionRuntime};
    use crate::domain::session::SamplePolicy;
    use crate::infrastructure::adapters::{
        SimulatedDeviceTransport, SimulatedLatency, SimulatedSpeechSynthesizer,
        SimulatedTextExpander, SimulatedVoiceCloner,
    };
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::http::state::Collaborators;
    use crate::infrastructure::memory::{InMemoryMediaStore, InMemorySessionStore};

    fn app() -> Router {
        let store = InMemorySessionStore::new().arc();
        let runtime = SessionRuntime::new(
            store.clone(),
            EventPublisher::new().arc(),
            RuntimeConfig::default(),
        )
        .arc();
        let ctx = SessionContext::new(
            store,
            InMemoryMediaStore::new().arc(),
            runtime,
            Arc::new(SimulatedSpeechSynthesizer::with_defaults()),
        );
        let collaborators = Collaborators {
            cloner: Arc::new(SimulatedVoiceCloner::new(SimulatedLatency::from_millis(0))),
            expander: Arc::new(SimulatedTextExpander::new(SimulatedLatency::from_millis(0))),
            transport: Arc::new(SimulatedDeviceTransport::with_defaults()),
        };
        let state = AppState::new(ctx, collaborators, SamplePolicy::default());
        create_routes().with_state(Arc::new(state))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> Value {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    async fn start(app: &Router) -> String {
        let json = post_json(app, "/api/session/start", json!({})).await;
        assert_eq!(json["errno"], 0);
        json["data"]["session_id"].as_str().unwrap().to_string()
    }

    fn multipart_upload(session_id: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "blessing-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"session_id\"\r\n\r\n{id}\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"duration_secs\"\r\n\r\n12\r\n\
                 --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                b = boundary,
                id = session_id,
                f = file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/clone/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let request = Request::builder()
            .uri("/api/ping")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_start_and_get_session() {
        let app = app();
        let id = start(&app).await;

        let json = post_json(&app, "/api/session/get", json!({ "session_id": id })).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["stage"], "clone");
        assert_eq!(json["data"]["blessing"]["style"], "humor");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app();
        let json = post_json(
            &app,
            "/api/session/get",
            json!({ "session_id": uuid::Uuid::new_v4().to_string() }),
        )
        .await;
        assert_eq!(json["errno"], 404);
        assert!(json["data"].is_null());

        let json = post_json(&app, "/api/session/get", json!({ "session_id": "nope" })).await;
        assert_eq!(json["errno"], 400);
    }

    #[tokio::test]
    async fn test_guard_rejection_is_not_an_error() {
        let app = app();
        let id = start(&app).await;

        let json = post_json(&app, "/api/clone/start", json!({ "session_id": id })).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["accepted"], false);

        let json = post_json(
            &app,
            "/api/session/navigate",
            json!({ "session_id": id, "direction": "forward" }),
        )
        .await;
        assert_eq!(json["data"]["accepted"], false);
        assert_eq!(json["data"]["session"]["stage"], "clone");
    }

    #[tokio::test]
    async fn test_upload_and_download_sample() {
        let app = app();
        let id = start(&app).await;

        let response = app
            .clone()
            .oneshot(multipart_upload(&id, "voice.mp3", b"ID3-fake-audio"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["accepted"], true);
        assert_eq!(json["data"]["session"]["clone"]["status"], "ready");
        assert_eq!(json["data"]["session"]["clone"]["sample"]["format"], "mp3");

        let request = Request::builder()
            .uri(format!("/api/clone/sample/{}", id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"ID3-fake-audio");
    }

    #[tokio::test]
    async fn test_upload_unsupported_format() {
        let app = app();
        let id = start(&app).await;

        let response = app
            .clone()
            .oneshot(multipart_upload(&id, "voice.flac", b"fLaC"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["errno"], 400);
    }

    #[tokio::test]
    async fn test_edit_text_and_quota() {
        let app = app();
        let id = start(&app).await;

        let json = post_json(
            &app,
            "/api/blessing/text",
            json!({ "session_id": id, "content": "新年快乐" }),
        )
        .await;
        assert_eq!(json["data"]["accepted"], true);
        assert_eq!(json["data"]["session"]["blessing"]["char_count"], 4);

        let request = Request::builder()
            .uri("/api/quota")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.clone().oneshot(request).await.unwrap()).await;
        assert_eq!(json["data"]["per_request"], 300);
        assert_eq!(json["data"]["total"], 20_000);
    }

    #[tokio::test]
    async fn test_close_session() {
        let app = app();
        let id = start(&app).await;

        let json = post_json(&app, "/api/session/close", json!({ "session_id": id })).await;
        assert_eq!(json["errno"], 0);
        assert_eq!(json["data"]["released_media"], 0);

        let json = post_json(&app, "/api/session/get", json!({ "session_id": id })).await;
        assert_eq!(json["errno"], 404);
    }
}
