//! Blessing - 语音祝福会话服务
//!
//! - Domain: session/ (会话聚合与各阶段状态机)
//! - Application: commands, queries, ports, runtime
//! - Infrastructure: http, memory, worker, adapters, events

use std::sync::Arc;
use std::time::Duration;

use blessing::application::{SessionContext, SessionRuntime};
use blessing::config::{load_config, print_config};
use blessing::infrastructure::adapters::{
    SimulatedDeviceTransport, SimulatedDeviceTransportConfig, SimulatedLatency,
    SimulatedSpeechSynthesizer, SimulatedSpeechSynthesizerConfig, SimulatedTextExpander,
    SimulatedVoiceCloner,
};
use blessing::infrastructure::events::EventPublisher;
use blessing::infrastructure::http::{AppState, Collaborators, HttpServer, ServerConfig};
use blessing::infrastructure::memory::{InMemoryMediaStore, InMemorySessionStore};
use blessing::infrastructure::worker::{SessionReaper, SessionReaperConfig};
use tokio_util::sync::CancellationToken;

/// multipart 编码的额外开销
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},blessing={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Blessing - 语音祝福会话服务");
    print_config(&config);

    // 内存状态
    let store = InMemorySessionStore::new().arc();
    let media = InMemoryMediaStore::new().arc();
    let event_publisher = EventPublisher::new().arc();
    let runtime = SessionRuntime::new(store.clone(), event_publisher.clone(), config.runtime()).arc();

    // 模拟协作方
    let sim = &config.simulation;
    let synthesizer = Arc::new(SimulatedSpeechSynthesizer::new(
        SimulatedSpeechSynthesizerConfig {
            latency: SimulatedLatency::from_millis(sim.synthesis_latency_ms),
            per_request_chars: config.quota.per_request_chars,
            total_chars: config.quota.total_chars,
            audio_duration_ms: sim.audio_duration_ms,
        },
    ));
    let collaborators = Collaborators {
        cloner: Arc::new(SimulatedVoiceCloner::new(SimulatedLatency::from_millis(
            sim.clone_latency_ms,
        ))),
        expander: Arc::new(SimulatedTextExpander::new(SimulatedLatency::from_millis(
            sim.expansion_latency_ms,
        ))),
        transport: Arc::new(SimulatedDeviceTransport::new(
            SimulatedDeviceTransportConfig {
                latency: SimulatedLatency::from_millis(sim.pairing_latency_ms),
                devices: sim.devices.iter().map(|d| d.to_device()).collect(),
            },
        )),
    };

    let ctx = SessionContext::new(store, media, runtime, synthesizer);

    // 空闲会话回收
    let shutdown = CancellationToken::new();
    let reaper = SessionReaper::new(
        SessionReaperConfig {
            idle_timeout_secs: config.session.idle_timeout_secs,
            interval: Duration::from_secs(config.session.reaper_interval_secs),
        },
        ctx.clone(),
    );
    let reaper_handle = tokio::spawn(reaper.run(shutdown.clone()));

    // 创建 HTTP 服务器
    let max_body_bytes = usize::try_from(config.sample.max_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(max_body_bytes);
    let state = AppState::new(ctx, collaborators, config.sample.policy());
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    let signal = shutdown.clone();
    server
        .run_with_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
            signal.cancel();
        })
        .await?;

    shutdown.cancel();
    let _ = reaper_handle.await;

    tracing::info!("Server shutdown complete");

    Ok(())
}
