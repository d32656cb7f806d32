//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `BLESSING_SERVER__PORT=8080`
/// - `BLESSING_SIMULATION__CLONE_LATENCY_MS=500`
/// - `BLESSING_QUOTA__TOTAL_CHARS=1000`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置，`None` 时搜索默认配置文件
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 默认值（最低优先级）；演示设备列表由 serde 默认值提供
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("simulation.clone_latency_ms", 3000)?
        .set_default("simulation.expansion_latency_ms", 2000)?
        .set_default("simulation.synthesis_latency_ms", 2000)?
        .set_default("simulation.pairing_latency_ms", 600)?
        .set_default("simulation.audio_duration_ms", 10_000)?
        .set_default("sample.max_bytes", 8 * 1024 * 1024)?
        .set_default("sample.min_duration_secs", 3)?
        .set_default("sample.max_duration_secs", 60)?
        .set_default("quota.per_request_chars", 300)?
        .set_default("quota.total_chars", 20_000)?
        .set_default("playback.tick_ms", 100)?
        .set_default("recording.max_secs", 60)?
        .set_default("recording.tick_ms", 1000)?
        .set_default("session.idle_timeout_secs", 1800)?
        .set_default("session.reaper_interval_secs", 60)?
        .set_default("log.level", "info")?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 环境变量（最高优先级），前缀 BLESSING_，层级分隔符 __
    builder = builder.add_source(
        Environment::with_prefix("BLESSING")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.sample.min_duration_secs > config.sample.max_duration_secs {
        return Err(ConfigError::ValidationError(format!(
            "Sample min duration {}s exceeds max duration {}s",
            config.sample.min_duration_secs, config.sample.max_duration_secs
        )));
    }

    if config.quota.per_request_chars == 0 {
        return Err(ConfigError::ValidationError(
            "Per-request character quota cannot be 0".to_string(),
        ));
    }

    if config.playback.tick_ms == 0 || config.recording.tick_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Timer tick cannot be 0".to_string(),
        ));
    }

    if config.session.reaper_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Reaper interval cannot be 0".to_string(),
        ));
    }

    let mut ids: Vec<&str> = config
        .simulation
        .devices
        .iter()
        .map(|d| d.id.as_str())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != config.simulation.devices.len() {
        return Err(ConfigError::ValidationError(
            "Device ids must be unique".to_string(),
        ));
    }

    if config.simulation.devices.iter().filter(|d| d.connected).count() > 1 {
        return Err(ConfigError::ValidationError(
            "At most one device may start connected".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    let sim = &config.simulation;
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!(
        "Simulated latency: clone={}ms expand={}ms synth={}ms pair={}ms",
        sim.clone_latency_ms,
        sim.expansion_latency_ms,
        sim.synthesis_latency_ms,
        sim.pairing_latency_ms
    );
    tracing::info!("Demo devices: {}", sim.devices.len());
    tracing::info!(
        "Sample: max {} bytes, {}-{}s",
        config.sample.max_bytes,
        config.sample.min_duration_secs,
        config.sample.max_duration_secs
    );
    tracing::info!(
        "Quota: {} chars/request, {} total",
        config.quota.per_request_chars,
        config.quota.total_chars
    );
    tracing::info!("Session idle timeout: {}s", config.session.idle_timeout_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DeviceConfig;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_inverted_duration_bounds() {
        let mut config = AppConfig::default();
        config.sample.min_duration_secs = 90;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_duplicate_devices() {
        let mut config = AppConfig::default();
        config
            .simulation
            .devices
            .push(DeviceConfig::new("1", "重复设备", false));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_two_connected_devices() {
        let mut config = AppConfig::default();
        config.simulation.devices[0].connected = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[server]
port = 6000

[simulation]
clone_latency_ms = 10

[[simulation.devices]]
id = "a"
name = "客厅音箱"
connected = true

[quota]
total_chars = 500
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.simulation.clone_latency_ms, 10);
        assert_eq!(config.simulation.expansion_latency_ms, 2000);
        assert_eq!(config.simulation.devices.len(), 1);
        assert_eq!(config.simulation.devices[0].name, "客厅音箱");
        assert_eq!(config.quota.total_chars, 500);
        assert_eq!(config.quota.per_request_chars, 300);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = load_config_from_path(Some(Path::new("/nonexistent/blessing.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
