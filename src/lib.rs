//! Blessing - 语音祝福会话服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Session: 会话聚合（声音复刻、祝福撰写、设备配对三个阶段）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SessionStore, MediaStore, VoiceCloning, TextExpansion, SpeechSynthesis, DeviceTransport）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//! - Runtime: 会话级异步操作与计时器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: SessionStore, MediaStore 内存实现
//! - Worker: SessionReaper 空闲会话回收
//! - Adapters: 模拟外部协作方
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
