//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod clone_commands;
mod composition_commands;
mod device_commands;
mod playback_commands;
mod session_commands;

pub mod handlers;

pub use clone_commands::*;
pub use composition_commands::*;
pub use device_commands::*;
pub use playback_commands::*;
pub use session_commands::*;
