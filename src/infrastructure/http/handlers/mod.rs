//! HTTP Handlers
//!
//! 每个路由组一个文件，处理器只做请求解析与命令分发

mod blessing;
mod clone;
mod device;
mod ping;
mod playback;
mod session;
mod websocket;

pub use blessing::*;
pub use clone::*;
pub use device::*;
pub use ping::*;
pub use playback::*;
pub use session::*;
pub use websocket::*;
