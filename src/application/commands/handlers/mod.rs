//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod clone_handlers;
mod composition_handlers;
mod device_handlers;
mod playback_handlers;
mod session_handlers;

pub use clone_handlers::*;
pub use composition_handlers::*;
pub use device_handlers::*;
pub use playback_handlers::*;
pub use session_handlers::*;
