//! Memory Layer - In-Memory State Management
//!
//! 实现 SessionStore 和 MediaStore，管理会话与音频字节的内存状态

mod media_store;
mod session_store;

pub use media_store::InMemoryMediaStore;
pub use session_store::InMemorySessionStore;
