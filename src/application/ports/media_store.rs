//! Media Store Port - 原始音频字节存储
//!
//! 会话只持有不透明的 `MediaHandle`，字节由 store 管理

use std::sync::Arc;

use crate::domain::session::MediaHandle;

/// Media Store Port
pub trait MediaStorePort: Send + Sync {
    /// 存入字节，返回新句柄
    fn put(&self, bytes: Vec<u8>) -> MediaHandle;

    /// 读取字节
    fn get(&self, handle: &MediaHandle) -> Option<Arc<Vec<u8>>>;

    /// 释放句柄，返回是否存在
    fn release(&self, handle: &MediaHandle) -> bool;

    fn contains(&self, handle: &MediaHandle) -> bool;
}
