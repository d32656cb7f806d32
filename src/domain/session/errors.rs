//! Session Context - Errors

use thiserror::Error;

/// 样本校验错误（在创建 VoiceSample 之前拒绝）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("样本文件名不能为空")]
    EmptyName,

    #[error("不支持的音频格式: {0}（仅支持 wav、mp3、m4a）")]
    UnsupportedFormat(String),

    #[error("样本内容为空")]
    EmptyContent,

    #[error("样本过大: {size} 字节（上限 {max} 字节）")]
    TooLarge { size: u64, max: u64 },

    #[error("样本过短: {secs} 秒（至少 {min} 秒）")]
    TooShort { secs: u32, min: u32 },

    #[error("样本过长: {secs} 秒（最多 {max} 秒）")]
    TooLong { secs: u32, max: u32 },
}
