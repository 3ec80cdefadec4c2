use thiserror::Error;

/// # Summary
/// 状态存储错误枚举，处理状态文件的读写与编解码失败。
///
/// # Invariants
/// - 调用方可以把任何 `StoreError` 视为"无状态"或"未保存"，不会中断运行。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 文件读写失败
    #[error("I/O error: {0}")]
    Io(String),
    /// 状态序列化失败
    #[error("Serialize error: {0}")]
    Serialize(String),
    /// 状态文件内容无法解析
    #[error("Deserialize error: {0}")]
    Deserialize(String),
}
