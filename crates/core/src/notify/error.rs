use thiserror::Error;

/// # Summary
/// 通知服务错误枚举。
///
/// # Invariants
/// - 每个渠道的错误只影响该渠道，不会中断运行。
#[derive(Error, Debug)]
pub enum NotifyError {
    /// 网络连接、超时或传输错误
    #[error("Network error: {0}")]
    Network(String),

    /// 配置错误 (如地址格式不合法)
    #[error("Configuration error: {0}")]
    Config(String),

    /// 推送平台返回的错误 (如 Telegram API Error)
    #[error("Platform error: {0}")]
    Platform(String),
}
