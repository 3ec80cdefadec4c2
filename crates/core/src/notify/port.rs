use crate::notify::error::NotifyError;
use crate::notify::message::AprChange;
use async_trait::async_trait;

/// # Summary
/// 发送利率变化通知到外部系统的接口定义。
///
/// # Invariants
/// - 每次运行每个渠道最多调用一次 `notify`，不重试、不确认送达。
/// - 实现必须自行按平台要求格式化消息。
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 渠道名称，用于日志
    fn channel(&self) -> &'static str;

    /// # Summary
    /// 发送一条利率变化通知。
    ///
    /// # Arguments
    /// * `change` - 已确认超过阈值的变化。
    ///
    /// # Returns
    /// * 成功返回 `Ok(())`。
    /// * 失败返回 `Err(NotifyError)`。
    async fn notify(&self, change: &AprChange) -> Result<(), NotifyError>;
}
