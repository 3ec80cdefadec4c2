use crate::rate::error::FetchError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// # Summary
/// 利率数据源接口。
///
/// # Invariants
/// - 每次调用最多发起一次请求，不做重试。
#[async_trait]
pub trait AprSource: Send + Sync {
    /// # Summary
    /// 抓取当前的 Supply APR。
    ///
    /// # Returns
    /// 成功返回百分数值，失败返回 `FetchError`。
    async fn fetch_apr(&self) -> Result<Decimal, FetchError>;
}
