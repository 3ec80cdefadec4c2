use crate::rate::entity::PersistedState;
use crate::store::error::StoreError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// # Summary
/// 单记录状态的持久化接口。
///
/// # Invariants
/// - 后端至多保存一条记录，`save` 总是完整覆盖旧内容。
/// - 单写者，不保证并发安全之外的任何语义。
#[async_trait]
pub trait StateStore: Send + Sync {
    /// # Summary
    /// 读取上一次记录的状态。
    ///
    /// # Returns
    /// * `Ok(None)` - 尚无记录 (首次运行)。
    /// * `Ok(Some(state))` - 上一次的利率与时间。
    /// * `Err(StoreError)` - 记录存在但无法读取。
    async fn load(&self) -> Result<Option<PersistedState>, StoreError>;

    /// # Summary
    /// 以当前时间保存利率，覆盖旧记录。
    ///
    /// # Arguments
    /// * `value` - 本次观测到的利率。
    ///
    /// # Returns
    /// 成功返回写入的状态。
    async fn save(&self, value: Decimal) -> Result<PersistedState, StoreError>;
}
