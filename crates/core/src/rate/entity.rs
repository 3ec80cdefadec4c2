use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// # Summary
/// 单次抓取得到的利率观测值。
///
/// # Invariants
/// - 每次运行重新产生，只在成为新的持久化状态时才会落盘。
/// - `value` 为百分数 (4.52 表示 4.52%)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub value: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// # Summary
/// 本地状态文件中的唯一一条记录。
///
/// # Invariants
/// - 至多存在一条；首次成功抓取时创建，此后每次运行覆盖。
/// - `observed_at` 为 `None` 表示文件中的时间戳缺失或无法识别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub value: Decimal,
    pub observed_at: Option<DateTime<Utc>>,
}

impl From<Observation> for PersistedState {
    fn from(observation: Observation) -> Self {
        Self {
            value: observation.value,
            observed_at: Some(observation.observed_at),
        }
    }
}
