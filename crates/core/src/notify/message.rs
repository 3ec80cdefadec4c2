use crate::common::Market;
use crate::rate::decision::Decision;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// 上升时的颜色 (绿色)
pub const RISING_COLOR: u32 = 0x00ff00;
/// 下降或持平时的颜色 (红色)
pub const FALLING_COLOR: u32 = 0xff0000;

/// # Summary
/// 交给每个通知渠道的利率变化描述。
///
/// # Invariants
/// - `delta == current - previous`。
/// - `previous` 与 `current` 去掉尾随零，页面上的 `4.50` 与状态文件读回的 `4.5` 显示一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AprChange {
    pub market: Market,
    pub previous: Decimal,
    pub current: Decimal,
    pub delta: Decimal,
    pub checked_at: DateTime<Utc>,
}

impl AprChange {
    pub fn new(
        market: Market,
        previous: Decimal,
        current: Decimal,
        decision: &Decision,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            market,
            previous: previous.normalize(),
            current: current.normalize(),
            delta: decision.delta,
            checked_at,
        }
    }

    pub fn is_rising(&self) -> bool {
        self.delta > Decimal::ZERO
    }

    /// 📈 或 📉
    pub fn emoji(&self) -> &'static str {
        if self.is_rising() { "📈" } else { "📉" }
    }

    pub fn color(&self) -> u32 {
        if self.is_rising() {
            RISING_COLOR
        } else {
            FALLING_COLOR
        }
    }

    /// 带符号、四位小数的变化量，例如 `+0.0100%`。
    pub fn signed_change(&self) -> String {
        format_signed_percent(self.delta)
    }

    /// 例如 `Checked at 2024-05-01 12:00:00 UTC`
    pub fn checked_at_text(&self) -> String {
        format!("Checked at {}", self.checked_at.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

/// # Summary
/// 把变化量格式化为带符号、四位小数的百分数。
///
/// # Logic
/// 1. 非负值带 `+` 号，负值带 `-` 号。
/// 2. 绝对值按四位小数重新定标 (四舍五入并补零)。
pub fn format_signed_percent(delta: Decimal) -> String {
    let sign = if delta < Decimal::ZERO { "-" } else { "+" };
    let mut magnitude = delta.abs();
    magnitude.rescale(4);
    format!("{}{}%", sign, magnitude)
}
