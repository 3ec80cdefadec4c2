use rust_decimal::Decimal;

/// # Summary
/// 一次比较的结果。
///
/// # Invariants
/// - `delta` 带符号：`current - previous`。
/// - `changed == (|delta| >= threshold)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub changed: bool,
    pub delta: Decimal,
}

impl Decision {
    /// 利率是否上升
    pub fn is_rising(&self) -> bool {
        self.delta > Decimal::ZERO
    }
}

/// # Summary
/// 比较上一次与本次的利率，判断变化幅度是否达到阈值。
///
/// # Logic
/// 1. `delta = current - previous`，十进制精确相减。
/// 2. `changed = |delta| >= threshold`，等于阈值也视为变化。
///
/// # Arguments
/// * `previous` - 上一次记录的利率。
/// * `current` - 本次抓取的利率。
/// * `threshold` - 触发通知的最小绝对变化 (百分点)。
///
/// # Returns
/// 返回 `Decision`。
pub fn decide(previous: Decimal, current: Decimal, threshold: Decimal) -> Decision {
    let delta = current - previous;
    Decision {
        changed: delta.abs() >= threshold,
        delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_change_at_threshold_counts() {
        let decision = decide(dec!(4.50), dec!(4.51), dec!(0.01));
        assert!(decision.changed);
        assert_eq!(decision.delta, dec!(0.01));
        assert!(decision.is_rising());
    }

    #[test]
    fn test_change_below_threshold() {
        let decision = decide(dec!(4.50), dec!(4.505), dec!(0.01));
        assert!(!decision.changed);
        assert_eq!(decision.delta, dec!(0.005));
    }

    #[test]
    fn test_drop_keeps_sign() {
        let decision = decide(dec!(5.25), dec!(4.75), dec!(0.01));
        assert!(decision.changed);
        assert_eq!(decision.delta, dec!(-0.50));
        assert!(!decision.is_rising());
    }

    #[test]
    fn test_no_change() {
        let decision = decide(dec!(3.1), dec!(3.1), dec!(0.01));
        assert!(!decision.changed);
        assert!(decision.delta.is_zero());
        assert!(!decision.is_rising());
    }

    #[test]
    fn test_zero_threshold_always_changes() {
        assert!(decide(dec!(3.1), dec!(3.1), Decimal::ZERO).changed);
    }

    #[test]
    fn test_changed_matches_abs_delta_over_grid() {
        let values = [dec!(0), dec!(0.009), dec!(0.01), dec!(1.234), dec!(4.5), dec!(4.51), dec!(12)];
        let thresholds = [dec!(0), dec!(0.001), dec!(0.01), dec!(0.5), dec!(10)];
        for &previous in &values {
            for &current in &values {
                for &threshold in &thresholds {
                    let decision = decide(previous, current, threshold);
                    assert_eq!(decision.delta, current - previous);
                    assert_eq!(decision.changed, (current - previous).abs() >= threshold);
                }
            }
        }
    }
}
