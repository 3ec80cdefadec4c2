use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

/// # Summary
/// 一次检查的 "现在"。
///
/// 状态文件里的 `timestamp` 与通知里的 "Checked at" 都取自这里，
/// 这样同一次运行写入的时间和发出的时间是同一个值。
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 生产环境的 UTC 系统时钟。
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 可控时钟，用来在测试中固定落盘时间或模拟相隔数小时的两次定时检查。
///
/// # Invariants
/// - 锁中毒时沿用最后写入的时间。
pub struct FakeClockProvider {
    current_time: RwLock<DateTime<Utc>>,
}

impl FakeClockProvider {
    pub fn new(initial_time: DateTime<Utc>) -> Self {
        Self {
            current_time: RwLock::new(initial_time),
        }
    }

    /// 跳到指定时间
    pub fn set_time(&self, new_time: DateTime<Utc>) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *time = new_time;
    }

    /// 前进一段时间，例如两次 cron 触发之间的间隔
    pub fn advance(&self, by: Duration) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *time += by;
    }
}

impl TimeProvider for FakeClockProvider {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
