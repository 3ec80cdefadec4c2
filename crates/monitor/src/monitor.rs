use aprwatch_core::common::Market;
use aprwatch_core::common::time::TimeProvider;
use aprwatch_core::notify::error::NotifyError;
use aprwatch_core::notify::message::{AprChange, format_signed_percent};
use aprwatch_core::notify::port::Notifier;
use aprwatch_core::rate::decision::{Decision, decide};
use aprwatch_core::rate::entity::{Observation, PersistedState};
use aprwatch_core::rate::error::FetchError;
use aprwatch_core::rate::port::AprSource;
use aprwatch_core::store::port::StateStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// # Summary
/// 单个通知渠道的投递结果。
#[derive(Debug)]
pub struct DeliveryReport {
    pub channel: &'static str,
    pub result: Result<(), NotifyError>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        self.result.is_ok()
    }
}

/// # Summary
/// 一次运行的最终结果，对应运行状态机的三个终态。
#[derive(Debug)]
pub enum RunOutcome {
    /// 抓取失败：不读状态、不通知、不保存
    FetchFailed(FetchError),
    /// 首次运行 (或旧状态不可读)：只保存，不比较
    FirstRun {
        observation: Observation,
        state_saved: bool,
    },
    /// 与旧状态比较过；`deliveries` 为空表示未达阈值
    Checked {
        previous: PersistedState,
        observation: Observation,
        decision: Decision,
        deliveries: Vec<DeliveryReport>,
        state_saved: bool,
    },
}

impl RunOutcome {
    /// 是否检测到超过阈值的变化
    pub fn changed(&self) -> bool {
        matches!(self, RunOutcome::Checked { decision, .. } if decision.changed)
    }

    pub fn state_saved(&self) -> bool {
        match self {
            RunOutcome::FetchFailed(_) => false,
            RunOutcome::FirstRun { state_saved, .. } | RunOutcome::Checked { state_saved, .. } => {
                *state_saved
            }
        }
    }

    pub fn deliveries(&self) -> &[DeliveryReport] {
        match self {
            RunOutcome::Checked { deliveries, .. } => deliveries,
            _ => &[],
        }
    }
}

/// # Summary
/// 利率监控器，负责编排一次完整的 "抓取 → 读状态 → 判断 → 通知 → 保存" 流程。
/// 只依赖 `aprwatch-core` 中的 Trait，具体实现由调用方注入。
///
/// # Invariants
/// - 各步骤严格顺序执行，渠道之间互不阻塞。
/// - 抓取成功后一定尝试保存状态，无论是否通知。
/// - 任何失败都不会让 `run` 返回错误，只体现在 `RunOutcome` 中。
pub struct AprMonitor {
    // 利率数据源
    source: Arc<dyn AprSource>,
    // 单记录状态存储
    store: Arc<dyn StateStore>,
    // 已启用的通知渠道，按注册顺序投递
    notifiers: Vec<Arc<dyn Notifier>>,
    // 观测时间来源
    clock: Arc<dyn TimeProvider>,
    // 市场标识，用于通知内容
    market: Market,
    // 触发通知的最小绝对变化 (百分点)
    threshold: Decimal,
}

impl AprMonitor {
    /// # Summary
    /// 创建不带任何通知渠道的监控器。
    ///
    /// # Arguments
    /// * `source` - 利率数据源。
    /// * `store` - 状态存储。
    /// * `clock` - 时间来源。
    /// * `market` - 市场标识。
    /// * `threshold` - 通知阈值。
    pub fn new(
        source: Arc<dyn AprSource>,
        store: Arc<dyn StateStore>,
        clock: Arc<dyn TimeProvider>,
        market: Market,
        threshold: Decimal,
    ) -> Self {
        Self {
            source,
            store,
            notifiers: Vec::new(),
            clock,
            market,
            threshold,
        }
    }

    /// 追加一个通知渠道
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// 已注册渠道的名称
    pub fn channels(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.channel()).collect()
    }

    /// # Summary
    /// 执行一次监控。
    ///
    /// # Logic
    /// 1. 抓取当前利率；失败则直接结束 (不读、不写、不通知)。
    /// 2. 读取上一次状态；读取失败按首次运行处理。
    /// 3. 首次运行：保存当前值后结束。
    /// 4. 否则比较变化量；达到阈值时依次投递所有渠道，单个渠道失败不影响其他渠道。
    /// 5. 无论是否通知都保存当前值；保存失败只记录日志。
    ///
    /// # Returns
    /// 本次运行的 `RunOutcome`。
    pub async fn run(&self) -> RunOutcome {
        info!(market = %self.market, url = %self.market.page_url, "starting supply APR check");

        let value = match self.source.fetch_apr().await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to fetch current APR");
                return RunOutcome::FetchFailed(e);
            }
        };
        let observation = Observation {
            value,
            observed_at: self.clock.now(),
        };
        info!("Current {} supply APR: {}%", self.market.asset, value);

        let Some(previous) = self.load_previous().await else {
            info!("First run - saving initial state");
            let state_saved = self.save(value).await;
            return RunOutcome::FirstRun {
                observation,
                state_saved,
            };
        };

        match previous.observed_at {
            Some(at) => info!("Last recorded APR: {}% (at {})", previous.value, at.to_rfc3339()),
            None => info!("Last recorded APR: {}% (at unknown time)", previous.value),
        }

        let decision = decide(previous.value, value, self.threshold);
        let deliveries = if decision.changed {
            let change = AprChange::new(
                self.market.clone(),
                previous.value,
                value,
                &decision,
                observation.observed_at,
            );
            info!(
                "APR CHANGE DETECTED! Old APR: {}% New APR: {}% Change: {}",
                change.previous,
                change.current,
                change.signed_change()
            );
            self.notify_all(&change).await
        } else {
            info!(
                "APR change ({}) is below threshold ({}%)",
                format_signed_percent(decision.delta.abs()).trim_start_matches('+'),
                self.threshold
            );
            Vec::new()
        };

        // 基线始终更新为最近一次观测值，而不是最近一次通知的值
        let state_saved = self.save(value).await;

        RunOutcome::Checked {
            previous,
            observation,
            decision,
            deliveries,
            state_saved,
        }
    }

    /// 读取失败时降级为无状态。
    async fn load_previous(&self) -> Option<PersistedState> {
        match self.store.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "failed to load previous state, treating as first run");
                None
            }
        }
    }

    /// # Summary
    /// 依次投递所有渠道。
    ///
    /// # Logic
    /// 1. 每个渠道独立调用一次。
    /// 2. 失败只记录日志并写入报告，继续下一个渠道。
    async fn notify_all(&self, change: &AprChange) -> Vec<DeliveryReport> {
        if self.notifiers.is_empty() {
            info!("no notification channels configured");
        }

        let mut reports = Vec::with_capacity(self.notifiers.len());
        for notifier in &self.notifiers {
            let channel = notifier.channel();
            let result = notifier.notify(change).await;
            match &result {
                Ok(()) => info!(channel, "notification sent successfully"),
                Err(e) => warn!(channel, error = %e, "failed to send notification"),
            }
            reports.push(DeliveryReport { channel, result });
        }
        reports
    }

    /// 保存失败只记录日志。
    async fn save(&self, value: Decimal) -> bool {
        match self.store.save(value).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "failed to save state");
                false
            }
        }
    }
}
