mod settings;

use std::sync::Arc;

use aprwatch_core::common::time::RealTimeProvider;
use aprwatch_core::config::{ChannelConfig, MonitorConfig};
use aprwatch_core::notify::port::Notifier;
use aprwatch_feed::page::PageAprSource;
use aprwatch_monitor::monitor::{AprMonitor, RunOutcome};
use aprwatch_notify::discord::DiscordNotifier;
use aprwatch_notify::email::EmailNotifier;
use aprwatch_notify::telegram::TelegramNotifier;
use aprwatch_store::json_file::JsonFileStateStore;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// # Summary
/// 初始化全局日志：非阻塞写 stdout，级别由 `RUST_LOG` 控制，缺省 info。
///
/// # Returns
/// 后台写线程的 guard，需在 main 结束前保持存活以刷新日志。
fn init_tracing() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();
    guard
}

/// # Summary
/// 按配置构建已启用的通知渠道。
///
/// # Logic
/// 1. 顺序固定为 Discord、Telegram、Email。
/// 2. 单个渠道构建失败只记录警告并跳过，不影响其他渠道。
fn build_notifiers(channels: &ChannelConfig, timeout: Duration) -> Vec<Arc<dyn Notifier>> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    if let Some(discord) = &channels.discord {
        match DiscordNotifier::new(discord.webhook_url.clone(), timeout) {
            Ok(n) => notifiers.push(Arc::new(n)),
            Err(e) => warn!(channel = "discord", error = %e, "channel disabled"),
        }
    }
    if let Some(telegram) = &channels.telegram {
        match TelegramNotifier::new(telegram.bot_token.clone(), telegram.chat_id.clone(), timeout) {
            Ok(n) => notifiers.push(Arc::new(n)),
            Err(e) => warn!(channel = "telegram", error = %e, "channel disabled"),
        }
    }
    if let Some(email) = &channels.email {
        match EmailNotifier::new(email, timeout) {
            Ok(n) => notifiers.push(Arc::new(n)),
            Err(e) => warn!(channel = "email", error = %e, "channel disabled"),
        }
    }

    notifiers
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::FetchFailed(e) => {
            error!(error = %e, "Failed to fetch current APR. Exiting.");
        }
        RunOutcome::FirstRun { state_saved, .. } => {
            info!(state_saved, "initial state recorded");
        }
        RunOutcome::Checked {
            decision,
            deliveries,
            state_saved,
            ..
        } => {
            let delivered = deliveries.iter().filter(|d| d.delivered()).count();
            info!(
                changed = decision.changed,
                delivered,
                attempted = deliveries.len(),
                state_saved,
                "check complete"
            );
        }
    }
}

/// # Summary
/// 应用入口，纯粹的 DI 容器：装配各组件并执行一次监控。
///
/// # Logic
/// 1. 加载 .env，初始化日志。
/// 2. 装载并校验配置；失败只记录错误。
/// 3. 实例化数据源、状态存储与通知渠道。
/// 4. 注入 AprMonitor 执行一次检查并汇总结果。
///
/// 任何失败都只体现在日志中，进程始终以 0 退出，便于定时调度。
#[tokio::main]
async fn main() {
    // .env 必须先于日志初始化加载，以便其中的 RUST_LOG 生效
    let dotenv = dotenvy::dotenv();
    let _guard = init_tracing();
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) => debug!(error = %e, "no .env loaded"),
    }

    let config: MonitorConfig = match settings::load().and_then(|s| s.into_monitor_config()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return;
        }
    };

    let source = match PageAprSource::new(config.market.page_url.clone(), config.timeouts.fetch()) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            error!(error = %e, "failed to initialise page source");
            return;
        }
    };
    let clock = Arc::new(RealTimeProvider);
    let store = Arc::new(JsonFileStateStore::new(config.state.file.clone(), clock.clone()));

    let mut monitor = AprMonitor::new(source, store, clock, config.market.clone(), config.threshold);
    for notifier in build_notifiers(&config.channels, config.timeouts.notify()) {
        monitor = monitor.with_notifier(notifier);
    }
    info!(
        channels = ?monitor.channels(),
        threshold = %config.threshold,
        state_file = %config.state.file.display(),
        "monitor ready"
    );

    let outcome = monitor.run().await;
    report(&outcome);
}
