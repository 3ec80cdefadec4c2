use aprwatch_core::common::Market;
use aprwatch_core::config::{
    ChannelConfig, ConfigError, DiscordConfig, EmailConfig, MonitorConfig, StateConfig,
    TelegramConfig, TimeoutConfig,
};
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "APRWATCH_CONFIG";
/// 默认配置文件名 (不含扩展名，`config` 会尝试 aprwatch.toml 等)
pub const DEFAULT_CONFIG_FILE: &str = "aprwatch";

/// # Summary
/// 扁平的原始配置，键名即环境变量名的小写形式。
///
/// # Invariants
/// - 只在启动时读取一次，随后转换为 `MonitorConfig`。
/// - 空字符串等同于未设置。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub page_url: String,
    pub asset: String,
    pub protocol: String,
    pub site_name: String,
    pub state_file: String,
    pub threshold: f64,
    pub fetch_timeout_secs: u64,
    pub notify_timeout_secs: u64,
    pub discord_webhook_url: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub email_enabled: Option<String>,
    pub email_smtp_host: Option<String>,
    pub email_smtp_user: Option<String>,
    pub email_smtp_pass: Option<String>,
    pub email_from: Option<String>,
    pub email_to: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = MonitorConfig::default();
        Self {
            page_url: defaults.market.page_url,
            asset: defaults.market.asset,
            protocol: defaults.market.protocol,
            site_name: defaults.market.site_name,
            state_file: defaults.state.file.to_string_lossy().into_owned(),
            threshold: 0.01,
            fetch_timeout_secs: defaults.timeouts.fetch_secs,
            notify_timeout_secs: defaults.timeouts.notify_secs,
            discord_webhook_url: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            email_enabled: None,
            email_smtp_host: None,
            email_smtp_user: None,
            email_smtp_pass: None,
            email_from: None,
            email_to: None,
        }
    }
}

/// # Summary
/// 按 "内置默认值 → 配置文件 → 环境变量" 的顺序装载配置。
///
/// # Logic
/// 1. 配置文件路径取自 `APRWATCH_CONFIG`，缺省为工作目录下的 `aprwatch.*`，文件可不存在。
/// 2. 环境变量覆盖文件中的同名键。
///
/// # Returns
/// 成功返回 `Settings`，文件格式或类型错误返回 `ConfigError::Load`。
pub fn load() -> Result<Settings, ConfigError> {
    let file = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let config = Config::builder()
        .add_source(File::with_name(&file).required(false))
        .add_source(Environment::default())
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    from_config(config)
}

/// 从已构建的 `Config` 反序列化。
pub fn from_config(config: Config) -> Result<Settings, ConfigError> {
    config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// 与原有脚本一致：只有 "true" (不区分大小写) 才算开启。
    pub fn email_enabled(&self) -> bool {
        self.email_enabled
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// # Summary
    /// 转换为各组件使用的 `MonitorConfig`。
    ///
    /// # Logic
    /// 1. 阈值必须是有限数，按十进制原样转换。
    /// 2. Discord 需要 webhook 地址；Telegram 需要 token 与 chat id 同时存在。
    /// 3. Email 需要开关为 true 且 SMTP 配置齐全，否则记录警告并禁用。
    /// 4. 最后执行 `MonitorConfig::validate`。
    pub fn into_monitor_config(self) -> Result<MonitorConfig, ConfigError> {
        if !self.threshold.is_finite() {
            return Err(ConfigError::Invalid {
                key: "threshold",
                reason: format!("must be a finite number, got {}", self.threshold),
            });
        }
        let threshold =
            Decimal::from_str(&self.threshold.to_string()).map_err(|e| ConfigError::Invalid {
                key: "threshold",
                reason: e.to_string(),
            })?;

        let email_enabled = self.email_enabled();

        let discord = non_empty(self.discord_webhook_url).map(|webhook_url| DiscordConfig { webhook_url });

        let telegram = match (
            non_empty(self.telegram_bot_token),
            non_empty(self.telegram_chat_id),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (None, None) => None,
            _ => {
                warn!("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must both be set; telegram channel disabled");
                None
            }
        };

        let smtp = (
            non_empty(self.email_smtp_host),
            non_empty(self.email_smtp_user),
            non_empty(self.email_smtp_pass),
            non_empty(self.email_from),
            non_empty(self.email_to),
        );
        let email = match (email_enabled, smtp) {
            (false, _) => None,
            (true, (Some(smtp_host), Some(smtp_user), Some(smtp_pass), Some(from), Some(to))) => {
                Some(EmailConfig {
                    smtp_host,
                    smtp_user,
                    smtp_pass,
                    from,
                    to,
                })
            }
            (true, _) => {
                warn!("EMAIL_ENABLED is true but SMTP settings are incomplete; email channel disabled");
                None
            }
        };

        let config = MonitorConfig {
            market: Market {
                asset: self.asset,
                protocol: self.protocol,
                page_url: self.page_url,
                site_name: self.site_name,
            },
            state: StateConfig {
                file: PathBuf::from(self.state_file),
            },
            threshold,
            timeouts: TimeoutConfig {
                fetch_secs: self.fetch_timeout_secs,
                notify_secs: self.notify_timeout_secs,
            },
            channels: ChannelConfig {
                discord,
                telegram,
                email,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings(overrides: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value).unwrap();
        }
        from_config(builder.build().unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = settings(&[]).unwrap().into_monitor_config().unwrap();
        assert_eq!(config.threshold, dec!(0.01));
        assert_eq!(config.market.page_url, "https://aavescan.com/ethereum-v3/usdc");
        assert_eq!(config.state.file, PathBuf::from("last_apr.json"));
        assert_eq!(config.timeouts.fetch_secs, 30);
        assert_eq!(config.timeouts.notify_secs, 10);
        assert_eq!(config.channels.enabled_count(), 0);
    }

    #[test]
    fn test_channels_enabled_by_credentials() {
        let config = settings(&[
            ("discord_webhook_url", "https://discord.com/api/webhooks/1/abc"),
            ("telegram_bot_token", "123:abc"),
            ("telegram_chat_id", "-10042"),
            ("threshold", "0.05"),
        ])
        .unwrap()
        .into_monitor_config()
        .unwrap();

        assert_eq!(config.threshold, dec!(0.05));
        let discord = config.channels.discord.unwrap();
        assert_eq!(discord.webhook_url, "https://discord.com/api/webhooks/1/abc");
        let telegram = config.channels.telegram.unwrap();
        assert_eq!(telegram.bot_token, "123:abc");
        assert_eq!(telegram.chat_id, "-10042");
        assert!(config.channels.email.is_none());
    }

    #[test]
    fn test_empty_values_disable_channels() {
        let config = settings(&[
            ("discord_webhook_url", ""),
            ("telegram_bot_token", "123:abc"),
            ("telegram_chat_id", "  "),
        ])
        .unwrap()
        .into_monitor_config()
        .unwrap();
        assert_eq!(config.channels.enabled_count(), 0);
    }

    #[test]
    fn test_email_flag_alone_sends_nothing() {
        let settings = settings(&[("email_enabled", "TRUE")]).unwrap();
        assert!(settings.email_enabled());
        let config = settings.into_monitor_config().unwrap();
        assert!(config.channels.email.is_none());
    }

    #[test]
    fn test_email_enabled_with_smtp() {
        let config = settings(&[
            ("email_enabled", "true"),
            ("email_smtp_host", "smtp.example.com"),
            ("email_smtp_user", "monitor@example.com"),
            ("email_smtp_pass", "secret"),
            ("email_from", "monitor@example.com"),
            ("email_to", "ops@example.com"),
        ])
        .unwrap()
        .into_monitor_config()
        .unwrap();
        let email = config.channels.email.unwrap();
        assert_eq!(email.smtp_host, "smtp.example.com");
        assert_eq!(email.to, "ops@example.com");
    }

    #[test]
    fn test_email_smtp_without_flag_is_disabled() {
        let config = settings(&[
            ("email_enabled", "false"),
            ("email_smtp_host", "smtp.example.com"),
            ("email_smtp_user", "monitor@example.com"),
            ("email_smtp_pass", "secret"),
            ("email_from", "monitor@example.com"),
            ("email_to", "ops@example.com"),
        ])
        .unwrap()
        .into_monitor_config()
        .unwrap();
        assert!(config.channels.email.is_none());
    }

    #[test]
    fn test_non_numeric_threshold_fails_to_load() {
        assert!(matches!(
            settings(&[("threshold", "a lot")]),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_negative_threshold_is_invalid() {
        let result = settings(&[("threshold", "-0.1")])
            .unwrap()
            .into_monitor_config();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "threshold", .. })
        ));
    }
}
