use crate::common::Market;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 监控运行配置，启动时构建一次后显式传入各组件。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub market: Market,
    pub state: StateConfig,
    pub threshold: Decimal,
    pub timeouts: TimeoutConfig,
    pub channels: ChannelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub fetch_secs: u64,
    pub notify_secs: u64,
}

impl TimeoutConfig {
    pub fn fetch(&self) -> Duration {
        Duration::from_secs(self.fetch_secs)
    }

    pub fn notify(&self) -> Duration {
        Duration::from_secs(self.notify_secs)
    }
}

/// 通知渠道配置，每个渠道仅在凭据齐全时启用。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub discord: Option<DiscordConfig>,
    pub telegram: Option<TelegramConfig>,
    pub email: Option<EmailConfig>,
}

impl ChannelConfig {
    /// 已启用的渠道数量
    pub fn enabled_count(&self) -> usize {
        usize::from(self.discord.is_some())
            + usize::from(self.telegram.is_some())
            + usize::from(self.email.is_some())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from: String,
    pub to: String,
}

/// # Summary
/// 配置装载或校验失败。
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置源读取失败 (文件格式错误、类型不匹配)
    #[error("Failed to load settings: {0}")]
    Load(String),
    /// 配置值不合法
    #[error("Invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl MonitorConfig {
    /// # Summary
    /// 校验配置中的业务约束。
    ///
    /// # Logic
    /// 1. 阈值必须非负。
    /// 2. 超时必须大于 0 秒。
    /// 3. 状态文件路径不能为空。
    ///
    /// # Returns
    /// 合法返回 `Ok(())`，否则返回 `ConfigError::Invalid`。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold.is_sign_negative() && !self.threshold.is_zero() {
            return Err(ConfigError::Invalid {
                key: "threshold",
                reason: format!("must not be negative, got {}", self.threshold),
            });
        }
        if self.timeouts.fetch_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "fetch_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.timeouts.notify_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "notify_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.state.file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "state_file",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            market: Market::default(),
            state: StateConfig {
                file: PathBuf::from("last_apr.json"),
            },
            // 0.01 个百分点
            threshold: Decimal::new(1, 2),
            timeouts: TimeoutConfig {
                fetch_secs: 30,
                notify_secs: 10,
            },
            channels: ChannelConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.threshold, dec!(0.01));
        assert_eq!(config.state.file, PathBuf::from("last_apr.json"));
        assert_eq!(config.timeouts.fetch(), Duration::from_secs(30));
        assert_eq!(config.timeouts.notify(), Duration::from_secs(10));
        assert_eq!(config.channels.enabled_count(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = MonitorConfig {
            threshold: dec!(-0.5),
            ..MonitorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { key: "threshold", .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = MonitorConfig::default();
        config.timeouts.notify_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "notify_timeout_secs",
                ..
            })
        ));
    }

    #[test]
    fn test_enabled_channel_count() {
        let channels = ChannelConfig {
            discord: Some(DiscordConfig {
                webhook_url: "https://discord.example/webhook".to_string(),
            }),
            telegram: Some(TelegramConfig {
                bot_token: "token".to_string(),
                chat_id: "42".to_string(),
            }),
            email: None,
        };
        assert_eq!(channels.enabled_count(), 2);
    }
}
