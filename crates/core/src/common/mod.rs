use serde::{Deserialize, Serialize};
use std::fmt;

pub mod time;
pub mod tls;

/// # Summary
/// 被监控的借贷市场标识，只用于消息展示与链接。
///
/// # Invariants
/// - `page_url` 同时是抓取地址和通知中的跳转链接。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    // 资产代码 (例如: USDC)
    pub asset: String,
    // 借贷协议名称 (例如: Aave)
    pub protocol: String,
    // 公开的利率页面
    pub page_url: String,
    // 页面所属站点名称，用于通知中的链接文字
    pub site_name: String,
}

impl Default for Market {
    fn default() -> Self {
        Self {
            asset: "USDC".to_string(),
            protocol: "Aave".to_string(),
            page_url: "https://aavescan.com/ethereum-v3/usdc".to_string(),
            site_name: "Aavescan".to_string(),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.asset, self.protocol)
    }
}
