use crate::extract::{ExtractionStrategy, default_strategies, extract_apr};
use aprwatch_core::common::tls::ensure_crypto_provider;
use aprwatch_core::rate::error::FetchError;
use aprwatch_core::rate::port::AprSource;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info};

/// 伪装浏览器的 User-Agent，减少被拦截的风险
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// # Summary
/// 从公开网页中抓取 Supply APR 的数据源实现。
///
/// # Invariants
/// - 每次 `fetch_apr` 只发起一次 GET 请求，不重试。
/// - 提取策略按顺序尝试，第一个成功的结果生效。
pub struct PageAprSource {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 利率页面地址
    url: String,
    /// 有序的提取策略
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl PageAprSource {
    /// # Summary
    /// 创建一个使用默认提取策略的 PageAprSource。
    ///
    /// # Logic
    /// 1. 安装 rustls 加密提供者。
    /// 2. 设置浏览器 User-Agent 与请求超时。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `url` - 利率页面地址。
    /// * `timeout` - 整个请求的超时时间。
    ///
    /// # Returns
    /// 成功返回 PageAprSource，客户端构建失败返回 `FetchError::Network`。
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Self::with_strategies(url, timeout, default_strategies())
    }

    /// 使用自定义的提取策略列表创建数据源。
    pub fn with_strategies(
        url: impl Into<String>,
        timeout: Duration,
        strategies: Vec<Box<dyn ExtractionStrategy>>,
    ) -> Result<Self, FetchError> {
        ensure_crypto_provider();

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            strategies,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// # Summary
    /// 下载页面 HTML。
    ///
    /// # Returns
    /// 成功返回页面文本；网络错误、非 2xx 状态或响应体读取失败返回对应的 `FetchError`。
    pub async fn fetch_html(&self) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

#[async_trait]
impl AprSource for PageAprSource {
    /// # Summary
    /// 抓取页面并提取 Supply APR。
    ///
    /// # Logic
    /// 1. GET 页面。
    /// 2. 依次运行提取策略。
    /// 3. 所有策略都失败时返回 `FetchError::NotFound`。
    async fn fetch_apr(&self) -> Result<Decimal, FetchError> {
        let html = self.fetch_html().await?;
        debug!(url = %self.url, bytes = html.len(), "page downloaded");

        let (value, strategy) = extract_apr(&html, &self.strategies).ok_or(FetchError::NotFound)?;
        info!(strategy, %value, "supply APR extracted");
        Ok(value)
    }
}
