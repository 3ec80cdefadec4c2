use thiserror::Error;

/// # Summary
/// 利率抓取错误枚举，覆盖网络、HTTP 状态与页面解析失败。
///
/// # Invariants
/// - 任何一种错误都意味着本次运行结束，不会重试。
#[derive(Error, Debug)]
pub enum FetchError {
    // 网络层错误 (连接失败、超时)
    #[error("Network error: {0}")]
    Network(String),
    // 页面返回非 2xx 状态码
    #[error("HTTP status {0}")]
    Status(u16),
    // 响应体读取失败
    #[error("Body error: {0}")]
    Body(String),
    // 所有提取策略都没有找到可解析的数值
    #[error("Supply APR not found on the page")]
    NotFound,
}
