use aprwatch_core::rate::error::FetchError;
use aprwatch_core::rate::port::AprSource;
use aprwatch_feed::page::{BROWSER_USER_AGENT, PageAprSource};
use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::net::TcpListener;

const MARKET_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>USDC | Aave v3</title><script>window.__DATA__ = {"label": "Supply APR", "v": "1.23%"}</script></head>
<body>
  <section class="stats">
    <div class="stat">
      <span class="label">Supply APR</span>
      <span class="value"><b>4.52</b>%</span>
    </div>
    <div class="stat">
      <span class="label">Borrow APR</span>
      <span class="value">6.01<small>%</small></span>
    </div>
  </section>
</body>
</html>"#;

const TABLE_ONLY_PAGE: &str = r#"<html><body>
  <table>
    <tr><th>Reserve</th><th>USDC</th></tr>
    <tr><td>Supply APR</td><td>3.875</td></tr>
  </table>
</body></html>"#;

const NO_APR_PAGE: &str = "<html><body><h1>Maintenance</h1></body></html>";

async fn market(headers: HeaderMap) -> impl IntoResponse {
    let ua = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if ua != BROWSER_USER_AGENT {
        return (StatusCode::FORBIDDEN, Html("blocked")).into_response();
    }
    Html(MARKET_PAGE).into_response()
}

// 在随机端口启动测试页面服务器
async fn spawn_page_server() -> anyhow::Result<String> {
    let router = Router::new()
        .route("/market", get(market))
        .route("/table", get(|| async { Html(TABLE_ONLY_PAGE) }))
        .route("/empty", get(|| async { Html(NO_APR_PAGE) }))
        .route(
            "/down",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "upstream down") }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Html(MARKET_PAGE)
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("test page server stopped: {}", e);
        }
    });
    Ok(addr)
}

fn source(base: &str, path: &str) -> PageAprSource {
    PageAprSource::new(format!("{}{}", base, path), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_fetch_from_text_layout() {
    let base = spawn_page_server().await.unwrap();
    let value = source(&base, "/market").fetch_apr().await.unwrap();
    assert_eq!(value, dec!(4.52));
}

#[tokio::test]
async fn test_fetch_falls_back_to_table_row() {
    let base = spawn_page_server().await.unwrap();
    let value = source(&base, "/table").fetch_apr().await.unwrap();
    assert_eq!(value, dec!(3.875));
}

#[tokio::test]
async fn test_page_without_label_is_not_found() {
    let base = spawn_page_server().await.unwrap();
    let result = source(&base, "/empty").fetch_apr().await;
    assert!(matches!(result, Err(FetchError::NotFound)), "{:?}", result);
}

#[tokio::test]
async fn test_http_error_status() {
    let base = spawn_page_server().await.unwrap();
    let result = source(&base, "/down").fetch_apr().await;
    assert!(matches!(result, Err(FetchError::Status(503))), "{:?}", result);
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let base = spawn_page_server().await.unwrap();
    let result = source(&base, "/slow").fetch_apr().await;
    assert!(matches!(result, Err(FetchError::Network(_))), "{:?}", result);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = source(&format!("http://{}", addr), "/market").fetch_apr().await;
    assert!(matches!(result, Err(FetchError::Network(_))), "{:?}", result);
}

/// # Summary
/// 真实页面抓取测试，需要外网。
#[tokio::test]
#[ignore]
async fn test_aavescan_real_fetch() {
    let source = PageAprSource::new(
        "https://aavescan.com/ethereum-v3/usdc",
        Duration::from_secs(30),
    )
    .unwrap();
    let result = source.fetch_apr().await;
    assert!(result.is_ok(), "Failed to fetch real APR: {:?}", result.err());
    println!("Current USDC supply APR: {}%", result.unwrap());
}
