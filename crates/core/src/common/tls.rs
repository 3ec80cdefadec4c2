use std::sync::Once;

static INSTALL_PROVIDER: Once = Once::new();

/// # Summary
/// 为 `reqwest` / `lettre` 的 rustls 后端安装进程级 `ring` 加密提供者。
///
/// # Logic
/// 1. 每个进程只尝试安装一次。
/// 2. 若其他组件已安装过提供者，则保留已有的。
pub fn ensure_crypto_provider() {
    INSTALL_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("rustls crypto provider already installed");
        }
    });
}
