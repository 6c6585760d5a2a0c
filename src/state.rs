//! 应用状态（仅持有只读配置）
//!
//! HTTP 客户端按请求创建，不在这里共享。

use tracing::warn;

use crate::config::Config;

pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        // 缺少 Cookie / API Key 时服务仍可启动，请求时分别返回 500 / 403
        if !config.has_cookie() {
            warn!("⚠️ 未配置 TERABOX_COOKIE，解析请求将返回 500");
        }
        if config.web.api_key.is_empty() {
            warn!("⚠️ 未配置 API_KEY，所有受保护接口都会返回 403");
        }
        Self { config }
    }
}
