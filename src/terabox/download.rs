//! dlink -> 高速直链解析
//!
//! API 返回的 dlink 还需一次 302 才能拿到带时效的高速下载地址。

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use super::client::ShareClient;

/// 批量解析直链，输出顺序与输入一致
pub async fn resolve_direct_links(
    client: &ShareClient,
    dlinks: Vec<String>,
    concurrency: usize,
) -> Vec<String> {
    stream::iter(dlinks)
        .map(|dlink| resolve_direct_link(client, dlink))
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
}

/// 解析单个 dlink；未跳转或请求失败时回退为 dlink 原值
pub async fn resolve_direct_link(client: &ShareClient, dlink: String) -> String {
    if dlink.is_empty() {
        return dlink;
    }

    match client.head_location(&dlink).await {
        Ok(Some(location)) => {
            debug!("🔗 直链: {}", location);
            location
        }
        Ok(None) => dlink,
        Err(e) => {
            warn!("⚠️ 直链解析失败，回退为 dlink: {}", e);
            dlink
        }
    }
}
