//! Terabox 分享链接解析
//!
//! 流程：访问分享链接（跟随跳转）-> 从最终 URL 提取 surl -> 调用 shorturl API
//! -> （可选）逐个解析 dlink 跳转 -> 整理为 FileDescriptor 列表。

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::client::ShareClient;
use super::download::resolve_direct_links;
use super::error::{ResolveError, ResolveFailure};
use super::parser::{extract_surl, snippet};
use super::types::{Diagnostic, FileDescriptor};
use crate::config::TeraboxConfig;

/// 非 JSON 响应保留的最大字符数
pub const SNIPPET_MAX_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(default, deserialize_with = "lenient_string")]
    server_filename: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    dlink: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: u64,
    #[serde(default)]
    thumbs: Value,
}

impl ListItem {
    fn thumbnail(&self) -> Option<String> {
        self.thumbs
            .get("url3")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// 宽松的字符串字段：字符串原样保留，数字/布尔转为字符串，其他情况为 None
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// 宽松的大小字段：数字或数字字符串，其他情况一律为 0
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// 解析分享链接，返回文件列表
///
/// 任何一步失败都以 [`ResolveFailure`] 返回，并附带已收集的诊断信息。
pub async fn resolve_share_link(
    config: &TeraboxConfig,
    share_url: &str,
    cookie: &str,
) -> Result<Vec<FileDescriptor>, ResolveFailure> {
    let mut diagnostic = Diagnostic::default();
    match resolve(config, share_url, cookie, &mut diagnostic).await {
        Ok(files) => Ok(files),
        Err(error) => {
            warn!("❌ 解析失败: {} ({})", error, share_url);
            Err(ResolveFailure { error, diagnostic })
        }
    }
}

async fn resolve(
    config: &TeraboxConfig,
    share_url: &str,
    cookie: &str,
    diagnostic: &mut Diagnostic,
) -> Result<Vec<FileDescriptor>, ResolveError> {
    let share_url = Url::parse(share_url.trim())
        .map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", share_url, e)))?;
    let client = ShareClient::new(config, cookie)?;

    // Step 1: 访问分享链接
    info!("🌐 访问分享链接: {}", share_url);
    let (final_url, resp) = client.get_following(share_url, None).await?;
    diagnostic.final_url = Some(final_url.to_string());
    ensure_success("分享链接", resp.status())?;
    debug!("📍 最终 URL: {}", final_url);

    // Step 2: 提取 surl
    let surl = extract_surl(&final_url).ok_or_else(|| ResolveError::MissingSurl {
        final_url: final_url.to_string(),
    })?;
    diagnostic.surl = Some(surl.clone());
    debug!("✅ surl={}", surl);

    // Step 3: 调用 shorturl API
    let api_base = config.api_base.trim_end_matches('/');
    let mut api_url = Url::parse(&format!("{}/api/shorturl", api_base))
        .map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", api_base, e)))?;
    api_url.query_pairs_mut().append_pair("surl", &surl);
    diagnostic.api_url = Some(api_url.to_string());

    info!("📡 调用 shorturl API: surl={}", surl);
    let referer = format!("{}/", api_base);
    let (_, resp) = client.get_following(api_url, Some(&referer)).await?;
    ensure_success("shorturl API", resp.status())?;
    let body = resp.text().await?;

    // Step 4: 解析文件列表
    let items = parse_listing(&body, diagnostic)?;
    info!("📦 获取到 {} 个文件", items.len());

    // Step 5: dlink -> 直链
    let dlinks: Vec<String> = items
        .iter()
        .map(|item| item.dlink.clone().unwrap_or_default())
        .collect();
    let links = if config.resolve_direct_links {
        resolve_direct_links(&client, dlinks, config.direct_link_concurrency).await
    } else {
        dlinks
    };

    Ok(items
        .into_iter()
        .zip(links)
        .map(|(item, direct_link)| FileDescriptor {
            thumbnail: item.thumbnail(),
            file_name: item.server_filename.unwrap_or_default(),
            direct_link,
            size_bytes: item.size,
        })
        .collect())
}

fn ensure_success(stage: &'static str, status: reqwest::StatusCode) -> Result<(), ResolveError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ResolveError::Status {
            stage,
            status: status.as_u16(),
        })
    }
}

/// 解析 shorturl API 响应
///
/// 返回的不是 JSON 时通常意味着 Cookie 已失效（服务端会返回登录页 HTML）。
fn parse_listing(body: &str, diagnostic: &mut Diagnostic) -> Result<Vec<ListItem>, ResolveError> {
    let payload: Value = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!("API 响应解析失败: {}", e);
            let raw = snippet(body, SNIPPET_MAX_CHARS);
            diagnostic.raw_snippet = Some(raw.clone());
            return Err(ResolveError::InvalidJson { snippet: raw });
        }
    };

    let errno = payload.get("errno");
    if errno.and_then(Value::as_i64) != Some(0) {
        let errno = errno.map_or_else(|| "missing".to_string(), Value::to_string);
        warn!("⚠️ shorturl API errno: {}", errno);
        diagnostic.api_error = Some(payload);
        return Err(ResolveError::Api { errno });
    }

    let list = match payload.get("list").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => list.clone(),
        _ => {
            diagnostic.api_error = Some(payload);
            return Err(ResolveError::EmptyList);
        }
    };

    match serde_json::from_value(Value::Array(list)) {
        Ok(items) => Ok(items),
        Err(e) => {
            warn!("⚠️ 文件列表格式异常: {}", e);
            diagnostic.api_error = Some(payload);
            Err(ResolveError::Schema(e))
        }
    }
}
