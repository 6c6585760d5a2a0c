//! Cookie 与链接解析

use std::collections::BTreeMap;

use url::Url;

/// 将原始 Cookie 字符串解析为 name -> value 映射
///
/// 按 `"; "` 分段，每段只在第一个 `=` 处切分，值中的 `=` 原样保留。
/// - 名称去除首尾空白，值保持原样
/// - 空段忽略
/// - 没有 `=` 的段视为空值
/// - 重复的名称以最后一次出现为准
pub fn parse_cookie_string(raw: &str) -> BTreeMap<String, String> {
    raw.split("; ")
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), value.to_string()),
            None => (segment.trim().to_string(), String::new()),
        })
        .collect()
}

/// 将 Cookie 映射重新拼接为 `Cookie` 请求头
pub fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 从跳转后的最终 URL 中提取 surl 查询参数
///
/// 参数缺失或为空时返回 None
pub fn extract_surl(final_url: &Url) -> Option<String> {
    final_url
        .query_pairs()
        .find(|(key, _)| key == "surl")
        .map(|(_, value)| value.into_owned())
        .filter(|surl| !surl.is_empty())
}

/// 截取前 `max_chars` 个字符（按字符而非字节，避免切断 UTF-8）
pub fn snippet(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
