//! 配置文件加载

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub terabox: TeraboxConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeraboxConfig {
    /// 原始 Cookie 字符串，格式 `name=value; name=value`
    #[serde(default)]
    pub cookie: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// 是否对 dlink 再做一次 HEAD 请求以获取最终高速直链
    #[serde(default = "default_true")]
    pub resolve_direct_links: bool,
    #[serde(default = "default_direct_link_concurrency")]
    pub direct_link_concurrency: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebConfig {
    /// 调用方需要提供的共享密钥，为空时拒绝所有请求
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub diagnostics: DiagnosticLevel,
}

/// 解析失败时返回给调用方的诊断详细程度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// 仅固定提示语
    Message,
    /// 提示语 + 错误描述（含响应片段）
    Snippet,
    /// 完整诊断记录
    #[default]
    Full,
}

impl FromStr for DiagnosticLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "message" => Ok(Self::Message),
            "snippet" => Ok(Self::Snippet),
            "full" => Ok(Self::Full),
            other => Err(anyhow!("未知的诊断级别: {}", other)),
        }
    }
}

impl Default for TeraboxConfig {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            api_base: default_api_base(),
            http_timeout_secs: default_http_timeout_secs(),
            resolve_direct_links: true,
            direct_link_concurrency: default_direct_link_concurrency(),
        }
    }
}

fn default_api_base() -> String {
    "https://www.terabox.com".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_direct_link_concurrency() -> usize {
    4
}

impl Config {
    /// 加载配置：配置文件可选（不存在时使用默认值），随后应用环境变量覆盖
    pub fn load(path: &str) -> Result<Self> {
        let mut config: Config = if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path))?
        } else {
            Config::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 用外部变量覆盖配置项，`lookup` 一般为环境变量读取
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cookie) = lookup("TERABOX_COOKIE") {
            self.terabox.cookie = cookie;
        }
        if let Some(api_base) = lookup("TERABOX_API_BASE") {
            self.terabox.api_base = api_base;
        }
        if let Some(secs) = lookup("HTTP_TIMEOUT_SECS") {
            self.terabox.http_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("HTTP_TIMEOUT_SECS 无效: {}", secs))?;
        }
        if let Some(flag) = lookup("RESOLVE_DIRECT_LINKS") {
            self.terabox.resolve_direct_links = parse_bool(&flag)
                .ok_or_else(|| anyhow!("RESOLVE_DIRECT_LINKS 无效: {}", flag))?;
        }
        if let Some(api_key) = lookup("API_KEY") {
            self.web.api_key = api_key;
        }
        if let Some(level) = lookup("DIAGNOSTIC_LEVEL") {
            self.web.diagnostics = level.parse()?;
        }
        Ok(())
    }

    /// Cookie 是否已配置
    pub fn has_cookie(&self) -> bool {
        !self.terabox.cookie.trim().is_empty()
    }

    pub fn browser_ua() -> &'static str {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36"
    }

    pub fn browser_accept() -> &'static str {
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
