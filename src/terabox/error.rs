//! 解析错误类型

use std::fmt;

use thiserror::Error;

use super::types::Diagnostic;

/// 解析流程中任意一步的失败原因
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("Cookie 格式无效: {0}")]
    InvalidCookie(String),

    /// 网络错误、超时以及其他意外错误
    #[error("请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("跳转次数过多")]
    TooManyRedirects,

    #[error("{stage} 返回 HTTP {status}")]
    Status { stage: &'static str, status: u16 },

    #[error("最终 URL 中未找到 surl 参数: {final_url}")]
    MissingSurl { final_url: String },

    #[error("API 响应不是有效的 JSON，Cookie 可能已失效: {snippet}")]
    InvalidJson { snippet: String },

    #[error("API 返回错误: errno={errno}")]
    Api { errno: String },

    #[error("API 返回的文件列表为空")]
    EmptyList,

    #[error("文件列表格式异常: {0}")]
    Schema(#[from] serde_json::Error),
}

/// 解析失败：错误原因 + 已收集的诊断信息
#[derive(Debug)]
pub struct ResolveFailure {
    pub error: ResolveError,
    pub diagnostic: Diagnostic,
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ResolveFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
