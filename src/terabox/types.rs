//! 数据类型

use serde::{Deserialize, Serialize};

/// 单个分享文件的解析结果（对外返回的结构）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub file_name: String,
    /// 解析后的下载直链（解析失败时为 dlink 原值）
    pub direct_link: String,
    pub size_bytes: u64,
    pub thumbnail: Option<String>,
}

/// 诊断信息，随解析流程逐步填充，用于排查 Cookie 失效等问题
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// 无法解析为 JSON 时的响应片段（最多 500 字符）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_snippet: Option<String>,
    /// API 返回的完整错误负载
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_error: Option<serde_json::Value>,
}
