//! 单次解析使用的 HTTP 客户端
//!
//! 每次解析新建一个客户端，随解析结束释放。
//! 跳转由这里手动跟随：reqwest 在跨域跳转时会丢弃 Cookie 头，
//! 而 Terabox 的分享链接通常会从短链域名跳到主站。

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, LOCATION, REFERER, USER_AGENT,
};
use reqwest::{redirect, Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::error::ResolveError;
use super::parser::{cookie_header, parse_cookie_string};
use crate::config::{Config, TeraboxConfig};

const MAX_REDIRECTS: usize = 10;

pub struct ShareClient {
    http: Client,
}

impl ShareClient {
    pub fn new(config: &TeraboxConfig, raw_cookie: &str) -> Result<Self, ResolveError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(Config::browser_ua()));
        headers.insert(ACCEPT, HeaderValue::from_static(Config::browser_accept()));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let cookies = parse_cookie_string(raw_cookie);
        if !cookies.is_empty() {
            let value = HeaderValue::from_str(&cookie_header(&cookies))
                .map_err(|_| ResolveError::InvalidCookie("包含非法字符".to_string()))?;
            headers.insert(COOKIE, value);
        }
        debug!("🍪 Cookie 字段数: {}", cookies.len());

        let http = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self { http })
    }

    /// GET 请求并跟随跳转，返回最终 URL 与响应
    ///
    /// 3xx 但没有可用 Location 时直接返回该响应，由调用方按状态码处理
    pub async fn get_following(
        &self,
        url: Url,
        referer: Option<&str>,
    ) -> Result<(Url, Response), ResolveError> {
        let mut current = url;
        for _ in 0..=MAX_REDIRECTS {
            let mut req = self.http.get(current.clone());
            if let Some(referer) = referer {
                req = req.header(REFERER, referer);
            }
            let resp = req.send().await?;

            if !resp.status().is_redirection() {
                return Ok((current, resp));
            }
            let Some(next) = redirect_target(&current, &resp) else {
                return Ok((current, resp));
            };
            debug!("↪️ 跳转: {} -> {}", current, next);
            current = next;
        }
        Err(ResolveError::TooManyRedirects)
    }

    /// HEAD 请求（不跟随跳转），若为 3xx 则返回 Location 指向的地址
    pub async fn head_location(&self, link: &str) -> Result<Option<String>, ResolveError> {
        let url =
            Url::parse(link).map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", link, e)))?;
        let resp = self.http.head(url.clone()).send().await?;

        if !resp.status().is_redirection() {
            debug!("dlink 未跳转 (status={})", resp.status());
            return Ok(None);
        }
        Ok(redirect_target(&url, &resp).map(String::from))
    }
}

/// 解析 Location 头，相对地址基于当前 URL 拼接
fn redirect_target(base: &Url, resp: &Response) -> Option<Url> {
    let location = resp.headers().get(LOCATION)?.to_str().ok()?;
    base.join(location).ok()
}
