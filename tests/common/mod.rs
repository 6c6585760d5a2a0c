//! 测试用的 Terabox 模拟服务（进程内 axum，绑定随机端口）

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use terabox_direct_link::config::{Config, TeraboxConfig};

pub const TEST_COOKIE: &str = "ndus=abc=; lang=en";
pub const CDN: &str = "https://cdn.example.com";

pub struct PlatformState {
    pub base: String,
    pub hits: AtomicUsize,
    pub cookies: Mutex<Vec<String>>,
}

impl PlatformState {
    fn record(&self, headers: &HeaderMap) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        if let Some(cookie) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
            self.cookies.lock().unwrap().push(cookie.to_string());
        }
    }
}

pub struct MockPlatform {
    pub base: String,
    pub state: Arc<PlatformState>,
}

impl MockPlatform {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn cookies(&self) -> Vec<String> {
        self.state.cookies.lock().unwrap().clone()
    }

    pub fn terabox_config(&self) -> TeraboxConfig {
        TeraboxConfig {
            cookie: TEST_COOKIE.to_string(),
            api_base: self.base.clone(),
            http_timeout_secs: 5,
            ..Default::default()
        }
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.terabox = self.terabox_config();
        config.web.api_key = "secret".to_string();
        config
    }
}

pub async fn spawn_platform() -> MockPlatform {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let state = Arc::new(PlatformState {
        base: base.clone(),
        hits: AtomicUsize::new(0),
        cookies: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/s/:code", get(share_page))
        .route("/sharing/link", get(sharing_link))
        .route("/nosurl", get(no_surl))
        .route("/login", get(login_page))
        .route("/api/shorturl", get(shorturl))
        .route("/dl/:name", get(dlink))
        .route("/plain/:name", get(plain))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockPlatform { base, state }
}

async fn share_page(
    State(state): State<Arc<PlatformState>>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Redirect {
    state.record(&headers);
    let surl = code.strip_prefix('1').unwrap_or(&code);
    Redirect::to(&format!("/sharing/link?surl={}", surl))
}

async fn sharing_link(State(state): State<Arc<PlatformState>>, headers: HeaderMap) -> Html<&'static str> {
    state.record(&headers);
    Html("<html>share</html>")
}

async fn no_surl(State(state): State<Arc<PlatformState>>, headers: HeaderMap) -> Redirect {
    state.record(&headers);
    Redirect::to("/login?redirect=share")
}

async fn login_page(State(state): State<Arc<PlatformState>>, headers: HeaderMap) -> Html<String> {
    state.record(&headers);
    Html(format!("<!DOCTYPE html><html>{}</html>", "login ".repeat(200)))
}

async fn shorturl(
    State(state): State<Arc<PlatformState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.record(&headers);
    let surl = params.get("surl").cloned().unwrap_or_default();
    let base = &state.base;

    match surl.as_str() {
        "ok" => Json(json!({
            "errno": 0,
            "list": [
                {
                    "server_filename": "a.mp4",
                    "dlink": format!("{}/dl/a.mp4", base),
                    "size": "1024",
                    "thumbs": { "url3": "https://thumb.example.com/a.jpg" }
                },
                {
                    "server_filename": "b.zip",
                    "dlink": format!("{}/dl/b.zip", base),
                    "size": 2048
                }
            ]
        }))
        .into_response(),
        "nodirect" => Json(json!({
            "errno": 0,
            "list": [
                { "server_filename": "plain.txt", "dlink": format!("{}/plain/x", base), "size": "abc" },
                { "server_filename": "down.txt", "dlink": "http://127.0.0.1:1/x" }
            ]
        }))
        .into_response(),
        "html" => Html(format!("<!DOCTYPE html><html>{}</html>", "登录".repeat(400))).into_response(),
        "err" => Json(json!({ "errno": -6, "errmsg": "need verify", "request_id": 7 })).into_response(),
        "empty" => Json(json!({ "errno": 0, "list": [] })).into_response(),
        "boom" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        other => Json(json!({
            "errno": 0,
            "list": [
                { "server_filename": format!("{}.bin", other), "dlink": format!("{}/dl/{}.bin", base, other), "size": 1 }
            ]
        }))
        .into_response(),
    }
}

async fn dlink(
    State(state): State<Arc<PlatformState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(&headers);
    (
        StatusCode::FOUND,
        [(header::LOCATION, format!("{}/{}?sign=1", CDN, name))],
    )
        .into_response()
}

async fn plain(State(state): State<Arc<PlatformState>>, headers: HeaderMap) -> &'static str {
    state.record(&headers);
    "plain"
}
