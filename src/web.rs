//! Web 服务器模块

use axum::{
    extract::{rejection::JsonRejection, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::DiagnosticLevel;
use crate::terabox::{self, FileDescriptor, ResolveFailure};
use crate::AppState;

/// 调用方传递共享密钥的请求头
pub const API_KEY_HEADER: &str = "X-API-Key";

const NOT_FOUND_MESSAGE: &str =
    "Failed to retrieve file data. Link may be invalid, private, or the cookie has expired.";

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkTestQuery {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid or missing API Key")]
    Unauthorized,

    #[error("Server is not configured with TERABOX_COOKIE")]
    MissingCookie,

    #[error("{0}")]
    BadRequest(String),

    /// detail 的结构取决于诊断级别
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound(Value),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::MissingCookie => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let detail = match self {
            ApiError::NotFound(detail) => detail,
            other => Value::String(other.to_string()),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// 校验调用方密钥；服务端未配置密钥时一律拒绝
fn check_api_key(state: &AppState, provided: Option<&str>) -> Result<(), ApiError> {
    let expected = state.config.web.api_key.as_str();
    if expected.is_empty() || provided != Some(expected) {
        warn!("❌ API Key 校验失败");
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// 按诊断级别生成 404 的 detail
pub fn failure_detail(level: DiagnosticLevel, failure: &ResolveFailure) -> Value {
    match level {
        DiagnosticLevel::Message => json!(NOT_FOUND_MESSAGE),
        DiagnosticLevel::Snippet => json!(format!("{} {}", NOT_FOUND_MESSAGE, failure)),
        DiagnosticLevel::Full => json!({
            "message": NOT_FOUND_MESSAGE,
            "error": failure.to_string(),
            "diagnostic": failure.diagnostic,
        }),
    }
}

/// X-API-Key 校验中间件，在读取请求体之前执行
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    check_api_key(&state, provided)?;
    Ok(next.run(req).await)
}

async fn resolve_link(
    state: &AppState,
    share_url: &str,
) -> Result<Vec<FileDescriptor>, ApiError> {
    if !state.config.has_cookie() {
        error!("❌ 未配置 TERABOX_COOKIE");
        return Err(ApiError::MissingCookie);
    }
    if share_url.trim().is_empty() {
        return Err(ApiError::BadRequest("`url` is required".to_string()));
    }

    info!("📥 收到解析请求: {}", share_url);

    match terabox::resolve_share_link(
        &state.config.terabox,
        share_url,
        &state.config.terabox.cookie,
    )
    .await
    {
        Ok(files) => {
            info!("✅ 解析成功: {} 个文件", files.len());
            Ok(files)
        }
        Err(failure) => Err(ApiError::NotFound(failure_detail(
            state.config.web.diagnostics,
            &failure,
        ))),
    }
}

/// 健康检查端点（不需要认证）
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Terabox API is running",
        version: crate::VERSION,
    })
}

/// POST /v1/get_link
pub async fn get_link_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LinkRequest>, JsonRejection>,
) -> Result<Json<Vec<FileDescriptor>>, ApiError> {
    // 请求体错误也统一为 {"detail": ...}
    let Json(req) = payload.map_err(|rejection| {
        warn!("❌ 请求体无效: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;
    resolve_link(&state, &req.url).await.map(Json)
}

/// GET /v1/get_link_test?url=...&api_key=...
///
/// 供无法设置自定义请求头的客户端使用
pub async fn get_link_test_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LinkTestQuery>,
) -> Result<Json<Vec<FileDescriptor>>, ApiError> {
    check_api_key(&state, query.api_key.as_deref())?;
    resolve_link(&state, query.url.as_deref().unwrap_or_default())
        .await
        .map(Json)
}

/// 创建 Web 路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/v1/get_link", post(get_link_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/v1/get_link_test", get(get_link_test_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
