//! HTTP Middleware
//!
//! 访问日志：为每个请求分配 `x-request-id`，记录耗时。
//! 任务失败以 200 + `{error}` 返回，状态码看不出结果，
//! 所以任务路由把 [`JobOutcome`] 放进响应扩展，由这里统一记录

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// 请求标识头；调用方提供时原样回传，否则生成 UUID
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// 单个任务请求的结果摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// 请求体无法解析时没有任务 ID
    pub job_id: Option<String>,
    pub success: bool,
}

fn request_id(request: &Request) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

pub async fn access_log_middleware(request: Request, next: Next) -> Response {
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match response.extensions().get::<JobOutcome>() {
        Some(outcome) => tracing::info!(
            request_id = %request_id,
            job_id = outcome.job_id.as_deref().unwrap_or("-"),
            success = outcome.success,
            elapsed_ms = elapsed_ms,
            "Job request finished"
        ),
        None if response.status().is_server_error() => tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status,
            elapsed_ms = elapsed_ms,
            "HTTP server error"
        ),
        None if response.status().is_client_error() => tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status,
            elapsed_ms = elapsed_ms,
            "HTTP client error"
        ),
        None => tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status,
            elapsed_ms = elapsed_ms,
            "HTTP request finished"
        ),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}
