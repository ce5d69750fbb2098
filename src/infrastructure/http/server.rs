//! HTTP Server
//!
//! 中间件栈（由外到内）: CORS → 请求追踪 → 访问日志 → 请求体上限 → 路由

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::{access_log_middleware, REQUEST_ID_HEADER};
use super::routes::create_routes;
use super::state::AppState;
use crate::config::ServerConfig;

/// 任务请求只有文本和 URL
pub const MAX_JOB_BODY_BYTES: usize = 1024 * 1024;

/// 组装带完整中间件栈的 Router
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, REQUEST_ID_HEADER.clone()])
        .expose_headers([REQUEST_ID_HEADER.clone()])
        .max_age(Duration::from_secs(3600));

    create_routes()
        .layer(DefaultBodyLimit::max(MAX_JOB_BODY_BYTES))
        .layer(middleware::from_fn(access_log_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 监听并服务，直到 `shutdown` 完成后优雅退出
pub async fn serve<F>(
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.addr()).await?;
    let local: SocketAddr = listener.local_addr()?;
    tracing::info!(addr = %local, "Job endpoint listening on http://{}/api/job/run", local);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
