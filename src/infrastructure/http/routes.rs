//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查
//! - /api/job/run           POST  执行合成任务（返回任务输出）
//! - /api/models            GET   已加载的语言模型
//! - /api/cache/stats       GET   参考音频缓存统计

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/job/run", post(handlers::run_job))
        .route("/models", get(handlers::list_models))
        .route("/cache/stats", get(handlers::cache_stats))
}
