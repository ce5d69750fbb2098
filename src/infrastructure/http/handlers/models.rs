//! Model Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, CacheStatsResponse, ModelsResponse};
use crate::infrastructure::http::state::AppState;

/// 列出已加载的语言模型
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ApiResponse<ModelsResponse>> {
    Json(ApiResponse::success(ModelsResponse {
        languages: state.registry.languages(),
    }))
}

/// 参考音频缓存统计
pub async fn cache_stats(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<CacheStatsResponse>> {
    Json(ApiResponse::success(CacheStatsResponse {
        stats: state.reference_cache.stats().await,
    }))
}
