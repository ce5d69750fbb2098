//! Data Transfer Objects

use serde::Serialize;

use crate::application::CacheStats;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
///
/// 任务接口 `/api/job/run` 不使用该结构，直接返回任务输出
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Model DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub languages: Vec<String>,
}

// ============================================================================
// Cache DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
}
