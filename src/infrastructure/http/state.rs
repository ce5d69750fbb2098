//! Application State
//!
//! 启动时构建一次，通过 `Arc` 在请求间共享

use std::sync::Arc;

use crate::application::{ModelRegistry, ReferenceCachePort, SynthesizeHandler};

/// 应用状态
pub struct AppState {
    pub synthesize_handler: SynthesizeHandler,
    pub registry: Arc<ModelRegistry>,
    pub reference_cache: Arc<dyn ReferenceCachePort>,
}

impl AppState {
    pub fn new(
        synthesize_handler: SynthesizeHandler,
        registry: Arc<ModelRegistry>,
        reference_cache: Arc<dyn ReferenceCachePort>,
    ) -> Self {
        Self {
            synthesize_handler,
            registry,
            reference_cache,
        }
    }
}
