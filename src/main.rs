//! Vocalis - 声音克隆语音合成任务服务
//!
//! 启动流程: 配置 → 日志 → 目录 → 对象存储 → 模型注册表 → 缓存 → 任务处理器 → HTTP

use std::sync::Arc;
use std::time::Duration;

use vocalis::application::{
    ModelRegistry, ObjectStorePort, ReferenceCachePort, StorageTransfer, SynthesizeHandler,
    SynthesizeSettings,
};
use vocalis::config::{load_config, print_config, AppConfig, SynthesisBackend};
use vocalis::infrastructure::adapters::{
    CliSynthesizerConfig, ConfiguredSynthesizerFactory, FakeSynthesizerConfig, GcsObjectStore,
    HttpSynthesizerConfig, SymphoniaInspector, SynthesizerBackend,
};
use vocalis::infrastructure::cache::{EvictionPolicy, FileReferenceCache, KeepForever, MaxTotalBytes};
use vocalis::infrastructure::http::{serve, AppState};
use vocalis::infrastructure::memory::InMemoryObjectStore;

/// 初始化日志
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},vocalis={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 根据配置选择合成后端
fn synthesizer_backend(config: &AppConfig) -> SynthesizerBackend {
    let synthesis = &config.synthesis;
    match synthesis.backend {
        SynthesisBackend::Cli => SynthesizerBackend::Cli(CliSynthesizerConfig {
            program: synthesis.cli.program.clone(),
            model: synthesis.cli.model.clone(),
            timeout_secs: synthesis.timeout_secs,
            ..Default::default()
        }),
        SynthesisBackend::Http => SynthesizerBackend::Http(
            HttpSynthesizerConfig::new(&synthesis.http.url).with_timeout(synthesis.timeout_secs),
        ),
        SynthesisBackend::Fake => SynthesizerBackend::Fake(FakeSynthesizerConfig {
            duration_ms: synthesis.fake.duration_ms,
            sample_rate: synthesis.fake.sample_rate,
            ..Default::default()
        }),
    }
}

fn eviction_policy(config: &AppConfig) -> Box<dyn EvictionPolicy> {
    if config.cache.max_size_bytes > 0 {
        Box::new(MaxTotalBytes(config.cache.max_size_bytes))
    } else {
        Box::new(KeepForever)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：部署环境变量 > VOCALIS_ 环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Vocalis - voice cloning synthesis service");
    print_config(&config);

    // 确保目录存在
    let work_dir = config.worker.work_dir();
    tokio::fs::create_dir_all(&config.cache.dir).await?;
    tokio::fs::create_dir_all(&work_dir).await?;

    // 对象存储
    let object_store: Arc<dyn ObjectStorePort> = if config.storage.in_memory {
        tracing::warn!("Using in-memory object store, nothing is persisted");
        Arc::new(InMemoryObjectStore::new())
    } else {
        Arc::new(GcsObjectStore::new(config.storage.credentials_json.as_deref()).await)
    };
    if config.storage.bucket.is_none() {
        tracing::warn!("GCS bucket is not configured, jobs will be rejected before synthesis");
    }
    let transfer = Arc::new(
        StorageTransfer::new(object_store, config.storage.bucket.clone())
            .with_signed_url_ttl(Duration::from_secs(config.storage.signed_url_ttl_secs)),
    );

    // 模型注册表
    let factory = ConfiguredSynthesizerFactory::new(synthesizer_backend(&config));
    let registry = Arc::new(ModelRegistry::build(&factory, &config.synthesis.custom_models)?);

    // 参考音频缓存
    let reference_cache: Arc<dyn ReferenceCachePort> = Arc::new(FileReferenceCache::new(
        &config.cache.dir,
        transfer.clone(),
        eviction_policy(&config),
    )?);

    // 任务处理器
    let handler = SynthesizeHandler::new(
        registry.clone(),
        reference_cache.clone(),
        transfer,
        Arc::new(SymphoniaInspector::new()),
        SynthesizeSettings {
            disable_auto_transcription: config.synthesis.disable_auto_transcription,
            work_dir,
            max_concurrent: config.worker.max_concurrent,
        },
    );

    // HTTP 服务器
    let state = Arc::new(AppState::new(handler, registry, reference_cache));

    serve(&config.server, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            return;
        }
        tracing::info!("Received shutdown signal");
    })
    .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
