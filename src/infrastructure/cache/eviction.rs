//! 缓存淘汰策略

/// 缓存文件元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    /// 缓存目录下的文件名
    pub name: String,
    pub size_bytes: u64,
    /// 最近访问时间（毫秒时间戳）
    pub last_accessed: i64,
}

/// 淘汰策略
///
/// 每次插入新文件后调用；返回需要删除的文件名
pub trait EvictionPolicy: Send + Sync {
    fn select_victims(&self, entries: &[CachedFile]) -> Vec<String>;

    /// 容量上限（0 表示不限制，仅用于统计）
    fn max_size_bytes(&self) -> u64 {
        0
    }

    fn name(&self) -> String;
}

/// 永不淘汰
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepForever;

impl EvictionPolicy for KeepForever {
    fn select_victims(&self, _entries: &[CachedFile]) -> Vec<String> {
        Vec::new()
    }

    fn name(&self) -> String {
        "keep-forever".to_string()
    }
}

/// 总大小超过上限时按 LRU 淘汰
#[derive(Debug, Clone, Copy)]
pub struct MaxTotalBytes(pub u64);

impl EvictionPolicy for MaxTotalBytes {
    fn select_victims(&self, entries: &[CachedFile]) -> Vec<String> {
        let mut total: u64 = entries.iter().map(|e| e.size_bytes).sum();
        if total <= self.0 {
            return Vec::new();
        }

        let mut by_age: Vec<&CachedFile> = entries.iter().collect();
        by_age.sort_by(|a, b| {
            a.last_accessed
                .cmp(&b.last_accessed)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut victims = Vec::new();
        for entry in by_age {
            if total <= self.0 {
                break;
            }
            total = total.saturating_sub(entry.size_bytes);
            victims.push(entry.name.clone());
        }
        victims
    }

    fn max_size_bytes(&self) -> u64 {
        self.0
    }

    fn name(&self) -> String {
        format!("max-total-bytes({})", self.0)
    }
}
