//! Cache Layer - 参考音频磁盘缓存

mod eviction;
mod file_reference_cache;

pub use eviction::{CachedFile, EvictionPolicy, KeepForever, MaxTotalBytes};
pub use file_reference_cache::{cache_file_name, FileReferenceCache};
