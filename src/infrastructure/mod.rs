//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod cache;
pub mod http;
pub mod memory;

pub use cache::{FileReferenceCache, KeepForever, MaxTotalBytes};
pub use memory::InMemoryObjectStore;
