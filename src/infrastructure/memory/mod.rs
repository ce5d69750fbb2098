//! Memory Layer - 内存实现
//!
//! 未配置云存储时的对象存储，也供测试使用

mod object_store;

pub use object_store::InMemoryObjectStore;
