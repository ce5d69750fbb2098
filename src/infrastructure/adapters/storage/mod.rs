//! Storage Adapter - 云对象存储实现

mod gcs_store;

pub use gcs_store::{CredentialSource, GcsObjectStore};
