//! Voice Context - 参考音色
//!
//! 职责:
//! - 音色标识校验（作为缓存文件名的一部分）

mod errors;
mod value_objects;

pub use errors::VoiceError;
pub use value_objects::VoiceId;
