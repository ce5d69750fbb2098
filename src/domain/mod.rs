//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Job Context: 合成任务的输入校验与输出形状
//! - Voice Context: 音色标识

pub mod job;
pub mod voice;
