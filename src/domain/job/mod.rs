//! Job Context - 合成任务
//!
//! 职责:
//! - 任务输入（JobInput / JobEnvelope）的反序列化与校验
//! - 任务输出（JobOutput）的对外形状：成功载荷或 `{error}`，二者互斥

mod errors;
mod output;
mod request;

pub use errors::ValidationError;
pub use output::{JobOutput, JobSuccess};
pub use request::{
    default_output_path, JobEnvelope, JobInput, ValidatedJob, DEFAULT_LANGUAGE, DEFAULT_SPEED,
    PLACEHOLDER_REF_TEXT,
};
