//! Job Context - Errors

use thiserror::Error;

use crate::domain::voice::VoiceError;

/// 任务输入校验错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("ref_text is required (automatic transcription is disabled to avoid reference transcription compatibility errors)")]
    RefTextRequired,

    #[error("speed must be a finite number greater than 0, got {0}")]
    InvalidSpeed(f64),

    #[error(transparent)]
    Voice(#[from] VoiceError),
}
