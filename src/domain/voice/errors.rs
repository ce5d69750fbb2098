//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceError {
    #[error("voice_id must not be empty")]
    Empty,

    #[error("voice_id contains invalid characters: {0}")]
    InvalidCharacters(String),

    #[error("voice_id is too long ({0} bytes, max {max})", max = super::value_objects::MAX_VOICE_ID_LEN)]
    TooLong(usize),
}
