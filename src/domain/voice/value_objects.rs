//! Voice Context - Value Objects

use serde::Serialize;

use super::VoiceError;

/// voice_id 最大长度（字节）
///
/// 缓存文件 `{voice_id}-{md5}.wav` 及其下载中的 `.part` 临时名都要落在 255 字节的文件名上限内
pub(super) const MAX_VOICE_ID_LEN: usize = 160;

/// 音色唯一标识（调用方提供）
///
/// 不变量:
/// - 非空，长度不超过 [`MAX_VOICE_ID_LEN`] 字节
/// - 不含路径分隔符、NUL 或其他控制字符，不为 `.` / `..`
///
/// 其余字符（空格、冒号、括号、非 ASCII 文字）都原样保留
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, VoiceError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(VoiceError::Empty);
        }
        if raw.len() > MAX_VOICE_ID_LEN {
            return Err(VoiceError::TooLong(raw.len()));
        }
        let unsafe_char = raw.chars().any(|c| matches!(c, '/' | '\\') || c.is_control());
        if unsafe_char || raw == "." || raw == ".." {
            return Err(VoiceError::InvalidCharacters(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
