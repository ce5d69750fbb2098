//! Audio Inspector Port - 读取波形文件的基本信息

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// 音频信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    /// 每声道采样帧数
    pub frames: u64,
    pub sample_rate: u32,
    pub channels: u8,
}

impl AudioInfo {
    /// 时长（秒）= 帧数 / 采样率
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / f64::from(self.sample_rate)
    }
}

/// Audio Inspector Port
///
/// 同步接口，调用方负责放到阻塞线程池执行
pub trait AudioInspectorPort: Send + Sync {
    fn inspect(&self, path: &Path) -> Result<AudioInfo, AudioError>;
}
