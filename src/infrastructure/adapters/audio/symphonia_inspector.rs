//! Symphonia Inspector - 解码波形文件并统计帧数
//!
//! 时长按实际解码出的帧数计算，不信任文件头里的长度字段

use std::fs::File;
use std::path::Path;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioError, AudioInfo, AudioInspectorPort};

/// 基于 symphonia 的音频检查器
#[derive(Debug, Default, Clone)]
pub struct SymphoniaInspector;

impl SymphoniaInspector {
    pub fn new() -> Self {
        Self
    }
}

impl AudioInspectorPort for SymphoniaInspector {
    fn inspect(&self, path: &Path) -> Result<AudioInfo, AudioError> {
        let file = File::open(path).map_err(|e| AudioError::IoError(e.to_string()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioError::InvalidInput("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioError::DecodingError("Unknown sample rate".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u8)
            .unwrap_or(1);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let track_id = track.id;
        let mut frames: u64 = 0;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(AudioError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => frames += decoded.frames() as u64,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Decode error (skipping packet)");
                }
            }
        }

        Ok(AudioInfo {
            frames,
            sample_rate,
            channels,
        })
    }
}
