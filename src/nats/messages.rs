use anyhow::{bail, Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::speech::SpeechEvent;

/// Request sent on `voice.session.init`
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInitRequest {
    pub client_id: String,
    pub timestamp: String, // RFC3339 timestamp
}

/// Reply to `voice.session.init`
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInitReply {
    pub ok: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Capture start/stop request for one session
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub session_id: String,
    pub timestamp: String, // RFC3339 timestamp
}

/// Reply to `voice.capture.start.<session>`
#[derive(Debug, Serialize, Deserialize)]
pub struct CaptureReply {
    pub ok: bool,
    /// Whether the microphone actually began capturing
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Event published by the speech backend on `voice.events.<session>`
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SpeechEventMessage {
    Status {
        message: String,
    },
    Error {
        message: String,
    },
    Audio {
        pcm: String, // Base64-encoded i16 little-endian PCM
        sample_rate: u32,
        channels: u16,
    },
}

impl SpeechEventMessage {
    pub fn into_event(self) -> Result<SpeechEvent> {
        Ok(match self {
            SpeechEventMessage::Status { message } => SpeechEvent::Status(message),
            SpeechEventMessage::Error { message } => SpeechEvent::Error(message),
            SpeechEventMessage::Audio {
                pcm,
                sample_rate,
                channels,
            } => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(pcm.as_bytes())
                    .context("Invalid base64 PCM payload")?;
                SpeechEvent::AudioReceived {
                    duration_ms: pcm_duration_ms(bytes.len(), sample_rate, channels)?,
                }
            }
        })
    }
}

/// Playback duration of 16-bit interleaved PCM
pub fn pcm_duration_ms(byte_len: usize, sample_rate: u32, channels: u16) -> Result<u64> {
    if sample_rate == 0 || channels == 0 {
        bail!(
            "Invalid audio format: {} Hz, {} channels",
            sample_rate,
            channels
        );
    }

    let frames = (byte_len / 2) as u64 / channels as u64;
    Ok(frames * 1000 / sample_rate as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_duration() {
        // 100ms of 16kHz mono = 1600 samples = 3200 bytes
        assert_eq!(pcm_duration_ms(3200, 16000, 1).unwrap(), 100);
        // 1s of 24kHz stereo
        assert_eq!(pcm_duration_ms(24000 * 2 * 2, 24000, 2).unwrap(), 1000);
        assert!(pcm_duration_ms(3200, 0, 1).is_err());
    }

    #[test]
    fn test_audio_event_decoding() {
        let msg = SpeechEventMessage::Audio {
            pcm: base64::engine::general_purpose::STANDARD.encode([0u8; 4800]),
            sample_rate: 24000,
            channels: 1,
        };

        let event = msg.into_event().unwrap();
        assert_eq!(event, SpeechEvent::AudioReceived { duration_ms: 100 });
    }
}
