//! Speech Service contract
//!
//! The speech backend performs microphone capture, streaming and playback.
//! This crate only consumes it through `SpeechService`:
//! - session initialization returning an opaque `SessionHandle`
//! - capture start (awaited) and stop (best effort)
//! - a broadcast subscription of `SpeechEvent`s

mod error;
mod service;

pub use error::SpeechError;
pub use service::{SessionHandle, SpeechEvent, SpeechService};
