pub mod client;
pub mod messages;

pub use client::NatsSpeechService;
pub use messages::{
    CaptureReply, CaptureRequest, SessionInitReply, SessionInitRequest, SpeechEventMessage,
};
