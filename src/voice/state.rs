use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recording lifecycle as seen by the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    /// Microphone off, ready to listen
    #[default]
    Idle,
    /// Capture start requested, waiting for the speech service
    Initializing,
    /// Microphone capturing
    Recording,
    /// An error message is on screen; reverts to `Idle` after a delay
    ErrorDisplay,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The speech session could not be established. Persistent for the page lifetime.
    #[error("speech session unavailable: {0}")]
    Initialization(String),

    /// Capture start failed. Transient, reverts after the display timeout.
    #[error("capture failed: {0}")]
    Capture(String),

    /// The response belonged to a request that was superseded by a newer one
    #[error("response to superseded request {request} ignored")]
    StaleResponseIgnored { request: u64 },

    #[error("speech session is not ready")]
    SessionNotReady,

    #[error("speech session already initialized")]
    AlreadyInitialized,
}
