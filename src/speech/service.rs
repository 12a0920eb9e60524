use tokio::sync::broadcast;

use super::error::SpeechError;

/// Opaque reference to an established speech session.
///
/// Created only by a `SpeechService` and intentionally not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionHandle {
    id: String,
}

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Events emitted by the speech backend at arbitrary times
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Informational status text to forward to the status region
    Status(String),
    /// Backend failure; puts the controller into error display
    Error(String),
    /// A chunk of synthesized audio was played back
    AudioReceived { duration_ms: u64 },
}

/// Speech backend trait
///
/// Implementations:
/// - `NatsSpeechService`: backend reachable over NATS request/reply
/// - test fakes with scripted outcomes
#[async_trait::async_trait]
pub trait SpeechService: Send + Sync {
    /// Establish the session. Called once per page session.
    async fn initialize_session(&self) -> Result<SessionHandle, SpeechError>;

    /// Begin microphone capture
    ///
    /// Returns `true` when capture actually began.
    async fn start_capture(&self, session: &SessionHandle) -> Result<bool, SpeechError>;

    /// Stop microphone capture. Best effort, never fails the caller.
    fn stop_capture(&self, session: &SessionHandle);

    /// Subscribe to status, error and audio events
    fn subscribe(&self) -> broadcast::Receiver<SpeechEvent>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
