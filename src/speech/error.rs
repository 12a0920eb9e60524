use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// Session could not be established (transport or permission failure)
    #[error("{0}")]
    Initialization(String),

    /// Capture could not be started
    #[error("{0}")]
    Capture(String),
}
