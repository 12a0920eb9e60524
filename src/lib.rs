pub mod chat;
pub mod config;
pub mod http;
pub mod nats;
pub mod preferences;
pub mod speech;
pub mod voice;

pub use chat::{Author, ChatLog, ChatMessage};
pub use config::{Config, StatusConfig};
pub use http::{create_router, AppState};
pub use nats::NatsSpeechService;
pub use preferences::{
    AccessibilityPanel, FileStorage, KeyValueStorage, MemoryStorage, PanelOption, PreferenceBag,
    PreferenceStore, Theme,
};
pub use speech::{SessionHandle, SpeechError, SpeechEvent, SpeechService};
pub use voice::{
    ControllerError, RecordingController, RecordingState, StatusPresenter, StatusTone, ViewState,
};
