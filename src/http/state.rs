use crate::chat::ChatLog;
use crate::config::ChatConfig;
use crate::preferences::AccessibilityPanel;
use crate::voice::RecordingController;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Voice page recording controller
    pub controller: RecordingController,

    /// Accessibility preferences
    pub panel: Arc<Mutex<AccessibilityPanel>>,

    /// Chat page transcript
    pub chat: Arc<RwLock<ChatLog>>,

    pub chat_config: ChatConfig,

    /// Target of "return to start"
    pub home: String,
}

impl AppState {
    pub fn new(
        controller: RecordingController,
        panel: AccessibilityPanel,
        chat_config: ChatConfig,
        home: impl Into<String>,
    ) -> Self {
        Self {
            controller,
            panel: Arc::new(Mutex::new(panel)),
            chat: Arc::new(RwLock::new(ChatLog::new())),
            chat_config,
            home: home.into(),
        }
    }
}
