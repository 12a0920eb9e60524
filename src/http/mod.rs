//! HTTP control surface for the widget pages
//!
//! - POST /voice/toggle - Microphone button
//! - POST /voice/navigate-away - "Return to start", stops any recording first
//! - GET /voice/status - Recording state and rendered view
//! - GET /preferences - Accessibility preferences as applied
//! - POST /preferences/options/:option - Accessibility panel option
//! - POST /preferences/system-theme - OS color scheme changed
//! - GET|POST /chat/messages - Chat transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{
    ChatMessageResponse, ErrorResponse, NavigationResponse, PostChatRequest, SystemThemeRequest,
    SystemThemeResponse, VoiceStatusResponse,
};
pub use routes::create_router;
pub use state::AppState;
