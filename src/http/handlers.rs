use super::state::AppState;
use crate::chat::ChatMessage;
use crate::preferences::{PanelOption, PanelView, Theme};
use crate::voice::{ControllerError, RecordingState, ViewState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceStatusResponse {
    pub state: RecordingState,
    pub session_ready: bool,
    pub first_interaction: bool,
    pub view: ViewState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub navigation: String,
    pub state: RecordingState,
}

#[derive(Debug, Deserialize)]
pub struct SystemThemeRequest {
    /// Result of the `prefers-color-scheme: light` media query
    pub prefers_light: bool,
}

#[derive(Debug, Serialize)]
pub struct SystemThemeResponse {
    /// Whether the effective theme followed the OS change
    pub followed: bool,
    pub preferences: PanelView,
}

#[derive(Debug, Deserialize)]
pub struct PostChatRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub message: ChatMessage,
    pub html: String,
}

impl From<&ChatMessage> for ChatMessageResponse {
    fn from(message: &ChatMessage) -> Self {
        Self {
            message: message.clone(),
            html: message.render_html(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

async fn voice_status(state: &AppState, error: Option<String>) -> VoiceStatusResponse {
    VoiceStatusResponse {
        state: state.controller.state().await,
        session_ready: state.controller.is_session_ready().await,
        first_interaction: state.controller.first_interaction().await,
        view: state.controller.presenter().snapshot(),
        error,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /voice/toggle
/// Microphone button
pub async fn toggle_recording(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.controller.toggle_recording().await;

    let (status, error) = match result {
        Ok(recording_state) => {
            info!("Toggle handled, state is {:?}", recording_state);
            (StatusCode::OK, None)
        }
        // Superseded by a newer request; the caller sees the current state
        Err(ControllerError::StaleResponseIgnored { request }) => {
            debug!("Toggle response for request {} was superseded", request);
            (StatusCode::OK, None)
        }
        Err(e @ ControllerError::Capture(_)) => (StatusCode::BAD_GATEWAY, Some(e.to_string())),
        Err(e @ ControllerError::SessionNotReady) => (StatusCode::CONFLICT, Some(e.to_string())),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, Some(e.to_string())),
    };

    (status, Json(voice_status(&state, error).await)).into_response()
}

/// POST /voice/navigate-away
/// Stop any recording, then navigate to the start page
pub async fn navigate_away(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.navigate_away(&state.home).await;

    (
        StatusCode::OK,
        Json(NavigationResponse {
            navigation: state.home.clone(),
            state: state.controller.state().await,
        }),
    )
}

/// GET /voice/status
pub async fn get_voice_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(voice_status(&state, None).await))
}

/// GET /preferences
pub async fn get_preferences(State(state): State<AppState>) -> impl IntoResponse {
    let panel = state.panel.lock().await;
    (StatusCode::OK, Json(panel.view()))
}

/// POST /preferences/options/:option
/// Apply one accessibility panel option (`data-opcao` identifier)
pub async fn apply_preference_option(
    State(state): State<AppState>,
    Path(option): Path<String>,
) -> impl IntoResponse {
    let option: PanelOption = match option.parse() {
        Ok(option) => option,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let mut panel = state.panel.lock().await;
    if let Err(e) = panel.apply(option) {
        error!("Failed to apply accessibility option: {:#}", e);
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to save preferences: {}", e),
        );
    }

    (StatusCode::OK, Json(panel.view())).into_response()
}

/// POST /preferences/system-theme
/// OS color scheme changed
pub async fn system_theme_changed(
    State(state): State<AppState>,
    Json(req): Json<SystemThemeRequest>,
) -> impl IntoResponse {
    let mut panel = state.panel.lock().await;
    let followed = panel.on_system_theme_change(Theme::from_prefers_light(req.prefers_light));

    (
        StatusCode::OK,
        Json(SystemThemeResponse {
            followed,
            preferences: panel.view(),
        }),
    )
}

/// GET /chat/messages
pub async fn list_chat_messages(State(state): State<AppState>) -> impl IntoResponse {
    let chat = state.chat.read().await;
    let messages: Vec<ChatMessageResponse> = chat
        .messages()
        .iter()
        .map(ChatMessageResponse::from)
        .collect();

    (StatusCode::OK, Json(messages))
}

/// POST /chat/messages
/// Append a user message; the bot reply follows after a short delay
pub async fn post_chat_message(
    State(state): State<AppState>,
    Json(req): Json<PostChatRequest>,
) -> impl IntoResponse {
    let response = {
        let mut chat = state.chat.write().await;
        match chat.submit(&req.text) {
            Some(message) => ChatMessageResponse::from(message),
            None => return error_response(StatusCode::BAD_REQUEST, "Message is empty"),
        }
    };

    let chat = state.chat.clone();
    let delay = state.chat_config.reply_delay();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        chat.write().await.push_bot_reply();
    });

    (StatusCode::CREATED, Json(response)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
