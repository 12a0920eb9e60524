use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Voice page
        .route("/voice/toggle", post(handlers::toggle_recording))
        .route("/voice/navigate-away", post(handlers::navigate_away))
        .route("/voice/status", get(handlers::get_voice_status))
        // Accessibility panel
        .route("/preferences", get(handlers::get_preferences))
        .route(
            "/preferences/options/:option",
            post(handlers::apply_preference_option),
        )
        .route(
            "/preferences/system-theme",
            post(handlers::system_theme_changed),
        )
        // Chat page
        .route(
            "/chat/messages",
            get(handlers::list_chat_messages).post(handlers::post_chat_message),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
