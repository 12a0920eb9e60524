use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use super::timer::RevertTimer;
use crate::config::StatusConfig;

/// Color flag of the status region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Normal,
    Error,
}

/// One line of status text with its tone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusLine {
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Normal,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Error,
        }
    }
}

/// Everything the voice page renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Text of the status region
    pub status_text: String,

    /// Normal or error coloring
    pub tone: StatusTone,

    /// Microphone button pulse and audio indicator
    pub recording_indicator: bool,

    /// Whether the introductory text has been hidden
    pub intro_hidden: bool,

    /// Set once the page navigates away
    pub navigation: Option<String>,

    /// Total duration of audio played back so far
    pub audio_received_ms: u64,
}

struct PresenterInner {
    /// Line shown when nothing else is on screen
    resting: StatusLine,

    /// Bumped on every status change; a revert only applies to its own generation
    generation: u64,

    revert: RevertTimer,
}

/// Renders the status region and the recording indicator
///
/// Error lines revert to the resting line after a fixed delay unless a newer
/// status replaced them first.
#[derive(Clone)]
pub struct StatusPresenter {
    inner: Arc<Mutex<PresenterInner>>,
    view: Arc<watch::Sender<ViewState>>,
    error_display: Duration,
}

impl StatusPresenter {
    pub fn new(config: &StatusConfig) -> Self {
        let resting = StatusLine::normal(config.idle_prompt.clone());
        let (view, _) = watch::channel(ViewState {
            status_text: resting.text.clone(),
            tone: resting.tone,
            recording_indicator: false,
            intro_hidden: false,
            navigation: None,
            audio_received_ms: 0,
        });

        Self {
            inner: Arc::new(Mutex::new(PresenterInner {
                resting,
                generation: 0,
                revert: RevertTimer::new(),
            })),
            view: Arc::new(view),
            error_display: config.error_display(),
        }
    }

    /// Show a normal status line, superseding any pending error revert
    pub async fn show_status(&self, text: &str) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.revert.cancel();
        self.render(&StatusLine::normal(text));
    }

    /// Show an error line that reverts to the resting line after the delay
    pub async fn show_error(&self, text: &str) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        let generation = inner.generation;
        self.render(&StatusLine::error(text));

        let shared = Arc::clone(&self.inner);
        let view = Arc::clone(&self.view);
        inner.revert.schedule(self.error_display, async move {
            let mut inner = shared.lock().await;
            if inner.generation != generation {
                return;
            }
            inner.revert.disarm();
            debug!("Reverting error status to '{}'", inner.resting.text);
            render_line(&view, &inner.resting);
        });
    }

    /// Show an error that stays on screen; it becomes the resting line
    pub async fn show_persistent_error(&self, text: &str) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.revert.cancel();
        inner.resting = StatusLine::error(text);
        self.render(&inner.resting);
    }

    /// Show the resting line (the idle prompt unless a persistent error replaced it)
    pub async fn show_resting(&self) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.revert.cancel();
        self.render(&inner.resting);
    }

    pub async fn has_pending_revert(&self) -> bool {
        self.inner.lock().await.revert.is_pending()
    }

    pub fn set_recording_indicator(&self, active: bool) {
        self.view.send_modify(|view| view.recording_indicator = active);
    }

    pub fn hide_intro(&self) {
        self.view.send_modify(|view| view.intro_hidden = true);
    }

    pub fn navigate(&self, destination: &str) {
        let destination = destination.to_string();
        self.view
            .send_modify(|view| view.navigation = Some(destination));
    }

    pub fn record_audio(&self, duration_ms: u64) {
        self.view
            .send_modify(|view| view.audio_received_ms += duration_ms);
    }

    /// Current view
    pub fn snapshot(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// Receive every view change
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    fn render(&self, line: &StatusLine) {
        render_line(&self.view, line);
    }
}

fn render_line(view: &watch::Sender<ViewState>, line: &StatusLine) {
    view.send_modify(|view| {
        view.status_text = line.text.clone();
        view.tone = line.tone;
    });
}
