use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::presenter::StatusPresenter;
use super::state::{ControllerError, RecordingState};
use super::timer::RevertTimer;
use crate::config::StatusConfig;
use crate::speech::{SessionHandle, SpeechEvent, SpeechService};

enum SessionSlot {
    /// `initialize_session` not called yet
    Pending,
    /// Waiting for the speech service to establish the session
    Connecting,
    Ready(Arc<SessionHandle>),
    /// Initialization failed; recording stays unavailable for this controller
    Failed,
}

struct Inner {
    state: RecordingState,
    session: SessionSlot,

    /// Bumped by every start, stop and error transition.
    /// Async results only apply if they carry the current value.
    request_seq: u64,

    /// Set after the first successful start; gates the intro transition
    first_interaction: bool,

    /// Error display -> idle
    revert: RevertTimer,
}

/// Sole authority on whether the microphone is on
///
/// Cloning is cheap and yields a handle to the same controller.
#[derive(Clone)]
pub struct RecordingController {
    service: Arc<dyn SpeechService>,
    presenter: StatusPresenter,
    config: Arc<StatusConfig>,
    inner: Arc<Mutex<Inner>>,
}

impl RecordingController {
    pub fn new(
        service: Arc<dyn SpeechService>,
        presenter: StatusPresenter,
        config: StatusConfig,
    ) -> Self {
        Self {
            service,
            presenter,
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(Inner {
                state: RecordingState::Idle,
                session: SessionSlot::Pending,
                request_seq: 0,
                first_interaction: false,
                revert: RevertTimer::new(),
            })),
        }
    }

    /// Establish the speech session. Must complete before recording is possible.
    pub async fn initialize_session(&self) -> Result<(), ControllerError> {
        {
            let mut inner = self.inner.lock().await;
            if !matches!(inner.session, SessionSlot::Pending) {
                warn!("Speech session initialization requested twice");
                return Err(ControllerError::AlreadyInitialized);
            }
            inner.session = SessionSlot::Connecting;
        }

        info!("Initializing speech session ({})", self.service.name());
        self.presenter.show_status(&self.config.initializing).await;

        let result = self.service.initialize_session().await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(session) => {
                info!("Speech session ready: {}", session.id());
                inner.session = SessionSlot::Ready(Arc::new(session));
                if inner.state == RecordingState::Idle {
                    self.presenter.show_resting().await;
                }
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                error!("Failed to initialize speech session: {}", message);
                inner.session = SessionSlot::Failed;
                self.presenter.show_persistent_error(&message).await;
                Err(ControllerError::Initialization(message))
            }
        }
    }

    /// Microphone button: stop when recording, start otherwise
    ///
    /// Ignored while a start is already in flight.
    pub async fn toggle_recording(&self) -> Result<RecordingState, ControllerError> {
        {
            let mut inner = self.inner.lock().await;
            match inner.state {
                RecordingState::Recording => {
                    self.stop_locked(&mut inner).await;
                    return Ok(inner.state);
                }
                RecordingState::Initializing => {
                    debug!("Toggle ignored: capture start already in flight");
                    return Ok(inner.state);
                }
                RecordingState::Idle | RecordingState::ErrorDisplay => {}
            }
        }

        self.start_recording().await
    }

    /// Request capture start and wait for the outcome
    pub async fn start_recording(&self) -> Result<RecordingState, ControllerError> {
        let (seq, session) = {
            let mut inner = self.inner.lock().await;

            let session = match &inner.session {
                SessionSlot::Ready(session) => Arc::clone(session),
                _ => {
                    warn!("Start requested before the speech session is ready");
                    return Err(ControllerError::SessionNotReady);
                }
            };

            if matches!(
                inner.state,
                RecordingState::Initializing | RecordingState::Recording
            ) {
                debug!("Start ignored in state {:?}", inner.state);
                return Ok(inner.state);
            }

            inner.request_seq += 1;
            let seq = inner.request_seq;
            self.transition(&mut inner, RecordingState::Initializing)
                .await;
            (seq, session)
        };

        info!("Requesting capture start (request {})", seq);
        let outcome = self.service.start_capture(&session).await;

        let mut inner = self.inner.lock().await;

        if inner.request_seq != seq || inner.state != RecordingState::Initializing {
            // A newer start owns the microphone if one is in flight or running
            let orphaned = matches!(outcome, Ok(true))
                && matches!(
                    inner.state,
                    RecordingState::Idle | RecordingState::ErrorDisplay
                );
            if orphaned {
                warn!(
                    "Capture began for superseded request {}; stopping it",
                    seq
                );
                self.service.stop_capture(&session);
            } else {
                debug!("Ignoring response to superseded request {}", seq);
            }
            return Err(ControllerError::StaleResponseIgnored { request: seq });
        }

        match outcome {
            Ok(true) => {
                self.transition(&mut inner, RecordingState::Recording).await;
                if !inner.first_interaction {
                    inner.first_interaction = true;
                    info!("First recording started, hiding intro");
                    self.presenter.hide_intro();
                }
                Ok(RecordingState::Recording)
            }
            Ok(false) => {
                let message = self.config.capture_declined.clone();
                warn!("Speech service declined to start capture");
                self.enter_error(&mut inner, &message).await;
                Err(ControllerError::Capture(message))
            }
            Err(e) => {
                let message = e.to_string();
                error!("Failed to start capture: {}", message);
                self.enter_error(&mut inner, &message).await;
                Err(ControllerError::Capture(message))
            }
        }
    }

    /// Stop capture (fire-and-forget) and return to idle immediately
    pub async fn stop_recording(&self) {
        let mut inner = self.inner.lock().await;
        self.stop_locked(&mut inner).await;
    }

    /// "Return to start": flush any recording before navigating
    pub async fn navigate_away(&self, destination: &str) {
        {
            let mut inner = self.inner.lock().await;
            if matches!(
                inner.state,
                RecordingState::Recording | RecordingState::Initializing
            ) {
                self.stop_locked(&mut inner).await;
            }
        }

        info!("Navigating to {}", destination);
        self.presenter.navigate(destination);
    }

    /// Apply one speech service event
    pub async fn handle_event(&self, event: SpeechEvent) {
        match event {
            SpeechEvent::Status(message) => {
                debug!("Speech status: {}", message);
                self.presenter.show_status(&message).await;
            }
            SpeechEvent::Error(message) => {
                warn!("Speech service error: {}", message);
                let mut inner = self.inner.lock().await;
                if inner.state == RecordingState::Recording {
                    if let SessionSlot::Ready(session) = &inner.session {
                        self.service.stop_capture(session);
                    }
                }
                self.enter_error(&mut inner, &message).await;
            }
            SpeechEvent::AudioReceived { duration_ms } => {
                debug!("Audio received: {} ms", duration_ms);
                self.presenter.record_audio(duration_ms);
            }
        }
    }

    /// Forward speech service events to `handle_event` in arrival order
    pub fn spawn_event_pump(&self) -> JoinHandle<()> {
        let mut events = self.service.subscribe();
        let controller = self.clone();

        tokio::spawn(async move {
            info!("Speech event pump started ({})", controller.service.name());

            loop {
                match events.recv().await {
                    Ok(event) => controller.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Speech event pump lagged, {} events dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            info!("Speech event pump stopped");
        })
    }

    pub async fn state(&self) -> RecordingState {
        self.inner.lock().await.state
    }

    pub async fn first_interaction(&self) -> bool {
        self.inner.lock().await.first_interaction
    }

    pub async fn is_session_ready(&self) -> bool {
        matches!(self.inner.lock().await.session, SessionSlot::Ready(_))
    }

    /// Whether any error revert (state or status text) is still scheduled
    pub async fn has_pending_revert(&self) -> bool {
        let state_timer = self.inner.lock().await.revert.is_pending();
        state_timer || self.presenter.has_pending_revert().await
    }

    pub fn presenter(&self) -> &StatusPresenter {
        &self.presenter
    }

    async fn stop_locked(&self, inner: &mut Inner) {
        inner.request_seq += 1;

        match inner.state {
            RecordingState::Recording => {
                if let SessionSlot::Ready(session) = &inner.session {
                    info!("Requesting capture stop");
                    self.service.stop_capture(session);
                }
            }
            RecordingState::Initializing => {
                info!("Stop requested while capture start is in flight");
            }
            RecordingState::Idle | RecordingState::ErrorDisplay => {}
        }

        self.transition(inner, RecordingState::Idle).await;
    }

    /// Show `message` and schedule the revert to `Idle`
    ///
    /// This timer owns the revert. The presenter's own text revert is
    /// cancelled by the `Idle` transition, which re-renders the resting line.
    async fn enter_error(&self, inner: &mut Inner, message: &str) {
        inner.request_seq += 1;
        let seq = inner.request_seq;

        self.transition(inner, RecordingState::ErrorDisplay).await;
        self.presenter.show_error(message).await;

        let controller = self.clone();
        inner
            .revert
            .schedule(self.config.error_display(), async move {
                let mut inner = controller.inner.lock().await;
                if inner.request_seq != seq || inner.state != RecordingState::ErrorDisplay {
                    return;
                }
                inner.revert.disarm();
                controller
                    .transition(&mut inner, RecordingState::Idle)
                    .await;
            });
    }

    /// The only place the state changes; renders its canonical visuals
    async fn transition(&self, inner: &mut Inner, next: RecordingState) {
        let prev = inner.state;
        inner.state = next;
        inner.revert.cancel();

        if prev != next {
            info!("recording state: {:?} -> {:?}", prev, next);
        }

        self.presenter
            .set_recording_indicator(next == RecordingState::Recording);

        match next {
            RecordingState::Idle => self.presenter.show_resting().await,
            RecordingState::Initializing => {
                self.presenter.show_status(&self.config.initializing).await
            }
            RecordingState::Recording => self.presenter.show_status(&self.config.listening).await,
            // The message arrives with the error, see `enter_error`
            RecordingState::ErrorDisplay => {}
        }
    }
}
