// Scripted speech service for controller tests
//
// Capture starts block until the test resolves them, so interleavings of
// user actions and async completions can be driven step by step.
#![allow(dead_code)]

use senachat_voice::{
    RecordingController, SessionHandle, SpeechError, SpeechEvent, SpeechService, StatusConfig,
    StatusPresenter,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, oneshot};

type StartReply = oneshot::Sender<Result<bool, SpeechError>>;

pub struct FakeSpeechService {
    init_result: Mutex<Result<(), SpeechError>>,
    pending_starts: Mutex<VecDeque<StartReply>>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    events: broadcast::Sender<SpeechEvent>,
}

impl FakeSpeechService {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            init_result: Mutex::new(Ok(())),
            pending_starts: Mutex::new(VecDeque::new()),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            events,
        })
    }

    pub fn failing_init(message: &str) -> Arc<Self> {
        let fake = Self::new();
        *fake.init_result.lock().unwrap() = Err(SpeechError::Initialization(message.to_string()));
        fake
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Complete the oldest pending capture start
    pub fn resolve_start(&self, result: Result<bool, SpeechError>) {
        let reply = self
            .pending_starts
            .lock()
            .unwrap()
            .pop_front()
            .expect("no capture start pending");
        reply.send(result).expect("start_capture caller went away");
    }

    pub fn emit(&self, event: SpeechEvent) {
        self.events.send(event).expect("no event subscribers");
    }

    /// Yield until `start_capture` has been called `count` times
    pub async fn wait_for_start_calls(&self, count: usize) {
        for _ in 0..1000 {
            if self.start_calls() >= count && !self.pending_starts.lock().unwrap().is_empty() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("start_capture was not called {} times", count);
    }
}

#[async_trait::async_trait]
impl SpeechService for FakeSpeechService {
    async fn initialize_session(&self) -> Result<SessionHandle, SpeechError> {
        self.init_result.lock().unwrap().clone()?;
        Ok(SessionHandle::new("fake-session"))
    }

    async fn start_capture(&self, _session: &SessionHandle) -> Result<bool, SpeechError> {
        let (tx, rx) = oneshot::channel();
        self.pending_starts.lock().unwrap().push_back(tx);
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        rx.await
            .unwrap_or_else(|_| Err(SpeechError::Capture("start abandoned".to_string())))
    }

    fn stop_capture(&self, _session: &SessionHandle) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.events.subscribe()
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn controller_for(fake: &Arc<FakeSpeechService>) -> RecordingController {
    let config = StatusConfig::default();
    let presenter = StatusPresenter::new(&config);
    RecordingController::new(fake.clone(), presenter, config)
}

/// Controller with an initialized session
pub async fn ready_controller(fake: &Arc<FakeSpeechService>) -> RecordingController {
    let controller = controller_for(fake);
    controller
        .initialize_session()
        .await
        .expect("fake session initializes");
    controller
}

/// Start a toggle in the background and wait until its capture start is pending
pub async fn toggle_in_background(
    controller: &RecordingController,
    fake: &Arc<FakeSpeechService>,
) -> tokio::task::JoinHandle<Result<senachat_voice::RecordingState, senachat_voice::ControllerError>>
{
    let expected = fake.start_calls() + 1;
    let background = controller.clone();
    let handle = tokio::spawn(async move { background.toggle_recording().await });
    fake.wait_for_start_calls(expected).await;
    handle
}
