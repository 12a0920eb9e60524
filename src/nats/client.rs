use anyhow::{Context, Result};
use async_nats::Client;
use futures::stream::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{broadcast, OnceCell};
use tracing::{error, info, warn};

use super::messages::{
    CaptureReply, CaptureRequest, SessionInitReply, SessionInitRequest, SpeechEventMessage,
};
use crate::speech::{SessionHandle, SpeechError, SpeechEvent, SpeechService};

const SESSION_INIT_SUBJECT: &str = "voice.session.init";
const EVENT_CAPACITY: usize = 100;

pub fn capture_start_subject(session_id: &str) -> String {
    format!("voice.capture.start.{}", session_id)
}

pub fn capture_stop_subject(session_id: &str) -> String {
    format!("voice.capture.stop.{}", session_id)
}

pub fn events_subject(session_id: &str) -> String {
    format!("voice.events.{}", session_id)
}

/// Speech backend reached over NATS request/reply
///
/// The connection is opened by `initialize_session`, so an unreachable
/// server surfaces as a session initialization error.
pub struct NatsSpeechService {
    url: String,
    client: OnceCell<Client>,
    client_id: String,
    request_timeout: Duration,
    events: broadcast::Sender<SpeechEvent>,
}

impl NatsSpeechService {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            url: url.into(),
            client: OnceCell::new(),
            client_id: uuid::Uuid::new_v4().to_string(),
            request_timeout,
            events,
        }
    }

    /// Connect to the NATS server on first use
    async fn client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                info!("Connecting to NATS at {}", self.url);

                let client = tokio::time::timeout(
                    self.request_timeout,
                    async_nats::connect(self.url.as_str()),
                )
                .await
                .with_context(|| format!("Connecting to NATS at {} timed out", self.url))?
                .context("Failed to connect to NATS")?;

                info!("Connected to NATS successfully");
                Ok::<_, anyhow::Error>(client)
            })
            .await
    }

    async fn request<Req, Reply>(&self, subject: String, request: &Req) -> Result<Reply>
    where
        Req: Serialize,
        Reply: DeserializeOwned,
    {
        let payload = serde_json::to_vec(request)?;

        let client = self.client().await?;

        let message = tokio::time::timeout(
            self.request_timeout,
            client.request(subject.clone(), payload.into()),
        )
        .await
        .with_context(|| format!("Request to {} timed out", subject))?
        .with_context(|| format!("Request to {} failed", subject))?;

        serde_json::from_slice(&message.payload)
            .with_context(|| format!("Invalid reply on {}", subject))
    }

    /// Forward backend events for `session_id` into the broadcast channel
    async fn subscribe_events(&self, session_id: &str) -> Result<()> {
        let subject = events_subject(session_id);

        info!("Subscribing to speech events on {}", subject);

        let mut subscriber = self
            .client()
            .await?
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe to speech events")?;

        let events = self.events.clone();

        tokio::spawn(async move {
            while let Some(msg) = subscriber.next().await {
                let event = serde_json::from_slice::<SpeechEventMessage>(&msg.payload)
                    .context("Failed to parse speech event message")
                    .and_then(SpeechEventMessage::into_event);

                match event {
                    Ok(event) => {
                        // No receivers just means nobody listens yet
                        let _ = events.send(event);
                    }
                    Err(e) => warn!("Dropping speech event: {:#}", e),
                }
            }

            info!("Speech event subscription on {} closed", subject);
        });

        Ok(())
    }
}

#[async_trait::async_trait]
impl SpeechService for NatsSpeechService {
    async fn initialize_session(&self) -> Result<SessionHandle, SpeechError> {
        let request = SessionInitRequest {
            client_id: self.client_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let reply: SessionInitReply = self
            .request(SESSION_INIT_SUBJECT.to_string(), &request)
            .await
            .map_err(|e| {
                SpeechError::Initialization(format!("Serviço de voz indisponível: {:#}", e))
            })?;

        let session_id = match (reply.ok, reply.session_id) {
            (true, Some(session_id)) => session_id,
            (_, _) => {
                return Err(SpeechError::Initialization(reply.error.unwrap_or_else(|| {
                    "Não foi possível iniciar a sessão de voz".to_string()
                })))
            }
        };

        self.subscribe_events(&session_id)
            .await
            .map_err(|e| SpeechError::Initialization(format!("{:#}", e)))?;

        info!("Speech session established: {}", session_id);

        Ok(SessionHandle::new(session_id))
    }

    async fn start_capture(&self, session: &SessionHandle) -> Result<bool, SpeechError> {
        let request = CaptureRequest {
            session_id: session.id().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let reply: CaptureReply = self
            .request(capture_start_subject(session.id()), &request)
            .await
            .map_err(|e| SpeechError::Capture(format!("{:#}", e)))?;

        if !reply.ok {
            return Err(SpeechError::Capture(
                reply
                    .error
                    .unwrap_or_else(|| "Falha ao iniciar a gravação".to_string()),
            ));
        }

        Ok(reply.started)
    }

    fn stop_capture(&self, session: &SessionHandle) {
        let subject = capture_stop_subject(session.id());
        let request = CaptureRequest {
            session_id: session.id().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = match serde_json::to_vec(&request) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode capture stop: {}", e);
                return;
            }
        };

        let Some(client) = self.client.get().cloned() else {
            warn!("Capture stop skipped, not connected to NATS");
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                error!("Failed to publish capture stop to {}: {}", subject, e);
            }
        });
    }

    fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.events.subscribe()
    }

    fn name(&self) -> &str {
        "nats"
    }
}
