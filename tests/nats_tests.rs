use base64::Engine;
use senachat_voice::nats::client::{capture_start_subject, capture_stop_subject, events_subject};
use senachat_voice::nats::messages::{
    CaptureReply, CaptureRequest, SessionInitReply, SessionInitRequest, SpeechEventMessage,
};
use senachat_voice::{
    ControllerError, NatsSpeechService, RecordingController, RecordingState, SessionHandle,
    SpeechEvent, SpeechService, StatusConfig, StatusPresenter, StatusTone,
};
use std::sync::Arc;
use std::time::Duration;

// Nothing listens on port 1, connections are refused
const UNREACHABLE_NATS: &str = "nats://127.0.0.1:1";

#[test]
fn test_session_init_request_serialization() {
    let msg = SessionInitRequest {
        client_id: "widget-1".to_string(),
        timestamp: "2025-10-27T14:30:00Z".to_string(),
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"client_id\":\"widget-1\""));
    assert!(json.contains("2025-10-27T14:30:00Z"));
}

#[test]
fn test_session_init_reply_success() {
    let json = r#"{ "ok": true, "session_id": "sess-42" }"#;

    let reply: SessionInitReply = serde_json::from_str(json).unwrap();
    assert!(reply.ok);
    assert_eq!(reply.session_id.as_deref(), Some("sess-42"));
    assert_eq!(reply.error, None);
}

#[test]
fn test_session_init_reply_failure() {
    let json = r#"{ "ok": false, "error": "Modelo indisponível" }"#;

    let reply: SessionInitReply = serde_json::from_str(json).unwrap();
    assert!(!reply.ok);
    assert_eq!(reply.session_id, None);
    assert_eq!(reply.error.as_deref(), Some("Modelo indisponível"));
}

#[test]
fn test_capture_reply_defaults_to_not_started() {
    let reply: CaptureReply = serde_json::from_str(r#"{ "ok": true }"#).unwrap();
    assert!(reply.ok);
    assert!(!reply.started);

    let reply: CaptureReply =
        serde_json::from_str(r#"{ "ok": true, "started": true }"#).unwrap();
    assert!(reply.started);
}

#[test]
fn test_capture_request_carries_session() {
    let msg = CaptureRequest {
        session_id: "sess-42".to_string(),
        timestamp: "2025-10-27T14:30:00Z".to_string(),
    };

    let json = serde_json::to_string(&msg).unwrap();
    let deserialized: CaptureRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.session_id, "sess-42");
}

#[test]
fn test_status_and_error_events() {
    let status: SpeechEventMessage =
        serde_json::from_str(r#"{ "kind": "status", "message": "Processando..." }"#).unwrap();
    assert_eq!(
        status.into_event().unwrap(),
        SpeechEvent::Status("Processando...".to_string())
    );

    let error: SpeechEventMessage =
        serde_json::from_str(r#"{ "kind": "error", "message": "Conexão perdida" }"#).unwrap();
    assert_eq!(
        error.into_event().unwrap(),
        SpeechEvent::Error("Conexão perdida".to_string())
    );
}

#[test]
fn test_audio_event_duration() {
    // 250ms of 16kHz mono i16 samples
    let samples = vec![0i16; 4000];
    let pcm_bytes: Vec<u8> = samples.iter().flat_map(|&s| s.to_le_bytes()).collect();

    let json = serde_json::json!({
        "kind": "audio",
        "pcm": base64::engine::general_purpose::STANDARD.encode(&pcm_bytes),
        "sample_rate": 16000,
        "channels": 1,
    });

    let msg: SpeechEventMessage = serde_json::from_value(json).unwrap();
    assert_eq!(
        msg.into_event().unwrap(),
        SpeechEvent::AudioReceived { duration_ms: 250 }
    );
}

#[test]
fn test_audio_event_rejects_bad_payload() {
    let msg: SpeechEventMessage = serde_json::from_str(
        r#"{ "kind": "audio", "pcm": "not base64!", "sample_rate": 16000, "channels": 1 }"#,
    )
    .unwrap();
    assert!(msg.into_event().is_err());

    let msg: SpeechEventMessage = serde_json::from_str(
        r#"{ "kind": "audio", "pcm": "", "sample_rate": 0, "channels": 1 }"#,
    )
    .unwrap();
    assert!(msg.into_event().is_err());
}

#[test]
fn test_unknown_event_kind_is_rejected() {
    let result =
        serde_json::from_str::<SpeechEventMessage>(r#"{ "kind": "transcript", "text": "oi" }"#);
    assert!(result.is_err());
}

#[test]
fn test_subjects_are_scoped_to_session() {
    assert_eq!(capture_start_subject("sess-42"), "voice.capture.start.sess-42");
    assert_eq!(capture_stop_subject("sess-42"), "voice.capture.stop.sess-42");
    assert_eq!(events_subject("sess-42"), "voice.events.sess-42");
}

#[tokio::test]
async fn test_unreachable_server_fails_session_init() {
    let service = NatsSpeechService::new(UNREACHABLE_NATS, Duration::from_secs(2));

    // Stopping before any connection exists is a logged no-op
    service.stop_capture(&SessionHandle::new("sess-42"));

    let err = service.initialize_session().await.unwrap_err();
    assert!(err.to_string().contains("Serviço de voz indisponível"));
}

#[tokio::test]
async fn test_unreachable_server_disables_recording_only() {
    let config = StatusConfig::default();
    let presenter = StatusPresenter::new(&config);
    let service = Arc::new(NatsSpeechService::new(UNREACHABLE_NATS, Duration::from_secs(2)));
    let controller = RecordingController::new(service, presenter, config);

    let result = controller.initialize_session().await;
    assert!(matches!(result, Err(ControllerError::Initialization(_))));

    let view = controller.presenter().snapshot();
    assert_eq!(view.tone, StatusTone::Error);
    assert!(view.status_text.contains("Serviço de voz indisponível"));

    assert_eq!(
        controller.toggle_recording().await,
        Err(ControllerError::SessionNotReady)
    );
    assert_eq!(controller.state().await, RecordingState::Idle);
}
