use anyhow::{Context, Result};
use clap::Parser;
use senachat_voice::{
    create_router, AccessibilityPanel, AppState, Config, FileStorage, NatsSpeechService,
    PreferenceStore, RecordingController, StatusPresenter, Theme,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "senachat-voice", about = "Voice widget controller service")]
struct Args {
    /// Config file path, without extension
    #[arg(long, default_value = "config/senachat-voice")]
    config: String,

    /// OS prefers the light color scheme at startup
    #[arg(long)]
    prefers_light: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Senachat Voice v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let storage = FileStorage::open(&cfg.preferences.path)?;
    let panel = AccessibilityPanel::open(
        PreferenceStore::new(storage),
        Theme::from_prefers_light(args.prefers_light),
    );

    // Connects during session initialization; an unreachable server only disables recording
    let speech = NatsSpeechService::new(cfg.speech.nats_url.clone(), cfg.speech.request_timeout());
    let presenter = StatusPresenter::new(&cfg.status);
    let controller = RecordingController::new(Arc::new(speech), presenter, cfg.status.clone());

    // Subscribe before the session exists so no event is missed
    controller.spawn_event_pump();

    {
        let controller = controller.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.initialize_session().await {
                error!("Voice recording unavailable: {}", e);
            }
        });
    }

    let state = AppState::new(
        controller.clone(),
        panel,
        cfg.chat.clone(),
        cfg.navigation.home.clone(),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down, stopping any active recording");
            controller.stop_recording().await;
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
