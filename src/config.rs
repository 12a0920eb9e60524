use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub speech: SpeechConfig,
    #[serde(default)]
    pub status: StatusConfig,
    pub navigation: NavigationConfig,
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct SpeechConfig {
    pub nats_url: String,
    pub request_timeout_ms: u64,
}

impl SpeechConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Texts and timing shown in the status region of the voice page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// How long an error stays visible before reverting (default: 3000 ms)
    pub error_display_ms: u64,
    /// Resting prompt shown while idle
    pub idle_prompt: String,
    /// Shown while the microphone is capturing
    pub listening: String,
    /// Shown while the speech session is being established
    pub initializing: String,
    /// Used when the speech service declines to start capture without a reason
    pub capture_declined: String,
}

impl StatusConfig {
    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            error_display_ms: 3000,
            idle_prompt: "Toque para falar".to_string(),
            listening: "Ouvindo...".to_string(),
            initializing: "Inicializando...".to_string(),
            capture_declined: "Não foi possível acessar o microfone".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationConfig {
    /// Target of the "return to start" action
    pub home: String,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesConfig {
    /// JSON file backing the key-value storage
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub reply_delay_ms: u64,
}

impl ChatConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { reply_delay_ms: 1000 }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
