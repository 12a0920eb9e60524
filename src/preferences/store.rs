use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};

use super::bag::{clamp_font_scale, PreferenceBag, Theme};

/// Key the preference bag is stored under
pub const STORAGE_KEY: &str = "senachat-acessibilidade";

/// String key-value storage (the browser's local storage on the page side)
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Persist synchronously
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Key-value storage backed by one JSON object file
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create storage directory: {:?}", parent))?;
            }
        }

        info!("Preference storage at {:?}", path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read storage file: {:?}", self.path))?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&raw)
            .with_context(|| format!("Storage file is not a JSON object: {:?}", self.path))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(key)
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // An unreadable file is overwritten rather than blocking every save
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            warn!("Discarding unreadable storage file: {:#}", e);
            Map::new()
        });
        entries.insert(key.to_string(), Value::String(value.to_string()));

        let payload = serde_json::to_vec_pretty(&entries)?;
        fs::write(&self.path, payload)
            .with_context(|| format!("Failed to write storage file: {:?}", self.path))
    }
}

/// In-memory storage, nothing survives the process
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves the `PreferenceBag` under `STORAGE_KEY`
pub struct PreferenceStore {
    storage: Box<dyn KeyValueStorage>,
}

impl PreferenceStore {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Stored preferences with the theme resolved against the OS color scheme
    ///
    /// Missing or unreadable data falls back to defaults.
    pub fn load(&self, system: Theme) -> PreferenceBag {
        let mut bag = self.load_stored().unwrap_or_default();

        if bag.theme.is_none() {
            bag.theme = Some(system);
        }
        bag.font_scale = clamp_font_scale(bag.font_scale);

        bag
    }

    /// Stored preferences as written, `None` when nothing usable is stored
    pub fn load_stored(&self) -> Option<PreferenceBag> {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("Failed to read preferences: {:#}", e);
                return None;
            }
        };

        match serde_json::from_str::<PreferenceBag>(&raw) {
            Ok(bag) => Some(bag),
            Err(e) => {
                error!("Failed to parse stored preferences: {}", e);
                None
            }
        }
    }

    pub fn save(&self, bag: &PreferenceBag) -> Result<()> {
        let payload = serde_json::to_string(bag)?;
        self.storage
            .set(STORAGE_KEY, &payload)
            .context("Failed to save preferences")
    }

    /// Whether the user has saved an explicit theme
    pub fn has_explicit_theme(&self) -> bool {
        self.load_stored()
            .map(|bag| bag.theme.is_some())
            .unwrap_or(false)
    }
}
