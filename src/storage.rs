//! JSON persistence for timer settings and the Spotify access token

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::config::TimerSettings;

/// Settings file name inside the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Token file name inside the data directory
pub const TOKEN_FILE_NAME: &str = ".spotify_token";

/// File-backed storage under a data directory.
///
/// Settings are stored as JSON and restored verbatim on startup; the access
/// token is a single opaque line. Both are optional, so a missing or
/// unreadable file simply falls back to defaults.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Open storage rooted at the given directory, creating it if needed
    pub fn new(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE_NAME)
    }

    fn token_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE_NAME)
    }

    /// Load persisted settings, or None when absent or unparsable
    pub fn load_settings(&self) -> Option<TimerSettings> {
        let path = self.settings_path();
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<TimerSettings>(&contents) {
            Ok(settings) => {
                debug!("Restored settings from {}", path.display());
                Some(settings)
            }
            Err(e) => {
                warn!("Ignoring unparsable settings file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Persist settings as pretty-printed JSON
    pub fn save_settings(&self, settings: &TimerSettings) -> Result<(), String> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(self.settings_path(), json)
            .map_err(|e| format!("Failed to write settings file: {}", e))
    }

    /// Load a persisted access token, if any
    pub fn load_token(&self) -> Option<String> {
        let token = fs::read_to_string(self.token_path()).ok()?;
        let token = token.trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    /// Persist the access token
    pub fn save_token(&self, token: &str) -> Result<(), String> {
        fs::write(self.token_path(), token).map_err(|e| format!("Failed to write token file: {}", e))
    }

    /// Remove the persisted access token, idempotently
    pub fn clear_token(&self) -> Result<(), String> {
        match fs::remove_file(self.token_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Failed to remove token file: {}", e)),
        }
    }
}
