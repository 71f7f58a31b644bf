//! Persisted theme and greeting text

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    White,
    LightGrey,
    #[default]
    DarkGrey,
    Black,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default)]
    theme: Theme,
}

/// Single-value preference file. Failures are logged and fall back to defaults.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Theme {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("No saved preferences at {}: {}", self.path.display(), e);
                return Theme::default();
            }
        };

        match serde_json::from_str::<StoredPreferences>(&contents) {
            Ok(prefs) => prefs.theme,
            Err(e) => {
                warn!("Ignoring unreadable preferences {}: {}", self.path.display(), e);
                Theme::default()
            }
        }
    }

    pub fn save(&self, theme: Theme) {
        if let Err(e) = self.try_save(theme) {
            warn!("Failed to save preferences to {}: {}", self.path.display(), e);
        }
    }

    fn try_save(&self, theme: Theme) -> Result<(), String> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(&StoredPreferences { theme })
            .map_err(|e| e.to_string())?;
        fs::write(&self.path, json).map_err(|e| e.to_string())
    }
}

/// Login name of the current user, `"User"` when unknown
pub fn local_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "User".to_string())
}

/// Greeting with only the first letter of the name uppercased
pub fn greeting(username: &str) -> String {
    let mut chars = username.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("Hello, {}!", name)
}
