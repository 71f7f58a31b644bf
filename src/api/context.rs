//! Shared state handed to every HTTP handler

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use tracing::info;

use crate::{
    services::{greeting, PromptBoard, RemoteWindow, Theme, ThemeStore},
    state::Session,
};

pub struct AppContext {
    pub session: Arc<Session>,
    pub prompts: Arc<PromptBoard>,
    pub window: Arc<RemoteWindow>,
    pub themes: ThemeStore,
    theme: Mutex<Theme>,
    pub greeting: String,
    pub start_time: Instant,
    pub host: String,
    pub port: u16,
}

impl AppContext {
    pub fn new(
        session: Arc<Session>,
        prompts: Arc<PromptBoard>,
        window: Arc<RemoteWindow>,
        themes: ThemeStore,
        username: &str,
        host: String,
        port: u16,
    ) -> Self {
        let theme = themes.load();
        info!("Loaded theme {:?} from {}", theme, themes.path().display());

        Self {
            session,
            prompts,
            window,
            themes,
            theme: Mutex::new(theme),
            greeting: greeting(username),
            start_time: Instant::now(),
            host,
            port,
        }
    }

    pub fn theme(&self) -> Theme {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply and persist a theme. Persistence failures are only logged.
    pub fn set_theme(&self, theme: Theme) {
        *self.theme.lock().unwrap_or_else(PoisonError::into_inner) = theme;
        self.themes.save(theme);
        info!("Theme set to {:?}", theme);
    }

    /// Server uptime as a short human-readable string
    pub fn uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
