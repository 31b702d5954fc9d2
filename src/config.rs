use crate::error::{config_error, env_error, AppResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default locale for assistant messages
pub const DEFAULT_LOCALE: &str = "en";

/// Optional file overlay for settings that are not secrets
pub const CONFIG_FILE: &str = "config/voicecal.toml";

/// Main configuration structure for the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the scheduling backend (extract, check_conflicts, add_event)
    pub backend_url: String,
    /// Timezone used for naive timestamps and for display
    pub timezone: String,
    /// Locale for assistant messages
    pub locale: String,
    /// Per-request timeout in seconds. Unset means requests may block indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// Whether assistant feedback is spoken as well as displayed
    pub speak_feedback: bool,
}

/// Settings that may be supplied through `config/voicecal.toml`
#[derive(Debug, Default, Deserialize)]
struct FileOverlay {
    backend_url: Option<String>,
    timezone: Option<String>,
    locale: Option<String>,
    request_timeout_secs: Option<u64>,
    speak_feedback: Option<bool>,
}

impl Config {
    /// Load configuration from environment and the default config file
    pub fn load() -> AppResult<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from the environment with `path` as the file overlay.
    /// A missing file is the same as an empty one.
    pub fn load_from(path: impl AsRef<Path>) -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let overlay = read_overlay(path.as_ref())?;
        Self::from_sources(|key| env::var(key).ok(), overlay)
    }

    fn from_sources(
        get: impl Fn(&str) -> Option<String>,
        overlay: FileOverlay,
    ) -> AppResult<Self> {
        // Environment wins over the file
        let backend_url = get("VOICECAL_BACKEND_URL")
            .or(overlay.backend_url)
            .ok_or_else(|| env_error("VOICECAL_BACKEND_URL"))?;

        let timezone = get("TIMEZONE")
            .or(overlay.timezone)
            .unwrap_or_else(|| String::from("UTC"));

        let locale = get("VOICECAL_LOCALE")
            .or(overlay.locale)
            .unwrap_or_else(|| String::from(DEFAULT_LOCALE));

        let request_timeout_secs = match get("VOICECAL_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|_| env_error("Invalid VOICECAL_REQUEST_TIMEOUT_SECS format"))?,
            ),
            None => overlay.request_timeout_secs,
        };

        let speak_feedback = match get("VOICECAL_SPEAK_FEEDBACK") {
            Some(raw) => raw
                .parse::<bool>()
                .map_err(|_| env_error("Invalid VOICECAL_SPEAK_FEEDBACK format"))?,
            None => overlay.speak_feedback.unwrap_or(true),
        };

        let config = Config {
            backend_url,
            timezone,
            locale,
            request_timeout_secs,
            speak_feedback,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check values that would otherwise fail later at request time
    pub fn validate(&self) -> AppResult<()> {
        self.backend_base()?;
        self.tz()?;
        if self.request_timeout_secs == Some(0) {
            return Err(config_error("Request timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// Backend base URL with a trailing slash so endpoint names join beneath it
    pub fn backend_base(&self) -> AppResult<Url> {
        let mut raw = self.backend_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw)
            .map_err(|e| config_error(&format!("Invalid backend URL {}: {}", self.backend_url, e)))
    }

    /// Request timeout, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn read_overlay(path: &Path) -> AppResult<FileOverlay> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str::<FileOverlay>(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileOverlay::default()),
        Err(e) => Err(e.into()),
    }
}
