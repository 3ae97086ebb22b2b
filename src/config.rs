use serde::Deserialize;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

use crate::error::Error;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Overrides the location of the optional settings file.
pub const CONFIG_PATH_VAR: &str = "HOMEWORK_BOT_CONFIG";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_SECS: u64 = 600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub settings: Settings,
}

/// Secrets required before the bot is allowed to start polling.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

// Tokens must never end up in the log file.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub telegram_api_url: String,
    pub retry_secs: u64,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            retry_secs: DEFAULT_RETRY_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads credentials from the environment (and `.env`) and settings from
    /// the settings file, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] when any required variable is unset,
    /// or an I/O, TOML or URL error when the settings file is unusable.
    pub fn load() -> Result<Config, Error> {
        Self::load_from(|key| dotenvy::var(key).ok())
    }

    /// Same as [`Config::load`], reading variables through `lookup`.
    /// Credentials are checked before any settings file is touched.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;

        // An explicitly configured file must exist, the default one is optional
        let settings = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Settings::from_file(path)?,
            None => match default_settings_path() {
                Some(path) if path.is_file() => Settings::from_file(path)?,
                _ => Settings::default(),
            },
        };

        Ok(Config {
            credentials,
            settings,
        })
    }
}

impl Credentials {
    /// Builds credentials from an arbitrary variable source. Empty values count
    /// as missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] naming the first absent variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Credentials, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(Error::MissingCredential(key))
        };

        Ok(Credentials {
            practicum_token: require(PRACTICUM_TOKEN)?,
            telegram_token: require(TELEGRAM_TOKEN)?,
            telegram_chat_id: require(TELEGRAM_CHAT_ID)?,
        })
    }
}

impl Settings {
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not hold valid settings.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// # Errors
    ///
    /// Fails on malformed TOML or when either URL does not parse.
    pub fn parse(content: &str) -> Result<Settings, Error> {
        let settings: Settings = toml::from_str(content)?;
        Url::parse(&settings.endpoint)?;
        Url::parse(&settings.telegram_api_url)?;
        Ok(settings)
    }

    #[must_use]
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_secs)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("homework-bot").join("config.toml"))
}
