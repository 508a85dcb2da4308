//! Load transport settings for json-models from the process environment, a project `.env`
//! and XDG `config.toml`, with priority: **existing env > .env > XDG**.
//!
//! ```toml
//! # ~/.config/json-models/config.toml
//! [client]
//! timeout_secs = 10
//! user_agent = "inventory-sync/2.1"
//!
//! [client.headers]
//! x-api-key = "..."
//! ```
//!
//! Environment overrides use the upper-cased app name as prefix, e.g. `JSON_MODELS_TIMEOUT_SECS`
//! and `JSON_MODELS_USER_AGENT`.

mod xdg_toml;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default request timeout when nothing is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("load .env: {0}")]
    Dotenv(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Settings consumed by the live HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Global request timeout; `None` waits forever.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Sent with every request; per-request headers with the same name win.
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: format!("json-models/{}", env!("CARGO_PKG_VERSION")),
            headers: BTreeMap::new(),
        }
    }
}

/// Prefix for environment overrides: `"json-models"` becomes `"JSON_MODELS"`.
pub fn env_prefix(app_name: &str) -> String {
    app_name
        .chars()
        .map(|c| match c {
            '-' | '.' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Builder over the locations settings are read from.
///
/// Defaults to the standard locations: `.env` in the current directory and
/// `$XDG_CONFIG_HOME/<app>/config.toml`.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    app_name: String,
    config_base: Option<PathBuf>,
    dotenv_dir: Option<PathBuf>,
}

impl SettingsLoader {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            config_base: None,
            dotenv_dir: None,
        }
    }

    /// Use `base` instead of `$XDG_CONFIG_HOME`; the file read is `<base>/<app>/config.toml`.
    pub fn config_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.config_base = Some(base.into());
        self
    }

    /// Look for `.env` in `dir` instead of the current directory.
    pub fn dotenv_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dotenv_dir = Some(dir.into());
        self
    }

    /// Applies `.env` to the process environment (existing variables are kept), then merges
    /// XDG `[client]` values with environment overrides.
    pub fn load(&self) -> Result<ClientSettings, LoadError> {
        self.apply_dotenv()?;

        let mut settings = ClientSettings::default();

        let base = self
            .config_base
            .clone()
            .or_else(xdg_toml::default_config_base);
        if let Some(base) = base {
            let table = xdg_toml::load_client_table(&base, &self.app_name)?;
            if let Some(secs) = table.timeout_secs {
                settings.timeout = timeout_from_secs(secs);
            }
            if let Some(agent) = table.user_agent {
                settings.user_agent = agent;
            }
            settings.headers.extend(table.headers);
        }

        let prefix = env_prefix(&self.app_name);
        let timeout_key = format!("{}_TIMEOUT_SECS", prefix);
        if let Ok(raw) = std::env::var(&timeout_key) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| LoadError::InvalidValue {
                    key: timeout_key.clone(),
                    value: raw.clone(),
                })?;
            settings.timeout = timeout_from_secs(secs);
        }
        if let Ok(agent) = std::env::var(format!("{}_USER_AGENT", prefix)) {
            settings.user_agent = agent;
        }

        Ok(settings)
    }

    fn apply_dotenv(&self) -> Result<(), LoadError> {
        let dir = match &self.dotenv_dir {
            Some(dir) => dir.clone(),
            None => match std::env::current_dir() {
                Ok(dir) => dir,
                Err(_) => return Ok(()),
            },
        };
        apply_dotenv_file(&dir.join(".env"))
    }
}

fn apply_dotenv_file(path: &Path) -> Result<(), LoadError> {
    if !path.is_file() {
        return Ok(());
    }
    dotenv::from_path(path).map_err(|e| LoadError::Dotenv(e.to_string()))
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

/// Loads settings for `app_name` from the standard locations.
pub fn load(app_name: &str) -> Result<ClientSettings, LoadError> {
    SettingsLoader::new(app_name).load()
}
