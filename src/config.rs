//! Runtime configuration
//!
//! Layered as defaults < `config.toml` < environment < command-line flags.

use crate::actions::Mode;
use crate::message::{DEFAULT_HISTORY_KEEP, DEFAULT_HISTORY_LIMIT};
use crate::model::ClientOptions;
use crate::{Result, TutorError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "Phi-4-generic-gpu";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5273/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

pub const ENV_MODEL: &str = "DJANGO_GIRLS_MODEL";
pub const ENV_BASE_URL: &str = "DJANGO_GIRLS_BASE_URL";
pub const ENV_API_KEY: &str = "DJANGO_GIRLS_API_KEY";

/// On-disk shape; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    model: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    request_timeout_secs: Option<u64>,
    history_limit: Option<usize>,
    history_keep: Option<usize>,
    mode: Option<Mode>,
}

/// Resolved configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct TutorConfig {
    /// Model identifier sent with every request
    pub model: String,

    /// Chat Completions base URL, e.g. `http://localhost:5273/v1`
    pub base_url: String,

    /// Bearer token, only needed for servers that check one
    pub api_key: Option<String>,

    pub temperature: f32,
    pub max_tokens: u32,

    /// Total request timeout; `None` waits for slow local models
    pub request_timeout: Option<Duration>,

    /// History length that triggers trimming
    pub history_limit: usize,

    /// Recent messages kept (besides the system prompt) after trimming
    pub history_keep: usize,

    pub mode: Mode,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_keep: DEFAULT_HISTORY_KEEP,
            mode: Mode::default(),
        }
    }
}

impl TutorConfig {
    /// `<config_dir>/django-girls/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("django-girls").join("config.toml"))
    }

    /// Load defaults overlaid with a config file.
    ///
    /// An explicitly given path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::default();
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(TutorError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                config.merge_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => config.merge_file(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(config)
                }
            },
        }
    }

    fn merge_file(self, path: &Path) -> Result<Self> {
        info!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        self.merge_toml(&content)
    }

    /// Overlay the keys present in a TOML document
    pub fn merge_toml(mut self, content: &str) -> Result<Self> {
        let file: ConfigToml = toml::from_str(content)?;

        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(base_url) = file.base_url {
            self.base_url = base_url;
        }
        if file.api_key.is_some() {
            self.api_key = file.api_key;
        }
        if let Some(temperature) = file.temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = file.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(limit) = file.history_limit {
            self.history_limit = limit;
        }
        if let Some(keep) = file.history_keep {
            self.history_keep = keep;
        }
        if let Some(mode) = file.mode {
            self.mode = mode;
        }
        Ok(self)
    }

    /// Overlay process environment variables
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(model) = non_empty(ENV_MODEL) {
            self.model = model;
        }
        if let Some(base_url) = non_empty(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        self
    }

    pub fn with_mode(mut self, mode: Option<Mode>) -> Self {
        if let Some(mode) = mode {
            self.mode = mode;
        }
        self
    }

    /// Reject settings the client or history cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(TutorError::Config(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(TutorError::Config("model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TutorError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        if self.history_keep == 0 || self.history_keep >= self.history_limit {
            return Err(TutorError::Config(format!(
                "history_keep ({}) must be at least 1 and below history_limit ({})",
                self.history_keep, self.history_limit
            )));
        }
        Ok(())
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            request_timeout: self.request_timeout,
        }
    }
}
