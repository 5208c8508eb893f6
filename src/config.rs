//! Environment-driven configuration for the chat server.

use std::time::Duration;

use thiserror::Error;

/// Primary environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Fallback environment variable for the API key.
pub const API_KEY_FALLBACK_ENV: &str = "GOOGLE_API_KEY";
/// Model override.
pub const MODEL_ENV: &str = "GEMINI_CHAT_MODEL";
/// API base URL override.
pub const BASE_URL_ENV: &str = "GEMINI_CHAT_BASE_URL";
/// Listening port.
pub const PORT_ENV: &str = "GEMINI_CHAT_PORT";
/// Remote call timeout in seconds.
pub const TIMEOUT_ENV: &str = "GEMINI_CHAT_TIMEOUT_SECS";
/// Idle session lifetime in seconds.
pub const SESSION_TTL_ENV: &str = "GEMINI_CHAT_SESSION_TTL_SECS";
/// Interval between idle-session sweeps in seconds.
pub const SWEEP_INTERVAL_ENV: &str = "GEMINI_CHAT_SWEEP_INTERVAL_SECS";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Default Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default server port.
pub const DEFAULT_PORT: u16 = 8501;

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Configuration errors. All of them abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key in the environment.
    #[error("missing API key: set GEMINI_API_KEY (or GOOGLE_API_KEY)")]
    MissingApiKey,
    /// A variable was present but could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Convenience result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Runtime configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Gemini API key.
    pub api_key: String,
    /// Model identifier sent to the API.
    pub model: String,
    /// Base URL of the Generative Language API.
    pub base_url: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Upper bound for a single remote call.
    pub request_timeout: Duration,
    /// Sessions idle for longer than this are discarded.
    pub session_ttl: Duration,
    /// How often idle sessions are swept.
    pub sweep_interval: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("session_ttl", &self.session_ttl)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

impl AppConfig {
    /// Create a config with defaults and the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }

    /// Load the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingApiKey`] when no key is set, or
    /// [`ConfigError::InvalidValue`] when a numeric variable does not parse.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_blank(API_KEY_ENV)
            .or_else(|| non_blank(API_KEY_FALLBACK_ENV))
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(model) = non_blank(MODEL_ENV) {
            config = config.with_model(model);
        }
        if let Some(url) = non_blank(BASE_URL_ENV) {
            config = config.with_base_url(url.trim_end_matches('/'));
        }
        if let Some(port) = parse_var(&lookup, PORT_ENV)? {
            config.port = port;
        }
        if let Some(secs) = parse_var::<_, u64>(&lookup, TIMEOUT_ENV)? {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name: TIMEOUT_ENV,
                    value: secs.to_string(),
                });
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var(&lookup, SESSION_TTL_ENV)? {
            config = config.with_session_ttl(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var(&lookup, SWEEP_INTERVAL_ENV)? {
            config.sweep_interval = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the remote call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the idle session lifetime.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> ConfigResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}
